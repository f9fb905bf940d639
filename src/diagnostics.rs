use std::io::Write;

use crate::types::Diagnostic;

/// Receives diagnostics in the order they are found. Delivery must never
/// fail the run, so implementations swallow their own errors.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.push(diagnostic.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: &Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Appends one `title: message` line per diagnostic.
pub struct LogFileSink<W: Write> {
    writer: W,
}

impl<W: Write> LogFileSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for LogFileSink<W> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        let written = writeln!(self.writer, "{}: {}", diagnostic.title, diagnostic.message)
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, row = diagnostic.source_row, "failed to write diagnostic to log");
        }
    }
}

/// Surfaces each diagnostic to the operator on stderr.
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        eprintln!("{}\n  {}", diagnostic.title, diagnostic.message);
    }
}

/// Forwards every diagnostic to both sinks, first `A` then `B`.
pub struct Tee<A, B>(pub A, pub B);

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for Tee<A, B> {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.0.report(diagnostic);
        self.1.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn diagnostic(title: &str, message: &str, source_row: usize) -> Diagnostic {
        Diagnostic {
            title: title.to_string(),
            message: message.to_string(),
            source_row,
        }
    }

    #[test]
    fn test_log_lines_in_order() {
        let mut sink = LogFileSink::new(Vec::new());
        sink.report(&diagnostic("First", "one", 3));
        sink.report(&diagnostic("Second", "two", 4));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "First: one\nSecond: two\n");
    }

    #[test]
    fn test_failed_write_does_not_panic() {
        let mut sink = LogFileSink::new(FailingWriter);
        sink.report(&diagnostic("Title", "message", 3));
    }

    #[test]
    fn test_tee_reaches_both() {
        let mut collected: Vec<Diagnostic> = Vec::new();
        let mut log = LogFileSink::new(Vec::new());
        {
            let mut tee = Tee(&mut collected, &mut log);
            tee.report(&diagnostic("T", "m", 9));
        }
        assert_eq!(collected, vec![diagnostic("T", "m", 9)]);
        assert_eq!(log.into_inner(), b"T: m\n");
    }

    #[test]
    fn test_collected_keeps_source_row() {
        let mut collected: Vec<Diagnostic> = Vec::new();
        collected.report(&diagnostic("T", "m", 12));
        assert_eq!(collected[0].source_row, 12);
    }
}
