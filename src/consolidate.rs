use crate::types::{ConsolidatedLine, Piece};

/// Collapses identical (material, length, tag) cuts within a piece into one
/// line each, in the order each combination first appears.
pub fn consolidate(piece: &Piece) -> Vec<ConsolidatedLine> {
    let mut lines: Vec<ConsolidatedLine> = Vec::new();
    for cut in &piece.cuts {
        match lines
            .iter_mut()
            .find(|l| l.material == cut.material && l.length == cut.length && l.tag == cut.tag)
        {
            Some(line) => line.count += 1,
            None => lines.push(ConsolidatedLine {
                material: cut.material.clone(),
                length: cut.length,
                tag: cut.tag.clone(),
                count: 1,
            }),
        }
    }
    lines
}
