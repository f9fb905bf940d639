use std::fs::File;
use std::path::{Path, PathBuf};

use bar_cut_optimizer::config::{
    DEFAULT_MAX_USABLE_LENGTH, DEFAULT_PURCHASE_UNIT_LENGTH, InputLayout, PlanConfig,
};
use bar_cut_optimizer::diagnostics::{ConsoleSink, LogFileSink, Tee};
use bar_cut_optimizer::error::PlanError;
use bar_cut_optimizer::{input, plan, render, report};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "bar_cut_optimizer",
    about = "Cutting plan and purchase list for linear stock from a bill of materials"
)]
struct Cli {
    /// Bill of materials (.xlsx, .xls or .csv)
    input: PathBuf,

    /// Longest total of cuts one bar yields, in metres
    #[arg(long, default_value_t = DEFAULT_MAX_USABLE_LENGTH)]
    max_usable_length: f64,

    /// Length of one bar as sold, in metres
    #[arg(long, default_value_t = DEFAULT_PURCHASE_UNIT_LENGTH)]
    purchase_unit_length: f64,

    /// Worksheet holding the bill of materials
    #[arg(long, default_value = "Lista")]
    sheet: String,

    /// 0-based row holding the column headers
    #[arg(long, default_value_t = 1)]
    header_row: usize,

    /// Directory for the reports and message log (default: next to the input)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Show ASCII layout of each bar
    #[arg(long)]
    layout: bool,

    /// Print the plan as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PlanError> {
    let config = PlanConfig::new(cli.max_usable_length, cli.purchase_unit_length);
    config.validate()?;

    let layout = InputLayout {
        sheet: cli.sheet.clone(),
        header_row: cli.header_row,
        ..InputLayout::default()
    };

    let rows = input::read_rows(&cli.input, &layout)?;
    if rows.is_empty() {
        return Err(PlanError::EmptyDataset);
    }

    let dir = output_dir(cli);
    let stem = cli
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bill_of_materials".to_string());

    let log_path = dir.join(format!("{stem}_messages.txt"));
    let mut sink = Tee(ConsoleSink, LogFileSink::new(File::create(&log_path)?));

    let plan = plan::run(&rows, &config, layout.row_offset(), &mut sink)?;
    let written = report::write_reports(&dir, &stem, &plan)?;

    if cli.json {
        let json = report::PlanReport::from(&plan);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", render::render_cutting_plan(&plan, cli.layout));
        print!("{}", render::render_purchase_summary(&plan));
        println!("{}", render::render_summary(&plan));
    }

    for path in &written {
        eprintln!("Saved '{}'", path.display());
    }
    eprintln!("Messages saved to '{}'", log_path.display());
    Ok(())
}

fn output_dir(cli: &Cli) -> PathBuf {
    match &cli.out_dir {
        Some(dir) => dir.clone(),
        None => cli
            .input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}
