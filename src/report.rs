use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;

use crate::config::PlanConfig;
use crate::consolidate::consolidate;
use crate::error::PlanError;
use crate::render::format_mm;
use crate::types::{Cut, CutPlan, Diagnostic, MaterialGroup, MaterialPurchase, Piece};

/// JSON shape of a plan, as printed by `--json` and returned over HTTP.
/// Pieces carry both their raw cuts and the consolidated lines.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub config: PlanConfig,
    pub diagnostics: Vec<Diagnostic>,
    pub groups: Vec<GroupReport>,
    pub purchases: Vec<MaterialPurchase>,
    pub piece_count: usize,
    pub purchase_length: f64,
    pub waste_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub material: String,
    pub piece_count: usize,
    pub pieces: Vec<PieceReport>,
}

#[derive(Debug, Serialize)]
pub struct PieceReport {
    pub occupied_length: f64,
    pub oversize: bool,
    pub cuts: Vec<Cut>,
    pub lines: Vec<LineReport>,
}

#[derive(Debug, Serialize)]
pub struct LineReport {
    pub material: String,
    pub length: f64,
    pub tag: String,
    pub count: u32,
    pub oversize: bool,
}

impl From<&CutPlan> for PlanReport {
    fn from(plan: &CutPlan) -> Self {
        let max = plan.config.max_usable_length;
        Self {
            config: plan.config,
            diagnostics: plan.diagnostics.clone(),
            groups: plan.groups.iter().map(|g| group_report(g, max)).collect(),
            purchases: plan.purchases.clone(),
            piece_count: plan.piece_count(),
            purchase_length: plan.total_purchase_length(),
            waste_percent: plan.total_waste_percent(),
        }
    }
}

fn group_report(group: &MaterialGroup, max: f64) -> GroupReport {
    GroupReport {
        material: group.material.clone(),
        piece_count: group.piece_count(),
        pieces: group.pieces.iter().map(|p| piece_report(p, max)).collect(),
    }
}

fn piece_report(piece: &Piece, max: f64) -> PieceReport {
    let lines = consolidate(piece)
        .into_iter()
        .map(|line| LineReport {
            oversize: line.exceeds(max),
            material: line.material,
            length: line.length,
            tag: line.tag,
            count: line.count,
        })
        .collect();
    PieceReport {
        occupied_length: piece.occupied_length(),
        oversize: piece.is_oversize(max),
        cuts: piece.cuts.clone(),
        lines,
    }
}

/// Writes the cutting plan view as CSV: a material header row, a row per
/// piece, then one `Length` row per consolidated line.
pub fn write_cutting_plan<W: Write>(writer: W, plan: &CutPlan) -> Result<(), PlanError> {
    let max = plan.config.max_usable_length;
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);

    wtr.write_record(["Cutting Plan"])?;
    for group in &plan.groups {
        wtr.write_record(["Material", group.material.as_str()])?;
        for (i, piece) in group.pieces.iter().enumerate() {
            wtr.write_record([
                format!("Piece {}", i + 1),
                format!("Total Length: {:.2} m", piece.occupied_length()),
            ])?;
            for line in consolidate(piece) {
                wtr.write_record([
                    "Length".to_string(),
                    format_mm(line.length),
                    line.count.to_string(),
                    line.tag.clone(),
                    (if line.exceeds(max) { "oversize" } else { "" }).to_string(),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the purchase view as CSV: summed quantity per length under each
/// material, closed by the whole-bar purchase total.
pub fn write_purchase_summary<W: Write>(writer: W, plan: &CutPlan) -> Result<(), PlanError> {
    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);

    wtr.write_record(["Grouping"])?;
    for purchase in &plan.purchases {
        wtr.write_record(["Material", purchase.material.as_str()])?;
        for line in &purchase.lines {
            wtr.write_record([
                "Length (mm)".to_string(),
                format_mm(line.length),
                line.quantity.to_string(),
            ])?;
        }
        wtr.write_record([
            "Total to purchase:".to_string(),
            format!("{:.1} m", purchase.purchase_length),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `<stem>_cutting_plan.csv` and `<stem>_purchase.csv` into `dir`.
pub fn write_reports(dir: &Path, stem: &str, plan: &CutPlan) -> Result<Vec<PathBuf>, PlanError> {
    let cutting = dir.join(format!("{stem}_cutting_plan.csv"));
    write_cutting_plan(File::create(&cutting)?, plan)?;

    let purchase = dir.join(format!("{stem}_purchase.csv"));
    write_purchase_summary(File::create(&purchase)?, plan)?;

    tracing::info!(
        cutting_plan = %cutting.display(),
        purchase = %purchase.display(),
        "reports written"
    );
    Ok(vec![cutting, purchase])
}
