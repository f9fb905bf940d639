use crate::config::PlanConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::PlanError;
use crate::purchase;
use crate::solver::Solver;
use crate::types::{CutPlan, Item, RawRow};
use crate::validate::Validator;

/// Only rows measured in this unit are cut from bars.
pub const LINEAR_UNIT: &str = "m";

/// Largest row quantity that is expanded into cuts. Anything above is taken
/// as a data entry error and left out of allocation.
pub const MAX_QUANTITY: u32 = 1_000_000;

/// Runs validation, allocation and purchase aggregation over one dataset.
///
/// `row_offset` turns a row's position into its displayed row number.
/// Diagnostics go to `sink` in the order they are found and are also kept
/// on the returned plan. An empty dataset halts the run before validation.
pub fn run(
    rows: &[RawRow],
    config: &PlanConfig,
    row_offset: usize,
    sink: &mut dyn DiagnosticSink,
) -> Result<CutPlan, PlanError> {
    config.validate()?;
    if rows.is_empty() {
        return Err(PlanError::EmptyDataset);
    }

    let diagnostics = Validator::new(config.max_usable_length, row_offset).validate(rows);
    for d in &diagnostics {
        sink.report(d);
    }

    let items = select_items(rows, row_offset);
    let groups = Solver::new(config.max_usable_length, items.clone()).solve();
    let purchases = purchase::summarize(&items, &groups, config.purchase_unit_length);

    let plan = CutPlan {
        config: *config,
        diagnostics,
        groups,
        purchases,
    };
    tracing::info!(
        rows = rows.len(),
        items = items.len(),
        diagnostics = plan.diagnostics.len(),
        pieces = plan.piece_count(),
        purchase_length = plan.total_purchase_length(),
        "cut plan computed"
    );
    Ok(plan)
}

/// Rows that take part in allocation: unit `m`, a numeric positive length,
/// a non-blank material and a quantity of at least one.
pub fn select_items(rows: &[RawRow], row_offset: usize) -> Vec<Item> {
    let items: Vec<Item> = rows
        .iter()
        .filter_map(|row| to_item(row, row_offset))
        .collect();
    tracing::debug!(
        selected = items.len(),
        skipped = rows.len() - items.len(),
        "selected linear items"
    );
    items
}

fn to_item(row: &RawRow, row_offset: usize) -> Option<Item> {
    let unit = row.unit.as_text()?;
    if unit != LINEAR_UNIT {
        return None;
    }
    let length = row.length.as_number().filter(|l| *l > 0.0)?;
    let material = row.material.as_text().filter(|m| !m.is_empty())?;
    // Truncated like an integer cast of the cell
    let quantity = row.quantity.as_number().filter(|q| *q >= 1.0)?.trunc();
    if quantity > f64::from(MAX_QUANTITY) {
        tracing::debug!(
            row = row.position + row_offset,
            quantity,
            "quantity out of range, row skipped"
        );
        return None;
    }
    let quantity = quantity as u32;

    Some(Item {
        material,
        quantity,
        length,
        unit,
        tag: row.tag.as_text().unwrap_or_default(),
        source_row: row.position + row_offset,
    })
}
