use crate::types::{Cell, Diagnostic, RawRow, exceeds_limit};

pub const OVERSIZE_TITLE: &str = "Error: Item Longer Than Limit";
pub const MISSING_MATERIAL_TITLE: &str = "Error: Missing or Empty Material";

/// Checks raw rows for policy violations. Every violation is reported and
/// none is fatal; offending rows still flow into allocation.
pub struct Validator {
    max_usable_length: f64,
    row_offset: usize,
}

impl Validator {
    pub fn new(max_usable_length: f64, row_offset: usize) -> Self {
        Self {
            max_usable_length,
            row_offset,
        }
    }

    /// All oversize diagnostics first, then all missing-material ones, each
    /// in row order.
    pub fn validate(&self, rows: &[RawRow]) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> =
            rows.iter().filter_map(|r| self.check_oversize(r)).collect();
        diagnostics.extend(rows.iter().filter_map(|r| self.check_material(r)));
        diagnostics
    }

    fn check_oversize(&self, row: &RawRow) -> Option<Diagnostic> {
        let length = row.length.as_number()?;
        if !exceeds_limit(length, self.max_usable_length) {
            return None;
        }
        let source_row = row.position + self.row_offset;
        Some(Diagnostic {
            title: OVERSIZE_TITLE.to_string(),
            message: format!(
                "Item: {} with TAG: {} has length {}m, greater than the limit of {}m. Row: {}",
                shown(&row.material),
                shown(&row.tag),
                length,
                self.max_usable_length,
                source_row
            ),
            source_row,
        })
    }

    fn check_material(&self, row: &RawRow) -> Option<Diagnostic> {
        if row.quantity.is_blank() || !row.material.is_blank() {
            return None;
        }
        let source_row = row.position + self.row_offset;
        Some(Diagnostic {
            title: MISSING_MATERIAL_TITLE.to_string(),
            message: format!(
                "Field 'Material' missing or empty for TAG: {}. Row: {}",
                shown(&row.tag),
                source_row
            ),
            source_row,
        })
    }
}

fn shown(cell: &Cell) -> String {
    if cell.is_blank() {
        "-".to_string()
    } else {
        cell.to_string()
    }
}
