use serde::{Deserialize, Serialize};

use crate::config::PlanConfig;

/// Slack applied when comparing summed lengths against a bar limit, so that
/// e.g. 3.9 + 2.0 still fits a 5.9 m bar despite binary rounding.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// True when `length` is longer than a bar can yield. Validation, allocation
/// and reporting all decide oversize through this one test.
pub fn exceeds_limit(length: f64, max_usable_length: f64) -> bool {
    length > max_usable_length + LENGTH_TOLERANCE
}

/// One spreadsheet cell after ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    /// Numeric value of the cell, coercing text the way a spreadsheet
    /// "to number" conversion would. Anything unparseable is `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Text content, trimmed. Numbers are rendered without a trailing `.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Empty => None,
        }
    }

    /// True for an empty cell or one holding only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s.trim()),
            Cell::Empty => Ok(()),
        }
    }
}

/// A bill-of-materials row as read from the input, before any filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// 0-based index of the row below the header.
    pub position: usize,
    #[serde(default)]
    pub material: Cell,
    #[serde(default)]
    pub quantity: Cell,
    #[serde(default)]
    pub length: Cell,
    #[serde(default)]
    pub unit: Cell,
    #[serde(default)]
    pub tag: Cell,
}

impl RawRow {
    pub fn is_blank(&self) -> bool {
        self.material.is_blank()
            && self.quantity.is_blank()
            && self.length.is_blank()
            && self.unit.is_blank()
            && self.tag.is_blank()
    }
}

/// A demanded cut, `quantity` times over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub material: String,
    pub quantity: u32,
    /// Metres.
    pub length: f64,
    pub unit: String,
    pub tag: String,
    /// Row number as displayed in the source spreadsheet.
    pub source_row: usize,
}

/// One physical cut: a single instance of an [`Item`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cut {
    pub material: String,
    pub length: f64,
    pub tag: String,
    pub source_row: usize,
}

/// One stock bar and the cuts assigned to it, in placement order.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub cuts: Vec<Cut>,
    occupied_length: f64,
}

impl Piece {
    pub fn new(cut: Cut) -> Self {
        let occupied_length = cut.length;
        Self {
            cuts: vec![cut],
            occupied_length,
        }
    }

    pub fn occupied_length(&self) -> f64 {
        self.occupied_length
    }

    pub fn remaining_length(&self, max_usable_length: f64) -> f64 {
        max_usable_length - self.occupied_length
    }

    pub fn fits(&self, length: f64, max_usable_length: f64) -> bool {
        self.occupied_length + length <= max_usable_length + LENGTH_TOLERANCE
    }

    pub fn push(&mut self, cut: Cut) {
        self.occupied_length += cut.length;
        self.cuts.push(cut);
    }

    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    /// A piece holding a single cut longer than the bar itself.
    pub fn is_oversize(&self, max_usable_length: f64) -> bool {
        exceeds_limit(self.occupied_length, max_usable_length)
    }
}

/// All pieces cut for one material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup {
    pub material: String,
    pub pieces: Vec<Piece>,
}

impl MaterialGroup {
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn cut_count(&self) -> usize {
        self.pieces.iter().map(Piece::len).sum()
    }

    pub fn demanded_length(&self) -> f64 {
        self.pieces.iter().map(Piece::occupied_length).sum()
    }
}

/// Identical cuts within one piece, collapsed to a count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedLine {
    pub material: String,
    pub length: f64,
    pub tag: String,
    pub count: u32,
}

impl ConsolidatedLine {
    pub fn exceeds(&self, max_usable_length: f64) -> bool {
        exceeds_limit(self.length, max_usable_length)
    }
}

/// Summed demand for one (material, length) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseLine {
    pub length: f64,
    /// Summed over every row of the material, so wider than a row quantity.
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialPurchase {
    pub material: String,
    /// Ordered by length, longest first.
    pub lines: Vec<PurchaseLine>,
    pub piece_count: usize,
    pub demanded_length: f64,
    /// Whole bars: `piece_count * purchase_unit_length`.
    pub purchase_length: f64,
}

impl MaterialPurchase {
    pub fn waste_length(&self) -> f64 {
        self.purchase_length - self.demanded_length
    }
}

/// A policy violation found in the input. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub title: String,
    pub message: String,
    pub source_row: usize,
}

#[derive(Debug, Clone)]
pub struct CutPlan {
    pub config: PlanConfig,
    pub diagnostics: Vec<Diagnostic>,
    pub groups: Vec<MaterialGroup>,
    pub purchases: Vec<MaterialPurchase>,
}

impl CutPlan {
    pub fn piece_count(&self) -> usize {
        self.groups.iter().map(MaterialGroup::piece_count).sum()
    }

    pub fn total_demanded_length(&self) -> f64 {
        self.purchases.iter().map(|p| p.demanded_length).sum()
    }

    pub fn total_purchase_length(&self) -> f64 {
        self.purchases.iter().map(|p| p.purchase_length).sum()
    }

    pub fn group(&self, material: &str) -> Option<&MaterialGroup> {
        self.groups.iter().find(|g| g.material == material)
    }

    pub fn purchase(&self, material: &str) -> Option<&MaterialPurchase> {
        self.purchases.iter().find(|p| p.material == material)
    }

    pub fn total_waste_percent(&self) -> f64 {
        let purchased = self.total_purchase_length();
        if purchased <= 0.0 {
            return 0.0;
        }
        (purchased - self.total_demanded_length()) / purchased * 100.0
    }
}
