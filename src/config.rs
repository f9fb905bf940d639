use serde::{Deserialize, Serialize};

use crate::error::PlanError;

pub const DEFAULT_MAX_USABLE_LENGTH: f64 = 5.9;
pub const DEFAULT_PURCHASE_UNIT_LENGTH: f64 = 6.0;

/// Bar lengths used by allocation and purchase rounding, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Longest total of cuts a single bar can yield after trim.
    #[serde(default = "default_max_usable_length")]
    pub max_usable_length: f64,
    /// Length of one bar as sold.
    #[serde(default = "default_purchase_unit_length")]
    pub purchase_unit_length: f64,
}

fn default_max_usable_length() -> f64 {
    DEFAULT_MAX_USABLE_LENGTH
}

fn default_purchase_unit_length() -> f64 {
    DEFAULT_PURCHASE_UNIT_LENGTH
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            max_usable_length: DEFAULT_MAX_USABLE_LENGTH,
            purchase_unit_length: DEFAULT_PURCHASE_UNIT_LENGTH,
        }
    }
}

impl PlanConfig {
    pub fn new(max_usable_length: f64, purchase_unit_length: f64) -> Self {
        Self {
            max_usable_length,
            purchase_unit_length,
        }
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.max_usable_length.is_finite() || self.max_usable_length <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "max usable length must be positive, got {}",
                self.max_usable_length
            )));
        }
        if !self.purchase_unit_length.is_finite() || self.purchase_unit_length <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "purchase unit length must be positive, got {}",
                self.purchase_unit_length
            )));
        }
        if self.purchase_unit_length < self.max_usable_length {
            return Err(PlanError::InvalidConfig(format!(
                "purchase unit length {} is shorter than max usable length {}",
                self.purchase_unit_length, self.max_usable_length
            )));
        }
        Ok(())
    }
}

/// Where the bill of materials lives inside the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayout {
    /// Worksheet name; ignored for CSV.
    pub sheet: String,
    /// 0-based row index of the header row. Rows above it are skipped.
    pub header_row: usize,
    pub material: String,
    pub quantity: String,
    pub length: String,
    pub unit: String,
    pub tag: String,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            sheet: "Lista".to_string(),
            header_row: 1,
            material: "Material".to_string(),
            quantity: "Quant.".to_string(),
            length: "Dimensão".to_string(),
            unit: "Unid. Medida".to_string(),
            tag: "TAG DO CONJUNTO".to_string(),
        }
    }
}

impl InputLayout {
    /// 1-based spreadsheet row of the data row at `position`.
    pub fn display_row(&self, position: usize) -> usize {
        position + self.row_offset()
    }

    /// Offset between a data row's position and its displayed row number.
    pub fn row_offset(&self) -> usize {
        self.header_row + 2
    }
}
