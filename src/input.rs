use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;

use crate::config::InputLayout;
use crate::error::PlanError;
use crate::types::{Cell, RawRow};

/// Reads the bill of materials from an `.xlsx`/`.xls` workbook or a `.csv`
/// file, choosing the reader by extension.
pub fn read_rows(path: &Path, layout: &InputLayout) -> Result<Vec<RawRow>, PlanError> {
    if !path.exists() {
        return Err(PlanError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let grid = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => read_workbook(path, &layout.sheet)?,
        "csv" => read_csv(path)?,
        _ => return Err(PlanError::UnsupportedFormat(ext)),
    };

    let rows = rows_from_grid(&grid, layout)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "read input");
    Ok(rows)
}

fn read_workbook(path: &Path, sheet: &str) -> Result<Vec<Vec<Cell>>, PlanError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| PlanError::Excel(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(PlanError::SheetNotFound(sheet.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PlanError::Excel(e.to_string()))?;

    // The range starts at the first used cell; pad so indices match the sheet
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); first_row];
    grid.extend(range.rows().map(|row| row.iter().map(to_cell).collect()));
    Ok(grid)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Vec<Cell>>, PlanError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

/// Maps a grid of cells to rows using the header names in `layout`. Rows
/// above the header are skipped; fully blank rows keep their position but
/// are not returned.
pub fn rows_from_grid(grid: &[Vec<Cell>], layout: &InputLayout) -> Result<Vec<RawRow>, PlanError> {
    let Some(header) = grid.get(layout.header_row) else {
        return Ok(Vec::new());
    };

    let column = |name: &str| -> Result<usize, PlanError> {
        header
            .iter()
            .position(|cell| cell.as_text().as_deref() == Some(name))
            .ok_or_else(|| PlanError::MissingColumn {
                row: layout.header_row + 1,
                column: name.to_string(),
            })
    };

    let material = column(&layout.material)?;
    let quantity = column(&layout.quantity)?;
    let length = column(&layout.length)?;
    let unit = column(&layout.unit)?;
    let tag = column(&layout.tag)?;

    let cell = |row: &[Cell], idx: usize| row.get(idx).cloned().unwrap_or_default();

    let rows = grid[layout.header_row + 1..]
        .iter()
        .enumerate()
        .map(|(position, row)| {
            let row = row.as_slice();
            RawRow {
                position,
                material: cell(row, material),
                quantity: cell(row, quantity),
                length: cell(row, length),
                unit: cell(row, unit),
                tag: cell(row, tag),
            }
        })
        .filter(|row| !row.is_blank())
        .collect();

    Ok(rows)
}
