use std::fmt;

use crate::consolidate::consolidate;
use crate::types::{CutPlan, Piece};

const MAX_WIDTH: f64 = 80.0;

/// Length in whole millimetres, e.g. `2000 mm`.
pub fn format_mm(length: f64) -> String {
    format!("{:.0} mm", length * 1000.0)
}

/// Cutting plan view: every piece of every material with its consolidated
/// cuts. Cuts longer than the bar are marked `[OVERSIZE]`.
pub struct CuttingPlanView<'a> {
    pub plan: &'a CutPlan,
    pub layout: bool,
}

impl fmt::Display for CuttingPlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max = self.plan.config.max_usable_length;
        for group in &self.plan.groups {
            writeln!(f, "Material: {}", group.material)?;
            for (i, piece) in group.pieces.iter().enumerate() {
                writeln!(
                    f,
                    "  Piece {} - Total Length: {:.2} m",
                    i + 1,
                    piece.occupied_length()
                )?;
                for line in consolidate(piece) {
                    let flag = if line.exceeds(max) { " [OVERSIZE]" } else { "" };
                    writeln!(
                        f,
                        "    {:>9} x{:<3} {}{}",
                        format_mm(line.length),
                        line.count,
                        line.tag,
                        flag
                    )?;
                }
                if self.layout {
                    for row in render_bar(piece, max).lines() {
                        writeln!(f, "    {}", row)?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Purchase view: summed demand per length, longest first, then the
/// whole-bar purchase total for the material.
pub struct PurchaseView<'a>(pub &'a CutPlan);

impl fmt::Display for PurchaseView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for purchase in &self.0.purchases {
            writeln!(f, "Material: {}", purchase.material)?;
            for line in &purchase.lines {
                writeln!(f, "  {:>9}  {}", format_mm(line.length), line.quantity)?;
            }
            writeln!(
                f,
                "  Total to purchase: {:.1} m ({} bar{})",
                purchase.purchase_length,
                purchase.piece_count,
                if purchase.piece_count == 1 { "" } else { "s" },
            )?;
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn render_cutting_plan(plan: &CutPlan, layout: bool) -> String {
    CuttingPlanView { plan, layout }.to_string()
}

pub fn render_purchase_summary(plan: &CutPlan) -> String {
    PurchaseView(plan).to_string()
}

pub fn render_summary(plan: &CutPlan) -> String {
    format!(
        "Summary: {} piece{} used, {:.1} m to purchase, {:.1}% waste, {} diagnostic{}",
        plan.piece_count(),
        if plan.piece_count() == 1 { "" } else { "s" },
        plan.total_purchase_length(),
        plan.total_waste_percent(),
        plan.diagnostics.len(),
        if plan.diagnostics.len() == 1 { "" } else { "s" },
    )
}

/// ASCII layout of one bar, cuts left to right, unused length dotted.
pub fn render_bar(piece: &Piece, max_usable_length: f64) -> String {
    let span = piece.occupied_length().max(max_usable_length);
    if span <= 0.0 {
        return String::new();
    }
    let scale = MAX_WIDTH / span;
    let grid_w = (span * scale).round() as usize;

    let mut grid = vec![vec![' '; grid_w + 1]; 3];

    // Draw bar border first
    draw_rect(&mut grid, 0, grid_w);

    let mut offset = 0.0;
    for cut in &piece.cuts {
        let sx = (offset * scale).round() as usize;
        let ex = ((offset + cut.length) * scale).round() as usize;
        offset += cut.length;
        let sw = ex.saturating_sub(sx);
        if sw == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sw);

        // Label
        let label: Vec<char> = format!("{:.0}", cut.length * 1000.0).chars().collect();
        if sw > label.len() + 1 {
            let start_x = sx + sw / 2 - label.len() / 2;
            for (i, &ch) in label.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw {
                    grid[1][x] = ch;
                }
            }
        }
    }

    let used = (piece.occupied_length() * scale).round() as usize;
    for cell in grid[1].iter_mut().take(grid_w).skip(used + 1) {
        if *cell == ' ' {
            *cell = '.';
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, w: usize) {
    let cols = grid[0].len();
    let last = grid.len() - 1;

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            for row in [0, last] {
                grid[row][i] = if grid[row][i] == '|' || grid[row][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    // Vertical edges
    for row in grid.iter_mut().take(last).skip(1) {
        for edge in [x, x + w] {
            if edge < cols {
                row[edge] = '|';
            }
        }
    }

    // Corners
    for cx in [x, x + w] {
        if cx < cols {
            grid[0][cx] = '+';
            grid[last][cx] = '+';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::plan;
    use crate::types::{Cell, Cut, Diagnostic, RawRow};

    fn cut(length: f64, tag: &str) -> Cut {
        Cut {
            material: "A".to_string(),
            length,
            tag: tag.to_string(),
            source_row: 3,
        }
    }

    fn plan_of(lengths: &[f64]) -> CutPlan {
        let rows: Vec<RawRow> = lengths
            .iter()
            .enumerate()
            .map(|(i, l)| RawRow {
                position: i,
                material: Cell::Text("A".to_string()),
                quantity: Cell::Number(1.0),
                length: Cell::Number(*l),
                unit: Cell::Text("m".to_string()),
                tag: Cell::Text("CJ-01".to_string()),
            })
            .collect();
        let mut sink: Vec<Diagnostic> = Vec::new();
        plan::run(&rows, &PlanConfig::default(), 3, &mut sink).unwrap()
    }

    #[test]
    fn test_format_mm() {
        assert_eq!(format_mm(2.0), "2000 mm");
        assert_eq!(format_mm(0.451), "451 mm");
    }

    #[test]
    fn test_render_single_cut() {
        let output = render_bar(&Piece::new(cut(2.95, "T1")), 5.9);
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("2950"));
        assert!(output.contains('.'));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_render_two_cuts() {
        let mut piece = Piece::new(cut(3.0, "T1"));
        piece.push(cut(2.9, "T1"));
        let output = render_bar(&piece, 5.9);
        assert!(output.contains("3000"));
        assert!(output.contains("2900"));
        assert!(!output.contains('.'));
    }

    #[test]
    fn test_render_oversize_bar_scales_to_cut() {
        let output = render_bar(&Piece::new(cut(7.0, "T1")), 5.9);
        assert!(output.contains("7000"));
        assert!(output.lines().all(|l| l.chars().count() <= MAX_WIDTH as usize + 1));
    }

    #[test]
    fn test_cutting_plan_marks_oversize() {
        let plan = plan_of(&[7.0, 2.0, 2.0]);
        let text = render_cutting_plan(&plan, false);
        assert!(text.contains("Material: A"));
        assert!(text.contains("Piece 1 - Total Length: 7.00 m"));
        assert!(text.contains("7000 mm x1   CJ-01 [OVERSIZE]"));
        assert!(text.contains("2000 mm x2   CJ-01\n"));
    }

    #[test]
    fn test_oversize_flag_within_tolerance() {
        let plan = plan_of(&[5.9000000005, 5.900001]);
        let text = render_cutting_plan(&plan, false);
        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(text.matches("[OVERSIZE]").count(), 1);
    }

    #[test]
    fn test_views_write_to_formatter() {
        let plan = plan_of(&[2.0]);
        let view = CuttingPlanView {
            plan: &plan,
            layout: true,
        };
        let text = format!("{}{}", view, PurchaseView(&plan));
        assert!(text.starts_with("Material: A\n  Piece 1 - Total Length: 2.00 m\n"));
        assert!(text.contains("2000"));
        assert!(text.contains("Total to purchase: 6.0 m (1 bar)"));
    }

    #[test]
    fn test_purchase_summary() {
        let plan = plan_of(&[4.0, 2.0, 2.0, 2.0, 2.0]);
        let text = render_purchase_summary(&plan);
        assert!(text.contains("4000 mm  1"));
        assert!(text.contains("2000 mm  4"));
        assert!(text.contains("Total to purchase: 18.0 m (3 bars)"));
        assert!(render_summary(&plan).starts_with("Summary: 3 pieces used, 18.0 m to purchase"));
    }
}
