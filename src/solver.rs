use std::collections::BTreeMap;

use crate::types::{Cut, Item, MaterialGroup, Piece};

/// First-fit-decreasing allocation of cuts to stock bars, one material at a
/// time.
pub struct Solver {
    max_usable_length: f64,
    items: Vec<Item>,
}

impl Solver {
    pub fn new(max_usable_length: f64, items: Vec<Item>) -> Self {
        Self {
            max_usable_length,
            items,
        }
    }

    /// Groups come back ordered by material name.
    pub fn solve(&self) -> Vec<MaterialGroup> {
        self.expand_items()
            .into_iter()
            .map(|(material, cuts)| {
                let pieces = self.first_fit(cuts);
                tracing::debug!(
                    material = material.as_str(),
                    pieces = pieces.len(),
                    "allocated material"
                );
                MaterialGroup { material, pieces }
            })
            .collect()
    }

    fn expand_items(&self) -> BTreeMap<String, Vec<Cut>> {
        let mut by_material: BTreeMap<String, Vec<Cut>> = BTreeMap::new();
        for item in &self.items {
            let cuts = by_material.entry(item.material.clone()).or_default();
            for _ in 0..item.quantity {
                cuts.push(Cut {
                    material: item.material.clone(),
                    length: item.length,
                    tag: item.tag.clone(),
                    source_row: item.source_row,
                });
            }
        }
        // Longest first; stable so equal lengths keep input order
        for cuts in by_material.values_mut() {
            cuts.sort_by(|a, b| b.length.total_cmp(&a.length));
        }
        by_material
    }

    fn first_fit(&self, cuts: Vec<Cut>) -> Vec<Piece> {
        let mut pieces: Vec<Piece> = Vec::new();

        for cut in cuts {
            // Earliest piece with room wins, not the tightest one
            match pieces
                .iter_mut()
                .find(|p| p.fits(cut.length, self.max_usable_length))
            {
                Some(piece) => piece.push(cut),
                None => pieces.push(Piece::new(cut)),
            }
        }

        pieces
    }
}

/// Allocates every item to pieces no longer than `max_usable_length`.
pub fn allocate(items: &[Item], max_usable_length: f64) -> Vec<MaterialGroup> {
    Solver::new(max_usable_length, items.to_vec()).solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f64 = 5.9;

    fn item(material: &str, quantity: u32, length: f64) -> Item {
        Item {
            material: material.to_string(),
            quantity,
            length,
            unit: "m".to_string(),
            tag: "T1".to_string(),
            source_row: 3,
        }
    }

    /// Validates a complete allocation:
    /// 1. Every piece fits within the bar, unless it isolates one oversize cut
    /// 2. Every demanded cut is placed exactly once per material
    fn assert_allocation_valid(groups: &[MaterialGroup], items: &[Item]) {
        assert_allocation_valid_with(groups, items, MAX);
    }

    fn assert_allocation_valid_with(groups: &[MaterialGroup], items: &[Item], max: f64) {
        for group in groups {
            for (pi, piece) in group.pieces.iter().enumerate() {
                assert!(!piece.is_empty(), "{}: piece {pi} is empty", group.material);
                let total: f64 = piece.cuts.iter().map(|c| c.length).sum();
                let isolated_oversize = piece.len() == 1 && piece.cuts[0].length > max;
                assert!(
                    total <= max + 1e-9 || isolated_oversize,
                    "{}: piece {pi} holds {total} m, over the {max} m limit",
                    group.material
                );
                assert!((piece.occupied_length() - total).abs() < 1e-9);
                assert!(piece.cuts.iter().all(|c| c.material == group.material));
            }

            let expected: u32 = items
                .iter()
                .filter(|i| i.material == group.material)
                .map(|i| i.quantity)
                .sum();
            assert_eq!(
                group.cut_count(),
                expected as usize,
                "{}: expected {expected} cuts placed, got {}",
                group.material,
                group.cut_count()
            );
        }
    }

    fn lengths(piece: &Piece) -> Vec<f64> {
        piece.cuts.iter().map(|c| c.length).collect()
    }

    #[test]
    fn test_no_items() {
        assert!(allocate(&[], MAX).is_empty());
    }

    #[test]
    fn test_decreasing_first_fit() {
        let items = vec![item("A", 3, 2.0), item("A", 1, 4.0)];
        let groups = allocate(&items, MAX);
        assert_allocation_valid(&groups, &items);

        assert_eq!(groups.len(), 1);
        let pieces = &groups[0].pieces;
        assert_eq!(pieces.len(), 3);
        assert_eq!(lengths(&pieces[0]), vec![4.0]);
        assert_eq!(lengths(&pieces[1]), vec![2.0, 2.0]);
        assert_eq!(lengths(&pieces[2]), vec![2.0]);
    }

    #[test]
    fn test_first_fit_not_best_fit() {
        // With [3.0] and [2.1, 2.1] open, 0.5 lands in the first piece even
        // though the second one is the tighter fit.
        let items = vec![item("A", 1, 3.0), item("A", 2, 2.1), item("A", 1, 0.5)];
        let groups = allocate(&items, 5.0);
        assert_allocation_valid_with(&groups, &items, 5.0);
        let pieces = &groups[0].pieces;
        assert_eq!(pieces.len(), 2);
        assert_eq!(lengths(&pieces[0]), vec![3.0, 0.5]);
        assert_eq!(lengths(&pieces[1]), vec![2.1, 2.1]);
    }

    #[test]
    fn test_nothing_fits_opens_new_piece() {
        let items = vec![item("A", 1, 3.0), item("A", 1, 2.9), item("A", 1, 1.0)];
        let groups = allocate(&items, 3.5);
        let pieces = &groups[0].pieces;
        assert_eq!(pieces.len(), 3);
        assert_eq!(lengths(&pieces[2]), vec![1.0]);
    }

    #[test]
    fn test_exact_fill_with_float_lengths() {
        let items = vec![item("A", 1, 3.9), item("A", 1, 2.0)];
        let groups = allocate(&items, MAX);
        assert_eq!(groups[0].piece_count(), 1);
    }

    #[test]
    fn test_oversize_cut_isolated() {
        let items = vec![item("A", 1, 7.0), item("A", 2, 1.0)];
        let groups = allocate(&items, MAX);
        assert_allocation_valid(&groups, &items);

        let pieces = &groups[0].pieces;
        assert_eq!(pieces.len(), 2);
        assert_eq!(lengths(&pieces[0]), vec![7.0]);
        assert!(pieces[0].is_oversize(MAX));
        assert_eq!(pieces[0].occupied_length(), 7.0);
        assert_eq!(lengths(&pieces[1]), vec![1.0, 1.0]);
    }

    #[test]
    fn test_materials_independent_and_sorted() {
        let items = vec![item("B", 1, 3.0), item("A", 1, 3.0), item("B", 1, 2.5)];
        let groups = allocate(&items, MAX);
        assert_allocation_valid(&groups, &items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].material, "A");
        assert_eq!(groups[1].material, "B");
        assert_eq!(groups[0].piece_count(), 1);
        assert_eq!(groups[1].piece_count(), 1);
    }

    #[test]
    fn test_equal_lengths_keep_input_order() {
        let mut first = item("A", 1, 2.0);
        first.tag = "first".to_string();
        let mut second = item("A", 1, 2.0);
        second.tag = "second".to_string();
        let groups = allocate(&[first, second], MAX);
        let tags: Vec<&str> = groups[0].pieces[0].cuts.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["first", "second"]);
    }

    #[test]
    fn test_deterministic() {
        let items = vec![
            item("A", 4, 1.2),
            item("A", 3, 2.7),
            item("B", 5, 0.8),
            item("A", 2, 4.1),
            item("B", 1, 5.9),
        ];
        assert_eq!(allocate(&items, MAX), allocate(&items, MAX));
    }

    /// 60 cuts, 8 different lengths across three materials.
    #[test]
    fn test_complex_mixed_lengths() {
        let items = vec![
            item("UDC 75", 6, 1.35),
            item("UDC 75", 4, 2.8),
            item("UDC 75", 9, 0.45),
            item("L 50x5", 12, 0.6),
            item("L 50x5", 3, 5.2),
            item("L 50x5", 7, 1.75),
            item("TUBE 40", 10, 2.95),
            item("TUBE 40", 9, 3.1),
        ];
        let total: u32 = items.iter().map(|i| i.quantity).sum();
        assert_eq!(total, 60);

        let groups = allocate(&items, MAX);
        assert_allocation_valid(&groups, &items);

        // Lower bound: total demanded length / bar length
        for group in &groups {
            let min_pieces = (group.demanded_length() / MAX).ceil() as usize;
            assert!(group.piece_count() >= min_pieces);
        }
        // 3.1 never shares a bar; 2.95 only pairs with itself
        let tube = groups.iter().find(|g| g.material == "TUBE 40").unwrap();
        assert_eq!(tube.piece_count(), 9 + 5);
    }
}
