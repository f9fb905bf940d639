use std::collections::BTreeMap;

use crate::types::{Item, MaterialGroup, MaterialPurchase, PurchaseLine};

/// Builds one purchase row set per material from the unexpanded items and
/// the pieces the solver produced for them. Performs no packing of its own.
pub fn summarize(
    items: &[Item],
    groups: &[MaterialGroup],
    purchase_unit_length: f64,
) -> Vec<MaterialPurchase> {
    let mut by_material: BTreeMap<&str, Vec<PurchaseLine>> = BTreeMap::new();
    for item in items {
        let lines = by_material.entry(item.material.as_str()).or_default();
        match lines.iter_mut().find(|l| l.length == item.length) {
            Some(line) => line.quantity += u64::from(item.quantity),
            None => lines.push(PurchaseLine {
                length: item.length,
                quantity: u64::from(item.quantity),
            }),
        }
    }

    by_material
        .into_iter()
        .map(|(material, mut lines)| {
            lines.sort_by(|a, b| b.length.total_cmp(&a.length));
            let piece_count = groups
                .iter()
                .find(|g| g.material == material)
                .map_or(0, MaterialGroup::piece_count);
            let demanded_length: f64 = lines.iter().map(|l| l.length * l.quantity as f64).sum();
            MaterialPurchase {
                material: material.to_string(),
                lines,
                piece_count,
                demanded_length,
                purchase_length: rounded_purchase_length(piece_count, purchase_unit_length),
            }
        })
        .collect()
}

/// Whole bars, not the summed demand rounded up.
pub fn rounded_purchase_length(piece_count: usize, purchase_unit_length: f64) -> f64 {
    piece_count as f64 * purchase_unit_length
}
