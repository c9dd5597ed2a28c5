//! Row lookup for generated variants.

use std::collections::HashMap;

use crate::rows::ImportRow;

type Key = (Option<String>, Option<String>);

/// Index from (color, size) to the first row declaring that pair.
///
/// A row without a color (or size) acts as a wildcard on that dimension.
/// Built once per group, before variants are visited.
#[derive(Debug, Default, Clone)]
pub struct VariantRowIndex {
    first_row: HashMap<Key, usize>,
}

impl VariantRowIndex {
    pub fn build(rows: &[ImportRow]) -> Self {
        let mut first_row = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            first_row.entry((row.color.clone(), row.size.clone())).or_insert(idx);
        }
        Self { first_row }
    }

    /// Position of the first row matching a variant's color and size.
    ///
    /// A row matches when each of its color and size is either absent or
    /// equal to the variant's value.
    pub fn lookup(&self, color: Option<&str>, size: Option<&str>) -> Option<usize> {
        let colors = [color.map(str::to_string), None];
        let sizes = [size.map(str::to_string), None];

        let mut best: Option<usize> = None;
        for c in colors.iter().take(if color.is_some() { 2 } else { 1 }) {
            for s in sizes.iter().take(if size.is_some() { 2 } else { 1 }) {
                if let Some(&idx) = self.first_row.get(&(c.clone(), s.clone())) {
                    best = Some(best.map_or(idx, |b| b.min(idx)));
                }
            }
        }
        best
    }
}
