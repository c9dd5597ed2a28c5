//! Variant expansion: one variant per combination of attribute-line values.

use crate::attribute::{AttributeLine, AttributeValueId};

/// Expand attribute lines into value combinations (cartesian product).
///
/// Combinations are produced in line order, with the last line varying
/// fastest. No lines yields a single, empty combination: a template without
/// attributes still has exactly one variant. Lines without values are
/// ignored.
pub fn expand_combinations(lines: &[AttributeLine]) -> Vec<Vec<AttributeValueId>> {
    let mut combinations: Vec<Vec<AttributeValueId>> = vec![Vec::new()];

    for line in lines.iter().filter(|l| !l.value_ids.is_empty()) {
        let mut next = Vec::with_capacity(combinations.len() * line.value_ids.len());
        for prefix in &combinations {
            for value_id in &line.value_ids {
                let mut combination = prefix.clone();
                combination.push(*value_id);
                next.push(combination);
            }
        }
        combinations = next;
    }

    combinations
}
