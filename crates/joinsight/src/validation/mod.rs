//! Join-field diagnostics.
//!
//! Each proposed column pair gets a fixed battery of checks: uniqueness,
//! pattern match, null analysis, cardinality, value overlap, and date
//! compatibility for date roles.

mod diagnostic;
mod field;
mod stats;

use std::collections::HashSet;
use std::hash::Hash;

pub use diagnostic::{
    CardinalityCheck, CharacterType, CheckType, DateCompatibilityCheck, Diagnostic, Granularity,
    NullAnalysisCheck, NullDistribution, PatternMatchCheck, Relationship, SideDates, SideNulls,
    SidePattern, SideUniqueness, UniquenessCheck, ValueOverlapCheck,
};
pub use field::{FieldChecks, FieldValidator, ValidatorConfig};
pub use stats::FrequencySummary;

/// Overlap of two distinct-value sets, scored against the larger set.
///
/// Zero when either side is empty.
pub fn overlap_of_sets<T: Eq + Hash>(set1: &HashSet<T>, set2: &HashSet<T>) -> ValueOverlapCheck {
    let overlap_count = set1.intersection(set2).count();
    let denominator = set1.len().max(set2.len());
    let overlap_percentage = if set1.is_empty() || set2.is_empty() {
        0.0
    } else {
        100.0 * overlap_count as f64 / denominator as f64
    };

    ValueOverlapCheck {
        overlap_percentage,
        overlap_count,
        unique_to_table1: set1.len() - overlap_count,
        unique_to_table2: set2.len() - overlap_count,
        table1_distinct: set1.len(),
        table2_distinct: set2.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_of_sets_is_symmetric() {
        let a: HashSet<i32> = (1..=10).collect();
        let b: HashSet<i32> = (6..=30).collect();

        let ab = overlap_of_sets(&a, &b);
        let ba = overlap_of_sets(&b, &a);
        assert_eq!(ab.overlap_percentage, ba.overlap_percentage);
        assert_eq!(ab.overlap_count, 5);
        assert_eq!(ab.overlap_percentage, 20.0);
        assert_eq!(ab.unique_to_table1, ba.unique_to_table2);
    }

    #[test]
    fn test_overlap_with_empty_side() {
        let a: HashSet<i32> = (1..=3).collect();
        let check = overlap_of_sets(&a, &HashSet::new());
        assert_eq!(check.overlap_percentage, 0.0);
        assert_eq!(check.unique_to_table1, 3);
    }
}
