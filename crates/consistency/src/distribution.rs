use crate::report::ClassificationDistribution;
use classification::Classifier;
use configuration::MAX_PERCENTAGE_SCALE;
use core_types::{Classification, Position};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Builds the per-category counts, percentages and label lists for `positions`.
pub fn build_distribution<'a>(
    classifier: &dyn Classifier,
    positions: impl IntoIterator<Item = &'a Position>,
    scale: u32,
) -> ClassificationDistribution {
    let mut distribution = ClassificationDistribution::default();
    let mut seen_labels: HashSet<(Classification, String)> = HashSet::new();

    for position in positions {
        let classification = classifier.classify_position(position);
        let share = distribution.get_mut(classification);
        share.count += 1;

        let label = position.label();
        if seen_labels.insert((classification, label.clone())) {
            share.positions.push(label);
        }
    }

    let counts = Classification::ALL.map(|c| distribution.get(c).count);
    let percentages = rounded_percentages(counts, scale);
    for (classification, percentage) in Classification::ALL.into_iter().zip(percentages) {
        distribution.get_mut(classification).percentage = percentage;
    }
    distribution
}

/// Percentages of `counts` rounded to `scale` decimal places that sum to exactly 100.
///
/// Uses the largest-remainder method: every share is floored to the unit
/// `10^-scale`, then the leftover units go to the shares with the largest
/// remainders (earlier categories win ties). An all-zero input yields all zeros.
/// `scale` is capped at [`MAX_PERCENTAGE_SCALE`].
pub fn rounded_percentages<const N: usize>(counts: [usize; N], scale: u32) -> [Decimal; N] {
    let scale = scale.min(MAX_PERCENTAGE_SCALE);
    let total: u64 = counts.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return [Decimal::ZERO; N];
    }

    let units_in_whole: u64 = 100 * 10u64.pow(scale);
    let mut units = [0u64; N];
    let mut remainders = [(0u64, 0usize); N];
    for (i, &count) in counts.iter().enumerate() {
        let scaled = count as u64 * units_in_whole;
        units[i] = scaled / total;
        remainders[i] = (scaled % total, i);
    }

    let assigned: u64 = units.iter().sum();
    let leftover = (units_in_whole - assigned) as usize;
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, index) in remainders.iter().take(leftover) {
        units[index] += 1;
    }

    units.map(|u| Decimal::new(u as i64, scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use classification::ClassificationEngine;
    use core_types::Level;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn thirds_round_to_exactly_one_hundred() {
        let [a, b, c] = rounded_percentages([1, 1, 1], 1);
        assert_eq!(a, dec!(33.4));
        assert_eq!(b, dec!(33.3));
        assert_eq!(c, dec!(33.3));
        assert_eq!(a + b + c, dec!(100));
    }

    #[test]
    fn whole_percent_scale() {
        let shares = rounded_percentages([2, 1, 0], 0);
        assert_eq!(shares, [dec!(67), dec!(33), dec!(0)]);
    }

    #[test]
    fn oversized_scale_is_capped() {
        let shares = rounded_percentages([1, 1, 1], 20);
        assert_eq!(shares, [dec!(33.3334), dec!(33.3333), dec!(33.3333)]);
        assert_eq!(shares[0].scale(), MAX_PERCENTAGE_SCALE);

        let shares = rounded_percentages([1, 2], u32::MAX);
        assert_eq!(shares[0] + shares[1], dec!(100));
    }

    #[test]
    fn empty_counts_are_all_zero() {
        assert_eq!(rounded_percentages([0, 0, 0], 1), [Decimal::ZERO; 3]);
    }

    #[test]
    fn distribution_counts_and_deduplicates_labels() {
        let engine = ClassificationEngine::new();
        let positions = vec![
            Position::new("1", "CE", Level::TM).with_subtitle("Mixing"),
            Position::new("2", "CE", Level::TM).with_subtitle("Mixing"),
            Position::new("3", "Line", Level::PM),
            Position::new("4", "Line", Level::TM),
        ];
        let distribution = build_distribution(&engine, &positions, 1);

        assert_eq!(distribution.total(), 4);
        assert_eq!(distribution.direct.count, 2);
        assert_eq!(distribution.direct.positions, vec!["CE TM (Mixing)"]);
        assert_eq!(distribution.direct.percentage, dec!(50.0));
        assert_eq!(distribution.oh.percentage, dec!(25.0));
        assert_eq!(distribution.indirect.percentage, dec!(25.0));
    }

    proptest! {
        #[test]
        fn percentages_always_sum_to_one_hundred(
            direct in 0usize..5000,
            indirect in 0usize..5000,
            oh in 0usize..5000,
            scale in 0u32..=4,
        ) {
            prop_assume!(direct + indirect + oh > 0);
            let shares = rounded_percentages([direct, indirect, oh], scale);
            let sum: Decimal = shares.iter().copied().sum();
            prop_assert_eq!(sum, Decimal::from(100));
            for share in shares {
                prop_assert!(share >= Decimal::ZERO && share <= Decimal::from(100));
            }
        }
    }
}
