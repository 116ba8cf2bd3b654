//! Side-effect-free descriptive statistics over ordered sequences.
//!
//! Every function that would divide by a count returns `None` instead when the
//! count is too small, so callers never see a division by zero.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

pub fn sum(values: &[Decimal]) -> Decimal {
    values.iter().sum()
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    Some(sum(values) / Decimal::from(values.len()))
}

/// Sample standard deviation (Bessel-corrected, divides by n - 1).
///
/// `None` for fewer than two values.
pub fn sample_std_dev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squared_deviations: Decimal = values
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum();
    let variance = squared_deviations / Decimal::from(values.len() - 1);
    variance.sqrt()
}

/// The `k` items with the largest key, largest first.
///
/// The sort is stable, so items with equal keys keep their input order.
pub fn top_k_by<T, K, F>(items: &[T], k: usize, key: F) -> Vec<&T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| key(b).cmp(&key(a)));
    ranked.truncate(k);
    ranked
}

/// The first item holding the largest key. Items whose key is `None` are skipped.
pub fn arg_max_by<T, K, F>(items: &[T], key: F) -> Option<&T>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    first_extreme(items, key, |candidate, best| candidate > best)
}

/// The first item holding the smallest key. Items whose key is `None` are skipped.
pub fn arg_min_by<T, K, F>(items: &[T], key: F) -> Option<&T>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
{
    first_extreme(items, key, |candidate, best| candidate < best)
}

fn first_extreme<T, K, F, B>(items: &[T], key: F, beats: B) -> Option<&T>
where
    F: Fn(&T) -> Option<K>,
    B: Fn(&K, &K) -> bool,
{
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let Some(candidate) = key(item) else { continue };
        // Only a strictly better key replaces the current pick, so ties keep the first.
        let replace = match &best {
            Some((_, current)) => beats(&candidate, current),
            None => true,
        };
        if replace {
            best = Some((item, candidate));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sum(&[]), Decimal::ZERO);
    }

    #[test]
    fn mean_and_sum_are_exact() {
        let values = [dec!(1.5), dec!(2.5), dec!(5)];
        assert_eq!(sum(&values), dec!(9));
        assert_eq!(mean(&values), Some(dec!(3)));
    }

    #[test]
    fn sample_std_dev_divides_by_n_minus_one() {
        // Deviations from the mean 5: squares sum to 32, 32 / 7 = 4.571..., sqrt = 2.138...
        let values = [
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        let std = sample_std_dev(&values).unwrap();
        assert_eq!(std.round_dp(4), dec!(2.1381));
    }

    #[test]
    fn sample_std_dev_needs_two_values() {
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[dec!(3)]), None);
        assert_eq!(sample_std_dev(&[dec!(3), dec!(3)]), Some(Decimal::ZERO));
    }

    #[test]
    fn top_k_is_stable_on_ties() {
        let items = [("a", 10), ("b", 30), ("c", 30), ("d", 20)];
        let top: Vec<_> = top_k_by(&items, 3, |i| i.1).into_iter().map(|i| i.0).collect();
        assert_eq!(top, ["b", "c", "d"]);
    }

    #[test]
    fn top_k_larger_than_input_returns_everything() {
        let items = [1, 3, 2];
        let top: Vec<_> = top_k_by(&items, 5, |i| *i).into_iter().copied().collect();
        assert_eq!(top, [3, 2, 1]);
    }

    #[test]
    fn extremes_prefer_first_occurrence() {
        let items = [("a", Some(1)), ("b", Some(5)), ("c", None), ("d", Some(5)), ("e", Some(-2)), ("f", Some(-2))];
        assert_eq!(arg_max_by(&items, |i| i.1).map(|i| i.0), Some("b"));
        assert_eq!(arg_min_by(&items, |i| i.1).map(|i| i.0), Some("e"));
    }

    #[test]
    fn extremes_of_all_none_are_none() {
        let items: [Option<i32>; 2] = [None, None];
        assert!(arg_max_by(&items, |i| *i).is_none());
        assert!(arg_min_by(&items, |i| *i).is_none());
    }
}
