//! # Coin Module
//!
//! Denominations accepted by the machine and the change calculator.
//!
//! ## Why Greedy Works Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Denominations: 5, 10, 20, 50, 100                                      │
//! │                                                                         │
//! │  Remainder 80:                                                          │
//! │    take 50 → 30 left                                                    │
//! │    take 20 → 10 left                                                    │
//! │    take 10 →  0 left          change = [50, 20, 10]                     │
//! │                                                                         │
//! │  Greedy is optimal for THIS set only. Property tests check it against   │
//! │  `minimal_change` (dynamic programming), which is the fallback for any  │
//! │  other denomination set.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::coin::{compute_change, is_denomination};
//!
//! assert!(is_denomination(20));
//! assert!(!is_denomination(25));
//! assert_eq!(compute_change(35), vec![20, 10, 5]);
//! ```

/// Coin values accepted for deposits, product cost and change.
pub const DENOMINATIONS: [i64; 5] = [5, 10, 20, 50, 100];

/// Larger denomination sets are rejected outright.
pub const MAX_DENOMINATIONS: usize = 10;

/// Checks whether `value` is one of [`DENOMINATIONS`].
#[inline]
pub fn is_denomination(value: i64) -> bool {
    DENOMINATIONS.contains(&value)
}

/// Splits `amount` into coins, largest first.
///
/// - `0` yields `[0]`, the "no change" placeholder.
/// - An amount that cannot be built from the denominations yields whatever
///   was collected before no coin fit (`3` → `[]`, `7` → `[5]`). Balances are
///   always sums of denominations, so callers treat that as a bug.
///
/// ## Example
/// ```rust
/// use vend_core::coin::compute_change;
///
/// assert_eq!(compute_change(80), vec![50, 20, 10]);
/// assert_eq!(compute_change(0), vec![0]);
/// ```
pub fn compute_change(amount: i64) -> Vec<i64> {
    compute_change_with(amount, &DENOMINATIONS)
}

/// Greedy change over an arbitrary denomination set.
///
/// Returns an empty breakdown when more than [`MAX_DENOMINATIONS`] values are
/// supplied or `amount` is negative. Non-positive denominations are ignored.
pub fn compute_change_with(amount: i64, denominations: &[i64]) -> Vec<i64> {
    if denominations.len() > MAX_DENOMINATIONS || amount < 0 {
        return Vec::new();
    }
    if amount == 0 {
        return vec![0];
    }

    let mut coins: Vec<i64> = denominations.iter().copied().filter(|d| *d > 0).collect();
    coins.sort_unstable_by(|a, b| b.cmp(a));

    let mut change = Vec::new();
    let mut remaining = amount;
    while remaining > 0 {
        let Some(&coin) = coins.iter().find(|c| **c <= remaining) else {
            break;
        };
        // Take as many of this coin as fit in one step.
        let count = remaining / coin;
        change.extend(std::iter::repeat(coin).take(count as usize));
        remaining -= coin * count;
    }

    change
}

/// Minimal-coin-count breakdown by dynamic programming.
///
/// Returns `None` when `amount` cannot be built exactly. The result is sorted
/// largest first so it compares directly with [`compute_change_with`].
pub fn minimal_change(amount: i64, denominations: &[i64]) -> Option<Vec<i64>> {
    if amount < 0 {
        return None;
    }
    if amount == 0 {
        return Some(vec![0]);
    }

    let target = amount as usize;
    let coins: Vec<usize> = denominations
        .iter()
        .copied()
        .filter(|d| *d > 0)
        .map(|d| d as usize)
        .collect();

    // best[v] = (coin count, last coin used) for the cheapest way to make v.
    let mut best: Vec<Option<(usize, usize)>> = vec![None; target + 1];
    best[0] = Some((0, 0));
    for value in 1..=target {
        for &coin in &coins {
            if coin > value {
                continue;
            }
            if let Some((count, _)) = best[value - coin] {
                let better = match best[value] {
                    Some((current, _)) => count + 1 < current,
                    None => true,
                };
                if better {
                    best[value] = Some((count + 1, coin));
                }
            }
        }
    }

    best[target]?;

    let mut change = Vec::new();
    let mut value = target;
    while value > 0 {
        let (_, coin) = best[value]?;
        change.push(coin as i64);
        value -= coin;
    }
    change.sort_unstable_by(|a, b| b.cmp(a));
    Some(change)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_yields_placeholder() {
        assert_eq!(compute_change(0), vec![0]);
    }

    #[test]
    fn test_purchase_example() {
        // balance 100, cost 10 x 2
        assert_eq!(compute_change(100 - 20), vec![50, 20, 10]);
    }

    #[test]
    fn test_exact_denominations() {
        for coin in DENOMINATIONS {
            assert_eq!(compute_change(coin), vec![coin]);
        }
        assert_eq!(compute_change(285), vec![100, 100, 50, 20, 10, 5]);
    }

    #[test]
    fn test_unconstructible_amounts_are_incomplete() {
        assert_eq!(compute_change(3), Vec::<i64>::new());
        assert_eq!(compute_change(7), vec![5]);
    }

    #[test]
    fn test_negative_amount_is_empty() {
        assert!(compute_change(-5).is_empty());
    }

    #[test]
    fn test_denomination_cap() {
        let too_many: Vec<i64> = (1..=11).collect();
        assert!(compute_change_with(10, &too_many).is_empty());

        let ten: Vec<i64> = (1..=10).collect();
        assert_eq!(compute_change_with(10, &ten), vec![10]);
    }

    #[test]
    fn test_unsorted_denominations() {
        assert_eq!(compute_change_with(80, &[10, 100, 5, 50, 20]), vec![50, 20, 10]);
    }

    #[test]
    fn test_greedy_not_optimal_for_other_sets() {
        // 6 with {1, 3, 4}: greedy takes 4+1+1, optimum is 3+3.
        assert_eq!(compute_change_with(6, &[1, 3, 4]), vec![4, 1, 1]);
        assert_eq!(minimal_change(6, &[1, 3, 4]), Some(vec![3, 3]));
    }

    #[test]
    fn test_minimal_change_unreachable() {
        assert_eq!(minimal_change(3, &DENOMINATIONS), None);
        assert_eq!(minimal_change(0, &DENOMINATIONS), Some(vec![0]));
    }

    #[test]
    fn test_is_denomination() {
        assert!(is_denomination(5));
        assert!(is_denomination(100));
        assert!(!is_denomination(0));
        assert!(!is_denomination(15));
    }

    fn constructible_amount() -> impl Strategy<Value = i64> {
        prop::collection::vec(prop::sample::select(DENOMINATIONS.to_vec()), 1..40)
            .prop_map(|coins| coins.iter().sum())
    }

    proptest! {
        #[test]
        fn prop_change_sums_to_amount(amount in constructible_amount()) {
            let change = compute_change(amount);
            prop_assert_eq!(change.iter().sum::<i64>(), amount);
        }

        #[test]
        fn prop_change_uses_denominations_descending(amount in constructible_amount()) {
            let change = compute_change(amount);
            prop_assert!(change.iter().all(|c| is_denomination(*c)));
            prop_assert!(change.windows(2).all(|w| w[0] >= w[1]));
        }

        #[test]
        fn prop_greedy_matches_minimal(amount in constructible_amount()) {
            let greedy = compute_change(amount);
            let minimal = minimal_change(amount, &DENOMINATIONS);
            prop_assert_eq!(Some(greedy), minimal);
        }
    }
}
