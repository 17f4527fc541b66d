/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Exact integer GCD / LCM.
//!
//! Floating point is never used here: a rounded hyperperiod would shift job
//! boundaries and silently change which jobs fall inside a demand interval.

use crate::model::error::InvalidInputError;
use crate::task::Time;

/// Euclid's algorithm, iterative.  `gcd(0, x) == x`.
pub fn gcd(mut a: Time, mut b: Time) -> Time {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `lcm(a, b) = (a / gcd(a, b)) · b`, with the multiplication checked.
///
/// Both operands must be non-zero; periods are validated before this is
/// reached.
pub fn lcm(a: Time, b: Time) -> Result<Time, InvalidInputError> {
    debug_assert!(a > 0 && b > 0, "lcm of a zero period");
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(InvalidInputError::HyperperiodOverflow { a, b })
}

/// Fold [`lcm`] over `periods`.  An empty slice yields `1`, the identity.
pub fn lcm_all(periods: &[Time]) -> Result<Time, InvalidInputError> {
    periods.iter().try_fold(1, |acc, &p| lcm(acc, p))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_small_values() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(4, 6), 2);
        assert_eq!(gcd(17, 13), 1);
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
    }

    #[test]
    fn lcm_small_values() {
        assert_eq!(lcm(4, 6).unwrap(), 12);
        assert_eq!(lcm(6, 4).unwrap(), 12);
        assert_eq!(lcm(5, 5).unwrap(), 5);
        assert_eq!(lcm(1, 7).unwrap(), 7);
    }

    #[test]
    fn lcm_overflow_is_reported_with_operands() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3;
        assert_eq!(
            lcm(a, b),
            Err(InvalidInputError::HyperperiodOverflow { a, b })
        );
    }

    #[test]
    fn lcm_all_folds_every_period() {
        assert_eq!(lcm_all(&[4, 6]).unwrap(), 12);
        assert_eq!(lcm_all(&[2, 3, 5, 7]).unwrap(), 210);
        assert_eq!(lcm_all(&[10]).unwrap(), 10);
        assert_eq!(lcm_all(&[]).unwrap(), 1);
    }

    #[test]
    fn lcm_all_is_minimal_common_multiple() {
        let periods = [6, 8, 9];
        let h = lcm_all(&periods).unwrap();
        assert_eq!(h, 72);
        for p in periods {
            assert_eq!(h % p, 0);
        }
        assert!((1..h).all(|c| periods.iter().any(|p| c % p != 0)));
    }
}
