// Chat billing settlement calculation.
// Cost model: elapsed time is billed in whole minutes (ceiling), with a
// floor of one minute, times the per-minute rate snapshotted at chat start.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub minutes: i64,
    pub cost_eur: Decimal,
}

/// Round a monetary amount to two decimal places, midpoint away from zero.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute billed minutes and total cost for a chat that started at
/// `started_at`.
///
/// Pure function: the caller applies the resulting debit/credit to the
/// wallets and persists the session transition and ledger entries.
///
/// A chat with no usable start timestamp is billed from `now`, which yields
/// the one-minute minimum. The settlement must never fail, so the fallback
/// is logged as a diagnostic rather than returned as an error.
pub fn settle(
    started_at: Option<DateTime<Utc>>,
    rate_eur_per_min: Decimal,
    now: DateTime<Utc>,
) -> Settlement {
    let started = match started_at {
        Some(ts) => ts,
        None => {
            tracing::warn!("chat has no usable start timestamp, billing minimum duration");
            now
        }
    };

    // Ceiling division on whole seconds; a non-positive elapsed time (clock
    // skew, fallback start) still bills the one-minute minimum.
    let elapsed_secs = (now - started).num_seconds();
    let minutes = ((elapsed_secs + 59) / 60).max(1);
    let cost_eur = round2(Decimal::from(minutes) * rate_eur_per_min);

    Settlement { minutes, cost_eur }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_150_seconds_at_1_20_per_minute() {
        let s = settle(Some(at(0)), Decimal::new(120, 2), at(150));
        assert_eq!(s.minutes, 3);
        assert_eq!(s.cost_eur, Decimal::new(360, 2)); // 3.60
    }

    #[test]
    fn test_under_one_minute_bills_the_minimum() {
        let s = settle(Some(at(0)), Decimal::new(90, 2), at(10));
        assert_eq!(s.minutes, 1);
        assert_eq!(s.cost_eur, Decimal::new(90, 2)); // 0.90
    }

    #[test]
    fn test_exact_minute_boundaries() {
        assert_eq!(settle(Some(at(0)), Decimal::ONE, at(60)).minutes, 1);
        assert_eq!(settle(Some(at(0)), Decimal::ONE, at(61)).minutes, 2);
        assert_eq!(settle(Some(at(0)), Decimal::ONE, at(120)).minutes, 2);
    }

    #[test]
    fn test_missing_start_bills_one_minute() {
        let s = settle(None, Decimal::new(150, 2), at(0));
        assert_eq!(s.minutes, 1);
        assert_eq!(s.cost_eur, Decimal::new(150, 2));
    }

    #[test]
    fn test_start_in_the_future_bills_one_minute() {
        let s = settle(Some(at(300)), Decimal::new(120, 2), at(0));
        assert_eq!(s.minutes, 1);
        assert_eq!(s.cost_eur, Decimal::new(120, 2));
    }

    #[test]
    fn test_zero_rate_costs_nothing() {
        let s = settle(Some(at(0)), Decimal::ZERO, at(600));
        assert_eq!(s.minutes, 10);
        assert_eq!(s.cost_eur, Decimal::ZERO);
    }

    #[test]
    fn test_cost_rounds_to_cents() {
        // 7 minutes at 0.333/min = 2.331 -> 2.33
        let s = settle(Some(at(0)), Decimal::new(333, 3), at(7 * 60));
        assert_eq!(s.minutes, 7);
        assert_eq!(s.cost_eur, Decimal::new(233, 2));

        // 5 minutes at 0.125/min = 0.625 -> 0.63 (midpoint away from zero)
        let s = settle(Some(at(0)), Decimal::new(125, 3), at(5 * 60));
        assert_eq!(s.cost_eur, Decimal::new(63, 2));
    }

    #[test]
    fn test_wallet_sequence_topup_then_settlement_debit() {
        let balance = round2(Decimal::ZERO + Decimal::new(2500, 2));
        assert_eq!(balance, Decimal::new(2500, 2)); // 25.00

        let s = settle(Some(at(0)), Decimal::new(120, 2), at(150));
        let after = round2(balance - s.cost_eur);
        assert_eq!(after, Decimal::new(2140, 2)); // 21.40
    }

    #[test]
    fn test_debit_and_credit_are_equal_and_opposite() {
        let s = settle(Some(at(0)), Decimal::new(120, 2), at(150));
        let debit = -s.cost_eur;
        let credit = s.cost_eur;
        assert_eq!(debit + credit, Decimal::ZERO);
        assert_eq!(debit.abs(), credit.abs());
    }

    #[test]
    fn test_debt_is_permitted() {
        // A settlement larger than the balance drives the wallet negative.
        let s = settle(Some(at(0)), Decimal::new(200, 2), at(10 * 60));
        let after = round2(Decimal::new(500, 2) - s.cost_eur);
        assert_eq!(after, Decimal::new(-1500, 2)); // -15.00
    }
}
