// Order pricing.

use rust_decimal::Decimal;

use crate::services::settlement::round2;

/// Total for an order: sum of unit price times quantity per line, rounded
/// to cents. Unit prices are snapshotted at order time, so later menu edits
/// do not change a placed order's total.
pub fn order_total(lines: &[(Decimal, i64)]) -> Decimal {
    let sum: Decimal = lines
        .iter()
        .map(|(price, qty)| *price * Decimal::from(*qty))
        .sum();
    round2(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total_sums_lines() {
        let total = order_total(&[
            (Decimal::new(899, 2), 2), // 17.98
            (Decimal::new(250, 2), 1), // 2.50
        ]);
        assert_eq!(total, Decimal::new(2048, 2));
    }

    #[test]
    fn test_empty_order_totals_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_rounds_to_cents() {
        // 3 x 1.333 = 3.999 -> 4.00
        let total = order_total(&[(Decimal::new(1333, 3), 3)]);
        assert_eq!(total, Decimal::new(400, 2));
    }
}
