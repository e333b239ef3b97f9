//! Deterministic order pricing
//!
//! Turns line items into subtotal/tax/total using `Decimal` end to end;
//! no binary floating point anywhere in the money path. Rounding is
//! applied exactly once, to the accumulated subtotal and tax, and the
//! total is derived from the rounded values — identical inputs always
//! produce identical totals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Monetary values are carried at 2 decimal places, half-up.
const DECIMAL_PLACES: u32 = 2;

/// Whether catalog prices already include tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    Exclusive,
    Inclusive,
}

/// One priced line at submission time.
#[derive(Debug, Clone, Copy)]
pub struct LineItem {
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Computed order totals, each rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Round a monetary value to 2 decimal places, half-up.
fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute subtotal, tax and total for a set of lines.
///
/// Exclusive mode: `subtotal = Σ(qty × price)`, `tax = subtotal × rate`.
/// Inclusive mode: each line's pre-tax base is `line / (1 + rate)`; the
/// base accumulates into subtotal and the remainder into tax, so the
/// total reconstructs the tax-inclusive line sum modulo rounding.
///
/// Accumulation is unrounded; subtotal and tax are rounded once at the
/// end and the total is their sum. That ordering is what makes totals
/// reproducible, and the tests pin it.
pub fn compute_totals(lines: &[LineItem], mode: TaxMode, tax_rate: Decimal) -> Totals {
    let mut subtotal = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for line in lines {
        let line_total = Decimal::from(line.quantity) * line.unit_price;
        match mode {
            TaxMode::Exclusive => {
                subtotal += line_total;
                tax += line_total * tax_rate;
            }
            TaxMode::Inclusive => {
                let base = line_total / (Decimal::ONE + tax_rate);
                subtotal += base;
                tax += line_total - base;
            }
        }
    }

    let subtotal = money(subtotal);
    let tax = money(tax);
    Totals {
        subtotal,
        tax,
        total: money(subtotal + tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(quantity: i32, unit_price: &str) -> LineItem {
        LineItem {
            quantity,
            unit_price: dec(unit_price),
        }
    }

    #[test]
    fn exclusive_mode_reference_vector() {
        let totals = compute_totals(
            &[line(2, "10.00"), line(1, "5.00")],
            TaxMode::Exclusive,
            dec("0.10"),
        );
        assert_eq!(totals.subtotal, dec("25.00"));
        assert_eq!(totals.tax, dec("2.50"));
        assert_eq!(totals.total, dec("27.50"));
    }

    #[test]
    fn inclusive_mode_reference_vector() {
        let totals = compute_totals(&[line(1, "11.00")], TaxMode::Inclusive, dec("0.10"));
        assert_eq!(totals.subtotal, dec("10.00"));
        assert_eq!(totals.tax, dec("1.00"));
        assert_eq!(totals.total, dec("11.00"));
    }

    #[test]
    fn rounding_happens_once_on_the_accumulated_sums() {
        // Three lines of 0.335 each: per-line rounding would give
        // 0.34 * 3 = 1.02; accumulate-then-round gives 1.01.
        let lines = [line(1, "0.335"), line(1, "0.335"), line(1, "0.335")];
        let totals = compute_totals(&lines, TaxMode::Exclusive, Decimal::ZERO);
        assert_eq!(totals.subtotal, dec("1.01"));
        assert_eq!(totals.tax, dec("0.00"));
        assert_eq!(totals.total, dec("1.01"));
    }

    #[test]
    fn total_derives_from_rounded_parts() {
        // raw subtotal 2.444 -> 2.44, raw tax 0.2444 -> 0.24; the total
        // must be their sum 2.68, not round(2.6884) = 2.69.
        let totals = compute_totals(&[line(1, "2.444")], TaxMode::Exclusive, dec("0.10"));
        assert_eq!(totals.subtotal, dec("2.44"));
        assert_eq!(totals.tax, dec("0.24"));
        assert_eq!(totals.total, dec("2.68"));
    }

    #[test]
    fn half_up_rounding() {
        assert_eq!(money(dec("2.345")), dec("2.35"));
        assert_eq!(money(dec("2.344")), dec("2.34"));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let lines = [line(3, "9.99"), line(2, "0.01"), line(7, "1.37")];
        let a = compute_totals(&lines, TaxMode::Inclusive, dec("0.21"));
        let b = compute_totals(&lines, TaxMode::Inclusive, dec("0.21"));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_lines_price_to_zero() {
        let totals = compute_totals(&[], TaxMode::Exclusive, dec("0.10"));
        assert_eq!(totals.total, Decimal::ZERO);
    }
}
