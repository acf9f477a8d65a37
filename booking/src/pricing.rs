//! Price calculation.

use crate::types::Money;

/// `unit_price × (adults + children)`, saturating on overflow.
///
/// Inputs are taken as given; the form keeps `adults >= 1` on its side.
#[must_use]
pub fn compute_total(unit_price: Money, adults: u32, children: u32) -> Money {
    unit_price.saturating_mul(u64::from(adults) + u64::from(children))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penglipuran_family() {
        assert_eq!(
            compute_total(Money::from_rupiah(1_500_000), 2, 1),
            Money::from_rupiah(4_500_000)
        );
    }

    #[test]
    fn test_unknown_tour_is_free() {
        assert_eq!(compute_total(Money::ZERO, 4, 2), Money::ZERO);
    }
}
