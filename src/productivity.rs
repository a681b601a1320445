use crate::types::{Measures, ProductivityTable, Summary};
use std::collections::BTreeSet;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Seconds of labor per unit for one cell.
///
/// Zero, negative or non-finite quantities give 0, as does any result that is
/// not a finite positive number.
pub fn seconds_per_unit(hours: f64, quantity: f64) -> f64 {
    if !quantity.is_finite() || quantity <= 0.0 {
        return 0.0;
    }
    let value = hours * SECONDS_PER_HOUR / quantity;
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Join a quantity summary with a working-hours summary of the same key shape.
///
/// The result covers the union of both key sets. A key present on only one
/// side has nothing to divide and comes out as 0 in every column.
pub fn compute_productivity<K>(quantity: &Summary<K>, hours: &Summary<K>) -> ProductivityTable<K>
where
    K: Ord + Clone,
{
    let keys: BTreeSet<&K> = quantity.keys().chain(hours.keys()).collect();
    keys.into_iter()
        .map(|key| {
            let row = match (quantity.get(key), hours.get(key)) {
                (Some(q), Some(h)) => Measures::from_fn(|c| seconds_per_unit(h.get(c), q.get(c))),
                _ => Measures::default(),
            };
            (key.clone(), row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{Phase, PhaseGroup};
    use crate::types::{DailyKey, TotalSummary};
    use chrono::NaiveDate;

    const CUTTING: PhaseGroup = PhaseGroup::Named(Phase::Cutting);
    const PACKAGING: PhaseGroup = PhaseGroup::Named(Phase::Packaging);

    #[test]
    fn hours_per_hundred_units() {
        let qty: TotalSummary = [(CUTTING, Measures::new(0.0, 0.0, 100.0))].into_iter().collect();
        let hrs: TotalSummary = [(CUTTING, Measures::new(0.0, 0.0, 2.0))].into_iter().collect();
        let p = compute_productivity(&qty, &hrs);
        assert_eq!(p.get(&CUTTING).unwrap().actual, 72.0);
    }

    #[test]
    fn zero_quantity_gives_zero() {
        let qty: TotalSummary = [(CUTTING, Measures::new(10.0, 0.0, 0.0))].into_iter().collect();
        let hrs: TotalSummary = [(CUTTING, Measures::new(1.0, 3.0, 5.0))].into_iter().collect();
        let p = compute_productivity(&qty, &hrs);
        let row = p.get(&CUTTING).unwrap();
        assert_eq!(row.plan, 360.0);
        assert_eq!(row.target, 0.0);
        assert_eq!(row.actual, 0.0);
    }

    #[test]
    fn misaligned_keys_resolve_to_zero() {
        let qty: TotalSummary = [(CUTTING, Measures::new(10.0, 10.0, 10.0))].into_iter().collect();
        let hrs: TotalSummary = [(PACKAGING, Measures::new(1.0, 1.0, 1.0))].into_iter().collect();
        let p = compute_productivity(&qty, &hrs);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get(&CUTTING), Some(&Measures::default()));
        assert_eq!(p.get(&PACKAGING), Some(&Measures::default()));
    }

    #[test]
    fn daily_keys_join_on_date_and_phase() {
        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let qty: Summary<DailyKey> = [
            (DailyKey::new(d1, CUTTING), Measures::new(50.0, 50.0, 50.0)),
            (DailyKey::new(d2, CUTTING), Measures::new(10.0, 10.0, 10.0)),
        ]
        .into_iter()
        .collect();
        let hrs: Summary<DailyKey> = [(DailyKey::new(d1, CUTTING), Measures::new(1.0, 0.5, 2.0))]
            .into_iter()
            .collect();
        let p = compute_productivity(&qty, &hrs);
        assert_eq!(
            p.get(&DailyKey::new(d1, CUTTING)),
            Some(&Measures::new(72.0, 36.0, 144.0))
        );
        assert_eq!(p.get(&DailyKey::new(d2, CUTTING)), Some(&Measures::default()));
    }

    #[test]
    fn never_negative_or_nan() {
        let cases = [
            (-1.0, 10.0),
            (1.0, -10.0),
            (f64::NAN, 1.0),
            (1.0, f64::NAN),
            (f64::INFINITY, 1.0),
        ];
        for (h, q) in cases {
            let v = seconds_per_unit(h, q);
            assert_eq!(v, 0.0, "hours={h} qty={q}");
        }
    }
}
