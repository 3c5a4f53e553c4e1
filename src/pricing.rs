//! Pricing engine: pure money math for bookings and settlements
//!
//! Every figure displayed or charged anywhere in the system comes from
//! these functions. Callers never re-derive subtotals or fines locally;
//! stored financial columns are treated as a cache and recomputed here
//! whenever they are read back.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::booking::BookingItem;
use crate::models::delivery::{ItemCondition, ReportItem};

const SECONDS_PER_DAY: i64 = 86_400;

/// Round a monetary amount to 2 decimal places, half away from zero
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of billable rental days, always at least 1.
///
/// Partial days count as full days. A missing return date, or a return
/// date not after the booking date, bills a single day.
pub fn rental_days(booking_date: DateTime<Utc>, return_date: Option<DateTime<Utc>>) -> i64 {
    match return_date {
        Some(ret) if ret > booking_date => {
            let secs = (ret - booking_date).num_seconds();
            (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        }
        _ => 1,
    }
}

/// Sum of price-per-day x quantity over all booked items
pub fn daily_total(items: &[BookingItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.price_per_day * Decimal::from(item.qty))
        .sum()
}

/// Rental subtotal for the given number of days
pub fn subtotal(items: &[BookingItem], days: i64) -> Decimal {
    round2(Decimal::from(days) * daily_total(items))
}

/// Refundable security deposit collected up front
pub fn security_deposit(subtotal: Decimal, deposit_rate: Decimal) -> Decimal {
    round2(subtotal * deposit_rate)
}

/// Days the return is overdue, never negative.
///
/// Open-ended bookings (no planned return date) can never be late.
pub fn late_days(planned_return: Option<DateTime<Utc>>, actual_return: DateTime<Utc>) -> i64 {
    match planned_return {
        Some(planned) if actual_return > planned => {
            let secs = (actual_return - planned).num_seconds();
            (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
        }
        _ => 0,
    }
}

/// Fine charged for a late return: per late day, a fraction of the
/// booking's per-day total
pub fn late_fine(items: &[BookingItem], late_days: i64, fine_rate: Decimal) -> Decimal {
    round2(Decimal::from(late_days) * daily_total(items) * fine_rate)
}

/// Repair cost assessed from a recollection report.
///
/// Units not collected back count as damaged. Minor damage bills half a
/// day's rate per damaged unit, major damage a full day's rate. Unit
/// prices come from the originating booking, matched by equipment id
/// with a fallback match by name for legacy rows whose ids diverged.
pub fn repair_cost(booking_items: &[BookingItem], report_items: &[ReportItem]) -> Decimal {
    let mut cost = Decimal::ZERO;

    for report in report_items {
        let damaged = (report.expected_qty - report.collected_qty).max(0);
        if damaged == 0 {
            continue;
        }

        let factor = match report.condition {
            ItemCondition::None => continue,
            ItemCondition::Minor => Decimal::new(5, 1), // 0.5
            ItemCondition::Major => Decimal::ONE,
        };

        let price = booking_items
            .iter()
            .find(|b| b.equipment_id == report.equipment_id)
            .or_else(|| booking_items.iter().find(|b| b.name == report.name))
            .map(|b| b.price_per_day)
            .unwrap_or(Decimal::ZERO);

        cost += factor * price * Decimal::from(damaged);
    }

    round2(cost)
}

/// Final settlement charged against the security deposit
pub fn settlement_total(repair_cost: Decimal, late_fine: Decimal) -> Decimal {
    round2(repair_cost + late_fine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn item(price: Decimal, qty: i32) -> BookingItem {
        BookingItem {
            equipment_id: Uuid::new_v4(),
            name: "Generator".to_string(),
            price_per_day: price,
            qty,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn rental_days_spans_inclusive_range() {
        assert_eq!(rental_days(date(2024, 1, 1), Some(date(2024, 1, 3))), 2);
    }

    #[test]
    fn rental_days_is_at_least_one() {
        assert_eq!(rental_days(date(2024, 1, 1), None), 1);
        assert_eq!(rental_days(date(2024, 1, 3), Some(date(2024, 1, 1))), 1);
        assert_eq!(rental_days(date(2024, 1, 1), Some(date(2024, 1, 1))), 1);
    }

    #[test]
    fn rental_days_rounds_partial_days_up() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
        assert_eq!(rental_days(start, Some(end)), 2);
    }

    #[test]
    fn worked_example_two_day_booking() {
        // 2 units at 100/day, 2024-01-01 to 2024-01-03
        let items = vec![item(dec!(100), 2)];
        let days = rental_days(date(2024, 1, 1), Some(date(2024, 1, 3)));
        assert_eq!(days, 2);

        let sub = subtotal(&items, days);
        assert_eq!(sub, dec!(400.00));

        let deposit = security_deposit(sub, dec!(0.30));
        assert_eq!(deposit, dec!(120.00));

        assert_eq!(round2(sub + deposit), dec!(520.00));
    }

    #[test]
    fn deposit_rounds_half_up() {
        // 33.335 -> 33.34
        assert_eq!(security_deposit(dec!(111.1166), dec!(0.30)), dec!(33.34));
    }

    #[test]
    fn late_days_zero_without_planned_return() {
        assert_eq!(late_days(None, date(2024, 1, 7)), 0);
        assert_eq!(late_days(Some(date(2024, 1, 7)), date(2024, 1, 5)), 0);
    }

    #[test]
    fn worked_example_late_fine() {
        // planned 2024-01-05, actual 2024-01-07, 300/day across items
        let items = vec![item(dec!(200), 1), item(dec!(50), 2)];
        let late = late_days(Some(date(2024, 1, 5)), date(2024, 1, 7));
        assert_eq!(late, 2);
        assert_eq!(late_fine(&items, late, dec!(0.20)), dec!(120.00));
    }

    #[test]
    fn worked_example_repair_cost_major_and_minor() {
        let booked = item(dec!(50), 4);
        let mut report = ReportItem {
            equipment_id: booked.equipment_id,
            name: booked.name.clone(),
            expected_qty: 4,
            collected_qty: 2,
            condition: ItemCondition::Major,
            note: None,
        };

        assert_eq!(repair_cost(std::slice::from_ref(&booked), std::slice::from_ref(&report)), dec!(100.00));

        report.condition = ItemCondition::Minor;
        assert_eq!(repair_cost(std::slice::from_ref(&booked), std::slice::from_ref(&report)), dec!(50.00));

        report.condition = ItemCondition::None;
        assert_eq!(repair_cost(std::slice::from_ref(&booked), std::slice::from_ref(&report)), dec!(0.00));
    }

    #[test]
    fn repair_cost_falls_back_to_name_match() {
        let booked = item(dec!(80), 1);
        let report = ReportItem {
            equipment_id: Uuid::new_v4(), // id diverged
            name: booked.name.clone(),
            expected_qty: 1,
            collected_qty: 0,
            condition: ItemCondition::Major,
            note: None,
        };
        assert_eq!(repair_cost(&[booked], &[report]), dec!(80.00));
    }

    #[test]
    fn repair_cost_ignores_over_collected_rows() {
        let booked = item(dec!(80), 1);
        let report = ReportItem {
            equipment_id: booked.equipment_id,
            name: booked.name.clone(),
            expected_qty: 1,
            collected_qty: 1,
            condition: ItemCondition::Major,
            note: None,
        };
        assert_eq!(repair_cost(&[booked], &[report]), dec!(0.00));
    }

    #[test]
    fn settlement_total_sums_and_rounds() {
        assert_eq!(settlement_total(dec!(100.005), dec!(20)), dec!(120.01));
    }
}
