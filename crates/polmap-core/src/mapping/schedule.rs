//! Installment schedule computation.
//!
//! Invariant: the sum of installment amounts equals the total exactly; any
//! rounding drift is absorbed into the last installment.

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;

use super::locale::{parse_amount, parse_date};
use crate::models::policy::{Installment, InstallmentSchedule};
use crate::models::record::RawExtractionRecord;

/// Compute an amortization schedule for `total` over `count` installments.
///
/// Every installment except the last uses `round(total / count, 2)`; the
/// last takes the remainder. Due dates advance one calendar month per
/// installment from `start`, or in 30-day steps from `reference` when no
/// reliable start date is available (degraded mode).
pub fn build_schedule(
    total: Decimal,
    count: u32,
    start: Option<NaiveDate>,
    reference: NaiveDate,
) -> InstallmentSchedule {
    let count = count.max(1);
    let per_installment = (total / Decimal::from(count)).round_dp(2);

    let installments = (1..=count)
        .map(|number| {
            let amount = if number == count {
                total - per_installment * Decimal::from(count - 1)
            } else {
                per_installment
            };
            Installment {
                number,
                due_date: due_date(start, reference, number),
                amount,
            }
        })
        .collect();

    InstallmentSchedule { installments }
}

fn due_date(start: Option<NaiveDate>, reference: NaiveDate, number: u32) -> NaiveDate {
    match start {
        Some(date) => date
            .checked_add_months(Months::new(number - 1))
            .unwrap_or(date),
        None => reference + Duration::days(30 * i64::from(number - 1)),
    }
}

/// Build a schedule, preferring literal per-installment data from the raw
/// record (`pago.cuotas[i].prima` / `pago.cuotas[i].fecha`) over computed
/// values. Computed values fill in for installments missing real data.
pub fn schedule_from_record(
    record: &RawExtractionRecord,
    total: Decimal,
    count: u32,
    start: Option<NaiveDate>,
    reference: NaiveDate,
) -> InstallmentSchedule {
    let mut schedule = build_schedule(total, count, start, reference);

    for installment in &mut schedule.installments {
        let index = installment.number - 1;

        if let Some(raw) = record.get(&format!("pago.cuotas[{}].prima", index)) {
            if let Ok(amount) = parse_amount(raw) {
                installment.amount = amount;
            }
        }
        if let Some(raw) = record.get(&format!("pago.cuotas[{}].fecha", index)) {
            if let Ok(date) = parse_date(raw) {
                installment.due_date = date;
            }
        }
    }

    schedule
}
