//! Allowance schedule.
//!
//! Due dates are computed at day granularity in UTC. With a fixed
//! `allowance_day` the child is paid on the first such weekday after the
//! last payment; without one the window rolls every 7 days. A child that was
//! never paid is due immediately.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

use crate::{Child, MoneyCents};

/// Length of the rolling allowance window.
pub const ROLLING_WINDOW_DAYS: u64 = 7;

/// An allowance payment that is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowanceResult {
    /// Credit to apply to the spending balance.
    pub amount: MoneyCents,
    /// The date the payment became due, `None` for a first payment.
    pub due_on: Option<NaiveDate>,
    /// New `last_allowance_date`.
    pub paid_at: DateTime<Utc>,
}

/// Date the next allowance becomes due, `None` when the child was never paid.
pub fn next_due_date(child: &Child) -> Option<NaiveDate> {
    let last = child.last_allowance_date?.date_naive();
    let due = match child.allowance_day {
        Some(day) => last
            .checked_add_days(Days::new(1))
            .map(|from| next_weekday_on_or_after(from, day)),
        None => last.checked_add_days(Days::new(ROLLING_WINDOW_DAYS)),
    };
    Some(due.unwrap_or(NaiveDate::MAX))
}

fn next_weekday_on_or_after(from: NaiveDate, day: Weekday) -> NaiveDate {
    let offset = (7 + day.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
    from.checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MAX)
}

/// Returns the allowance owed to `child` at `as_of`, if any.
///
/// Paused or inactive children and children without a positive allowance are
/// never due.
pub fn compute_due_allowance(child: &Child, as_of: DateTime<Utc>) -> Option<AllowanceResult> {
    if child.allowance_paused || !child.is_active || !child.weekly_allowance.is_positive() {
        return None;
    }

    let due_on = next_due_date(child);
    if let Some(due) = due_on
        && as_of.date_naive() < due
    {
        return None;
    }

    Some(AllowanceResult {
        amount: child.weekly_allowance,
        due_on,
        paid_at: as_of,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    fn child() -> Child {
        Child::new(
            Uuid::new_v4(),
            "Cleo".to_string(),
            MoneyCents::new(10_00),
            at(2025, 1, 1),
        )
    }

    #[test]
    fn never_paid_is_due_immediately() {
        let child = child();
        let result = compute_due_allowance(&child, at(2025, 3, 5)).unwrap();
        assert_eq!(result.amount, MoneyCents::new(10_00));
        assert_eq!(result.due_on, None);
        assert_eq!(result.paid_at, at(2025, 3, 5));
    }

    #[test]
    fn paused_child_is_never_due() {
        let mut child = child();
        child.allowance_paused = true;
        assert_eq!(compute_due_allowance(&child, at(2025, 3, 5)), None);
    }

    #[test]
    fn rolling_window_is_seven_days() {
        let mut child = child();
        // Wednesday
        child.last_allowance_date = Some(at(2025, 3, 5));

        assert_eq!(
            next_due_date(&child),
            NaiveDate::from_ymd_opt(2025, 3, 12)
        );
        assert_eq!(compute_due_allowance(&child, at(2025, 3, 11)), None);
        assert!(compute_due_allowance(&child, at(2025, 3, 12)).is_some());
    }

    #[test]
    fn fixed_day_waits_for_next_weekday() {
        let mut child = child();
        child.allowance_day = Some(Weekday::Sat);
        // Wednesday 2025-03-05, next Saturday is 2025-03-08
        child.last_allowance_date = Some(at(2025, 3, 5));

        assert_eq!(next_due_date(&child), NaiveDate::from_ymd_opt(2025, 3, 8));
        assert_eq!(compute_due_allowance(&child, at(2025, 3, 7)), None);
        assert!(compute_due_allowance(&child, at(2025, 3, 8)).is_some());
    }

    #[test]
    fn fixed_day_paid_on_payday_skips_to_next_week() {
        let mut child = child();
        child.allowance_day = Some(Weekday::Sat);
        child.last_allowance_date = Some(at(2025, 3, 8));

        assert_eq!(next_due_date(&child), NaiveDate::from_ymd_opt(2025, 3, 15));
    }

    #[test]
    fn zero_allowance_is_never_due() {
        let mut child = child();
        child.weekly_allowance = MoneyCents::ZERO;
        assert_eq!(compute_due_allowance(&child, at(2025, 3, 5)), None);
    }
}
