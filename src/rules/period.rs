//! Payroll period date rules.
//!
//! Periods are semi-monthly. The closing date is derived from the opening
//! date, and the period's holiday selection is recomputed from the loaded
//! holiday list whenever either bound changes — manual deselections do not
//! survive a range change.

use chrono::{Datelike, Days, NaiveDate};

use crate::model::holiday::Holiday;

fn days_in_month(date: NaiveDate) -> u32 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of the following month minus one day lands on this month's last day.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Default closing date for a period opening at `date_from`: +15 days in a
/// 31-day month, otherwise +14 days.
pub fn default_date_to(date_from: NaiveDate) -> NaiveDate {
    let offset = if days_in_month(date_from) == 31 { 15 } else { 14 };
    date_from
        .checked_add_days(Days::new(offset))
        .unwrap_or(date_from)
}

/// Ids of the holidays falling inside the inclusive `[date_from, date_to]`
/// range. This is the period's entire holiday selection; it overwrites any
/// previous selection when the range changes.
pub fn select_holidays(holidays: &[Holiday], date_from: NaiveDate, date_to: NaiveDate) -> Vec<u64> {
    holidays
        .iter()
        .filter(|h| h.date >= date_from && h.date <= date_to)
        .map(|h| h.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn holiday(id: u64, day: &str) -> Holiday {
        Holiday {
            id,
            name: format!("Holiday {id}"),
            holiday_type: "Regular".to_string(),
            date: date(day),
        }
    }

    #[test]
    fn test_31_day_month_gets_15_day_offset() {
        assert_eq!(default_date_to(date("2024-01-01")), date("2024-01-16"));
    }

    #[test]
    fn test_30_day_month_gets_14_day_offset() {
        assert_eq!(default_date_to(date("2024-04-01")), date("2024-04-15"));
    }

    #[test]
    fn test_february_gets_14_day_offset() {
        assert_eq!(default_date_to(date("2024-02-01")), date("2024-02-15"));
        assert_eq!(default_date_to(date("2023-02-01")), date("2023-02-15"));
    }

    #[test]
    fn test_december_counts_as_31_day_month() {
        assert_eq!(default_date_to(date("2024-12-01")), date("2024-12-16"));
    }

    #[test]
    fn test_mid_month_start_still_uses_month_length() {
        // Second half of January: 31-day month, so +15.
        assert_eq!(default_date_to(date("2024-01-16")), date("2024-01-31"));
    }

    #[test]
    fn test_selection_picks_only_holidays_in_range() {
        let holidays = vec![holiday(1, "2024-01-01"), holiday(2, "2024-02-14")];
        let selected = select_holidays(&holidays, date("2024-01-01"), date("2024-01-16"));
        assert_eq!(selected, vec![1]);
    }

    #[test]
    fn test_selection_includes_both_bounds() {
        let holidays = vec![
            holiday(1, "2024-01-01"),
            holiday(2, "2024-01-16"),
            holiday(3, "2024-01-17"),
        ];
        let selected = select_holidays(&holidays, date("2024-01-01"), date("2024-01-16"));
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn test_empty_range_selects_nothing() {
        let holidays = vec![holiday(1, "2024-03-01")];
        let selected = select_holidays(&holidays, date("2024-04-01"), date("2024-04-15"));
        assert!(selected.is_empty());
    }
}
