use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::Result;
use crate::models::{date_part, Schedule};
use crate::records::RecordsApi;

const DAY_NAMES: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

/// Schedules keyed by the date part of `start_time`, dates ascending.
/// Entries without a start time collect under the empty key.
pub fn group_by_date(schedules: &[Schedule]) -> BTreeMap<String, Vec<&Schedule>> {
    let mut grouped: BTreeMap<String, Vec<&Schedule>> = BTreeMap::new();
    for schedule in schedules {
        let date = schedule
            .start_time
            .as_deref()
            .map(date_part)
            .unwrap_or_default();
        grouped.entry(date.to_string()).or_default().push(schedule);
    }
    grouped
}

/// Korean short weekday for a `YYYY-MM-DD` string.
pub fn day_name(date: &str) -> Option<&'static str> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some(DAY_NAMES[date.weekday().num_days_from_sunday() as usize])
}

pub fn is_today(date: &str, today: NaiveDate) -> bool {
    date == today.format("%Y-%m-%d").to_string()
}

pub async fn load(api: &dyn RecordsApi) -> Result<Vec<Schedule>> {
    api.list_schedules().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(id: &str, start: Option<&str>) -> Schedule {
        Schedule {
            id: id.to_string(),
            title: format!("일정 {id}"),
            description: String::new(),
            start_time: start.map(str::to_string),
            end_time: None,
            location: String::new(),
            creator: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_grouping_sorts_dates() {
        let items = vec![
            schedule("a", Some("2025-01-03T10:00:00")),
            schedule("b", Some("2025-01-02T14:00:00")),
            schedule("c", Some("2025-01-03T16:00:00")),
            schedule("d", None),
        ];
        let grouped = group_by_date(&items);
        let dates: Vec<_> = grouped.keys().map(String::as_str).collect();
        assert_eq!(dates, vec!["", "2025-01-02", "2025-01-03"]);
        let ids: Vec<_> = grouped["2025-01-03"].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_day_name_and_today() {
        // 2025-01-02 was a Thursday.
        assert_eq!(day_name("2025-01-02"), Some("목"));
        assert_eq!(day_name("not-a-date"), None);

        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert!(is_today("2025-01-02", today));
        assert!(!is_today("2025-01-03", today));
    }
}
