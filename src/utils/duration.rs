use chrono::NaiveDateTime;

/// Formats a whole-second count as `HH:MM:SS`. Hours are not wrapped at 24,
/// matching how durations are stored in the activity tables.
pub fn format_hms(total_seconds: i64) -> String {
    let secs = total_seconds.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Duration between two instants, truncated to whole seconds.
pub fn hms_between(start: NaiveDateTime, stop: NaiveDateTime) -> String {
    format_hms((stop - start).num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_zero_and_subminute() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
    }

    #[test]
    fn formats_mixed_span() {
        assert_eq!(format_hms(45 * 60 + 30), "00:45:30");
        assert_eq!(format_hms(8 * 3600 + 7 * 60 + 10), "08:07:10");
    }

    #[test]
    fn hours_exceeding_a_day_are_not_wrapped() {
        assert_eq!(format_hms(25 * 3600), "25:00:00");
    }

    #[test]
    fn negative_spans_clamp_to_zero() {
        assert_eq!(format_hms(-5), "00:00:00");
    }

    #[test]
    fn between_truncates_to_whole_seconds() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let start = day.and_hms_opt(9, 0, 0).unwrap();
        let stop = day.and_hms_milli_opt(9, 45, 30, 700).unwrap();
        assert_eq!(hms_between(start, stop), "00:45:30");
    }
}
