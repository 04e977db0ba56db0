use chrono::NaiveDate;

/// Counts the calendar days shared by two closed date intervals.
///
/// Both endpoints of each interval are inclusive, so two intervals that meet
/// on a single day share one day, and intervals that merely touch end-to-start
/// (`..=Jan 5` and `Jan 6..=`) share none. Each interval must satisfy
/// `start <= end`.
#[must_use]
pub fn overlap_days(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> u64 {
    let start = start_a.max(start_b);
    let end = end_a.min(end_b);

    if start > end {
        return 0;
    }

    end.signed_duration_since(start).num_days().unsigned_abs() + 1
}
