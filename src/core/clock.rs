//! Wall-clock helpers for observed times, generation stamps and file names.

use time::OffsetDateTime;
use time::macros::format_description;

/// Current time in the local offset, falling back to UTC when the offset
/// cannot be determined (e.g. in a multi-threaded process on some platforms).
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `HH:mm:ss`, used as the observed time of live transactions.
pub fn time_of_day(at: &OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

/// `yyyy-MM-dd HH:mm:ss`, substituted into the report header.
pub fn generated_at(at: &OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// `MMddyyyy_HHmmss`, used in default report file names.
pub fn file_stamp(at: &OffsetDateTime) -> String {
    at.format(format_description!(
        "[month][day][year]_[hour][minute][second]"
    ))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_formats() {
        let at = datetime!(2024-03-07 09:05:01 UTC);
        assert_eq!(time_of_day(&at), "09:05:01");
        assert_eq!(generated_at(&at), "2024-03-07 09:05:01");
        assert_eq!(file_stamp(&at), "03072024_090501");
    }

    #[test]
    fn test_now_is_recent() {
        let delta = now() - OffsetDateTime::now_utc();
        assert!(delta.whole_seconds().abs() < 5);
    }
}
