//! Display-string derivation. A pure function of the target and "now".

use chrono::{DateTime, Duration, Utc};

use crate::utils::date::format_compact_seconds;

pub const COUNTING_DOWN_PREFIX: &str = "↓ ";
pub const COUNTING_UP_PREFIX: &str = "↑ ";
pub const AT_TARGET_TEXT: &str = "= now";
const FALLBACK_DURATION_TEXT: &str = "0s";

/// `"↓ 1d 2h 3m 4s"` before the target, `"↑ …"` after it, `"= now"` at it.
pub fn format_countdown(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = target.signed_duration_since(now);

    if delta == Duration::zero() {
        return AT_TARGET_TEXT.to_string();
    }

    let prefix = if delta > Duration::zero() {
        COUNTING_DOWN_PREFIX
    } else {
        COUNTING_UP_PREFIX
    };

    let body = format_magnitude(delta).unwrap_or_else(|| FALLBACK_DURATION_TEXT.to_string());
    format!("{prefix}{body}")
}

fn format_magnitude(delta: Duration) -> Option<String> {
    let seconds = delta.num_seconds().checked_abs()?;
    let seconds = u64::try_from(seconds).ok()?;
    Some(format_compact_seconds(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_exact_target_is_now() {
        assert_eq!(format_countdown(at(12, 0, 0), at(12, 0, 0)), "= now");
    }

    #[test_case(at(12, 0, 0), at(11, 59, 55), "↓ 5s" ; "seconds before")]
    #[test_case(at(12, 0, 0), at(10, 58, 59), "↓ 1h 1m 1s" ; "hours before")]
    #[test_case(at(12, 0, 0), at(12, 0, 5), "↑ 5s" ; "seconds after")]
    #[test_case(at(12, 0, 0), at(12, 2, 0), "↑ 2m" ; "minutes after")]
    fn test_format_countdown(target: DateTime<Utc>, now: DateTime<Utc>, expected: &str) {
        assert_eq!(format_countdown(target, now), expected);
    }

    #[test]
    fn test_days_are_included() {
        let target = at(12, 0, 0) + Duration::days(3);
        assert_eq!(format_countdown(target, at(12, 0, 0)), "↓ 3d");
    }

    #[test]
    fn test_sub_second_gap_keeps_direction() {
        let now = at(12, 0, 0);
        assert_eq!(format_countdown(now + Duration::milliseconds(400), now), "↓ 0s");
        assert_eq!(format_countdown(now - Duration::milliseconds(400), now), "↑ 0s");
    }
}
