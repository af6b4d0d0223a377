// Property-based tests for body normalization, date parsing and display derivation

use chrono::{DateTime, Duration, TimeZone, Utc};
use menubar_countdown::services::countdown::{
    format_countdown, AT_TARGET_TEXT, COUNTING_DOWN_PREFIX, COUNTING_UP_PREFIX,
};
use menubar_countdown::services::fetcher::{normalize_body, parse_target_instant};
use proptest::prelude::*;

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 1971-01-01 .. 2100-01-01
    (31_536_000i64..4_102_444_800i64)
        .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap())
}

fn designator_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Z".to_string()),
        (-12i32..=14, prop_oneof![Just(0u32), Just(30u32), Just(45u32)]).prop_map(|(h, m)| {
            let sign = if h < 0 { '-' } else { '+' };
            format!("{}{:02}:{:02}", sign, h.abs(), m)
        }),
    ]
}

fn noise_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(' '),
            Just('\n'),
            Just('\r'),
            Just('\t'),
            Just('\u{0007}'),
            Just('\u{0000}'),
            Just('\u{2028}'),
        ],
        0..6,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_normalization_yields_trimmed_core(
        instant in instant_strategy(),
        designator in designator_strategy(),
        prefix in noise_strategy(),
        suffix in noise_strategy(),
    ) {
        let core = format!("{}{}", instant.format("%Y-%m-%dT%H:%M:%S"), designator);
        let body = format!("{prefix}{core}{suffix}");

        prop_assert_eq!(normalize_body(&body), core.clone());
        prop_assert!(parse_target_instant(&core).is_some());
    }

    #[test]
    fn prop_parse_requires_designator(instant in instant_strategy()) {
        let without = instant.format("%Y-%m-%dT%H:%M:%S").to_string();
        let with_z = format!("{without}Z");

        prop_assert_eq!(parse_target_instant(&without), None);
        prop_assert_eq!(parse_target_instant(&with_z), Some(instant));
    }

    #[test]
    fn prop_display_prefix_follows_sign(
        target in instant_strategy(),
        offset_ms in -10_000_000_000i64..10_000_000_000i64,
    ) {
        let now = target + Duration::milliseconds(offset_ms);
        let text = format_countdown(target, now);

        if offset_ms < 0 {
            prop_assert!(text.starts_with(COUNTING_DOWN_PREFIX), "{}", text);
        } else if offset_ms > 0 {
            prop_assert!(text.starts_with(COUNTING_UP_PREFIX), "{}", text);
        } else {
            prop_assert_eq!(text, AT_TARGET_TEXT);
        }
    }

    #[test]
    fn prop_display_is_never_empty(
        target in instant_strategy(),
        now in instant_strategy(),
    ) {
        let text = format_countdown(target, now);
        prop_assert!(!text.is_empty());
        prop_assert!(text.ends_with(['d', 'h', 'm', 's']) || text == AT_TARGET_TEXT);
    }
}
