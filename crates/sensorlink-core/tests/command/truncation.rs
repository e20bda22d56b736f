use proptest::prelude::*;
use sensorlink_core::{voice_payload, Command, DeviceId, VOICE_MAX_CHARS};

proptest! {
    #[test]
    fn prop_voice_payload_bounded(text in ".*") {
        prop_assert!(voice_payload(&text).chars().count() <= VOICE_MAX_CHARS);
    }

    #[test]
    fn prop_voice_truncation_idempotent(text in ".*") {
        let once = voice_payload(&text);
        prop_assert_eq!(voice_payload(&once), once.clone());
    }

    #[test]
    fn prop_short_ascii_text_unchanged(text in "[ -~]{0,12}") {
        let line = Command::voice(DeviceId::A, text.clone()).encode().unwrap();
        prop_assert_eq!(line, format!("V A {}", text));
    }

    #[test]
    fn prop_encoded_lines_are_single_ascii_lines(text in ".*", temp in -100.0f64..100.0) {
        for cmd in [Command::voice(DeviceId::B, text), Command::temperature(DeviceId::A, temp)] {
            let line = cmd.encode().unwrap();
            prop_assert!(line.is_ascii());
            prop_assert!(!line.contains('\n'));
        }
    }

    #[test]
    fn prop_temperature_one_fractional_digit(temp in -100.0f64..100.0) {
        let line = Command::temperature(DeviceId::A, temp).encode().unwrap();
        let value = line.rsplit(' ').next().unwrap();
        let (_, frac) = value.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 1);
    }
}
