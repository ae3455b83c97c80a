// tests/text_properties.rs

use petribot::bot::BotCommand;
use petribot::bot::text::{TRUNCATION_MARKER, truncate_text};
use proptest::prelude::*;

proptest! {
    #[test]
    fn truncation_respects_the_limit(text in "\\PC{0,200}", limit in 0usize..120) {
        let out = truncate_text(&text, limit);
        let len = text.chars().count();

        if len <= limit {
            prop_assert_eq!(&out, &text);
        } else {
            prop_assert!(out.ends_with(TRUNCATION_MARKER));
            let kept = &out[..out.len() - TRUNCATION_MARKER.len()];
            prop_assert_eq!(kept.chars().count(), limit);
            prop_assert!(text.starts_with(kept));
        }
    }

    #[test]
    fn non_command_text_is_always_echoed(text in "[a-zA-Z0-9][^\\n]{0,60}") {
        prop_assert_eq!(BotCommand::parse(&text), BotCommand::Echo(text.clone()));
    }

    #[test]
    fn operate_keeps_the_operation_text(op in "[a-z][a-z0-9 ;&|$]{0,40}[a-z]") {
        let parsed = BotCommand::parse(&format!("/claude {op}"));
        prop_assert_eq!(parsed, BotCommand::Operate(Some(op.clone())));
    }
}
