//! Property-based tests for ReaderSettings serialization round-trip and
//! query overrides.

use std::collections::BTreeMap;

use epubreader::services::settings_engine::apply_query;
use epubreader::types::settings::{ReaderAction, ReaderSettings};
use proptest::prelude::*;

fn arb_action() -> impl Strategy<Value = ReaderAction> {
    prop_oneof![
        Just(ReaderAction::Next),
        Just(ReaderAction::Previous),
        Just(ReaderAction::First),
        Just(ReaderAction::Last),
        Just(ReaderAction::Annotate),
        Just(ReaderAction::Bookmark),
        Just(ReaderAction::Reflow),
        Just(ReaderAction::ToggleSidebar),
        Just(ReaderAction::Toolbar),
        Just(ReaderAction::ToggleDay),
        Just(ReaderAction::ToggleNight),
        Just(ReaderAction::ToggleFullscreen),
        Just(ReaderAction::CloseSidebar),
    ]
}

fn arb_keyboard() -> impl Strategy<Value = BTreeMap<u32, ReaderAction>> {
    prop::collection::btree_map(8u32..255, arb_action(), 0..20)
}

fn arb_settings() -> impl Strategy<Value = ReaderSettings> {
    (
        "[a-zA-Z0-9/._-]{0,40}",
        prop::option::of(any::<bool>()),
        any::<[bool; 6]>(),
        arb_keyboard(),
        1u32..500,
        prop::option::of("[a-zA-Z0-9 ();/._-]{1,60}"),
    )
        .prop_map(|(book_path, contained, flags, keyboard, max_width, user_agent)| ReaderSettings {
            book_path,
            contained,
            sidebar_reflow: flags[0],
            generate_pagination: flags[1],
            history: flags[2],
            keyboard,
            night_mode: flags[3],
            day_mode: flags[4],
            max_width,
            page_arrows: flags[5],
            user_agent,
        })
}

proptest! {
    #[test]
    fn settings_json_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: ReaderSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn query_max_width_override(width in 1u32..10_000) {
        let mut settings = ReaderSettings::default();
        let applied = apply_query(&mut settings, &format!("?maxWidth={}", width));
        prop_assert_eq!(applied, vec!["maxWidth".to_string()]);
        prop_assert_eq!(settings.max_width, width);
    }

    #[test]
    fn query_book_path_is_decoded(name in "[a-z]{1,12}( [a-z]{1,12})?") {
        let mut settings = ReaderSettings::default();
        let encoded = urlencoding::encode(&name).into_owned();
        apply_query(&mut settings, &format!("bookPath={}.epub", encoded));
        prop_assert_eq!(settings.book_path, format!("{}.epub", name));
    }
}
