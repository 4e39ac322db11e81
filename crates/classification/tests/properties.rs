use classification::{ClassificationEngine, Classifier, classify};
use core_types::{Classification, Level};
use proptest::prelude::*;

fn department() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CE".to_string()),
        Just("Plant Production".to_string()),
        Just("FG WH".to_string()),
        Just("Admin".to_string()),
        Just("Raw Material".to_string()),
        Just("Line".to_string()),
        Just("Quality".to_string()),
        Just("No-sew".to_string()),
        Just(String::new()),
        "[A-Za-z &-]{0,16}",
    ]
}

fn level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::PM),
        Just(Level::LM),
        Just(Level::GL),
        Just(Level::TL),
        Just(Level::TM),
        "[A-Z]{0,4}".prop_map(Level::from),
    ]
}

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("Mixing".to_string())),
        Just(Some("Shipping".to_string())),
        Just(Some("HF Welding".to_string())),
        "[A-Za-z ]{0,12}".prop_map(Some),
    ]
}

proptest! {
    #[test]
    fn classify_is_deterministic(
        department in department(),
        level in level(),
        process_type in optional_text(),
        subtitle in optional_text(),
    ) {
        let first = classify(&department, &level, process_type.as_deref(), subtitle.as_deref());
        let second = classify(&department, &level, process_type.as_deref(), subtitle.as_deref());
        prop_assert_eq!(first, second);
        prop_assert!(Classification::ALL.contains(&first));
    }

    #[test]
    fn engine_and_free_function_agree(
        department in department(),
        level in level(),
        subtitle in optional_text(),
    ) {
        let engine = ClassificationEngine::new();
        prop_assert_eq!(
            engine.classify(&department, &level, None, subtitle.as_deref()),
            classify(&department, &level, None, subtitle.as_deref())
        );
    }

    #[test]
    fn formatting_does_not_change_the_outcome(level in level(), subtitle in optional_text()) {
        for (plain, formatted) in [("Raw Material", "raw-material"), ("FG WH", "fgwh"), ("Plant Production", "PLANT  PRODUCTION")] {
            prop_assert_eq!(
                classify(plain, &level, None, subtitle.as_deref()),
                classify(formatted, &level, None, subtitle.as_deref())
            );
        }
    }

    #[test]
    fn separated_processes_override_everything(department in department(), level in level()) {
        prop_assert_eq!(
            classify(&department, &level, Some("HF Welding"), Some("Mixing")),
            Classification::Indirect
        );
    }
}
