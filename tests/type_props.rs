use proptest::prelude::*;

use wiki_packet_import::projector::project;
use wiki_packet_import::type_norm::normalize_type;

fn scalar() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("VarInt"),
        Just("VarLong"),
        Just("String"),
        Just("Long"),
        Just("Byte"),
        Just("Boolean"),
        Just("Identifier"),
        Just("Text Component"),
        Just("Sound Event"),
        Just("Unsigned Short"),
    ]
}

fn word() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("VarInt"), Just("String"), Just("Byte"), Just("Slot"), Just("UUID")]
}

/// Field type descriptions in the shapes the wiki writes them.
fn description() -> impl Strategy<Value = String> {
    prop_oneof![
        scalar().prop_map(str::to_string),
        word().prop_map(|w| format!("Array of {w}")),
        word().prop_map(|w| format!("Prefixed Array of {w}")),
        (1u16..512, word()).prop_map(|(n, w)| format!("Array ({n}) of {w}")),
        (1u16..512, word()).prop_map(|(n, w)| format!("Prefixed Array ({n}) of {w}")),
        scalar().prop_map(|s| format!("{s} Enum")),
        scalar().prop_map(|s| format!("ID or {s}")),
        (scalar(), scalar()).prop_map(|(a, b)| format!("{a} or {b}")),
        (scalar(), 1u16..40000).prop_map(|(s, n)| format!("{s} ( {n} )")),
        word().prop_map(|w| format!("Optional {w}")),
    ]
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in description()) {
        let once = normalize_type(&raw);
        prop_assert_eq!(normalize_type(&once), once.clone());
        prop_assert!(!once.contains(char::is_whitespace), "{}", once);
    }

    #[test]
    fn normalize_is_idempotent_with_padding(raw in description(), pad in "[ \t\n]{0,3}") {
        let padded = format!("{pad}{raw}{pad}");
        prop_assert_eq!(normalize_type(&padded), normalize_type(&raw));
    }

    #[test]
    fn projection_is_total(s in ".*") {
        let ty = project(&s);
        let _ = ty.to_string();
        let _ = project(&normalize_type(&s)).to_string();
    }

    #[test]
    fn projected_descriptions_render(raw in description()) {
        let ty = project(&normalize_type(&raw));
        let rendered = ty.to_string();
        prop_assert!(!rendered.is_empty());
        prop_assert_eq!(ty.is_resolved(), !rendered.contains("FIXME"));
    }
}
