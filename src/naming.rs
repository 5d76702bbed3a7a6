use crate::model::{Direction, PacketSpec};
use once_cell::sync::Lazy;
use regex::Regex;

static PAREN_ASIDE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.+\)").unwrap());
static TRAILING_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(([^)]*)\)\s*$").unwrap());

/// Turn a free-text field label into a TitleCase identifier.
///
/// `"Entity ID"` -> `EntityId`, `"Has 2nd hand?"` -> `Has2NdHand`,
/// `"3D Biomes"` -> `Field3DBiomes`.
pub fn field_ident(name: &str) -> String {
    let cleaned = PAREN_ASIDE.replace_all(name, "");
    let cleaned = cleaned.replace(['-', '/'], " ").replace(['?', ':'], "");

    let ident: String = cleaned.split_whitespace().map(capitalize_word).collect();

    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Field{ident}")
    } else {
        ident
    }
}

fn capitalize_word(word: &str) -> String {
    let has_digit = word.chars().any(|c| c.is_ascii_digit());
    let has_alpha = word.chars().any(char::is_alphabetic);
    if has_digit && has_alpha {
        // only the first letter is touched so "3D" stays "3D"
        let mut out = String::with_capacity(word.len());
        let mut upcased = false;
        for c in word.chars() {
            if !upcased && c.is_alphabetic() {
                out.extend(c.to_uppercase());
                upcased = true;
            } else {
                out.push(c);
            }
        }
        out
    } else {
        capitalize_plain(word)
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace().map(capitalize_plain).collect()
}

fn capitalize_plain(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Stable type name for a packet: `C2S`/`S2C` plus the resource in
/// TitleCase, or the cleaned title when the resource is missing.
///
/// Packets documented once per state, like "Cookie Request (login)", get the
/// state appended so the names stay distinct.
pub fn packet_type_name(packet: &PacketSpec, direction: Direction) -> String {
    let prefix = match direction {
        Direction::Serverbound => "C2S",
        Direction::Clientbound => "S2C",
    };

    let state_suffix = TRAILING_PAREN
        .captures(&packet.name)
        .map(|c| c[1].to_lowercase())
        .filter(|s| matches!(s.as_str(), "play" | "configuration" | "login" | "status"))
        .map(|s| capitalize_plain(&s))
        .unwrap_or_default();

    let base = if !packet.resource.is_empty() && packet.resource != "unknown" {
        title_case(&packet.resource.replace('_', " "))
    } else {
        title_case(&TRAILING_PAREN.replace(&packet.name, ""))
    };

    format!("{prefix}{base}{state_suffix}")
}
