use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ENUM_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\benums?\b").unwrap());
static PREFIXED_SIZED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bPrefixed\s+Array\s*\(\s*([0-9]+)\s*\)\s+of\s+([A-Za-z0-9]+)\b").unwrap()
});
static PREFIXED_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bPrefixed\s+Array\s+of\s+([A-Za-z0-9]+)\b").unwrap());
static SIZED_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bArray\s*\(\s*([0-9]+)\s*\)\s+of\s+([A-Za-z0-9]+)\b").unwrap()
});
static ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bArray\s+of\s+([A-Za-z0-9]+)\b").unwrap());
static ID_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)^ID\s+or\s+(.+)$").unwrap());
static OR_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+or\s+").unwrap());
static PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*([^)]+)\s*\)").unwrap());

/// Canonicalize a free-text field type from the wiki into a whitespace-free
/// token such as `PrefixedVarIntArray(2)`, `IDorSoundEvent` or `OrStringVarInt`.
///
/// Every rewrite is a no-op on input it doesn't match and the output holds no
/// whitespace or standalone Enum word, so the function is idempotent on its
/// own output.
pub fn normalize_type(raw: &str) -> String {
    let t = collapse_ws(raw);
    if t.is_empty() {
        return String::new();
    }

    let t = collapse_ws(&ENUM_WORD.replace_all(&t, ""));

    let t = PREFIXED_SIZED_ARRAY.replace_all(&t, "Prefixed${2}Array(${1})");
    let t = PREFIXED_ARRAY.replace_all(&t, "Prefixed${1}Array");
    let t = SIZED_ARRAY.replace_all(&t, "${2}Array(${1})");
    let mut t = ARRAY.replace_all(&t, "${1}Array").into_owned();

    if let Some(inner) = ID_OR.captures(&t).and_then(|c| c.get(1)) {
        t = format!("IDor{}", normalize_type(inner.as_str()));
    }

    // Only the first " or " splits; "A or B or C" becomes Or(A, "B or C").
    if let Some(m) = OR_SPLIT.find(&t) {
        let left = normalize_type(&t[..m.start()]);
        let right = normalize_type(&t[m.end()..]);
        t = format!("Or{left}{right}");
    }

    let t = collapse_ws(&ENUM_WORD.replace_all(&t, ""));
    let t = PAREN.replace_all(&t, |c: &Captures<'_>| format!("({})", &c[1]));
    let t = WHITESPACE.replace_all(&t, "");
    // Dropping the spaces can spell a new standalone "Enum" ("En enum um").
    ENUM_WORD.replace_all(&t, "").into_owned()
}

fn collapse_ws(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Collapse runs of spaces and tabs on each line and trim, keeping the line
/// breaks that separate paragraphs.
pub fn normalize_notes(text: &str) -> String {
    static INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
    text.lines()
        .map(|ln| INLINE_WS.replace_all(ln, " ").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
