use crate::type_expr::TypeExpr;
use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\((\d+)\)$").unwrap());
static QUALIFIED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\((.+)\)$").unwrap());

/// Scalar names an `Or` token may end with, in lookup order. `VarInt` comes
/// before `Int` so `OrStringVarInt` splits as String | VarInt.
const UNION_BOUNDARIES: &[&str] = &[
    "TextComponent",
    "String",
    "VarInt",
    "Int",
    "Long",
    "Float",
    "Double",
    "Boolean",
    "Byte",
];

/// Project a canonical type token (see [`crate::type_norm::normalize_type`])
/// onto the target type system.
///
/// Never fails: shapes the grammar doesn't know come back as
/// [`TypeExpr::Unresolved`] carrying the offending text. Each recursive call
/// works on a strictly shorter slice, so recursion ends on any input.
pub fn project(token: &str) -> TypeExpr {
    if let Some(caps) = TRAILING_SIZE.captures(token) {
        let inner = project_base(&caps[1]);
        return TypeExpr::Sized {
            inner: Box::new(inner),
            size: caps[2].to_string(),
        };
    }
    project_base(token)
}

fn project_base(token: &str) -> TypeExpr {
    let base = token.replace(['-', '/'], "");

    if base.is_empty() {
        return TypeExpr::unresolved("empty type");
    }
    if base == "Namespace" {
        return TypeExpr::identifier();
    }
    if is_see_below(&base) {
        return TypeExpr::unresolved(format!("See below: {token}"));
    }

    if let Some(caps) = QUALIFIED.captures(&base) {
        let main = project(&caps[1]);
        let qualifier = caps[2].to_string();
        if is_see_below(&qualifier) {
            return TypeExpr::Unresolved {
                inner: Some(Box::new(main)),
                diagnostic: format!("See below: {token}"),
            };
        }
        if qualifier.chars().all(|c| c.is_ascii_digit()) {
            return TypeExpr::Sized {
                inner: Box::new(main),
                size: qualifier,
            };
        }
        return TypeExpr::Annotated {
            inner: Box::new(main),
            note: qualifier.to_lowercase(),
        };
    }

    if let Some(inner) = base.strip_prefix("IDor") {
        return TypeExpr::Or(Box::new(TypeExpr::identifier()), Box::new(project(inner)));
    }

    if let Some(combined) = base.strip_prefix("Or") {
        return project_union(combined);
    }

    if let Some(inner) = base.strip_prefix("PrefixedOptional") {
        let inner = match inner {
            "ByteArray" => TypeExpr::ByteArray,
            "PrefixedByteArray" => TypeExpr::PrefixedByteArray,
            other => project(other),
        };
        return TypeExpr::PrefixedOptional(Box::new(inner));
    }

    if let Some(inner) = base.strip_prefix("Optional") {
        let inner = match inner {
            "ByteArray" | "PrefixedByteArray" => TypeExpr::ByteArray,
            other => project(other),
        };
        return TypeExpr::Optional(Box::new(inner));
    }

    if let Some(inner) = base
        .strip_prefix("Prefixed")
        .and_then(|rest| rest.strip_suffix("Array"))
        .filter(|inner| !inner.is_empty())
    {
        return if inner == "Byte" {
            TypeExpr::PrefixedByteArray
        } else {
            TypeExpr::PrefixedArray(Box::new(project(inner)))
        };
    }

    if let Some(inner) = base.strip_suffix("Array").filter(|inner| !inner.is_empty()) {
        return if inner == "Byte" {
            TypeExpr::ByteArray
        } else {
            TypeExpr::Array(Box::new(project(inner)))
        };
    }

    if !base.replace('_', "").chars().all(char::is_alphanumeric) {
        return TypeExpr::unresolved(format!("Invalid type '{base}'"));
    }

    TypeExpr::Scalar(base)
}

/// Re-split the body of an `Or` token on a known trailing scalar name.
fn project_union(combined: &str) -> TypeExpr {
    for boundary in UNION_BOUNDARIES {
        if combined == *boundary {
            continue;
        }
        if let Some(left) = combined.strip_suffix(boundary) {
            return TypeExpr::Or(
                Box::new(project(left)),
                Box::new(project_base(boundary)),
            );
        }
    }
    TypeExpr::unresolved(format!("Or type {combined}"))
}

fn is_see_below(s: &str) -> bool {
    matches!(
        s.to_lowercase().as_str(),
        "seebelow" | "see below" | "(seebelow)" | "(see below)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("VarInt", "VarInt")]
    #[case("Namespace", "Identifier")]
    #[case("ByteArray", "ByteArray")]
    #[case("PrefixedByteArray", "PrefixedByteArray")]
    #[case("ByteArray(256)", "ByteArray // Size: 256")]
    #[case("PrefixedVarIntArray(2)", "PrefixedArray[VarInt] // Size: 2")]
    #[case("SlotArray", "Array[Slot]")]
    #[case("IDorSoundEvent", "Or[Identifier, SoundEvent]")]
    #[case("OrStringVarInt", "Or[String, VarInt]")]
    #[case("OrTextComponentString", "Or[TextComponent, String]")]
    #[case("PrefixedOptionalByteArray", "PrefixedOptional[ByteArray]")]
    #[case("PrefixedOptionalPrefixedByteArray", "PrefixedOptional[PrefixedByteArray]")]
    #[case("OptionalPrefixedByteArray", "Optional[ByteArray]")]
    #[case("PrefixedOptionalPrefixedStringArray", "PrefixedOptional[PrefixedArray[String]]")]
    #[case("Position(seebelow)", "Position // FIXME: See below: Position(seebelow)")]
    #[case("Int(optional)", "Int // FIXME: optional")]
    #[case("seebelow", "Unknown // FIXME: See below: seebelow")]
    #[case("See-Below", "Unknown // FIXME: See below: See-Below")]
    #[case("OrFooBar", "Unknown // FIXME: Or type FooBar")]
    #[case("Chat.Json", "Unknown // FIXME: Invalid type 'Chat.Json'")]
    #[case("", "Unknown // FIXME: empty type")]
    fn projects(#[case] token: &str, #[case] expected: &str) {
        assert_eq!(project(token).to_string(), expected);
    }

    #[test]
    fn byte_arrays_are_dedicated_types() {
        assert_eq!(project("ByteArray").shape(), &TypeExpr::ByteArray);
        assert_eq!(project("PrefixedByteArray"), TypeExpr::PrefixedByteArray);
        assert_ne!(
            project("ByteArray"),
            TypeExpr::Array(Box::new(TypeExpr::scalar("Byte")))
        );
    }

    #[test]
    fn bare_array_words_are_scalars() {
        // "Array" alone has no element type to wrap.
        assert_eq!(project("Array"), TypeExpr::scalar("Array"));
    }
}
