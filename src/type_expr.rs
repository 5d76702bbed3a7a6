use serde::{Serialize, Serializer};
use std::fmt;

/// Projected field type.
///
/// Produced by [`crate::projector::project`] from a canonical token, or built
/// directly when rowspan element rows are folded into a structure. Anything
/// the grammar can't place ends up as [`TypeExpr::Unresolved`] instead of an
/// error, so a full schema is always emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Scalar(String),
    /// Raw bytes running to the end of the packet.
    ByteArray,
    /// Raw bytes with a VarInt length prefix.
    PrefixedByteArray,
    Array(Box<TypeExpr>),
    PrefixedArray(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
    PrefixedOptional(Box<TypeExpr>),
    Or(Box<TypeExpr>, Box<TypeExpr>),
    Struct(Vec<StructMember>),
    /// A fixed element count from the wiki, kept for the reader only.
    Sized { inner: Box<TypeExpr>, size: String },
    /// Free-text qualifier that followed the type in parentheses.
    Annotated { inner: Box<TypeExpr>, note: String },
    Unresolved {
        inner: Option<Box<TypeExpr>>,
        diagnostic: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    pub name: String,
    pub ty: TypeExpr,
}

impl TypeExpr {
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeExpr::Scalar(name.into())
    }

    pub fn identifier() -> Self {
        TypeExpr::Scalar("Identifier".into())
    }

    pub fn unresolved(diagnostic: impl Into<String>) -> Self {
        TypeExpr::Unresolved {
            inner: None,
            diagnostic: diagnostic.into(),
        }
    }

    /// Strip informational wrappers (`Sized`, `Annotated`).
    pub fn shape(&self) -> &TypeExpr {
        match self {
            TypeExpr::Sized { inner, .. } | TypeExpr::Annotated { inner, .. } => inner.shape(),
            other => other,
        }
    }

    pub fn is_byte(&self) -> bool {
        matches!(self.shape(), TypeExpr::Scalar(name) if name == "Byte")
    }

    /// False if any node in the tree needs a manual fix.
    pub fn is_resolved(&self) -> bool {
        match self {
            TypeExpr::Unresolved { .. } => false,
            TypeExpr::Scalar(_) | TypeExpr::ByteArray | TypeExpr::PrefixedByteArray => true,
            TypeExpr::Array(t)
            | TypeExpr::PrefixedArray(t)
            | TypeExpr::Optional(t)
            | TypeExpr::PrefixedOptional(t) => t.is_resolved(),
            TypeExpr::Or(a, b) => a.is_resolved() && b.is_resolved(),
            TypeExpr::Struct(members) => members.iter().all(|m| m.ty.is_resolved()),
            TypeExpr::Sized { inner, .. } | TypeExpr::Annotated { inner, .. } => {
                inner.is_resolved()
            }
        }
    }

    /// Collect size comments and FIXME diagnostics, outermost first.
    pub fn annotations(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_annotations(&mut out);
        out
    }

    fn collect_annotations(&self, out: &mut Vec<String>) {
        match self {
            TypeExpr::Scalar(_) | TypeExpr::ByteArray | TypeExpr::PrefixedByteArray => {}
            TypeExpr::Array(t)
            | TypeExpr::PrefixedArray(t)
            | TypeExpr::Optional(t)
            | TypeExpr::PrefixedOptional(t) => t.collect_annotations(out),
            TypeExpr::Or(a, b) => {
                a.collect_annotations(out);
                b.collect_annotations(out);
            }
            TypeExpr::Struct(members) => {
                for m in members {
                    m.ty.collect_annotations(out);
                }
            }
            TypeExpr::Sized { inner, size } => {
                out.push(format!("Size: {size}"));
                inner.collect_annotations(out);
            }
            TypeExpr::Annotated { inner, note } => {
                out.push(format!("FIXME: {note}"));
                inner.collect_annotations(out);
            }
            TypeExpr::Unresolved { inner, diagnostic } => {
                out.push(format!("FIXME: {diagnostic}"));
                if let Some(inner) = inner {
                    inner.collect_annotations(out);
                }
            }
        }
    }

    fn write_shape(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Scalar(name) => f.write_str(name),
            TypeExpr::ByteArray => f.write_str("ByteArray"),
            TypeExpr::PrefixedByteArray => f.write_str("PrefixedByteArray"),
            TypeExpr::Array(t) => wrap(f, "Array", t),
            TypeExpr::PrefixedArray(t) => wrap(f, "PrefixedArray", t),
            TypeExpr::Optional(t) => wrap(f, "Optional", t),
            TypeExpr::PrefixedOptional(t) => wrap(f, "PrefixedOptional", t),
            TypeExpr::Or(a, b) => {
                f.write_str("Or[")?;
                a.write_shape(f)?;
                f.write_str(", ")?;
                b.write_shape(f)?;
                f.write_str("]")
            }
            TypeExpr::Struct(members) => {
                f.write_str("struct { ")?;
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} ", m.name)?;
                    m.ty.write_shape(f)?;
                }
                f.write_str(" }")
            }
            TypeExpr::Sized { inner, .. } | TypeExpr::Annotated { inner, .. } => {
                inner.write_shape(f)
            }
            TypeExpr::Unresolved { inner: Some(inner), .. } => inner.write_shape(f),
            TypeExpr::Unresolved { inner: None, .. } => f.write_str("Unknown"),
        }
    }
}

fn wrap(f: &mut fmt::Formatter<'_>, wrapper: &str, inner: &TypeExpr) -> fmt::Result {
    write!(f, "{wrapper}[")?;
    inner.write_shape(f)?;
    f.write_str("]")
}

/// Renders the type shape followed by a single `// ...` comment carrying
/// every annotation in the tree, e.g. `Array[Unknown] // FIXME: Or type Foo`.
impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_shape(f)?;
        let notes = self.annotations();
        if !notes.is_empty() {
            write!(f, " // {}", notes.join("; "))?;
        }
        Ok(())
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
