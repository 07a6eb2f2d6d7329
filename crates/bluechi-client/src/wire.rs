//! Tagged representation of positional bus payloads.
//!
//! Replies from the manager are positionally typed tuples. The transport
//! converts them into [`WireValue`] trees so the decoder can check every
//! position against an explicit layout before anything typed is built.

use std::fmt::{self, Write as _};

use serde::Serialize;

/// Type tag of a single wire position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireKind {
    /// Unsigned 8-bit integer (`y`).
    Byte,
    /// Boolean (`b`).
    Bool,
    /// Signed 16-bit integer (`n`).
    Int16,
    /// Unsigned 16-bit integer (`q`).
    Uint16,
    /// Signed 32-bit integer (`i`).
    Int32,
    /// Unsigned 32-bit integer (`u`).
    Uint32,
    /// Signed 64-bit integer (`x`).
    Int64,
    /// Unsigned 64-bit integer (`t`).
    Uint64,
    /// IEEE 754 double (`d`).
    Double,
    /// UTF-8 string (`s`).
    Str,
    /// Object path (`o`).
    ObjectPath,
    /// Type signature (`g`).
    Signature,
    /// Boxed value carrying its own type (`v`).
    Variant,
    /// Homogeneous array (`a...`).
    Array,
    /// Dictionary of key/value entries (`a{..}`).
    Dict,
    /// Positional structure (`(...)`).
    Struct,
}

impl WireKind {
    /// Signature code used when rendering layouts.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Byte => "y",
            Self::Bool => "b",
            Self::Int16 => "n",
            Self::Uint16 => "q",
            Self::Int32 => "i",
            Self::Uint32 => "u",
            Self::Int64 => "x",
            Self::Uint64 => "t",
            Self::Double => "d",
            Self::Str => "s",
            Self::ObjectPath => "o",
            Self::Signature => "g",
            Self::Variant => "v",
            Self::Array => "a",
            Self::Dict => "a{}",
            Self::Struct => "()",
        }
    }

    /// Renders a layout as a compact signature such as `(sos)`.
    #[must_use]
    pub fn layout_signature(layout: &[Self]) -> String {
        let mut rendered = String::from("(");
        for kind in layout {
            rendered.push_str(kind.code());
        }
        rendered.push(')');
        rendered
    }
}

/// Dynamically typed value as it travelled over the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WireValue {
    /// Unsigned 8-bit integer.
    Byte(u8),
    /// Boolean.
    Bool(bool),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Unsigned 16-bit integer.
    Uint16(u16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    Uint32(u32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 64-bit integer.
    Uint64(u64),
    /// IEEE 754 double.
    Double(f64),
    /// UTF-8 string.
    Str(String),
    /// Object path.
    ObjectPath(String),
    /// Type signature.
    Signature(String),
    /// Boxed value.
    Variant(Box<WireValue>),
    /// Array of values sharing one element type.
    Array(Vec<WireValue>),
    /// Dictionary entries in wire order.
    Dict(Vec<(WireValue, WireValue)>),
    /// Positional structure.
    Struct(Vec<WireValue>),
}

impl WireValue {
    /// Builds a string value.
    #[must_use]
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Builds an object path value.
    #[must_use]
    pub fn object_path(value: impl Into<String>) -> Self {
        Self::ObjectPath(value.into())
    }

    /// Wraps a value in a variant.
    #[must_use]
    pub fn variant(value: Self) -> Self {
        Self::Variant(Box::new(value))
    }

    /// Builds an array of strings.
    #[must_use]
    pub fn string_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Array(values.into_iter().map(Self::str).collect())
    }

    /// Type tag of the value.
    #[must_use]
    pub const fn kind(&self) -> WireKind {
        match self {
            Self::Byte(_) => WireKind::Byte,
            Self::Bool(_) => WireKind::Bool,
            Self::Int16(_) => WireKind::Int16,
            Self::Uint16(_) => WireKind::Uint16,
            Self::Int32(_) => WireKind::Int32,
            Self::Uint32(_) => WireKind::Uint32,
            Self::Int64(_) => WireKind::Int64,
            Self::Uint64(_) => WireKind::Uint64,
            Self::Double(_) => WireKind::Double,
            Self::Str(_) => WireKind::Str,
            Self::ObjectPath(_) => WireKind::ObjectPath,
            Self::Signature(_) => WireKind::Signature,
            Self::Variant(_) => WireKind::Variant,
            Self::Array(_) => WireKind::Array,
            Self::Dict(_) => WireKind::Dict,
            Self::Struct(_) => WireKind::Struct,
        }
    }

    /// Full signature of the value, descending into containers.
    ///
    /// Empty arrays carry no element type and render as a bare `a`.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut rendered = String::new();
        self.write_signature(&mut rendered);
        rendered
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            Self::Array(items) => {
                out.push('a');
                if let Some(first) = items.first() {
                    first.write_signature(out);
                }
            }
            Self::Dict(entries) => {
                out.push_str("a{");
                if let Some((key, value)) = entries.first() {
                    key.write_signature(out);
                    value.write_signature(out);
                }
                out.push('}');
            }
            Self::Struct(fields) => {
                out.push('(');
                for field in fields {
                    field.write_signature(out);
                }
                out.push(')');
            }
            other => out.push_str(other.kind().code()),
        }
    }

    /// Renders the body signature of a reply (the concatenated signatures of
    /// every top-level value).
    #[must_use]
    pub fn body_signature(values: &[Self]) -> String {
        values.iter().map(Self::signature).collect()
    }

    /// Returns the contained string for `s` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the contained path for `o` values.
    #[must_use]
    pub fn as_object_path(&self) -> Option<&str> {
        match self {
            Self::ObjectPath(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the contained flag for `b` values.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Strips any number of variant wrappers.
    #[must_use]
    pub fn unwrap_variant(&self) -> &Self {
        match self {
            Self::Variant(inner) => inner.unwrap_variant(),
            other => other,
        }
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(value) => write!(formatter, "{value}"),
            Self::Bool(value) => write!(formatter, "{value}"),
            Self::Int16(value) => write!(formatter, "{value}"),
            Self::Uint16(value) => write!(formatter, "{value}"),
            Self::Int32(value) => write!(formatter, "{value}"),
            Self::Uint32(value) => write!(formatter, "{value}"),
            Self::Int64(value) => write!(formatter, "{value}"),
            Self::Uint64(value) => write!(formatter, "{value}"),
            Self::Double(value) => write!(formatter, "{value}"),
            Self::Str(value) | Self::ObjectPath(value) | Self::Signature(value) => {
                formatter.write_str(value)
            }
            Self::Variant(inner) => write!(formatter, "{inner}"),
            Self::Array(items) | Self::Struct(items) => {
                let (open, close) = if matches!(self, Self::Array(_)) {
                    ('[', ']')
                } else {
                    ('(', ')')
                };
                formatter.write_char(open)?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{item}")?;
                }
                formatter.write_char(close)
            }
            Self::Dict(entries) => {
                formatter.write_char('{')?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "{key}: {value}")?;
                }
                formatter.write_char('}')
            }
        }
    }
}
