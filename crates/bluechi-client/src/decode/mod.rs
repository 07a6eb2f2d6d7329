//! Pure conversion of reply payloads into the typed model.
//!
//! Each entity has a table of accepted layouts ([`EntityShapes`]). A tuple is
//! decoded only when it matches one layout exactly, position by position.
//! Anything else is a [`DecodeError`]; nothing is coerced and no partially
//! built value escapes.

mod changes;
mod node;
mod property;
mod shape;
mod unit;

use thiserror::Error;

use crate::wire::WireValue;

pub use changes::{decode_empty, decode_enable_reply, decode_job, decode_unit_file_changes};
pub use node::{NodeLayout, decode_node_properties, decode_nodes, decode_object_path, node_shapes};
pub use property::decode_property_map;
pub use shape::{EntityShapes, Shape};
pub use unit::{UnitLayout, decode_unit_properties, decode_units, unit_shapes};

/// Reply did not have a shape the client understands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Arity or per-position types matched no accepted layout.
    #[error("{entity} has signature '{observed}', expected {accepted}")]
    ShapeMismatch {
        /// Entity being decoded.
        entity: &'static str,
        /// Signature actually received.
        observed: String,
        /// Accepted signatures.
        accepted: String,
    },

    /// An enumerated text field carried a value outside the known set.
    #[error("{entity} field '{field}' has unrecognised value '{value}'")]
    UnknownVariant {
        /// Entity being decoded.
        entity: &'static str,
        /// Field holding the value.
        field: &'static str,
        /// Text received.
        value: String,
    },

    /// A property map lacked a property the entity requires.
    #[error("{entity} properties lack required '{property}'")]
    MissingProperty {
        /// Entity being decoded.
        entity: &'static str,
        /// Name of the missing property.
        property: &'static str,
    },

    /// A property carried a value of the wrong type.
    #[error("{entity} property '{property}' has signature '{observed}', expected '{expected}'")]
    PropertyType {
        /// Entity being decoded.
        entity: &'static str,
        /// Property name.
        property: &'static str,
        /// Signature actually received.
        observed: String,
        /// Signature expected.
        expected: &'static str,
    },
}

impl DecodeError {
    pub(crate) fn body_mismatch(
        entity: &'static str,
        values: &[WireValue],
        accepted: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            entity,
            observed: WireValue::body_signature(values),
            accepted: accepted.into(),
        }
    }

    pub(crate) fn unknown_variant(
        entity: &'static str,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::UnknownVariant {
            entity,
            field,
            value: value.into(),
        }
    }
}

/// Parses an enumerated text field through its `FromStr` implementation.
fn parse_enum<T>(entity: &'static str, field: &'static str, text: &str) -> Result<T, DecodeError>
where
    T: std::str::FromStr,
{
    text.parse::<T>()
        .map_err(|_| DecodeError::unknown_variant(entity, field, text))
}

/// Unwraps a reply whose body is a single array and returns its items.
fn single_array<'a>(
    entity: &'static str,
    values: &'a [WireValue],
    accepted: impl FnOnce() -> String,
) -> Result<&'a [WireValue], DecodeError> {
    match values {
        [WireValue::Array(items)] => Ok(items.as_slice()),
        other => Err(DecodeError::body_mismatch(entity, other, accepted())),
    }
}
