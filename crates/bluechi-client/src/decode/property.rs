use crate::model::{Property, PropertyMap};
use crate::wire::WireValue;

use super::DecodeError;

const ENTITY: &str = "property map";
const ACCEPTED: &str = "a{sv}";

/// Decodes an `a{sv}` reply into a name-ordered map.
///
/// Variant wrappers are stripped from the values. An empty array is accepted
/// as an empty map because it carries no element type.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] when the body is not a single
/// dictionary of string keys to variants.
pub fn decode_property_map(values: &[WireValue]) -> Result<PropertyMap, DecodeError> {
    let entries = match values {
        [WireValue::Dict(entries)] => entries.as_slice(),
        [WireValue::Array(items)] if items.is_empty() => &[],
        other => return Err(DecodeError::body_mismatch(ENTITY, other, ACCEPTED)),
    };

    let properties = entries
        .iter()
        .map(|entry| match entry {
            (WireValue::Str(name), WireValue::Variant(value)) => Ok(Property {
                name: name.clone(),
                value: value.unwrap_variant().clone(),
            }),
            (key, value) => Err(DecodeError::ShapeMismatch {
                entity: ENTITY,
                observed: format!("a{{{}{}}}", key.signature(), value.signature()),
                accepted: ACCEPTED.to_owned(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PropertyMap::from_properties(properties))
}

/// Reads a string property that must be present.
pub(super) fn required_str<'a>(
    entity: &'static str,
    properties: &'a PropertyMap,
    property: &'static str,
) -> Result<&'a str, DecodeError> {
    optional_str(entity, properties, property)?
        .ok_or(DecodeError::MissingProperty { entity, property })
}

/// Reads a string property that may be absent.
pub(super) fn optional_str<'a>(
    entity: &'static str,
    properties: &'a PropertyMap,
    property: &'static str,
) -> Result<Option<&'a str>, DecodeError> {
    match properties.get(property) {
        None => Ok(None),
        Some(WireValue::Str(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(DecodeError::PropertyType {
            entity,
            property,
            observed: other.signature(),
            expected: "s",
        }),
    }
}
