use crate::model::{ActiveState, LoadState, ObjectPath, PropertyMap, Unit};
use crate::wire::{WireKind, WireValue};

use super::property::{optional_str, required_str};
use super::shape::{EntityShapes, Shape};
use super::{DecodeError, parse_enum, single_array};

const ENTITY: &str = "unit";

/// Unit tuple revisions understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLayout {
    /// `(name, node, active state, load state)`.
    Compact,
    /// Manager listing: `(node, name, description, load state, active state,
    /// sub state, following, object path, job id, job type, job path)`.
    Listing,
}

static UNIT_SHAPES: EntityShapes<UnitLayout> = EntityShapes::new(
    ENTITY,
    &[
        Shape::new(
            UnitLayout::Compact,
            &[WireKind::Str, WireKind::Str, WireKind::Str, WireKind::Str],
        ),
        Shape::new(
            UnitLayout::Listing,
            &[
                WireKind::Str,
                WireKind::Str,
                WireKind::Str,
                WireKind::Str,
                WireKind::Str,
                WireKind::Str,
                WireKind::Str,
                WireKind::ObjectPath,
                WireKind::Uint32,
                WireKind::Str,
                WireKind::ObjectPath,
            ],
        ),
    ],
);

/// Layouts accepted for unit tuples.
#[must_use]
pub fn unit_shapes() -> &'static EntityShapes<UnitLayout> {
    &UNIT_SHAPES
}

/// Decodes a `ListUnits` reply, preserving the manager's order.
///
/// # Errors
///
/// Returns [`DecodeError`] when the body is not a single array or any tuple
/// matches no unit layout.
pub fn decode_units(values: &[WireValue]) -> Result<Vec<Unit>, DecodeError> {
    let items = single_array(ENTITY, values, || UNIT_SHAPES.accepted_arrays())?;
    items.iter().map(decode_unit_tuple).collect()
}

fn decode_unit_tuple(item: &WireValue) -> Result<Unit, DecodeError> {
    let mismatch = || DecodeError::ShapeMismatch {
        entity: ENTITY,
        observed: item.signature(),
        accepted: UNIT_SHAPES.accepted(),
    };
    let WireValue::Struct(fields) = item else {
        return Err(mismatch());
    };
    let revision = UNIT_SHAPES.revision_of(fields).ok_or_else(mismatch)?;

    match (revision, fields.as_slice()) {
        (
            UnitLayout::Compact,
            [
                WireValue::Str(name),
                WireValue::Str(node),
                WireValue::Str(active),
                WireValue::Str(load),
            ],
        ) => Ok(Unit {
            name: name.clone(),
            node: node.clone(),
            active_state: parse_active(active)?,
            load_state: parse_load(load)?,
            sub_state: None,
            description: None,
            object_path: None,
        }),
        (
            UnitLayout::Listing,
            [
                WireValue::Str(node),
                WireValue::Str(name),
                WireValue::Str(description),
                WireValue::Str(load),
                WireValue::Str(active),
                WireValue::Str(sub),
                WireValue::Str(_following),
                WireValue::ObjectPath(path),
                WireValue::Uint32(_job_id),
                WireValue::Str(_job_type),
                WireValue::ObjectPath(_job_path),
            ],
        ) => Ok(Unit {
            name: name.clone(),
            node: node.clone(),
            active_state: parse_active(active)?,
            load_state: parse_load(load)?,
            sub_state: Some(sub.clone()),
            description: Some(description.clone()),
            object_path: Some(ObjectPath::new(path.clone())),
        }),
        _ => Err(mismatch()),
    }
}

/// Builds a unit from the systemd unit properties exported by a node.
///
/// `Id`, `ActiveState`, and `LoadState` are required; `SubState` and
/// `Description` are optional.
///
/// # Errors
///
/// Returns [`DecodeError`] when a required property is absent or any
/// property has the wrong type or an unknown value.
pub fn decode_unit_properties(node: &str, properties: &PropertyMap) -> Result<Unit, DecodeError> {
    let name = required_str(ENTITY, properties, "Id")?;
    let active = required_str(ENTITY, properties, "ActiveState")?;
    let load = required_str(ENTITY, properties, "LoadState")?;
    let sub_state = optional_str(ENTITY, properties, "SubState")?;
    let description = optional_str(ENTITY, properties, "Description")?;

    Ok(Unit {
        name: name.to_owned(),
        node: node.to_owned(),
        active_state: parse_active(active)?,
        load_state: parse_load(load)?,
        sub_state: sub_state.map(str::to_owned),
        description: description.map(str::to_owned),
        object_path: None,
    })
}

fn parse_active(text: &str) -> Result<ActiveState, DecodeError> {
    parse_enum(ENTITY, "active state", text)
}

fn parse_load(text: &str) -> Result<LoadState, DecodeError> {
    parse_enum(ENTITY, "load state", text)
}
