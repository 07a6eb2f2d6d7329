use crate::model::{Job, ObjectPath, UnitFileChange, UnitFileChanges};
use crate::wire::{WireKind, WireValue};

use super::shape::{EntityShapes, Shape};
use super::{DecodeError, single_array};

const CHANGE_ENTITY: &str = "unit file change";

static CHANGE_SHAPES: EntityShapes<()> = EntityShapes::new(
    CHANGE_ENTITY,
    &[Shape::new(
        (),
        &[WireKind::Str, WireKind::Str, WireKind::Str],
    )],
);

/// Decodes the job path returned by unit lifecycle calls.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] unless the body is a single `o`.
pub fn decode_job(values: &[WireValue]) -> Result<Job, DecodeError> {
    match values {
        [WireValue::ObjectPath(path)] => Ok(Job {
            object_path: ObjectPath::new(path.clone()),
        }),
        other => Err(DecodeError::body_mismatch("job", other, "o")),
    }
}

/// Decodes a reply that must carry no values.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] when the body is not empty.
pub fn decode_empty(values: &[WireValue]) -> Result<(), DecodeError> {
    if values.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::body_mismatch("empty reply", values, "()"))
    }
}

/// Decodes the `a(sss)` reply of `DisableUnitFiles`.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] when the body or any change tuple
/// has another shape.
pub fn decode_unit_file_changes(values: &[WireValue]) -> Result<UnitFileChanges, DecodeError> {
    let items = single_array(CHANGE_ENTITY, values, || CHANGE_SHAPES.accepted_arrays())?;
    Ok(UnitFileChanges {
        carries_install_info: None,
        changes: decode_changes(items)?,
    })
}

/// Decodes the `(b a(sss))` reply of `EnableUnitFiles`.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] when the body or any change tuple
/// has another shape.
pub fn decode_enable_reply(values: &[WireValue]) -> Result<UnitFileChanges, DecodeError> {
    match values {
        [WireValue::Bool(carries_install_info), WireValue::Array(items)] => Ok(UnitFileChanges {
            carries_install_info: Some(*carries_install_info),
            changes: decode_changes(items)?,
        }),
        other => Err(DecodeError::body_mismatch(
            "enable reply",
            other,
            format!("b{}", CHANGE_SHAPES.accepted_arrays()),
        )),
    }
}

fn decode_changes(items: &[WireValue]) -> Result<Vec<UnitFileChange>, DecodeError> {
    items
        .iter()
        .map(|item| match item {
            WireValue::Struct(fields) if CHANGE_SHAPES.revision_of(fields).is_some() => {
                match fields.as_slice() {
                    [
                        WireValue::Str(kind),
                        WireValue::Str(file),
                        WireValue::Str(destination),
                    ] => Ok(UnitFileChange {
                        kind: kind.clone(),
                        file: file.clone(),
                        destination: destination.clone(),
                    }),
                    _ => Err(change_mismatch(item)),
                }
            }
            other => Err(change_mismatch(other)),
        })
        .collect()
}

fn change_mismatch(item: &WireValue) -> DecodeError {
    DecodeError::ShapeMismatch {
        entity: CHANGE_ENTITY,
        observed: item.signature(),
        accepted: CHANGE_SHAPES.accepted(),
    }
}
