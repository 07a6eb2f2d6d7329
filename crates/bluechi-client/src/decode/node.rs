use crate::model::{Node, NodeStatus, ObjectPath, PropertyMap};
use crate::wire::{WireKind, WireValue};

use super::shape::{EntityShapes, Shape};
use super::{DecodeError, parse_enum, single_array};

const ENTITY: &str = "node";

/// Node tuple revisions understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLayout {
    /// `(name, status)`.
    Compact,
    /// `(name, object path, status)`.
    Addressed,
    /// `(name, object path, status, peer address)`.
    Peered,
}

static NODE_SHAPES: EntityShapes<NodeLayout> = EntityShapes::new(
    ENTITY,
    &[
        Shape::new(NodeLayout::Compact, &[WireKind::Str, WireKind::Str]),
        Shape::new(
            NodeLayout::Addressed,
            &[WireKind::Str, WireKind::ObjectPath, WireKind::Str],
        ),
        Shape::new(
            NodeLayout::Peered,
            &[
                WireKind::Str,
                WireKind::ObjectPath,
                WireKind::Str,
                WireKind::Str,
            ],
        ),
    ],
);

/// Layouts accepted for node tuples.
#[must_use]
pub fn node_shapes() -> &'static EntityShapes<NodeLayout> {
    &NODE_SHAPES
}

/// Decodes a `ListNodes` reply, preserving the manager's order.
///
/// # Errors
///
/// Returns [`DecodeError`] when the body is not a single array or any tuple
/// matches no node layout.
pub fn decode_nodes(values: &[WireValue]) -> Result<Vec<Node>, DecodeError> {
    let items = single_array(ENTITY, values, || NODE_SHAPES.accepted_arrays())?;
    items.iter().map(decode_node_tuple).collect()
}

fn decode_node_tuple(item: &WireValue) -> Result<Node, DecodeError> {
    let mismatch = || DecodeError::ShapeMismatch {
        entity: ENTITY,
        observed: item.signature(),
        accepted: NODE_SHAPES.accepted(),
    };
    let WireValue::Struct(fields) = item else {
        return Err(mismatch());
    };
    let revision = NODE_SHAPES.revision_of(fields).ok_or_else(mismatch)?;

    match (revision, fields.as_slice()) {
        (NodeLayout::Compact, [WireValue::Str(name), WireValue::Str(status)]) => {
            Ok(Node::new(name.clone(), parse_status(status)?))
        }
        (
            NodeLayout::Addressed,
            [
                WireValue::Str(name),
                WireValue::ObjectPath(path),
                WireValue::Str(status),
            ],
        ) => Ok(Node {
            name: name.clone(),
            status: parse_status(status)?,
            object_path: Some(ObjectPath::new(path.clone())),
            peer_address: None,
        }),
        (
            NodeLayout::Peered,
            [
                WireValue::Str(name),
                WireValue::ObjectPath(path),
                WireValue::Str(status),
                WireValue::Str(peer),
            ],
        ) => Ok(Node {
            name: name.clone(),
            status: parse_status(status)?,
            object_path: Some(ObjectPath::new(path.clone())),
            peer_address: non_empty(peer),
        }),
        _ => Err(mismatch()),
    }
}

/// Decodes a `GetNode` reply into the node's object path.
///
/// # Errors
///
/// Returns [`DecodeError::ShapeMismatch`] unless the body is a single `o`.
pub fn decode_object_path(values: &[WireValue]) -> Result<ObjectPath, DecodeError> {
    match values {
        [WireValue::ObjectPath(path)] => Ok(ObjectPath::new(path.clone())),
        other => Err(DecodeError::body_mismatch("node object path", other, "o")),
    }
}

/// Builds a node from its exported properties.
///
/// `Status` is required. `Name` falls back to the name the caller looked up,
/// and `PeerIp` is optional.
///
/// # Errors
///
/// Returns [`DecodeError`] when `Status` is absent or any property has the
/// wrong type or an unknown value.
pub fn decode_node_properties(
    requested_name: &str,
    object_path: ObjectPath,
    properties: &PropertyMap,
) -> Result<Node, DecodeError> {
    let status = super::property::required_str(ENTITY, properties, "Status")?;
    let name = super::property::optional_str(ENTITY, properties, "Name")?
        .unwrap_or(requested_name);
    let peer = super::property::optional_str(ENTITY, properties, "PeerIp")?;

    Ok(Node {
        name: name.to_owned(),
        status: parse_status(status)?,
        object_path: Some(object_path),
        peer_address: peer.and_then(non_empty),
    })
}

fn parse_status(text: &str) -> Result<NodeStatus, DecodeError> {
    parse_enum(ENTITY, "status", text)
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_owned())
    }
}
