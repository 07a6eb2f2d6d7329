use crate::wire::{WireKind, WireValue};

/// One accepted positional layout, tagged with a revision label.
#[derive(Debug, Clone, Copy)]
pub struct Shape<R: 'static> {
    revision: R,
    layout: &'static [WireKind],
}

impl<R: Copy + 'static> Shape<R> {
    /// Declares a layout for `revision`.
    #[must_use]
    pub const fn new(revision: R, layout: &'static [WireKind]) -> Self {
        Self { revision, layout }
    }

    /// Revision label of the layout.
    #[must_use]
    pub const fn revision(&self) -> R {
        self.revision
    }

    /// Whether `fields` has exactly this arity and these kinds.
    #[must_use]
    pub fn matches(&self, fields: &[WireValue]) -> bool {
        fields.len() == self.layout.len()
            && fields
                .iter()
                .zip(self.layout)
                .all(|(field, kind)| field.kind() == *kind)
    }
}

/// Every layout accepted for one entity.
#[derive(Debug, Clone, Copy)]
pub struct EntityShapes<R: 'static> {
    entity: &'static str,
    shapes: &'static [Shape<R>],
}

impl<R: Copy + 'static> EntityShapes<R> {
    /// Declares the accepted layouts for `entity`.
    #[must_use]
    pub const fn new(entity: &'static str, shapes: &'static [Shape<R>]) -> Self {
        Self { entity, shapes }
    }

    /// Entity name used in diagnostics.
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    /// Accepted layouts in declaration order.
    #[must_use]
    pub const fn shapes(&self) -> &'static [Shape<R>] {
        self.shapes
    }

    /// Revision of the first layout matching `fields` exactly.
    #[must_use]
    pub fn revision_of(&self, fields: &[WireValue]) -> Option<R> {
        self.shapes
            .iter()
            .find(|shape| shape.matches(fields))
            .map(Shape::revision)
    }

    /// Accepted layouts rendered for diagnostics, e.g. `(ss) | (sos)`.
    #[must_use]
    pub fn accepted(&self) -> String {
        self.shapes
            .iter()
            .map(|shape| WireKind::layout_signature(shape.layout))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Accepted layouts rendered as array element types, e.g. `a(ss) | a(sos)`.
    #[must_use]
    pub fn accepted_arrays(&self) -> String {
        self.shapes
            .iter()
            .map(|shape| format!("a{}", WireKind::layout_signature(shape.layout)))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
