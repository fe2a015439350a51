use sxd_document::dom;

use crate::element::Element;
use crate::namespaces::Namespaces;

/// Constructs the namespace-aware elements a parsed document hands out.
///
/// Every element surfaced for one document goes through the same factory, so
/// all of them carry a reference to the same namespace table.
#[derive(Debug, Clone, Copy)]
pub struct ElementFactory<'d> {
    namespaces: &'d Namespaces,
}

impl<'d> ElementFactory<'d> {
    pub fn new(namespaces: &'d Namespaces) -> ElementFactory<'d> {
        ElementFactory { namespaces }
    }

    /// Wrap an engine element, attaching the shared namespace table.
    pub fn element(&self, node: dom::Element<'d>) -> Element<'d> {
        Element::attached(node, self.namespaces)
    }
}
