use sxd_document::dom;
use sxd_document::QName;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

use crate::error::{Error, Result};
use crate::factory::ElementFactory;
use crate::namespaces::Namespaces;
use crate::path::{self, PathBinding};

/// An element with its document's namespace table attached.
///
/// The table reference is injected at construction by [`ElementFactory`] and
/// shared by every element of one parse. The query operations hand it to the
/// path evaluator themselves, so callers never supply a prefix mapping:
/// prefixes in a path mean exactly what the document declared.
///
/// This is a wrapper around the engine's element handle, not a substitute
/// for it; [`Element::dom_element`] exposes the handle where the narrower
/// query signatures do not suffice.
#[derive(Debug, Clone, Copy)]
pub struct Element<'d> {
    node: dom::Element<'d>,
    namespaces: &'d Namespaces,
}

impl<'d> Element<'d> {
    pub(crate) fn attached(node: dom::Element<'d>, namespaces: &'d Namespaces) -> Element<'d> {
        Element { node, namespaces }
    }

    fn factory(&self) -> ElementFactory<'d> {
        ElementFactory::new(self.namespaces)
    }

    /// The first element matching `path`, in document order.
    pub fn find(&self, path: &str) -> Result<Option<Element<'d>>> {
        Ok(select(self.node, self.namespaces, path)?
            .into_iter()
            .next()
            .map(|node| self.factory().element(node)))
    }

    /// The text content of the first element matching `path`.
    ///
    /// `None` when nothing matches. A matching element without text yields
    /// an empty string, so absence and emptiness stay distinguishable.
    pub fn findtext(&self, path: &str) -> Result<Option<String>> {
        Ok(self
            .find(path)?
            .map(|element| element.text().unwrap_or_default()))
    }

    /// Every element matching `path`, in document order.
    pub fn findall(&self, path: &str) -> Result<Vec<Element<'d>>> {
        let factory = self.factory();
        Ok(select(self.node, self.namespaces, path)?
            .into_iter()
            .map(|node| factory.element(node))
            .collect())
    }

    /// Like [`Element::findall`], yielding matches lazily.
    pub fn iterfind(&self, path: &str) -> Result<IterFind<'d>> {
        Ok(IterFind::new(
            select(self.node, self.namespaces, path)?,
            self.factory(),
        ))
    }

    /// The qualified name of this element.
    pub fn name(&self) -> QName<'d> {
        self.node.name()
    }

    pub fn local_name(&self) -> &'d str {
        self.node.name().local_part()
    }

    pub fn namespace_uri(&self) -> Option<&'d str> {
        self.node.name().namespace_uri()
    }

    /// An attribute value by name, `None` when the attribute is absent.
    pub fn attribute_value<'n, N>(&self, name: N) -> Option<&'d str>
    where
        N: Into<QName<'n>>,
    {
        self.node.attribute_value(name)
    }

    pub fn attributes(&self) -> Vec<dom::Attribute<'d>> {
        self.node.attributes()
    }

    /// The element children in document order, each carrying the shared
    /// table.
    pub fn children(&self) -> Vec<Element<'d>> {
        let factory = self.factory();
        self.node
            .children()
            .into_iter()
            .filter_map(|child| child.element())
            .map(|node| factory.element(node))
            .collect()
    }

    /// The leading text content: text between this element's start tag and
    /// its first child element. `None` when there is no text there.
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in self.node.children() {
            match child {
                dom::ChildOfElement::Element(_) => break,
                dom::ChildOfElement::Text(t) => {
                    text.get_or_insert_with(String::new).push_str(t.text());
                }
                _ => {}
            }
        }
        text
    }

    /// The concatenated text of this element and all of its descendants.
    pub fn string_value(&self) -> String {
        let mut value = String::new();
        append_text(self.node, &mut value);
        value
    }

    /// The namespace table captured when this element's document was parsed.
    pub fn namespaces(&self) -> &'d Namespaces {
        self.namespaces
    }

    /// The underlying engine element.
    pub fn dom_element(&self) -> dom::Element<'d> {
        self.node
    }
}

// The attached table does not participate in element identity.
impl<'d> PartialEq for Element<'d> {
    fn eq(&self, other: &Element<'d>) -> bool {
        self.node == other.node
    }
}

impl<'d> Eq for Element<'d> {}

fn append_text(node: dom::Element<'_>, value: &mut String) {
    for child in node.children() {
        match child {
            dom::ChildOfElement::Element(element) => append_text(element, value),
            dom::ChildOfElement::Text(t) => value.push_str(t.text()),
            _ => {}
        }
    }
}

/// Iterator over the elements matching a path, in document order.
///
/// Matches are computed when the iterator is created; a fresh call to
/// `iterfind` re-evaluates the path from scratch.
#[derive(Debug)]
pub struct IterFind<'d> {
    nodes: std::vec::IntoIter<dom::Element<'d>>,
    factory: ElementFactory<'d>,
}

impl<'d> IterFind<'d> {
    pub(crate) fn new(nodes: Vec<dom::Element<'d>>, factory: ElementFactory<'d>) -> IterFind<'d> {
        IterFind {
            nodes: nodes.into_iter(),
            factory,
        }
    }
}

impl<'d> Iterator for IterFind<'d> {
    type Item = Element<'d>;

    fn next(&mut self) -> Option<Element<'d>> {
        self.nodes.next().map(|node| self.factory.element(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

/// Evaluate a path against a context node with the table's bindings in
/// scope, returning the matching elements in document order.
///
/// A path using a prefix the table does not bind matches nothing. A path
/// that evaluates to a plain value instead of a node set is an error.
pub(crate) fn select<'d, N>(
    node: N,
    namespaces: &Namespaces,
    path: &str,
) -> Result<Vec<dom::Element<'d>>>
where
    N: Into<Node<'d>>,
{
    let (path, bindings) = match path::bind(path, namespaces) {
        PathBinding::Unmapped => return Ok(Vec::new()),
        PathBinding::Bound { path, bindings } => (path, bindings),
    };

    let xpath = Factory::new()
        .build(&path)
        .map_err(|e| Error::Query(e.into()))?
        .ok_or(Error::Query(sxd_xpath::Error::NoXPath))?;

    let mut context = Context::new();
    for (prefix, uri) in &bindings {
        context.set_namespace(prefix, uri);
    }

    let nodes = match xpath
        .evaluate(&context, node)
        .map_err(|e| Error::Query(e.into()))?
    {
        Value::Nodeset(nodes) => nodes,
        Value::Boolean(_) => return Err(Error::NotANodeset("boolean")),
        Value::Number(_) => return Err(Error::NotANodeset("number")),
        Value::String(_) => return Err(Error::NotANodeset("string")),
    };

    Ok(nodes
        .document_order()
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
        .collect())
}
