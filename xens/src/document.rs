use std::fmt;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};

use sxd_document::parser;
use sxd_document::Package;

use crate::element::{select, Element, IterFind};
use crate::error::{Error, Result};
use crate::factory::ElementFactory;
use crate::namespaces::Namespaces;

/// A parsed document together with its captured namespace table.
///
/// [`Document::parse`] makes two passes over the source. The first collects
/// every namespace declaration into a [`Namespaces`] table; the second
/// builds the element tree. The document is the container above the root
/// element, so the table is available before any element is inspected, and
/// a relative path evaluated from the document can address the root element
/// by name.
pub struct Document {
    package: Package,
    namespaces: Namespaces,
}

impl Document {
    /// Parse an XML document, capturing its namespace declarations.
    ///
    /// The source is read in full twice and is rewound to its start in
    /// between, which is why `Seek` is required. A source that cannot be
    /// rewound is reported as [`Error::Rewind`] before the tree pass
    /// starts. One-shot streams should be buffered and handed to
    /// [`Document::from_text`] instead.
    pub fn parse<R: Read + Seek>(mut source: R) -> Result<Document> {
        let namespaces = Namespaces::parse(BufReader::new(&mut source))?;
        source.seek(SeekFrom::Start(0)).map_err(Error::Rewind)?;
        let mut text = String::new();
        source.read_to_string(&mut text)?;
        let package = parser::parse(&text)?;
        Ok(Document {
            package,
            namespaces,
        })
    }

    /// Parse a document held in a string.
    pub fn from_text(text: &str) -> Result<Document> {
        Document::parse(Cursor::new(text))
    }

    /// The namespace table captured by the parse.
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The root element, carrying the shared table.
    pub fn root(&self) -> Element<'_> {
        let root = self
            .dom()
            .root()
            .children()
            .into_iter()
            .find_map(|child| child.element())
            .expect("a parsed document always has a root element");
        ElementFactory::new(&self.namespaces).element(root)
    }

    /// The first element matching `path`, in document order.
    ///
    /// The path is evaluated from the document container, so the root
    /// element itself is addressable by name.
    pub fn find(&self, path: &str) -> Result<Option<Element<'_>>> {
        Ok(select(self.dom().root(), &self.namespaces, path)?
            .into_iter()
            .next()
            .map(|node| ElementFactory::new(&self.namespaces).element(node)))
    }

    /// The text content of the first element matching `path`.
    pub fn findtext(&self, path: &str) -> Result<Option<String>> {
        Ok(self
            .find(path)?
            .map(|element| element.text().unwrap_or_default()))
    }

    /// Every element matching `path`, in document order.
    pub fn findall(&self, path: &str) -> Result<Vec<Element<'_>>> {
        let factory = ElementFactory::new(&self.namespaces);
        Ok(select(self.dom().root(), &self.namespaces, path)?
            .into_iter()
            .map(|node| factory.element(node))
            .collect())
    }

    /// Like [`Document::findall`], yielding matches lazily.
    pub fn iterfind(&self, path: &str) -> Result<IterFind<'_>> {
        Ok(IterFind::new(
            select(self.dom().root(), &self.namespaces, path)?,
            ElementFactory::new(&self.namespaces),
        ))
    }

    fn dom(&self) -> sxd_document::dom::Document<'_> {
        self.package.as_document()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("namespaces", &self.namespaces)
            .finish_non_exhaustive()
    }
}
