use std::io::BufRead;

use ahash::{HashMap, HashMapExt};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::PrefixDeclaration;
use quick_xml::Reader;

use crate::error::{Error, Result};

/// Prefix to namespace URI bindings declared by a document.
///
/// Built by a declaration-only scan over the input; no tree is constructed.
/// Scoping is flattened: a prefix declared more than once maps to the URI of
/// its most recent declaration, no matter where in the document the
/// declarations appear. The default namespace is recorded under the empty
/// prefix.
///
/// The table is immutable once built. Elements of one parse share a single
/// table by reference.
#[derive(Debug, Default)]
pub struct Namespaces {
    bindings: HashMap<String, String>,
}

impl Namespaces {
    /// Scan an XML document for namespace declarations.
    ///
    /// The whole input is consumed so every declaration is observed, and
    /// element nesting is validated along the way. Malformed input is an
    /// error; no partial table is returned.
    pub fn parse(source: impl BufRead) -> Result<Namespaces> {
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();
        let mut bindings = HashMap::new();
        let mut depth = 0usize;
        let mut seen_element = false;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    seen_element = true;
                    depth += 1;
                    collect_declarations(&start, &mut bindings)?;
                }
                Event::Empty(start) => {
                    seen_element = true;
                    collect_declarations(&start, &mut bindings)?;
                }
                Event::End(_) => {
                    depth = depth.checked_sub(1).ok_or(Error::UnmatchedEnd)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        if depth > 0 {
            return Err(Error::UnclosedElement);
        }
        if !seen_element {
            return Err(Error::NoElement);
        }
        Ok(Namespaces { bindings })
    }

    /// Scan a document held in a string.
    pub fn from_text(text: &str) -> Result<Namespaces> {
        Namespaces::parse(text.as_bytes())
    }

    /// The URI a prefix is bound to. The empty prefix holds the default
    /// namespace declaration, if any.
    pub fn by_prefix(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// The default namespace URI, when the document declares a non-empty
    /// one. An `xmlns=""` undeclaration is recorded in the table but does
    /// not count as a default namespace here.
    pub fn default_uri(&self) -> Option<&str> {
        self.by_prefix("").filter(|uri| !uri.is_empty())
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.bindings.contains_key(prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn collect_declarations(
    start: &BytesStart,
    bindings: &mut HashMap<String, String>,
) -> Result<()> {
    for attribute in start.attributes() {
        let attribute = attribute?;
        let declaration = match attribute.key.as_namespace_binding() {
            Some(declaration) => declaration,
            None => continue,
        };
        let prefix = match declaration {
            PrefixDeclaration::Default => "",
            PrefixDeclaration::Named(name) => std::str::from_utf8(name)?,
        };
        let uri = unescape(std::str::from_utf8(attribute.value.as_ref())?)?;
        bindings.insert(prefix.to_string(), uri.into_owned());
    }
    Ok(())
}
