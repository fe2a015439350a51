use std::io;

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The declaration scan could not tokenize the input as XML.
    #[error("malformed XML: {0}")]
    Scan(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("malformed attribute value: {0}")]
    Escape(#[from] EscapeError),
    #[error("input is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("end tag without a matching start tag")]
    UnmatchedEnd,
    #[error("input ended with unclosed elements")]
    UnclosedElement,
    #[error("no element found in input")]
    NoElement,
    /// The source could not be repositioned to its start for the tree pass.
    #[error("source cannot be rewound for the tree pass: {0}")]
    Rewind(#[source] io::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The tree pass rejected the input.
    #[error("malformed document: {0}")]
    Parse(#[from] sxd_document::parser::Error),
    #[error("query failed: {0}")]
    Query(#[from] sxd_xpath::Error),
    /// The path evaluated to a value rather than to elements.
    #[error("path evaluates to a {0}, not to elements")]
    NotANodeset(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
