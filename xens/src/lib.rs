mod document;
mod element;
mod error;
mod factory;
mod namespaces;
mod path;

pub use document::Document;
pub use element::{Element, IterFind};
pub use error::{Error, Result};
pub use factory::ElementFactory;
pub use namespaces::Namespaces;

pub use sxd_document::{dom, QName};
