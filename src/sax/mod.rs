//! SAX (Simple API for XML) Module
//!
//! The event contract the digester is driven by.
//!
//! ## Architecture
//!
//! ```text
//! Tokenizer ---> ContentHandler ---> Digester (rule dispatch)
//!                      |
//!                      +-----------> EventCollector (record / replay)
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - Element opening tag with name and attributes
//! - `Characters` - Character data, text and CDATA alike
//! - `EndElement` - Element closing tag
//! - `EndDocument` - Input exhausted with all elements closed
//!
//! Comments, processing instructions and the DOCTYPE never reach a handler.

pub mod collector;
pub mod events;
pub mod handler;

pub use collector::{parse_sax, EventCollector};
pub use events::{Attribute, Attributes, QName, SaxEvent};
pub use handler::{replay, ContentHandler};
