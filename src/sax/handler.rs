//! Content Handler
//!
//! The inbound contract between a tokenizer and whatever consumes its
//! events. Calls arrive in well-formed nesting order: every
//! `start_element` is paired with exactly one `end_element` at the same
//! depth unless a call fails, in which case the tokenizer stops and returns
//! that failure.

use super::events::{Attributes, QName, SaxEvent};
use crate::error::TokenizerError;

/// Receiver of structural parsing events
pub trait ContentHandler {
    type Error;

    fn start_element(&mut self, name: QName, attributes: Attributes) -> Result<(), Self::Error>;

    /// Character data; a run of text may arrive in several fragments
    fn characters(&mut self, text: &str) -> Result<(), Self::Error>;

    fn end_element(&mut self, name: QName) -> Result<(), Self::Error>;

    fn end_document(&mut self) -> Result<(), Self::Error>;

    /// Convert a tokenizer failure into the handler's error
    ///
    /// The tokenizer returns the result as its own failure and stops.
    fn fatal_error(&mut self, error: TokenizerError) -> Self::Error;
}

/// Feed recorded events to a handler, stopping at the first failure
pub fn replay<H: ContentHandler>(
    events: impl IntoIterator<Item = SaxEvent>,
    handler: &mut H,
) -> Result<(), H::Error> {
    for event in events {
        match event {
            SaxEvent::StartElement { name, attributes } => handler.start_element(name, attributes)?,
            SaxEvent::Characters(text) => handler.characters(&text)?,
            SaxEvent::EndElement { name } => handler.end_element(name)?,
            SaxEvent::EndDocument => handler.end_document()?,
        }
    }
    Ok(())
}
