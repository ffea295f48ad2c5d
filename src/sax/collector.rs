//! SAX Collector
//!
//! Implements ContentHandler by recording every event, for inspection or
//! later replay into another handler.

use super::events::{Attributes, QName, SaxEvent};
use super::handler::ContentHandler;
use crate::core::tokenizer::Tokenizer;
use crate::error::TokenizerError;

/// Collector that records events in arrival order
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SaxEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }
}

impl ContentHandler for EventCollector {
    type Error = TokenizerError;

    fn start_element(&mut self, name: QName, attributes: Attributes) -> Result<(), Self::Error> {
        self.events.push(SaxEvent::StartElement { name, attributes });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Self::Error> {
        self.events.push(SaxEvent::Characters(text.to_string()));
        Ok(())
    }

    fn end_element(&mut self, name: QName) -> Result<(), Self::Error> {
        self.events.push(SaxEvent::EndElement { name });
        Ok(())
    }

    fn end_document(&mut self) -> Result<(), Self::Error> {
        self.events.push(SaxEvent::EndDocument);
        Ok(())
    }

    fn fatal_error(&mut self, error: TokenizerError) -> Self::Error {
        error
    }
}

/// Tokenize input and return its events
pub fn parse_sax(input: &[u8]) -> Result<Vec<SaxEvent>, TokenizerError> {
    let mut collector = EventCollector::new();
    Tokenizer::new(input).scan(&mut collector)?;
    Ok(collector.take_events())
}
