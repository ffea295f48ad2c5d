//! XML Tokenizer
//!
//! Push tokenizer over a UTF-8 byte slice. It drives a [`ContentHandler`]
//! with structural events, checks that elements nest properly and resolves
//! namespace prefixes. Comments, processing instructions, the XML
//! declaration and the DOCTYPE are consumed without producing events.

use super::entities::decode_text;
use super::namespace::NamespaceScope;
use super::scanner::{is_name_start_char, Scanner};
use crate::error::TokenizerError;
use crate::sax::{Attribute, Attributes, ContentHandler, QName};
use std::borrow::Cow;

/// Why scanning stopped early
enum Stop<E> {
    Handler(E),
    Malformed(TokenizerError),
}

type Step<T, E> = Result<T, Stop<E>>;

fn malformed<E>(message: impl Into<String>, position: usize) -> Stop<E> {
    Stop::Malformed(TokenizerError::new(message, position))
}

/// XML tokenizer feeding a content handler
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    /// Byte offset of the first invalid UTF-8 sequence, if any
    utf8_error: Option<usize>,
    /// Qualified names of the currently open elements
    open: Vec<String>,
    namespaces: NamespaceScope,
    namespace_aware: bool,
    seen_root: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a namespace-aware tokenizer
    pub fn new(input: &'a [u8]) -> Self {
        let (text, utf8_error) = match std::str::from_utf8(input) {
            Ok(text) => (text, None),
            Err(e) => (
                std::str::from_utf8(&input[..e.valid_up_to()]).unwrap_or(""),
                Some(e.valid_up_to()),
            ),
        };
        Tokenizer {
            scanner: Scanner::new(text),
            utf8_error,
            open: Vec::with_capacity(16),
            namespaces: NamespaceScope::new(),
            namespace_aware: true,
            seen_root: false,
        }
    }

    /// Turn prefix resolution on or off
    ///
    /// When off, names are reported as written and `xmlns` attributes are
    /// passed through as ordinary attributes.
    pub fn namespace_aware(mut self, enabled: bool) -> Self {
        self.namespace_aware = enabled;
        self
    }

    /// Scan the whole document, calling handler methods for each event
    ///
    /// Stops at the first handler failure and returns it unchanged.
    /// Malformed input is handed to [`ContentHandler::fatal_error`] and the
    /// handler's error is returned.
    pub fn scan<H: ContentHandler>(&mut self, handler: &mut H) -> Result<(), H::Error> {
        match self.scan_document(handler) {
            Ok(()) => Ok(()),
            Err(Stop::Handler(e)) => Err(e),
            Err(Stop::Malformed(err)) => Err(handler.fatal_error(err)),
        }
    }

    fn scan_document<H: ContentHandler>(&mut self, handler: &mut H) -> Step<(), H::Error> {
        if let Some(position) = self.utf8_error {
            return Err(malformed("Invalid UTF-8", position));
        }
        self.scanner.eat("\u{FEFF}");

        while let Some(c) = self.scanner.peek() {
            if c == b'<' {
                self.scan_markup(handler)?;
            } else {
                self.scan_text(handler)?;
            }
        }

        if let Some(name) = self.open.last() {
            return Err(malformed(format!("Unclosed element <{name}>"), self.scanner.len()));
        }
        if !self.seen_root {
            return Err(malformed("No root element", self.scanner.len()));
        }
        handler.end_document().map_err(Stop::Handler)
    }

    fn scan_text<H: ContentHandler>(&mut self, handler: &mut H) -> Step<(), H::Error> {
        let start = self.scanner.position();
        let end = self.scanner.find(b'<').unwrap_or(self.scanner.len());
        self.scanner.seek(end);
        let raw = self.scanner.slice(start, end);

        if self.open.is_empty() {
            if raw.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
                return Ok(());
            }
            return Err(malformed("Text outside the root element", start));
        }

        let decoded = decode_text(raw).map_err(|(msg, offset)| malformed(msg, start + offset))?;
        handler.characters(&decoded).map_err(Stop::Handler)
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ContentHandler>(&mut self, handler: &mut H) -> Step<(), H::Error> {
        let start = self.scanner.position();

        match self.scanner.peek_at(1) {
            Some(b'/') => {
                self.scanner.bump(2);
                self.scan_end_tag(handler, start)
            }
            Some(b'!') => {
                if self.scanner.eat("<!--") {
                    self.skip_past("-->", start, "Unterminated comment")
                } else if self.scanner.at("<![CDATA[") {
                    self.scan_cdata(handler)
                } else if self.scanner.at("<!DOCTYPE") {
                    self.skip_doctype()
                } else {
                    Err(malformed("Invalid markup declaration", start))
                }
            }
            Some(b'?') => {
                self.scanner.bump(2);
                self.skip_past("?>", start, "Unterminated processing instruction")
            }
            Some(c) if is_name_start_char(c) => {
                self.scanner.bump(1);
                self.scan_start_tag(handler, start)
            }
            _ => Err(malformed("Invalid markup", start)),
        }
    }

    /// Skip everything up to and including `needle`
    fn skip_past<E>(&mut self, needle: &str, start: usize, message: &'static str) -> Step<(), E> {
        let end = self
            .scanner
            .find_str(needle)
            .ok_or_else(|| malformed(message, start))?;
        self.scanner.seek(end + needle.len());
        Ok(())
    }

    fn scan_cdata<H: ContentHandler>(&mut self, handler: &mut H) -> Step<(), H::Error> {
        let start = self.scanner.position();
        if self.open.is_empty() {
            return Err(malformed("CDATA section outside the root element", start));
        }

        self.scanner.bump("<![CDATA[".len());
        let content_start = self.scanner.position();
        let content_end = self
            .scanner
            .find_str("]]>")
            .ok_or_else(|| malformed("Unterminated CDATA section", start))?;
        self.scanner.seek(content_end + 3);

        let content = self.scanner.slice(content_start, content_end);
        if content.is_empty() {
            return Ok(());
        }
        handler.characters(content).map_err(Stop::Handler)
    }

    /// Skip DOCTYPE, handling an internal subset
    fn skip_doctype<E>(&mut self) -> Step<(), E> {
        let start = self.scanner.position();
        if self.seen_root {
            return Err(malformed("DOCTYPE after the root element", start));
        }

        self.scanner.bump("<!DOCTYPE".len());
        let mut depth = 0usize;
        while let Some(c) = self.scanner.peek() {
            self.scanner.bump(1);
            match c {
                b'[' => depth += 1,
                b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(malformed("Unterminated DOCTYPE", start))
    }

    fn scan_start_tag<H: ContentHandler>(&mut self, handler: &mut H, start: usize) -> Step<(), H::Error> {
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| malformed("Invalid element name", start + 1))?;

        let mut attributes = Attributes::new();
        let is_empty = loop {
            let whitespace = self.scanner.skip_whitespace();
            let pos = self.scanner.position();
            match self.scanner.peek() {
                Some(b'>') => {
                    self.scanner.bump(1);
                    break false;
                }
                Some(b'/') => {
                    if !self.scanner.eat("/>") {
                        return Err(malformed("Expected '>' after '/'", pos));
                    }
                    break true;
                }
                Some(c) if is_name_start_char(c) => {
                    if whitespace == 0 {
                        return Err(malformed("Missing whitespace before attribute", pos));
                    }
                    let attribute = self.scan_attribute()?;
                    if attributes.get(attribute.name.as_str()).is_some() {
                        return Err(malformed(
                            format!("Duplicate attribute `{}`", attribute.name),
                            pos,
                        ));
                    }
                    attributes.push(attribute);
                }
                Some(_) => return Err(malformed("Unexpected character in start tag", pos)),
                None => return Err(malformed("Unterminated start tag", start)),
            }
        };

        if self.open.is_empty() && self.seen_root {
            return Err(malformed("Multiple root elements", start));
        }
        self.seen_root = true;

        let qname = self.qualify_start(name, &mut attributes, start)?;
        self.open.push(name.to_string());

        if is_empty {
            handler
                .start_element(qname.clone(), attributes)
                .map_err(Stop::Handler)?;
            self.close_element(handler, qname)
        } else {
            handler.start_element(qname, attributes).map_err(Stop::Handler)
        }
    }

    /// Scan `name="value"`, decoding the value
    fn scan_attribute<E>(&mut self) -> Step<Attribute, E> {
        let start = self.scanner.position();
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| malformed("Invalid attribute name", start))?;

        self.scanner.skip_whitespace();
        if !self.scanner.eat("=") {
            return Err(malformed("Attribute value required", self.scanner.position()));
        }
        self.scanner.skip_whitespace();

        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(malformed(
                    "Attribute value must be quoted",
                    self.scanner.position(),
                ))
            }
        };
        self.scanner.bump(1);

        let value_start = self.scanner.position();
        let value_end = self
            .scanner
            .find(quote)
            .ok_or_else(|| malformed("Unterminated attribute value", start))?;
        self.scanner.seek(value_end + 1);

        let raw = self.scanner.slice(value_start, value_end);
        if let Some(offset) = raw.find('<') {
            return Err(malformed("Attribute value cannot contain '<'", value_start + offset));
        }

        // Literal whitespace normalizes to spaces; character references survive
        let normalized: Cow<'_, str> = if raw.contains(['\t', '\n', '\r']) {
            Cow::Owned(raw.replace(['\t', '\n', '\r'], " "))
        } else {
            Cow::Borrowed(raw)
        };
        let value = decode_text(&normalized)
            .map_err(|(msg, offset)| malformed(msg, value_start + offset))?
            .into_owned();

        Ok(Attribute::new(name, value))
    }

    /// Open a namespace scope for a start tag and resolve its names
    fn qualify_start<E>(
        &mut self,
        name: &str,
        attributes: &mut Attributes,
        position: usize,
    ) -> Step<QName, E> {
        if !self.namespace_aware {
            return Ok(QName::new(name));
        }

        self.namespaces.push_scope();
        for attr in attributes.iter() {
            let qualified = attr.name.as_str();
            if qualified == "xmlns" {
                self.namespaces.declare("", &attr.value);
            } else if let Some(prefix) = qualified.strip_prefix("xmlns:") {
                if attr.value.is_empty() {
                    return Err(malformed(format!("Cannot undeclare prefix `{prefix}`"), position));
                }
                self.namespaces.declare(prefix, &attr.value);
            }
        }
        attributes.retain(|attr| {
            let qualified = attr.name.as_str();
            qualified != "xmlns" && !qualified.starts_with("xmlns:")
        });

        for attr in attributes.iter_mut() {
            if let Some(prefix) = attr.name.prefix() {
                let uri = self.namespaces.resolve(prefix).ok_or_else(|| {
                    malformed(format!("Undeclared namespace prefix `{prefix}`"), position)
                })?;
                let uri = uri.to_string();
                attr.name.set_namespace(Some(uri));
            }
        }

        let mut qname = QName::new(name);
        let namespace = match qname.prefix() {
            Some(prefix) => Some(self.namespaces.resolve(prefix).ok_or_else(|| {
                malformed(format!("Undeclared namespace prefix `{prefix}`"), position)
            })?),
            None => self.namespaces.resolve_default(),
        }
        .map(str::to_string);
        qname.set_namespace(namespace);
        Ok(qname)
    }

    fn scan_end_tag<H: ContentHandler>(&mut self, handler: &mut H, start: usize) -> Step<(), H::Error> {
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| malformed("Invalid end tag", start))?;
        self.scanner.skip_whitespace();
        if !self.scanner.eat(">") {
            return Err(malformed("Expected '>' in end tag", self.scanner.position()));
        }

        match self.open.last() {
            Some(open) if open == name => {}
            Some(open) => {
                return Err(malformed(
                    format!("Mismatched end tag </{name}>, expected </{open}>"),
                    start,
                ))
            }
            None => return Err(malformed(format!("Unexpected end tag </{name}>"), start)),
        }

        let mut qname = QName::new(name);
        if self.namespace_aware {
            let namespace = match qname.prefix() {
                Some(prefix) => self.namespaces.resolve(prefix),
                None => self.namespaces.resolve_default(),
            }
            .map(str::to_string);
            qname.set_namespace(namespace);
        }
        self.close_element(handler, qname)
    }

    fn close_element<H: ContentHandler>(&mut self, handler: &mut H, qname: QName) -> Step<(), H::Error> {
        self.open.pop();
        if self.namespace_aware {
            self.namespaces.pop_scope();
        }
        handler.end_element(qname).map_err(Stop::Handler)
    }
}
