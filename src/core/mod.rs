//! Core XML parsing primitives
//!
//! This module contains the building blocks the bundled tokenizer uses:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: entity decoding with Cow (zero-copy when possible)
//! - Namespace: scoped prefix resolution
//! - Tokenizer: push tokenizer driving a `ContentHandler`

pub mod entities;
pub mod namespace;
pub mod scanner;
pub mod tokenizer;

pub use tokenizer::Tokenizer;
