//! Language detection and per-language rule tables.

pub mod language;

pub use language::{ImportGroup, Language, LanguageRules, LINE_SEPARATORS};
