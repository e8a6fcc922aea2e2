//! Render configuration
//!
//! Everything that changes the shape of the output text lives here; the tree
//! itself never stores pre-rendered SQL. Configurations can be loaded from
//! JSON, e.g.
//!
//! ```json
//! { "indent": "  ", "identifierDelimiter": "\"", "keywordCase": "upper" }
//! ```
//!
//! Omitted options keep their default. The alias allocator and placeholder
//! marker are runtime-only and cannot be set from JSON.

use super::alias::{AliasAllocator, LetterAllocator};
use super::params::{NumberedMarker, PlaceholderMarker, QuestionMarker};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Case conversion for identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    Upper,
    Lower,
    #[default]
    Unchanged,
}

impl IdentifierCase {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Upper => s.to_uppercase(),
            Self::Lower => s.to_lowercase(),
            Self::Unchanged => s.to_string(),
        }
    }
}

/// Case conversion for keywords, function names and type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    Upper,
    #[default]
    Lower,
}

impl KeywordCase {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Upper => s.to_uppercase(),
            Self::Lower => s.to_lowercase(),
        }
    }
}

/// Produces a fresh alias allocator for each render
#[derive(Clone)]
pub struct AllocatorFactory(Arc<dyn Fn() -> Box<dyn AliasAllocator> + Send + Sync>);

impl AllocatorFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> Box<dyn AliasAllocator> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn create(&self) -> Box<dyn AliasAllocator> {
        (self.0)()
    }
}

impl Default for AllocatorFactory {
    fn default() -> Self {
        Self::new(|| Box::new(LetterAllocator::new()))
    }
}

impl std::fmt::Debug for AllocatorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AllocatorFactory")
    }
}

/// Shared placeholder marker builder
#[derive(Clone)]
pub struct Marker(Arc<dyn PlaceholderMarker>);

impl Marker {
    pub fn new(marker: impl PlaceholderMarker + 'static) -> Self {
        Self(Arc::new(marker))
    }
}

impl std::ops::Deref for Marker {
    type Target = dyn PlaceholderMarker;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(QuestionMarker)
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Marker")
    }
}

/// Options controlling SQL text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Indentation unit; empty renders everything on one line
    pub indent: String,
    /// Line separator used when `indent` is set
    pub newline: String,
    /// Quote string wrapped around identifiers; empty leaves them bare
    pub identifier_delimiter: String,
    pub identifier_case: IdentifierCase,
    pub keyword_case: KeywordCase,
    /// `{d '…'}` / `{ts '…'}` / `{escape '…'}` instead of bare literals
    pub use_escape_notation: bool,
    /// Render a clause's top-level AND/OR list without parentheses
    pub strip_parentheses: bool,
    #[serde(skip)]
    pub allocator: AllocatorFactory,
    #[serde(skip)]
    pub marker: Marker,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: String::new(),
            newline: "\n".to_string(),
            identifier_delimiter: String::new(),
            identifier_case: IdentifierCase::Unchanged,
            keyword_case: KeywordCase::Lower,
            use_escape_notation: false,
            strip_parentheses: false,
            allocator: AllocatorFactory::default(),
            marker: Marker::default(),
        }
    }
}

impl RenderConfig {
    /// Double-quoted identifiers and `$n` markers
    pub fn postgres() -> Self {
        Self {
            identifier_delimiter: "\"".to_string(),
            marker: Marker::new(NumberedMarker),
            ..Self::default()
        }
    }

    /// One clause per line, four-space indentation
    pub fn pretty() -> Self {
        Self {
            indent: "    ".to_string(),
            ..Self::default()
        }
    }

    /// Load options from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_identifier_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.identifier_delimiter = delimiter.into();
        self
    }

    pub fn with_identifier_case(mut self, case: IdentifierCase) -> Self {
        self.identifier_case = case;
        self
    }

    pub fn with_keyword_case(mut self, case: KeywordCase) -> Self {
        self.keyword_case = case;
        self
    }

    pub fn with_escape_notation(mut self, enabled: bool) -> Self {
        self.use_escape_notation = enabled;
        self
    }

    pub fn with_strip_parentheses(mut self, enabled: bool) -> Self {
        self.strip_parentheses = enabled;
        self
    }

    pub fn with_marker(mut self, marker: impl PlaceholderMarker + 'static) -> Self {
        self.marker = Marker::new(marker);
        self
    }

    pub fn with_allocator<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn AliasAllocator> + Send + Sync + 'static,
    {
        self.allocator = AllocatorFactory::new(factory);
        self
    }

    /// Whether output is broken over lines
    pub fn is_pretty(&self) -> bool {
        !self.indent.is_empty()
    }
}
