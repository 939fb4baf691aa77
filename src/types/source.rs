//! Source documents and strategy selectors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChunkerError;

/// The kind of document being chunked.
///
/// This determines which chunking strategy the router picks by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Source code with a declared language
    Code,
    /// Markdown / wiki text
    Markdown,
    /// Text extracted from a PDF, page by page
    Pdf,
    /// Anything else
    #[default]
    Text,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Code => write!(f, "code"),
            SourceKind::Markdown => write!(f, "markdown"),
            SourceKind::Pdf => write!(f, "pdf"),
            SourceKind::Text => write!(f, "text"),
        }
    }
}

/// The closed set of chunking strategies, one per format adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Code,
    Markdown,
    Pdf,
    Generic,
}

impl Strategy {
    /// All strategies, in a stable order.
    pub const ALL: [Strategy; 4] = [Strategy::Code, Strategy::Markdown, Strategy::Pdf, Strategy::Generic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Code => "code",
            Strategy::Markdown => "markdown",
            Strategy::Pdf => "pdf",
            Strategy::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code" | "source" => Ok(Strategy::Code),
            "markdown" | "md" | "document" => Ok(Strategy::Markdown),
            "pdf" | "page" | "pages" => Ok(Strategy::Pdf),
            "generic" | "recursive" | "custom" | "text" => Ok(Strategy::Generic),
            _ => Err(ChunkerError::UnknownStrategy {
                adapter: "router",
                name: s.to_string(),
            }),
        }
    }
}

/// One page of text handed over by the extraction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfPage {
    /// 1-based page number
    pub page_number: usize,
    /// Extracted text of the page
    pub text: String,
}

impl PdfPage {
    pub fn new(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// Document-level PDF metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
}

/// A document to be chunked.
///
/// This is the input unit received from the extraction service: plain text,
/// plus per-page text for PDFs and a language tag for code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Kind of document
    #[serde(default)]
    pub kind: SourceKind,

    /// Full extracted text
    #[serde(default)]
    pub content: String,

    /// Declared language for code (e.g. "python")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Source file path, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Per-page text for PDFs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PdfPage>,

    /// PDF document metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<PdfInfo>,
}

impl SourceDocument {
    /// A plain text document.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Text,
            content: content.into(),
            ..Default::default()
        }
    }

    /// A source file in the given language.
    pub fn code(content: impl Into<String>, language: &str) -> Self {
        Self {
            kind: SourceKind::Code,
            content: content.into(),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    /// A markdown document.
    pub fn markdown(content: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Markdown,
            content: content.into(),
            ..Default::default()
        }
    }

    /// A PDF given as extracted pages; `content` is the pages joined by form feeds.
    pub fn pdf(pages: Vec<PdfPage>, info: Option<PdfInfo>) -> Self {
        let content = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\x0c");
        Self {
            kind: SourceKind::Pdf,
            content,
            pages,
            info,
            ..Default::default()
        }
    }

    /// Attach a source path.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Get content length in characters.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Check whether there is anything to chunk.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_aliases() {
        assert_eq!("Recursive".parse::<Strategy>().unwrap(), Strategy::Generic);
        assert_eq!("document".parse::<Strategy>().unwrap(), Strategy::Markdown);
        assert!(matches!("semantic".parse::<Strategy>(), Err(ChunkerError::UnknownStrategy { .. })));
    }

    #[test]
    fn test_pdf_content_joins_pages() {
        let doc = SourceDocument::pdf(vec![PdfPage::new(1, "one"), PdfPage::new(2, "two")], None);
        assert_eq!(doc.content, "one\x0ctwo");
        assert_eq!(doc.kind, SourceKind::Pdf);
    }
}
