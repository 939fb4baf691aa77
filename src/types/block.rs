//! Intermediate structural blocks produced by format adapters.

/// An immutable span of source text with a structural label.
///
/// Adapters produce blocks in document order; the assembler consumes each
/// block exactly once when packing chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The block text, verbatim from the (cleaned) source
    pub text: String,

    /// Structural label ("class", "function", "heading-2", "page", "other", ...)
    pub kind: String,

    /// Ancestor headings that apply to this block, outermost first
    pub hierarchy: Vec<String>,

    /// Own heading line, for section blocks
    pub heading: Option<String>,

    /// 1-based line where the block starts in its source text
    pub start_line: usize,

    /// Page the block came from
    pub page: Option<usize>,

    /// Whether the assembler must close the running chunk before this block
    pub starts_group: bool,
}

impl Block {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: kind.into(),
            hierarchy: Vec::new(),
            heading: None,
            start_line: 1,
            page: None,
            starts_group: false,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.start_line = line;
        self
    }

    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: Vec<String>, heading: Option<String>) -> Self {
        self.hierarchy = hierarchy;
        self.heading = heading;
        self
    }

    /// Mark this block as the first of a group that never shares a chunk with
    /// the preceding blocks.
    pub fn starting_group(mut self) -> Self {
        self.starts_group = true;
        self
    }

    /// Size in characters.
    pub fn size(&self) -> usize {
        self.text.chars().count()
    }

    /// Last line covered by this block.
    pub fn end_line(&self) -> usize {
        self.start_line + self.text.trim_end_matches('\n').matches('\n').count()
    }

    /// A piece of this block carrying the same labels and context.
    pub(crate) fn piece(&self, text: String, start_line: usize) -> Self {
        Self {
            text,
            kind: self.kind.clone(),
            hierarchy: self.hierarchy.clone(),
            heading: self.heading.clone(),
            start_line,
            page: self.page,
            starts_group: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_line() {
        let block = Block::new("a\nb\nc\n", "other").at_line(4);
        assert_eq!(block.end_line(), 6);
        assert_eq!(Block::new("single", "other").end_line(), 1);
    }
}
