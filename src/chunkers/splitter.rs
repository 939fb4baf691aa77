//! Recursive boundary splitter with hierarchical separators.

use std::borrow::Cow;

/// A split point in a separator hierarchy.
///
/// Hierarchies are ordered from most to least semantic and always end in
/// [`Separator::FixedWidth`], which guarantees termination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// Split on the literal; it is dropped at segment boundaries and
    /// re-inserted between pieces that end up in the same segment.
    Literal(Cow<'static, str>),
    /// Split before the literal; it stays at the start of the following piece.
    Leading(Cow<'static, str>),
    /// Split after the literal; it stays at the end of the preceding piece.
    Trailing(Cow<'static, str>),
    /// Slice into `target_size` character windows.
    FixedWidth,
}

impl Separator {
    pub const fn literal(s: &'static str) -> Self {
        Separator::Literal(Cow::Borrowed(s))
    }

    pub const fn leading(s: &'static str) -> Self {
        Separator::Leading(Cow::Borrowed(s))
    }

    pub const fn trailing(s: &'static str) -> Self {
        Separator::Trailing(Cow::Borrowed(s))
    }

    /// Split text into pieces at this separator.
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Literal(sep) => text.split(&**sep).collect(),
            Separator::Leading(sep) => split_before(text, sep),
            Separator::Trailing(sep) => text.split_inclusive(&**sep).collect(),
            Separator::FixedWidth => vec![text],
        }
    }

    /// String placed between pieces accumulated into one segment.
    fn joiner(&self) -> &str {
        match self {
            Separator::Literal(sep) => &**sep,
            _ => "",
        }
    }
}

impl From<&str> for Separator {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Separator::FixedWidth
        } else {
            Separator::Literal(Cow::Owned(s.to_string()))
        }
    }
}

impl From<String> for Separator {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Separator::FixedWidth
        } else {
            Separator::Literal(Cow::Owned(s))
        }
    }
}

/// Recursive splitter bound to one separator hierarchy.
///
/// For each level it only proceeds to more granular splitting for pieces that
/// are still too large.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    separators: Vec<Separator>,
}

impl RecursiveSplitter {
    /// Create a splitter; a fixed-width fallback is appended when missing.
    pub fn new(separators: Vec<Separator>) -> Self {
        Self {
            separators: terminated(separators),
        }
    }

    /// Splitter over a static separator table.
    pub fn from_table(table: &[Separator]) -> Self {
        Self::new(table.to_vec())
    }

    pub fn separators(&self) -> &[Separator] {
        &self.separators
    }

    /// Split text into segments of at most `target_size` characters.
    pub fn split(&self, text: &str, target_size: usize) -> Vec<String> {
        split_text(text, &self.separators, target_size)
    }

    /// Structural pieces of `text`: cut before every leading separator, so
    /// each piece holds at most one class, function or other item.
    ///
    /// Pieces are contiguous and concatenate back to `text`.
    pub fn boundaries<'a>(&self, text: &'a str) -> Vec<&'a str> {
        split_at_boundaries(text, &self.separators)
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(vec![
            Separator::literal("\n\n"),
            Separator::literal("\n"),
            Separator::trailing(". "),
            Separator::trailing("! "),
            Separator::trailing("? "),
            Separator::trailing("; "),
            Separator::trailing(", "),
            Separator::literal(" "),
            Separator::FixedWidth,
        ])
    }
}

/// Append a fixed-width fallback unless the hierarchy already ends in one.
pub fn terminated(mut separators: Vec<Separator>) -> Vec<Separator> {
    if separators.last() != Some(&Separator::FixedWidth) {
        separators.push(Separator::FixedWidth);
    }
    separators
}

/// Recursively split `text` using the separator hierarchy.
///
/// Pieces produced by the first separator are greedily re-accumulated while
/// the running segment stays within `target_size`; a piece that alone is too
/// large is split again with the remaining, finer separators.
pub fn split_text(text: &str, separators: &[Separator], target_size: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }

    let target_size = target_size.max(1);
    if char_len(text) <= target_size {
        return vec![text.to_string()];
    }

    let (separator, finer) = match separators.split_first() {
        Some((Separator::FixedWidth, _)) | None => return split_fixed_width(text, target_size),
        Some(first) => first,
    };

    let joiner = separator.joiner();
    let joiner_len = char_len(joiner);
    let mut segments = Vec::new();
    let mut buffer: Option<(String, usize)> = None;

    for piece in separator.pieces(text) {
        let piece_len = char_len(piece);

        match buffer.as_mut() {
            Some((current, current_len)) if *current_len + joiner_len + piece_len <= target_size => {
                current.push_str(joiner);
                current.push_str(piece);
                *current_len += joiner_len + piece_len;
                continue;
            }
            None if piece_len <= target_size => {
                buffer = Some((piece.to_string(), piece_len));
                continue;
            }
            _ => {}
        }

        // Current segment is full
        if let Some((current, _)) = buffer.take() {
            if !current.is_empty() {
                segments.push(current);
            }
        }

        if piece_len > target_size {
            segments.extend(split_text(piece, finer, target_size));
        } else {
            buffer = Some((piece.to_string(), piece_len));
        }
    }

    if let Some((current, _)) = buffer {
        if !current.is_empty() {
            segments.push(current);
        }
    }

    segments
}

/// Split text into fixed windows of `size` characters (last resort).
pub fn split_fixed_width(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|window| window.iter().collect())
        .collect()
}

/// 1-based start line of each segment, given the line `text` starts on.
///
/// Segments must be substrings of `text` in order, which holds for
/// everything [`split_text`] returns.
pub fn segment_lines<S: AsRef<str>>(text: &str, segments: &[S], first_line: usize) -> Vec<usize> {
    let mut cursor = 0;
    let mut line = first_line;

    segments
        .iter()
        .map(|segment| {
            let segment = segment.as_ref();
            let Some(offset) = text[cursor..].find(segment) else {
                return line;
            };
            let start = cursor + offset;
            line += text[cursor..start].matches('\n').count();
            let segment_line = line;
            line += segment.matches('\n').count();
            cursor = start + segment.len();
            segment_line
        })
        .collect()
}

/// Character length; sizes are measured in chars, never bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Line prefixes of decorators and attributes, which belong to the item below.
const ATTACHED_PREFIXES: &[&str] = &["@", "#["];

/// Move a leading cut at `idx` back over the decorator or attribute lines
/// directly above it, never past `floor`.
fn attach_back(text: &str, floor: usize, mut idx: usize) -> usize {
    while let Some(pos) = text[floor..idx].rfind('\n').map(|pos| floor + pos) {
        let line = text[pos + 1..idx].trim_start();
        if !ATTACHED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            break;
        }
        idx = pos;
    }
    idx
}

fn split_before<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for (idx, _) in text.match_indices(separator) {
        let idx = attach_back(text, last, idx);
        if idx > last {
            pieces.push(&text[last..idx]);
            last = idx;
        }
    }
    pieces.push(&text[last..]);

    pieces
}

/// Cut `text` before every leading separator of the hierarchy, regardless
/// of size.
fn split_at_boundaries<'a>(text: &'a str, separators: &[Separator]) -> Vec<&'a str> {
    let mut cuts: Vec<usize> = separators
        .iter()
        .filter_map(|separator| match separator {
            Separator::Leading(sep) => Some(sep),
            _ => None,
        })
        .flat_map(|sep| text.match_indices(&**sep).map(|(idx, _)| attach_back(text, 0, idx)))
        .filter(|&idx| idx > 0)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut last = 0;
    for cut in cuts {
        pieces.push(&text[last..cut]);
        last = cut;
    }
    pieces.push(&text[last..]);
    pieces
}
