// Value types that travel through a single upload: the document handed
// over by the host, the request sent to Sourcebin and what came back.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of an entry in the language table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LanguageId(pub u32);

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language attached to a paste. `Fallback` carries the literal marker used
/// when the file extension is not in the table (normally `"text"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    Known(LanguageId),
    Fallback(String),
}

/// Byte range into a document's text. Empty when `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Selection { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The active document as the host sees it. Untitled buffers have no
/// `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: Option<PathBuf>,
    pub text: String,
    pub selection: Selection,
}

impl Document {
    pub fn new(file_name: Option<PathBuf>, text: impl Into<String>) -> Self {
        Document {
            file_name,
            text: text.into(),
            selection: Selection::default(),
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Text under the selection, or the whole document when nothing is
    /// selected. A selection reaching past the end is cut at the end of the
    /// text, and one splitting a character grows to cover that character;
    /// it never becomes the whole document.
    pub fn selected_text(&self) -> &str {
        if self.selection.is_empty() {
            return &self.text;
        }
        let start = floor_char_boundary(&self.text, self.selection.start);
        let end = ceil_char_boundary(&self.text, self.selection.end);
        &self.text[start..end.max(start)]
    }

    /// Last path segment of the file name.
    pub fn title(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Selection covering the 1-based inclusive line range `first..=last`.
    /// `last` past the end of the document is clamped; `None` when `first`
    /// is not a line of the document.
    pub fn line_selection(&self, first: usize, last: usize) -> Option<Selection> {
        let mut start = None;
        let mut end = self.text.len();
        let mut offset = 0;
        for (index, line) in self.text.split_inclusive('\n').enumerate() {
            let number = index + 1;
            if number == first {
                start = Some(offset);
            }
            offset += line.len();
            if number == last {
                end = offset;
                break;
            }
        }
        start.map(|start| Selection::new(start, end))
    }

    pub fn line_count(&self) -> usize {
        self.text.split_inclusive('\n').count()
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Lookup key derived from a title: the part after the final `.`, or the
/// whole title when it has no dot.
pub fn extension_key(title: &str) -> &str {
    title.rsplit('.').next().unwrap_or(title)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRequest {
    pub content: String,
    pub language: Language,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteResult {
    pub url: String,
}

/// Buttons offered next to the success notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlAction {
    Open,
    Copy,
}

impl UrlAction {
    pub const ALL: [UrlAction; 2] = [UrlAction::Open, UrlAction::Copy];

    pub fn label(&self) -> &'static str {
        match self {
            UrlAction::Open => "Open URL",
            UrlAction::Copy => "Copy URL",
        }
    }
}

/// How a successful invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Opened(String),
    Copied(String),
    Dismissed(String),
}

impl Outcome {
    pub fn url(&self) -> &str {
        match self {
            Outcome::Opened(url) | Outcome::Copied(url) | Outcome::Dismissed(url) => url,
        }
    }
}
