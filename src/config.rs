/// Column width used for hard wrapping when no other width is requested.
pub const DEFAULT_MAX_WIDTH: usize = 80;

/// Configuration for rewriting a document.
///
/// Built once before any processing and handed to the formatter by reference.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Drop the YAML front matter instead of re-emitting it.
    pub skip_metadata: bool,
    /// Drop HTML blocks and inline HTML.
    pub skip_html: bool,
    /// Hard wrap paragraphs at this many columns. `None` keeps the source
    /// line breaks.
    pub max_width: Option<usize>,
    /// Write level 1 and 2 headings with `===` / `---` underlines.
    pub setext_headings: bool,
}

impl Config {
    /// Configuration that wraps paragraphs at [`DEFAULT_MAX_WIDTH`].
    pub fn wrapped() -> Self {
        Self {
            max_width: Some(DEFAULT_MAX_WIDTH),
            ..Self::default()
        }
    }
}
