use super::*;

/// A Markdown formatter. Configure it with the builder methods, then call
/// [`MarkdownFormatter::format`].
///
/// ```rust
/// # use mdfmt::MarkdownFormatter;
/// let output = MarkdownFormatter::default()
///     .setext_headings(true)
///     .format("#  Title\n")?;
/// assert_eq!(output, "Title\n=====\n");
/// # Ok::<(), std::fmt::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MarkdownFormatter {
    pub(crate) config: Config,
}

impl MarkdownFormatter {
    /// Make a formatter from an existing [`Config`].
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Drop HTML blocks and inline HTML.
    pub fn skip_html(mut self, skip_html: bool) -> Self {
        self.config.skip_html = skip_html;
        self
    }

    /// Hard wrap paragraphs at `max_width` columns, or keep source line
    /// breaks with `None`.
    pub fn max_width(mut self, max_width: Option<usize>) -> Self {
        self.config.max_width = max_width;
        self
    }

    /// Use underlined headings for levels 1 and 2.
    pub fn setext_headings(mut self, setext_headings: bool) -> Self {
        self.config.setext_headings = setext_headings;
        self
    }

    /// The configuration this formatter will use.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
