//! Reformat Markdown into one canonical style.
//! [mdfmt] supports [CommonMark] and [GitHub Flavored Markdown], plus YAML
//! front matter at the start of a document.
//!
//! [mdfmt]: index.html
//! [CommonMark]: https://spec.commonmark.org/
//! [GitHub Flavored Markdown]: https://github.github.com/gfm/
//!
//! # Getting Started
//!
//! ```rust
//! use mdfmt::MarkdownFormatter;
//!
//! let markdown = r##" # Getting Started
//! 1) numbered lists
//! 1)  are easy!
//! + and so are
//! + bullets
//! "##;
//!
//! let formatted = r##"# Getting Started
//!
//! 1. numbered lists
//! 2. are easy!
//!
//! - and so are
//! - bullets
//! "##;
//!
//! let output = MarkdownFormatter::default().format(markdown)?;
//! # assert_eq!(output, formatted);
//! # Ok::<(), std::fmt::Error>(())
//! ```
//!
//! # Whole documents
//!
//! [`rewrite_document`] also handles front matter, re-encoding it as YAML
//! unless [`Config::skip_metadata`] is set.
//!
//! ```rust
//! use mdfmt::{rewrite_document, Config};
//!
//! let input = "---\ntitle:   Hello\n---\nSome  *text*\n";
//! let mut output = Vec::new();
//! rewrite_document(input, &Config::default(), &mut output)?;
//! assert_eq!(output, b"---\ntitle: Hello\n---\nSome  *text*\n");
//! # Ok::<(), mdfmt::Error>(())
//! ```

use std::io;

mod adapters;
mod builder;
pub mod cli;
mod config;
mod error;
mod escape;
mod formatter;
pub mod front_matter;
mod links;
mod list;
mod paragraph;
mod table;
#[cfg(test)]
mod test;
mod utils;

pub use crate::{
    builder::MarkdownFormatter,
    config::{Config, DEFAULT_MAX_WIDTH},
    error::{Error, Result},
    front_matter::{extract, FrontMatter},
};

/// Rewrite a whole document: front matter first, then the formatted body.
///
/// Front matter that does not decode is left in place and formatted as part
/// of the body. Bytes written before an error stay written.
pub fn rewrite_document(input: &str, config: &Config, out: &mut impl io::Write) -> Result<()> {
    let body = match extract(input) {
        Some(front_matter) => {
            if !config.skip_metadata {
                front_matter.write_to(out)?;
            }
            front_matter.body
        }
        None => input,
    };

    let formatted = MarkdownFormatter::new(config.clone()).format(body)?;
    out.write_all(formatted.as_bytes()).map_err(Error::Write)?;
    out.flush().map_err(Error::Write)
}
