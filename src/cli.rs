//! Command line surface of the `mdfmt` binary.

use std::ffi::OsString;
use std::io::{self, Read};

use clap::Parser;

use crate::{
    config::{Config, DEFAULT_MAX_WIDTH},
    error::{Error, Result},
    rewrite_document,
};

/// Reformat the Markdown document read from standard input and write it to
/// standard output.
#[derive(Debug, Parser)]
#[command(name = "mdfmt", version, about, long_about = None)]
pub struct Cli {
    /// Remove the YAML front matter from the output
    #[arg(long = "skipMetadata")]
    pub skip_metadata: bool,

    /// Remove HTML blocks and inline HTML
    #[arg(long = "skipHTML")]
    pub skip_html: bool,

    /// Hard wrap paragraph lines
    #[arg(long = "wrapLines")]
    pub wrap_lines: bool,

    /// Use underlined (setext) level 1 and 2 headings
    #[arg(long = "stxHeaders")]
    pub stx_headers: bool,

    /// Column to wrap at with --wrapLines
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_MAX_WIDTH)]
    pub width: usize,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags.
    pub fn from_env() -> Self {
        Self::parse_from(normalize_flags(std::env::args_os()))
    }

    /// The configuration for one run.
    pub fn config(&self) -> Config {
        Config {
            skip_metadata: self.skip_metadata,
            skip_html: self.skip_html,
            max_width: self.wrap_lines.then_some(self.width),
            setext_headings: self.stx_headers,
        }
    }
}

/// Turn `-skipHTML` into `--skipHTML` so long flags work with one dash too.
/// Short flags such as `-h` are left alone.
pub fn normalize_flags<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some(flag) if flag.len() > 2 && flag.starts_with('-') && !flag.starts_with("--") => {
                format!("-{flag}").into()
            }
            _ => arg,
        })
        .collect()
}

/// Read standard input, rewrite it, and write the result to standard output.
pub fn run(config: &Config) -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .lock()
        .read_to_end(&mut input)
        .map_err(Error::Read)?;
    let input = String::from_utf8(input)?;
    tracing::debug!(bytes = input.len(), ?config, "read input");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    rewrite_document(&input, config, &mut out)
}
