//! YAML front matter at the very start of a document.
//!
//! A block opens with a `---` line as the first line of the input and closes
//! with the first `---` or `...` line after which the enclosed text decodes to
//! exactly one YAML document with content. Closing lines that fail that test
//! are skipped and the search continues further down the input.

use std::{fmt, io};

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

const OPENING_LINE: &str = "---\n";
const CLOSING_LINE: &str = "---\n";
const CLOSING_MARKERS: [&str; 2] = ["\n---", "\n..."];

/// A decoded front matter block and the document body that follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontMatter<'i> {
    /// The single top-level YAML node.
    pub value: Value,
    /// Raw YAML text between the delimiter lines.
    pub yaml: &'i str,
    /// Everything after the closing delimiter line.
    pub body: &'i str,
}

/// Split a leading YAML front matter block off `input`.
///
/// Returns `None` when the input does not start with `---\n` or when no
/// closing line yields a valid block. The whole input is then the body.
///
/// ```rust
/// # use mdfmt::front_matter::extract;
/// let front_matter = extract("---\ntitle: Hello\n---\n# Hello\n").unwrap();
/// assert_eq!(front_matter.value["title"], "Hello");
/// assert_eq!(front_matter.body, "# Hello\n");
///
/// assert!(extract("# No front matter\n").is_none());
/// ```
pub fn extract(input: &str) -> Option<FrontMatter<'_>> {
    let content = input.strip_prefix(OPENING_LINE)?;

    let mut cursor = 0;
    while let Some(marker) = next_marker(content, cursor) {
        let after_marker = marker + CLOSING_MARKERS[0].len();
        cursor = after_marker;

        let Some(body_start) = closing_line_end(content, after_marker) else {
            tracing::trace!(offset = marker, "delimiter is not alone on its line");
            continue;
        };

        let yaml = &content[..marker];
        match decode_single_document(yaml) {
            Ok(value) => {
                tracing::debug!(offset = marker, "found front matter");
                return Some(FrontMatter {
                    value,
                    yaml,
                    body: &content[body_start..],
                });
            }
            Err(rejection) => {
                tracing::trace!(offset = marker, %rejection, "rejected front matter candidate");
            }
        }
    }
    None
}

impl FrontMatter<'_> {
    /// Write the block back out between `---` lines.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<()> {
        let yaml = serde_yaml::to_string(&self.value)?;
        out.write_all(OPENING_LINE.as_bytes()).map_err(Error::Write)?;
        out.write_all(yaml.as_bytes()).map_err(Error::Write)?;
        if !yaml.ends_with('\n') {
            out.write_all(b"\n").map_err(Error::Write)?;
        }
        out.write_all(CLOSING_LINE.as_bytes()).map_err(Error::Write)
    }
}

/// Offset of the nearest closing marker at or after `cursor`.
fn next_marker(content: &str, cursor: usize) -> Option<usize> {
    let haystack = &content[cursor..];
    CLOSING_MARKERS
        .iter()
        .filter_map(|marker| haystack.find(marker))
        .min()
        .map(|offset| cursor + offset)
}

/// Where the body starts, if only blanks and a line ending follow the marker.
fn closing_line_end(content: &str, after_marker: usize) -> Option<usize> {
    let rest = &content[after_marker..];
    let trimmed = rest.trim_start_matches([' ', '\t']);
    let blanks = rest.len() - trimmed.len();
    let line_ending = if trimmed.is_empty() {
        0
    } else if trimmed.starts_with('\n') {
        1
    } else if trimmed.starts_with("\r\n") {
        2
    } else {
        return None;
    };
    Some(after_marker + blanks + line_ending)
}

#[derive(Debug)]
enum Rejection {
    Syntax(serde_yaml::Error),
    Empty,
    MultipleDocuments,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Syntax(err) => write!(f, "invalid YAML: {err}"),
            Rejection::Empty => f.write_str("no YAML content"),
            Rejection::MultipleDocuments => f.write_str("more than one YAML document"),
        }
    }
}

fn decode_single_document(yaml: &str) -> std::result::Result<Value, Rejection> {
    // An explicit `null` or `~` is content; blank or comment-only text is not.
    if !yaml.lines().any(has_content) {
        return Err(Rejection::Empty);
    }
    let mut documents = serde_yaml::Deserializer::from_str(yaml);
    let document = documents.next().ok_or(Rejection::Empty)?;
    let value = Value::deserialize(document).map_err(Rejection::Syntax)?;
    if documents.next().is_some() {
        return Err(Rejection::MultipleDocuments);
    }
    Ok(value)
}

/// Whether a line holds more than blanks, comments, directives or document markers.
fn has_content(line: &str) -> bool {
    if line.starts_with('%') {
        return false;
    }
    let line = line.trim();
    let rest = ["---", "..."]
        .into_iter()
        .find_map(|marker| line.strip_prefix(marker))
        .filter(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
        .unwrap_or(line)
        .trim_start();
    !rest.is_empty() && !rest.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_without_opening_line_is_all_body() {
        for input in [
            "",
            "# Title\n",
            "--- \ntitle: x\n---\n",
            "----\ntitle: x\n---\n",
            "\n---\ntitle: x\n---\n",
            "---",
        ] {
            assert!(extract(input).is_none(), "{input:?}");
        }
    }

    #[test]
    fn body_starts_after_the_closing_line() {
        let input = "---\nkey: value\n---\nBody text";
        let front_matter = extract(input).unwrap();

        assert_eq!(front_matter.yaml, "key: value");
        assert_eq!(front_matter.body, "Body text");
        let mapping = front_matter.value.as_mapping().unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(front_matter.value["key"], "value");
    }

    #[test]
    fn dots_close_the_block() {
        let front_matter = extract("---\na: 1\n...\nBody\n").unwrap();
        assert_eq!(front_matter.value["a"], 1);
        assert_eq!(front_matter.body, "Body\n");
    }

    #[test]
    fn closing_line_may_end_the_input() {
        let front_matter = extract("---\na: 1\n---").unwrap();
        assert_eq!(front_matter.body, "");

        let front_matter = extract("---\na: 1\n--- \t\r\nBody").unwrap();
        assert_eq!(front_matter.body, "Body");
    }

    #[test]
    fn indented_delimiter_in_block_scalar_is_not_a_closing_line() {
        let input = "---\nkey: |\n  text\n  ---\n  more\n---\nBody\n";
        let front_matter = extract(input).unwrap();
        let scalar = front_matter.value["key"].as_str().unwrap();
        assert!(scalar.starts_with("text\n---\nmore"), "{scalar:?}");
        assert_eq!(front_matter.body, "Body\n");
    }

    #[test]
    fn empty_block_scalar_before_a_closing_line() {
        let input = "---\nkey: |\n---\nmore: 1\n---\nBody";
        let front_matter = extract(input).unwrap();
        assert_eq!(front_matter.yaml, "key: |");
        assert_eq!(front_matter.value["key"], "");
        assert_eq!(front_matter.body, "more: 1\n---\nBody");
    }

    #[test]
    fn rejected_candidate_moves_on_to_the_next_closing_line() {
        let input = "---\n# leading comment\n---\ntitle: Hello\n---\nBody";
        let front_matter = extract(input).unwrap();
        assert_eq!(front_matter.yaml, "# leading comment\n---\ntitle: Hello");
        assert_eq!(front_matter.value["title"], "Hello");
        assert_eq!(front_matter.body, "Body");
    }

    #[test]
    fn delimiter_with_trailing_text_is_skipped() {
        let input = "---\ntitle: Hello\n---x: 1\n---\nBody";
        let front_matter = extract(input).unwrap();
        assert_eq!(front_matter.yaml, "title: Hello\n---x: 1");
        assert_eq!(front_matter.value["title"], "Hello");
        assert_eq!(front_matter.body, "Body");
    }

    #[test]
    fn invalid_yaml_everywhere_means_no_front_matter() {
        assert!(extract("---\n: : [\n---\nBody\n").is_none());
        assert!(extract("---\n\n---\nBody\n").is_none());
    }

    #[test]
    fn missing_closing_line_means_no_front_matter() {
        assert!(extract("---\ntitle: Hello\n\n# Body\n").is_none());
        assert!(extract("---\n").is_none());
    }

    #[test]
    fn multiple_documents_are_rejected() {
        assert!(matches!(
            decode_single_document("a: 1\n---\nb: 2\n"),
            Err(Rejection::MultipleDocuments)
        ));
        assert!(matches!(
            decode_single_document("# only a comment\n"),
            Err(Rejection::Empty)
        ));
        assert!(matches!(decode_single_document("a: [1"), Err(Rejection::Syntax(_))));
    }

    #[test]
    fn scalar_front_matter_is_accepted() {
        let front_matter = extract("---\njust text\n---\n").unwrap();
        assert_eq!(front_matter.value, Value::from("just text"));
    }

    #[test]
    fn explicit_null_is_accepted() {
        for input in ["---\nnull\n---\nBody\n", "---\n~\n---\nBody\n"] {
            let front_matter = extract(input).unwrap();
            assert_eq!(front_matter.value, Value::Null, "{input:?}");
            assert_eq!(front_matter.body, "Body\n");
        }
        assert!(extract("---\n# just a note\n\n---\nBody\n").is_none());
    }

    #[test]
    fn rejections_explain_themselves() {
        let Err(rejection) = decode_single_document("a: [1") else {
            panic!("unterminated flow sequence should not decode");
        };
        assert!(rejection.to_string().starts_with("invalid YAML: "), "{rejection}");
        assert_eq!(
            decode_single_document("--- # nothing\n").unwrap_err().to_string(),
            "no YAML content"
        );
    }

    #[test]
    fn write_to_round_trips() {
        let front_matter = extract("---\na: 1\nb: two\n---\n").unwrap();
        let mut out = Vec::new();
        front_matter.write_to(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.starts_with("---\n"));
        assert!(written.ends_with("\n---\n"));

        let reparsed = extract(&written).unwrap();
        assert_eq!(reparsed.value, front_matter.value);
        assert_eq!(reparsed.body, "");
    }
}
