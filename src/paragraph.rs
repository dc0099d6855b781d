use std::fmt::Write;

use itertools::Itertools;
use textwrap::{Options as TextWrapOptions, WordSeparator, WordSplitter, WrapAlgorithm};

use crate::escape::starts_block;

/// Narrowest width we wrap to, however deep the indentation gets.
const MIN_WRAP_WIDTH: usize = 20;

/// Stands in for a space that wrapping must not break at.
const NO_BREAK_SPACE: char = '\u{E000}';

/// Buffer for the inline content of a paragraph, heading, or definition term.
///
/// Soft breaks are kept as line breaks unless a maximum width is set, in
/// which case they become spaces and the text is re-wrapped when the
/// paragraph is finished.
pub(crate) struct Paragraph {
    /// Text before each hard break.
    broken: Vec<String>,
    buffer: String,
    max_width: Option<usize>,
    lead: Option<&'static str>,
}

impl Paragraph {
    pub(crate) fn new(max_width: Option<usize>, capacity: usize) -> Self {
        Self {
            broken: vec![],
            buffer: String::with_capacity(capacity),
            max_width,
            lead: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lead.is_none() && self.broken.is_empty() && self.buffer.trim().is_empty()
    }

    /// Text that must start the first line, like a task list checkbox.
    pub(crate) fn set_lead(&mut self, lead: &'static str) {
        self.lead = Some(lead);
    }

    pub(crate) fn soft_break(&mut self) {
        if self.max_width.is_some() {
            self.buffer.push(' ');
        } else {
            self.buffer.push('\n');
        }
    }

    pub(crate) fn hard_break(&mut self) {
        let trimmed = self.buffer.trim_end_matches([' ', '\t']).len();
        self.buffer.truncate(trimmed);
        self.broken.push(std::mem::take(&mut self.buffer));
    }

    /// Write text that must stay on one line, like a link destination.
    pub(crate) fn write_unbroken(&mut self, s: &str) {
        if self.max_width.is_some() {
            self.buffer.extend(s.chars().map(|c| match c {
                ' ' => NO_BREAK_SPACE,
                c => c,
            }));
        } else {
            self.buffer.push_str(s);
        }
    }

    /// Consume the paragraph and return its lines.
    pub(crate) fn into_lines(self) -> Vec<String> {
        let lead = self.lead.unwrap_or("");
        let segment_count = self.broken.len() + 1;
        let segments = self.broken.into_iter().chain([self.buffer]);
        let mut lines = vec![];
        for (index, segment) in segments.enumerate() {
            let lead = if index == 0 { lead } else { "" };
            let mut segment_lines = match self.max_width {
                Some(max_width) => {
                    // Newlines left in the text come from inline HTML or titles.
                    let text = segment.replace(['\n', '\r'], " ");
                    wrap_segment(text.trim(), max_width.max(MIN_WRAP_WIDTH), lead)
                        .into_iter()
                        .map(|line| line.replace(NO_BREAK_SPACE, " "))
                        .collect()
                }
                None => source_lines(&segment, lead),
            };
            if index + 1 < segment_count {
                match segment_lines.last_mut() {
                    Some(last) => last.push('\\'),
                    None => segment_lines.push("\\".to_owned()),
                }
            }
            lines.extend(segment_lines);
        }
        lines
    }

    /// All lines joined with spaces, for content that must stay on one line.
    pub(crate) fn into_single_line(self) -> String {
        let lead = self.lead.unwrap_or("");
        let text = self
            .broken
            .iter()
            .chain([&self.buffer])
            .flat_map(|segment| segment.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .join(" ");
        format!("{lead}{text}").trim_end().to_owned()
    }
}

impl Write for Paragraph {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.buffer.push_str(s);
        Ok(())
    }
}

fn source_lines(segment: &str, lead: &str) -> Vec<String> {
    let mut lines = segment
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if !lead.is_empty() {
        match lines.first_mut() {
            Some(first) => first.insert_str(0, lead),
            None => lines.push(lead.trim_end().to_owned()),
        }
    }
    lines
}

fn wrap_segment(segment: &str, width: usize, lead: &str) -> Vec<String> {
    let options = TextWrapOptions::new(width)
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation)
        .wrap_algorithm(WrapAlgorithm::FirstFit)
        .initial_indent(lead);

    let mut lines: Vec<String> = vec![];
    for line in textwrap::wrap(segment, options) {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        match lines.last_mut() {
            // Don't let wrapping turn text into a list item, heading, etc.
            Some(previous) if starts_block(line) || previous.ends_with('\\') => {
                previous.push(' ');
                previous.push_str(line);
            }
            _ => lines.push(line.to_owned()),
        }
    }
    if lines.is_empty() && !lead.is_empty() {
        lines.push(lead.trim_end().to_owned());
    }
    lines
}
