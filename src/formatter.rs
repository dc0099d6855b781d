use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write;
use std::ops::Range;

use itertools::Itertools;
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};

use crate::{
    adapters::{loose_lists, ImplicitParagraphExt},
    escape::{escape_closing_hashes, starts_block},
    links,
    list::ListMarker,
    paragraph::Paragraph,
    table::TableState,
    utils::{longest_run, unicode_str_width},
    Config, MarkdownFormatter,
};

/// Extensions the formatter understands.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
}

impl MarkdownFormatter {
    /// Format Markdown input
    ///
    /// ```rust
    /// # use mdfmt::MarkdownFormatter;
    /// let formatter = MarkdownFormatter::default();
    /// let input = "   #  Header! ";
    /// let rewrite = formatter.format(input).unwrap();
    /// assert_eq!(rewrite, String::from("# Header!\n"));
    /// ```
    pub fn format(self, input: &str) -> Result<String, std::fmt::Error> {
        let parser = Parser::new_ext(input, parser_options());

        let reference_links = parser
            .reference_definitions()
            .iter()
            .sorted_by_key(|(_, link_def)| link_def.span.start)
            .map(|(label, link_def)| ReferenceLinkDefinition {
                label: label.to_string(),
                dest: link_def.dest.to_string(),
                title: link_def.title.as_ref().map(|title| title.to_string()),
            })
            .collect::<Vec<_>>();

        let events = parser.into_offset_iter().collect::<Vec<_>>();
        let loose_lists = loose_lists(&events);
        let iter = events.into_iter().explicit_paragraphs();

        let fmt_state = FormatState::new(input, self.config, iter, loose_lists, reference_links);
        fmt_state.format()
    }
}

/// A `[label]: dest "title"` definition, written at the end of the document.
struct ReferenceLinkDefinition {
    label: String,
    dest: String,
    title: Option<String>,
}

/// One level of line prefix: list markers, `> `, and so on.
struct Indent {
    /// Written on the first line of the container.
    first: Cow<'static, str>,
    /// Written on every following line.
    rest: Cow<'static, str>,
    used: bool,
}

impl Indent {
    fn new(first: impl Into<Cow<'static, str>>, rest: impl Into<Cow<'static, str>>) -> Self {
        Self {
            first: first.into(),
            rest: rest.into(),
            used: false,
        }
    }

    fn uniform(prefix: &'static str) -> Self {
        Self::new(prefix, prefix)
    }

    fn next_prefix(&mut self) -> &str {
        if self.used {
            &self.rest
        } else {
            self.used = true;
            &self.first
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ContextKind {
    Document,
    BlockQuote,
    List { loose: bool, marker: ListMarker },
    Item { tight: bool },
    FootnoteDefinition,
    DefinitionList,
    Definition,
}

/// What kind of block was last written inside a context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BlockKind {
    Leaf,
    Container,
    List(ListMarker),
    Item,
    Title,
    Definition,
}

struct Context {
    kind: ContextKind,
    children: usize,
    last_child: Option<BlockKind>,
}

impl Context {
    fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            children: 0,
            last_child: None,
        }
    }
}

struct Heading {
    level: HeadingLevel,
    /// Already rendered `{#id .class key=value}`, or empty.
    attributes: String,
}

struct CodeBlock {
    info: String,
    buffer: String,
}

pub(crate) struct FormatState<'i, I>
where
    I: Iterator<Item = (Event<'i>, Range<usize>)>,
{
    /// Raw markdown input
    input: &'i str,
    /// Iterator Supplying Markdown Events
    events: I,
    rewrite_buffer: String,
    /// Stack of line prefixes for the open containers.
    indentation: Vec<Indent>,
    /// Stack of open containers. The bottom is always the document.
    nested_context: Vec<Context>,
    /// Inline content of the current paragraph, heading, or definition term.
    paragraph: Option<Paragraph>,
    heading: Option<Heading>,
    code_block: Option<CodeBlock>,
    html_block: Option<String>,
    table_state: Option<TableState>,
    /// Open links and images, needed again at their end tag.
    inline_context: Vec<Tag<'i>>,
    /// Autolinks are copied from the source at their end tag.
    in_autolink: bool,
    /// Source offsets of lists whose items are separated by blank lines.
    loose_lists: HashSet<usize>,
    /// Link reference definitions, in source order.
    reference_links: Vec<ReferenceLinkDefinition>,
    /// Format configurations
    config: Config,
}

/// Inline content goes to whichever buffer is collecting it. The Write impl
/// centralizes that choice.
impl<'i, I> Write for FormatState<'i, I>
where
    I: Iterator<Item = (Event<'i>, Range<usize>)>,
{
    fn write_str(&mut self, text: &str) -> std::fmt::Result {
        tracing::trace!(text, "write_str");
        self.current_buffer().write_str(text)
    }
}

impl<'i, I> FormatState<'i, I>
where
    I: Iterator<Item = (Event<'i>, Range<usize>)>,
{
    fn new(
        input: &'i str,
        config: Config,
        iter: I,
        loose_lists: HashSet<usize>,
        reference_links: Vec<ReferenceLinkDefinition>,
    ) -> Self {
        Self {
            input,
            events: iter,
            rewrite_buffer: String::with_capacity(input.len() * 2),
            indentation: vec![],
            nested_context: vec![Context::new(ContextKind::Document)],
            paragraph: None,
            heading: None,
            code_block: None,
            html_block: None,
            table_state: None,
            inline_context: vec![],
            in_autolink: false,
            loose_lists,
            reference_links,
            config,
        }
    }

    fn current_buffer(&mut self) -> &mut dyn Write {
        if let Some(table) = self.table_state.as_mut() {
            table as &mut dyn Write
        } else if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph as &mut dyn Write
        } else {
            &mut self.rewrite_buffer as &mut dyn Write
        }
    }

    fn parent(&self) -> &Context {
        self.nested_context
            .last()
            .expect("the document context is never popped")
    }

    /// Width of the continuation prefixes of all open containers.
    fn indentation_width(&self) -> usize {
        self.indentation
            .iter()
            .map(|indent| unicode_str_width(&indent.rest))
            .sum()
    }

    fn formatter_width(&self) -> Option<usize> {
        self.config
            .max_width
            .map(|w| w.saturating_sub(self.indentation_width()))
    }

    fn write_indentation(&mut self, trim_trailing_whitespace: bool) -> std::fmt::Result {
        let mut prefix = String::new();
        for indent in self.indentation.iter_mut() {
            prefix.push_str(indent.next_prefix());
        }
        if trim_trailing_whitespace {
            self.rewrite_buffer.push_str(prefix.trim_end());
        } else {
            self.rewrite_buffer.push_str(&prefix);
        }
        Ok(())
    }

    /// End the current line, and write blank lines until `newlines` line
    /// breaks have been written.
    fn write_newlines(&mut self, newlines: usize) -> std::fmt::Result {
        for i in 0..newlines {
            if i > 0 {
                self.write_indentation(true)?;
            }
            self.rewrite_buffer.push('\n');
        }
        Ok(())
    }

    /// Separate a new block from its previous sibling.
    fn start_block(&mut self, kind: BlockKind) -> std::fmt::Result {
        let parent = self
            .nested_context
            .last_mut()
            .expect("the document context is never popped");
        let newlines = if parent.children == 0 {
            0
        } else {
            match (parent.kind, kind) {
                (ContextKind::List { loose: false, .. }, _) => 1,
                (ContextKind::Item { tight: true }, _) => 1,
                (ContextKind::DefinitionList, BlockKind::Definition) => 1,
                _ => 2,
            }
        };
        parent.children += 1;
        parent.last_child = Some(kind);
        tracing::trace!(?kind, newlines, "start_block");
        self.write_newlines(newlines)
    }

    /// Write the lines of a leaf block, each behind the container prefixes.
    fn write_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> std::fmt::Result {
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if i > 0 {
                self.rewrite_buffer.push('\n');
            }
            self.write_indentation(line.is_empty())?;
            self.rewrite_buffer.push_str(line);
        }
        Ok(())
    }

    fn write_leaf<S: AsRef<str>>(&mut self, lines: &[S]) -> std::fmt::Result {
        self.start_block(BlockKind::Leaf)?;
        self.write_lines(lines)
    }

    fn push_container(&mut self, kind: ContextKind, indent: Option<Indent>) {
        self.nested_context.push(Context::new(kind));
        if let Some(indent) = indent {
            self.indentation.push(indent);
        }
    }

    fn end_container(&mut self, has_indent: bool) -> std::fmt::Result {
        let empty = self.parent().children == 0;
        if empty && has_indent {
            // Keep the marker of an empty item or quote.
            self.write_indentation(true)?;
        }
        let popped = self.nested_context.pop();
        debug_assert!(!matches!(
            popped.map(|c| c.kind),
            None | Some(ContextKind::Document)
        ));
        if has_indent {
            let popped_indentation = self.indentation.pop();
            debug_assert!(popped_indentation.is_some());
        }
        Ok(())
    }

    /// The main entry point for markdown formatting.
    pub(crate) fn format(mut self) -> Result<String, std::fmt::Error> {
        while let Some((event, range)) = self.events.next() {
            tracing::debug!(?event, ?range);

            match event {
                Event::Start(tag) => self.start_tag(tag, range)?,
                Event::End(tag) => self.end_tag(tag, range)?,
                Event::Text(ref text) => self.write_text(text, range)?,
                Event::Code(ref code) => {
                    if !self.in_autolink {
                        self.write_code_span(code)?;
                    }
                }
                Event::Html(ref html) | Event::InlineHtml(ref html) => {
                    if let Some(buffer) = self.html_block.as_mut() {
                        buffer.push_str(html);
                    } else if !self.config.skip_html && !self.in_autolink {
                        self.write_str(html.trim_end_matches('\n'))?;
                    }
                }
                Event::InlineMath(_) | Event::DisplayMath(_) => {
                    let input = self.input;
                    self.write_str(&input[range])?;
                }
                Event::FootnoteReference(ref label) => {
                    write!(self, "[^{label}]")?;
                }
                Event::SoftBreak => match self.paragraph.as_mut() {
                    Some(paragraph) if !self.in_autolink => paragraph.soft_break(),
                    Some(_) => {}
                    None => self.write_str(" ")?,
                },
                Event::HardBreak => match self.paragraph.as_mut() {
                    Some(paragraph) => paragraph.hard_break(),
                    None => self.write_str(" ")?,
                },
                Event::Rule => self.write_leaf(&["___"])?,
                Event::TaskListMarker(done) => {
                    if let Some(paragraph) = self.paragraph.as_mut() {
                        paragraph.set_lead(if done { "[x] " } else { "[ ] " });
                    }
                }
            }
        }
        debug_assert_eq!(self.nested_context.len(), 1);

        self.write_reference_definitions()?;
        let mut output = self.rewrite_buffer;
        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }

    fn write_text(&mut self, text: &str, range: Range<usize>) -> std::fmt::Result {
        if let Some(code_block) = self.code_block.as_mut() {
            code_block.buffer.push_str(text);
            return Ok(());
        }
        if let Some(buffer) = self.html_block.as_mut() {
            buffer.push_str(text);
            return Ok(());
        }
        if self.in_autolink {
            return Ok(());
        }

        // Prefer the source so escapes and entity references survive.
        let input = self.input;
        let starts_with_escape = input[..range.start].ends_with('\\');
        let text_from_source = &input[range];
        let text = if text_from_source.is_empty() {
            text
        } else {
            text_from_source
        };

        if starts_with_escape {
            write!(self, "\\{text}")
        } else {
            self.write_str(text)
        }
    }

    /// Rebuild an inline code span with the shortest fence that works.
    fn write_code_span(&mut self, code: &str) -> std::fmt::Result {
        // Table rows are split on `|` before code spans are parsed.
        let code = if self.table_state.is_some() {
            Cow::Owned(code.replace('|', "\\|"))
        } else {
            Cow::Borrowed(code)
        };
        let code = code.as_ref();
        let fence = "`".repeat(longest_run(code, '`') + 1);
        let needs_padding = code.starts_with('`')
            || code.ends_with('`')
            || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
        if needs_padding {
            write!(self, "{fence} {code} {fence}")
        } else {
            write!(self, "{fence}{code}{fence}")
        }
    }

    fn start_tag(&mut self, tag: Tag<'i>, range: Range<usize>) -> std::fmt::Result {
        match tag {
            Tag::Paragraph => {
                let capacity = range.len() * 2;
                self.paragraph = Some(Paragraph::new(self.formatter_width(), capacity));
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                self.paragraph = Some(Paragraph::new(None, range.len()));
                self.heading = Some(Heading {
                    level,
                    attributes: heading_attributes(id, classes, attrs),
                });
            }
            Tag::BlockQuote(_) => {
                self.start_block(BlockKind::Container)?;
                self.push_container(ContextKind::BlockQuote, Some(Indent::uniform("> ")));
            }
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.trim().to_owned(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some(CodeBlock {
                    info,
                    buffer: String::with_capacity(range.len()),
                });
            }
            Tag::HtmlBlock => {
                if self.config.skip_html {
                    self.skip_until(TagEnd::HtmlBlock);
                } else {
                    self.html_block = Some(String::with_capacity(range.len()));
                }
            }
            Tag::List(start) => {
                let mut marker = ListMarker::canonical(start);
                if let Some(BlockKind::List(previous)) = self.parent().last_child {
                    // Two lists in a row only stay apart with different markers.
                    if previous.same_list_kind(&marker) {
                        marker = marker.alternate();
                    }
                }
                self.start_block(BlockKind::List(marker))?;
                let loose = self.loose_lists.contains(&range.start);
                tracing::debug!(?marker, loose, "list");
                self.push_container(ContextKind::List { loose, marker }, None);
            }
            Tag::Item => {
                let (marker, loose) = match self.nested_context.last_mut() {
                    Some(Context {
                        kind: ContextKind::List { loose, marker },
                        ..
                    }) => {
                        let current = *marker;
                        marker.increment_count();
                        (current, *loose)
                    }
                    _ => (ListMarker::canonical(None), false),
                };
                self.start_block(BlockKind::Item)?;
                self.push_container(
                    ContextKind::Item { tight: !loose },
                    Some(Indent::new(marker.prefix(), marker.indentation())),
                );
            }
            Tag::FootnoteDefinition(label) => {
                self.start_block(BlockKind::Container)?;
                self.push_container(
                    ContextKind::FootnoteDefinition,
                    Some(Indent::new(format!("[^{label}]: "), "    ")),
                );
            }
            Tag::DefinitionList => {
                self.start_block(BlockKind::Container)?;
                self.push_container(ContextKind::DefinitionList, None);
            }
            Tag::DefinitionListTitle => {
                self.paragraph = Some(Paragraph::new(None, range.len()));
            }
            Tag::DefinitionListDefinition => {
                self.start_block(BlockKind::Definition)?;
                self.push_container(ContextKind::Definition, Some(Indent::new(": ", "  ")));
            }
            Tag::Table(alignment) => {
                self.table_state = Some(TableState::new(alignment));
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(state) = self.table_state.as_mut() {
                    state.push_row();
                }
            }
            Tag::TableCell => {}
            Tag::Emphasis => self.write_str("*")?,
            Tag::Strong => self.write_str("**")?,
            Tag::Strikethrough => self.write_str("~~")?,
            tag @ Tag::Link { .. } => {
                if matches!(
                    tag,
                    Tag::Link {
                        link_type: LinkType::Autolink | LinkType::Email,
                        ..
                    }
                ) {
                    self.in_autolink = true;
                } else {
                    self.write_str("[")?;
                }
                self.inline_context.push(tag);
            }
            tag @ Tag::Image { .. } => {
                self.write_str("![")?;
                self.inline_context.push(tag);
            }
            Tag::MetadataBlock(kind) => {
                self.skip_until(TagEnd::MetadataBlock(kind));
            }
        }
        Ok(())
    }

    fn end_tag(&mut self, tag: TagEnd, range: Range<usize>) -> std::fmt::Result {
        match tag {
            TagEnd::Paragraph => {
                let Some(paragraph) = self.paragraph.take() else {
                    return Ok(());
                };
                if !paragraph.is_empty() {
                    self.write_leaf(&paragraph.into_lines())?;
                }
            }
            TagEnd::Heading { .. } => {
                let text = self
                    .paragraph
                    .take()
                    .map(Paragraph::into_single_line)
                    .unwrap_or_default();
                let heading = self.heading.take().expect("Should have pushed a header tag");
                let lines = heading.lines(&text, self.config.setext_headings);
                self.write_leaf(&lines)?;
            }
            TagEnd::BlockQuote { .. }
            | TagEnd::Item { .. }
            | TagEnd::FootnoteDefinition { .. }
            | TagEnd::DefinitionListDefinition { .. } => self.end_container(true)?,
            TagEnd::List { .. } | TagEnd::DefinitionList { .. } => self.end_container(false)?,
            TagEnd::DefinitionListTitle { .. } => {
                let text = self
                    .paragraph
                    .take()
                    .map(Paragraph::into_single_line)
                    .unwrap_or_default();
                self.start_block(BlockKind::Title)?;
                self.write_lines(&[text])?;
            }
            TagEnd::CodeBlock { .. } => {
                let code_block = self
                    .code_block
                    .take()
                    .expect("Should have pushed a code block start tag");
                self.write_leaf(&code_block.lines())?;
            }
            TagEnd::HtmlBlock { .. } => {
                if let Some(html) = self.html_block.take() {
                    let html = html.trim_start_matches(' ').trim_end();
                    if !html.is_empty() {
                        self.write_leaf(&html.lines().collect::<Vec<_>>())?;
                    }
                }
            }
            TagEnd::Table { .. } => {
                if let Some(state) = self.table_state.take() {
                    self.write_leaf(&state.format()?)?;
                }
            }
            TagEnd::TableHead { .. } | TagEnd::TableRow { .. } => {}
            TagEnd::TableCell { .. } => {
                if let Some(state) = self.table_state.as_mut() {
                    // We finished formatting this cell. Setup the state to format the next cell
                    state.increment_col_index();
                }
            }
            TagEnd::Emphasis { .. } => self.write_str("*")?,
            TagEnd::Strong { .. } => self.write_str("**")?,
            TagEnd::Strikethrough { .. } => self.write_str("~~")?,
            TagEnd::Link { .. } | TagEnd::Image { .. } => self.end_link_or_image(range)?,
            TagEnd::MetadataBlock { .. } => {}
        }
        Ok(())
    }

    fn end_link_or_image(&mut self, range: Range<usize>) -> std::fmt::Result {
        let popped_tag = self
            .inline_context
            .pop()
            .expect("Should have pushed a start tag.");
        let (link_type, url, title, id) = match popped_tag {
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }
            | Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => (link_type, dest_url, title, id),
            _ => unreachable!("Should reach the end of a corresponding tag."),
        };

        match link_type {
            LinkType::Autolink | LinkType::Email => {
                self.in_autolink = false;
                let input = self.input;
                self.write_str(input[range].trim())
            }
            LinkType::Reference | LinkType::ReferenceUnknown => write!(self, "][{id}]"),
            LinkType::Collapsed | LinkType::CollapsedUnknown => self.write_str("][]"),
            LinkType::Shortcut | LinkType::ShortcutUnknown => self.write_str("]"),
            LinkType::Inline => {
                let destination = links::format_link_url(&url);
                let in_table = self.table_state.is_some();
                self.write_str("](")?;
                match self.paragraph.as_mut() {
                    Some(paragraph) if !in_table => paragraph.write_unbroken(&destination),
                    _ => self.write_str(&destination)?,
                }
                if !title.is_empty() {
                    write!(self, " {}", links::format_link_title(&title))?;
                }
                self.write_str(")")
            }
        }
    }

    /// Drop every event up to and including `end`.
    fn skip_until(&mut self, end: TagEnd) {
        for (event, range) in self.events.by_ref() {
            tracing::trace!(?event, ?range, "skipped");
            if event == Event::End(end) {
                break;
            }
        }
    }

    fn write_reference_definitions(&mut self) -> std::fmt::Result {
        let reference_links = std::mem::take(&mut self.reference_links);
        if reference_links.is_empty() {
            return Ok(());
        }
        let mut lines = Vec::with_capacity(reference_links.len());
        for link in &reference_links {
            let mut line = String::new();
            links::write_reference_definition(
                &mut line,
                &link.label,
                &link.dest,
                link.title.as_deref(),
            )?;
            lines.push(line);
        }
        self.write_leaf(&lines)
    }
}

impl Heading {
    fn lines(&self, text: &str, setext: bool) -> Vec<String> {
        let with_attributes = |text: &str| {
            if self.attributes.is_empty() {
                text.to_owned()
            } else if text.is_empty() {
                self.attributes.clone()
            } else {
                format!("{text} {}", self.attributes)
            }
        };

        let underline = match self.level {
            HeadingLevel::H1 => Some('='),
            HeadingLevel::H2 => Some('-'),
            _ => None,
        };
        if let (true, Some(underline)) = (setext, underline) {
            if !text.is_empty() && !starts_block(text) {
                let line = with_attributes(text);
                let width = unicode_str_width(&line).max(3);
                return vec![line, underline.to_string().repeat(width)];
            }
        }

        let header = match self.level {
            HeadingLevel::H1 => "#",
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
            HeadingLevel::H4 => "####",
            HeadingLevel::H5 => "#####",
            HeadingLevel::H6 => "######",
        };
        let content = with_attributes(&escape_closing_hashes(text));
        if content.is_empty() {
            vec![header.to_owned()]
        } else {
            vec![format!("{header} {content}")]
        }
    }
}

impl CodeBlock {
    /// Opening fence, code lines, closing fence.
    fn lines(self) -> Vec<String> {
        let fence_char = if self.info.contains('`') { '~' } else { '`' };
        let fence = fence_char
            .to_string()
            .repeat((longest_run(&self.buffer, fence_char) + 1).max(3));

        let mut lines = vec![format!("{fence}{}", self.info)];
        if !self.buffer.is_empty() {
            let code = self.buffer.strip_suffix('\n').unwrap_or(&self.buffer);
            lines.extend(code.split('\n').map(str::to_owned));
        }
        lines.push(fence);
        lines
    }
}

/// Rewrite heading attributes as `{#id .class key=value}`.
fn heading_attributes(
    id: Option<CowStr>,
    classes: Vec<CowStr>,
    attrs: Vec<(CowStr, Option<CowStr>)>,
) -> String {
    let attributes = id
        .map(|id| format!("#{id}"))
        .into_iter()
        .chain(classes.iter().map(|class| format!(".{class}")))
        .chain(attrs.iter().map(|(key, value)| match value {
            Some(value) => format!("{key}={value}"),
            None => key.to_string(),
        }))
        .join(" ");
    if attributes.is_empty() {
        attributes
    } else {
        format!("{{{attributes}}}")
    }
}
