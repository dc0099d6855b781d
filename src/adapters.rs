//! Adapters that reshape the `pulldown_cmark` event stream before formatting.

use std::collections::{HashSet, VecDeque};
use std::ops::Range;

use pulldown_cmark::{Event, Tag, TagEnd};

/// Extension trait for wrapping bare inline content in paragraphs.
pub(crate) trait ImplicitParagraphExt<'i>: Iterator<Item = (Event<'i>, Range<usize>)> {
    /// Tight list items and definition bodies hold their text without
    /// `Paragraph` events. Wrap every such run of inline events in a
    /// `Paragraph` so it can be formatted like any other paragraph.
    fn explicit_paragraphs(self) -> ExplicitParagraphs<'i, Self>
    where
        Self: Sized,
    {
        ExplicitParagraphs {
            inner: self,
            scopes: vec![],
            pending: VecDeque::new(),
        }
    }
}

impl<'i, I> ImplicitParagraphExt<'i> for I where I: Iterator<Item = (Event<'i>, Range<usize>)> {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scope {
    /// A container whose children may be bare inline events.
    BlockContainer,
    /// A paragraph we opened ourselves.
    Synthetic,
    Other,
}

pub(crate) struct ExplicitParagraphs<'i, I>
where
    I: Iterator<Item = (Event<'i>, Range<usize>)>,
{
    inner: I,
    scopes: Vec<Scope>,
    pending: VecDeque<(Event<'i>, Range<usize>)>,
}

impl<'i, I> Iterator for ExplicitParagraphs<'i, I>
where
    I: Iterator<Item = (Event<'i>, Range<usize>)>,
{
    type Item = (Event<'i>, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.pop_front() {
            return Some(item);
        }

        let Some((event, range)) = self.inner.next() else {
            // Close a paragraph left open at the very end.
            if self.scopes.last() == Some(&Scope::Synthetic) {
                self.scopes.pop();
                return Some((Event::End(TagEnd::Paragraph), 0..0));
            }
            return None;
        };

        let inline = is_inline(&event);
        if !inline && self.scopes.last() == Some(&Scope::Synthetic) {
            self.scopes.pop();
            self.pending
                .push_back((Event::End(TagEnd::Paragraph), range.start..range.start));
        }
        if inline && self.scopes.last() == Some(&Scope::BlockContainer) {
            self.scopes.push(Scope::Synthetic);
            self.pending
                .push_back((Event::Start(Tag::Paragraph), range.clone()));
        }

        match &event {
            Event::Start(tag) => self.scopes.push(match tag {
                Tag::Item | Tag::DefinitionListDefinition => Scope::BlockContainer,
                _ => Scope::Other,
            }),
            Event::End(_) => {
                self.scopes.pop();
            }
            _ => {}
        }

        self.pending.push_back((event, range));
        self.pending.pop_front()
    }
}

/// Check if the event belongs inside a paragraph.
fn is_inline(event: &Event) -> bool {
    match event {
        Event::Start(tag) => is_inline_tag(tag),
        Event::End(tag) => matches!(
            tag,
            TagEnd::Emphasis { .. }
                | TagEnd::Strong { .. }
                | TagEnd::Strikethrough { .. }
                | TagEnd::Link { .. }
                | TagEnd::Image { .. }
        ),
        Event::Text(_)
        | Event::Code(_)
        | Event::InlineHtml(_)
        | Event::InlineMath(_)
        | Event::DisplayMath(_)
        | Event::FootnoteReference(_)
        | Event::SoftBreak
        | Event::HardBreak
        | Event::TaskListMarker(_) => true,
        _ => false,
    }
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

/// Find the lists whose items are separated by blank lines.
///
/// `pulldown_cmark` only emits `Paragraph` events directly inside the items
/// of a loose list. Lists are identified by the start of their source range.
pub(crate) fn loose_lists(events: &[(Event, Range<usize>)]) -> HashSet<usize> {
    let mut loose = HashSet::new();
    let mut lists: Vec<usize> = vec![];
    let mut parents: Vec<bool> = vec![];

    for (event, range) in events {
        match event {
            Event::Start(tag) => {
                if matches!(tag, Tag::Paragraph) && parents.last() == Some(&true) {
                    if let Some(list) = lists.last() {
                        loose.insert(*list);
                    }
                }
                if matches!(tag, Tag::List(_)) {
                    lists.push(range.start);
                }
                parents.push(matches!(tag, Tag::Item));
            }
            Event::End(tag) => {
                if matches!(tag, TagEnd::List { .. }) {
                    lists.pop();
                }
                parents.pop();
            }
            _ => {}
        }
    }
    loose
}
