use std::borrow::Cow;

/// Marker used for one list item.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ListMarker {
    /// `1.` or `1)`
    Ordered {
        number: u64,
        marker: OrderedListMarker,
    },
    /// `-`, `*`, or `+`
    Unordered(UnorderedListMarker),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OrderedListMarker {
    Period,
    Parenthesis,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum UnorderedListMarker {
    Hyphen,
    Asterisk,
}

impl ListMarker {
    /// Canonical marker for a list starting at `start`, or a bullet list when
    /// `start` is `None`.
    pub(crate) fn canonical(start: Option<u64>) -> Self {
        match start {
            Some(number) => Self::Ordered {
                number,
                marker: OrderedListMarker::Period,
            },
            None => Self::Unordered(UnorderedListMarker::Hyphen),
        }
    }

    /// Check if the two markers would continue the same list when written
    /// next to each other.
    pub(crate) fn same_list_kind(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Ordered { marker: a, .. }, Self::Ordered { marker: b, .. }) => a == b,
            (Self::Unordered(a), Self::Unordered(b)) => a == b,
            _ => false,
        }
    }

    /// The other marker of the same kind, used to keep adjacent lists apart.
    pub(crate) fn alternate(self) -> Self {
        match self {
            Self::Ordered { number, marker } => Self::Ordered {
                number,
                marker: match marker {
                    OrderedListMarker::Period => OrderedListMarker::Parenthesis,
                    OrderedListMarker::Parenthesis => OrderedListMarker::Period,
                },
            },
            Self::Unordered(UnorderedListMarker::Hyphen) => {
                Self::Unordered(UnorderedListMarker::Asterisk)
            }
            Self::Unordered(UnorderedListMarker::Asterisk) => {
                Self::Unordered(UnorderedListMarker::Hyphen)
            }
        }
    }

    pub(crate) fn marker_char(&self) -> char {
        match self {
            Self::Ordered {
                marker: OrderedListMarker::Period,
                ..
            } => '.',
            Self::Ordered {
                marker: OrderedListMarker::Parenthesis,
                ..
            } => ')',
            Self::Unordered(UnorderedListMarker::Hyphen) => '-',
            Self::Unordered(UnorderedListMarker::Asterisk) => '*',
        }
    }

    /// The marker as written before the first line of an item, including the
    /// trailing space.
    pub(crate) fn prefix(&self) -> String {
        match self {
            Self::Ordered { number, .. } => format!("{number}{} ", self.marker_char()),
            Self::Unordered(_) => format!("{} ", self.marker_char()),
        }
    }

    /// Indentation for the continuation lines of an item.
    pub(crate) fn indentation(&self) -> Cow<'static, str> {
        match self.prefix().len() {
            2 => "  ".into(),
            3 => "   ".into(),
            4 => "    ".into(),
            n => " ".repeat(n).into(),
        }
    }

    /// Move on to the next item's number. No-op for bullets.
    pub(crate) fn increment_count(&mut self) {
        if let Self::Ordered { number, .. } = self {
            *number = number.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_markers() {
        assert_eq!(ListMarker::canonical(None).prefix(), "- ");
        assert_eq!(ListMarker::canonical(Some(1)).prefix(), "1. ");
        assert_eq!(ListMarker::canonical(Some(0)).prefix(), "0. ");
    }

    #[test]
    fn ordered_markers_count_up_and_widen_indentation() {
        let mut marker = ListMarker::canonical(Some(9));
        assert_eq!(marker.indentation(), "   ");
        marker.increment_count();
        assert_eq!(marker.prefix(), "10. ");
        assert_eq!(marker.indentation(), "    ");
    }

    #[test]
    fn alternate_markers_separate_adjacent_lists() {
        let bullet = ListMarker::canonical(None);
        assert_eq!(bullet.alternate().prefix(), "* ");
        assert!(!bullet.same_list_kind(&bullet.alternate()));
        assert_eq!(bullet.alternate().alternate(), bullet);

        let ordered = ListMarker::canonical(Some(3));
        assert_eq!(ordered.alternate().prefix(), "3) ");
        assert!(ordered.same_list_kind(&ListMarker::canonical(Some(1))));
        assert!(!ordered.same_list_kind(&bullet));
    }
}
