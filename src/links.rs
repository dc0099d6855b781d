use std::fmt::Write;

/// Format a link destination so it parses back to `url`.
///
/// Destinations that are empty, contain whitespace or angle brackets, or have
/// unbalanced parentheses are wrapped in `<>`.
pub(crate) fn format_link_url(url: &str) -> String {
    let needs_angle_brackets = url.is_empty()
        || url.chars().any(|c| c.is_whitespace() || c.is_control())
        || !balanced_parens(url);

    if needs_angle_brackets {
        let mut out = String::with_capacity(url.len() + 2);
        out.push('<');
        for c in url.chars() {
            if matches!(c, '<' | '>') {
                out.push('\\');
            }
            match c {
                '\n' => out.push_str("%0A"),
                _ => out.push(c),
            }
        }
        out.push('>');
        return out;
    }

    let mut out = String::with_capacity(url.len());
    let mut chars = url.chars().peekable();
    while let Some(c) = chars.next() {
        // A backslash only needs escaping when it would escape what follows.
        if c == '\\' && chars.peek().is_some_and(char::is_ascii_punctuation) {
            out.push('\\');
        }
        if matches!(c, '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn balanced_parens(url: &str) -> bool {
    let mut depth = 0usize;
    for c in url.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Format a link title, quoted with `"`.
pub(crate) fn format_link_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len() + 2);
    out.push('"');
    let mut chars = title.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if chars.peek().is_some_and(char::is_ascii_punctuation) => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Write one link reference definition, `[label]: dest "title"`.
pub(crate) fn write_reference_definition<W: Write>(
    writer: &mut W,
    label: &str,
    url: &str,
    title: Option<&str>,
) -> std::fmt::Result {
    let url = format_link_url(url);
    match title {
        Some(title) => write!(writer, "[{}]: {url} {}", label.trim(), format_link_title(title)),
        None => write!(writer, "[{}]: {url}", label.trim()),
    }
}
