//! Checks for text that changes meaning when it lands at the start of a line.

/// Check if `line` would be read as the start of a block construct (or as a
/// setext underline) rather than as paragraph continuation text.
pub(crate) fn starts_block(line: &str) -> bool {
    let line = line.trim_start();
    let Some(first) = line.chars().next() else {
        return false;
    };

    match first {
        '#' => {
            let hashes = line.chars().take_while(|c| *c == '#').count();
            hashes <= 6 && followed_by_space_or_end(&line[hashes..])
        }
        '>' | '<' | '|' => true,
        '-' | '+' | '*' => followed_by_space_or_end(&line[1..]) || is_rule_or_underline(line),
        '=' | '_' => is_rule_or_underline(line),
        ':' => followed_by_space_or_end(&line[1..]),
        '`' => line.starts_with("```"),
        '~' => line.starts_with("~~~"),
        '0'..='9' => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            digits <= 9
                && line[digits..].starts_with(['.', ')'])
                && followed_by_space_or_end(&line[digits + 1..])
        }
        _ => false,
    }
}

fn followed_by_space_or_end(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with([' ', '\t'])
}

/// `***`, `- - -`, `===`, and friends.
fn is_rule_or_underline(line: &str) -> bool {
    let Some(marker) = line.chars().next() else {
        return false;
    };
    let mut count = 0;
    for c in line.chars() {
        if c == marker {
            count += 1;
        } else if !matches!(c, ' ' | '\t') {
            return false;
        }
    }
    // A single `=` or `-` is already a setext underline.
    count >= 3 || matches!(marker, '=' | '-')
}

/// Escape the trailing `#` run of ATX heading text so it isn't read as a
/// closing sequence.
pub(crate) fn escape_closing_hashes(text: &str) -> String {
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.len() == text.len()
        || without_hashes.ends_with('\\')
        || !(without_hashes.is_empty() || without_hashes.ends_with([' ', '\t']))
    {
        return text.to_owned();
    }
    format!("{without_hashes}\\{}", &text[without_hashes.len()..])
}
