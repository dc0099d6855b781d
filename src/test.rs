use super::*;

fn format(input: &str) -> String {
    MarkdownFormatter::default().format(input).unwrap()
}

fn format_with(formatter: MarkdownFormatter, input: &str) -> String {
    formatter.format(input).unwrap()
}

/// Format `input`, check the result, and check that formatting it again
/// changes nothing.
#[track_caller]
fn check(formatter: MarkdownFormatter, input: &str, expected: &str) {
    let output = format_with(formatter.clone(), input);
    assert_eq!(output, expected);
    assert_eq!(format_with(formatter, &output), expected, "not idempotent");
}

#[test]
fn empty_input_gives_empty_output() {
    assert_eq!(format(""), "");
    assert_eq!(format("\n\n  \n"), "");
}

#[test]
fn blocks_are_separated_by_one_blank_line() {
    check(
        MarkdownFormatter::default(),
        "Some text\nacross lines.   \n\n\n\nNext paragraph.",
        "Some text\nacross lines.\n\nNext paragraph.\n",
    );
}

#[test]
fn hard_breaks_use_a_backslash() {
    check(
        MarkdownFormatter::default(),
        "first  \nsecond\n",
        "first\\\nsecond\n",
    );
}

#[test]
fn headings_default_to_atx() {
    check(
        MarkdownFormatter::default(),
        "Title\n=====\n\nSub\n---\n\n### Deep ###\n",
        "# Title\n\n## Sub\n\n### Deep\n",
    );
}

#[test]
fn setext_headings_for_levels_one_and_two() {
    check(
        MarkdownFormatter::default().setext_headings(true),
        "# Title\n\n## Sub-title\n\n### Deep\n",
        "Title\n=====\n\nSub-title\n---------\n\n### Deep\n",
    );
}

#[test]
fn setext_headings_fall_back_to_atx() {
    check(
        MarkdownFormatter::default().setext_headings(true),
        "# 1. Not a list\n\n## A\n",
        "# 1. Not a list\n\nA\n---\n",
    );
}

#[test]
fn heading_attributes_are_kept() {
    check(
        MarkdownFormatter::default(),
        "#   Title   {#intro .lead}\n",
        "# Title {#intro .lead}\n",
    );
}

#[test]
fn emphasis_markers_are_canonical() {
    check(
        MarkdownFormatter::default(),
        "_em_ and __strong__ and ~~gone~~\n",
        "*em* and **strong** and ~~gone~~\n",
    );
}

#[test]
fn code_spans_get_the_shortest_fence() {
    check(
        MarkdownFormatter::default(),
        "Use ```` a`b ```` here\n",
        "Use ``a`b`` here\n",
    );
}

#[test]
fn escapes_and_entities_survive() {
    check(
        MarkdownFormatter::default(),
        "\\# not a heading\n\n1\\. not a list\n\n&copy; 2024\n",
        "\\# not a heading\n\n1\\. not a list\n\n&copy; 2024\n",
    );
}

#[test]
fn bullet_lists_use_hyphens() {
    check(
        MarkdownFormatter::default(),
        "* one\n* two\n    + nested\n",
        "- one\n- two\n  - nested\n",
    );
}

#[test]
fn ordered_lists_are_renumbered() {
    check(
        MarkdownFormatter::default(),
        "3) three\n7) four\n",
        "3. three\n4. four\n",
    );
}

#[test]
fn loose_lists_stay_loose() {
    check(
        MarkdownFormatter::default(),
        "- a\n\n- b\n  continued\n",
        "- a\n\n- b\n  continued\n",
    );
}

#[test]
fn adjacent_lists_stay_apart() {
    check(
        MarkdownFormatter::default(),
        "- a\n- b\n\n\n+ c\n",
        "- a\n- b\n\n* c\n",
    );
    check(
        MarkdownFormatter::default(),
        "1. a\n\n\n1) b\n",
        "1. a\n\n1) b\n",
    );
}

#[test]
fn empty_items_keep_their_marker() {
    check(MarkdownFormatter::default(), "-\n- b\n", "-\n- b\n");
}

#[test]
fn task_lists() {
    check(
        MarkdownFormatter::default(),
        "* [ ] todo\n* [X] done\n",
        "- [ ] todo\n- [x] done\n",
    );
}

#[test]
fn block_quotes() {
    check(
        MarkdownFormatter::default(),
        "> quoted\ncontinued lazily\n>\n>second\n",
        "> quoted\n> continued lazily\n>\n> second\n",
    );
    check(MarkdownFormatter::default(), "- > quote\n", "- > quote\n");
}

#[test]
fn code_blocks_are_fenced() {
    check(
        MarkdownFormatter::default(),
        "    indented code\n",
        "```\nindented code\n```\n",
    );
    check(
        MarkdownFormatter::default(),
        "~~~rust\nlet s = \"```\";\n~~~\n",
        "````rust\nlet s = \"```\";\n````\n",
    );
}

#[test]
fn thematic_breaks() {
    check(
        MarkdownFormatter::default(),
        "a\n\n* * *\n\nb\n",
        "a\n\n___\n\nb\n",
    );
}

#[test]
fn thematic_break_opening_an_alternate_bullet_item() {
    check(
        MarkdownFormatter::default(),
        "- a\n\n+ ***\n",
        "- a\n\n* ___\n",
    );
}

#[test]
fn tables_are_aligned() {
    check(
        MarkdownFormatter::default(),
        "|a|b|\n|-|:-:|\n|long cell|x|\n",
        "| a         |  b  |\n| --------- | :-: |\n| long cell |  x  |\n",
    );
}

#[test]
fn pipes_in_table_code_spans_are_escaped() {
    check(
        MarkdownFormatter::default(),
        "| a | b |\n|---|---|\n| `x\\|y` | z |\n",
        "| a      | b   |\n| ------ | --- |\n| `x\\|y` | z   |\n",
    );
}

#[test]
fn inline_links_and_autolinks() {
    check(
        MarkdownFormatter::default(),
        "[Rust](https://www.rust-lang.org  'The Rust site') and <https://example.com> and ![img](<a b.png>)\n",
        "[Rust](https://www.rust-lang.org \"The Rust site\") and <https://example.com> and ![img](<a b.png>)\n",
    );
}

#[test]
fn reference_definitions_move_to_the_end() {
    check(
        MarkdownFormatter::default(),
        "See [the book][Book] and [Book][] and [Book].\n\n[Book]:   https://doc.rust-lang.org/book/  'TRPL'\n\nMore text.\n",
        "See [the book][Book] and [Book][] and [Book].\n\nMore text.\n\n[Book]: https://doc.rust-lang.org/book/ \"TRPL\"\n",
    );
}

#[test]
fn footnotes() {
    check(
        MarkdownFormatter::default(),
        "Text[^1].\n\n[^1]:   The note.\n",
        "Text[^1].\n\n[^1]: The note.\n",
    );
}

#[test]
fn definition_lists() {
    check(
        MarkdownFormatter::default(),
        "Term\n:   Definition\n",
        "Term\n: Definition\n",
    );
}

#[test]
fn html_is_kept_by_default() {
    check(
        MarkdownFormatter::default(),
        "<div>\nblock\n</div>\n\nText with <b>inline</b> html.\n",
        "<div>\nblock\n</div>\n\nText with <b>inline</b> html.\n",
    );
}

#[test]
fn skip_html_drops_blocks_and_inline_html() {
    let output = format_with(
        MarkdownFormatter::default().skip_html(true),
        "<div>\nblock\n</div>\n\nText with <b>inline</b> html.\n",
    );
    assert_eq!(output, "Text with inline html.\n");
}

#[test]
fn wrapping_at_max_width() {
    check(
        MarkdownFormatter::default().max_width(Some(20)),
        "The quick brown fox jumps over\nthe lazy dog.\n",
        "The quick brown fox\njumps over the lazy\ndog.\n",
    );
}

#[test]
fn wrapping_accounts_for_indentation() {
    check(
        MarkdownFormatter::default().max_width(Some(24)),
        "- The quick brown fox jumps over the lazy dog.\n",
        "- The quick brown fox\n  jumps over the lazy\n  dog.\n",
    );
}

#[test]
fn wrapping_folds_multi_line_inline_html() {
    check(
        MarkdownFormatter::default().max_width(Some(80)),
        "Text <span\nclass=\"x\">b</span> end\n",
        "Text <span class=\"x\">b</span> end\n",
    );
}

#[test]
fn wrapping_folds_multi_line_link_titles() {
    check(
        MarkdownFormatter::default(),
        "[x](/u \"line one\nline two\")\n",
        "[x](/u \"line one\nline two\")\n",
    );
    check(
        MarkdownFormatter::default().max_width(Some(80)),
        "[x](/u \"line one\nline two\")\n",
        "[x](/u \"line one line two\")\n",
    );
}

#[test]
fn wrapping_keeps_hard_breaks() {
    check(
        MarkdownFormatter::default().max_width(Some(80)),
        "first  \nsecond\\\nthird\n",
        "first\\\nsecond\\\nthird\n",
    );
}

#[test]
fn wrapping_never_breaks_a_link_destination() {
    check(
        MarkdownFormatter::default().max_width(Some(20)),
        "See [the doc](<my long file name here.md>) now.\n",
        "See [the\ndoc](<my long file name here.md>)\nnow.\n",
    );
}

#[test]
fn wrapped_lines_stay_within_the_width() {
    let input = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
                 tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, \
                 quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo.\n";
    let output = format_with(MarkdownFormatter::new(Config::wrapped()), input);
    assert!(output.lines().count() > 1);
    for line in output.lines() {
        assert!(line.len() <= DEFAULT_MAX_WIDTH, "{line:?}");
    }
}

#[test]
fn explicit_null_front_matter_is_kept() {
    let mut output = Vec::new();
    rewrite_document("---\nnull\n---\nBody\n", &Config::default(), &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "---\nnull\n---\nBody\n");
}

#[test]
fn whole_document() {
    let input = r###"Project Title
=============

Intro paragraph with _emphasis_
and a second line.

* first
* second
    1) nested one
    2) nested two

>Quote line

```rust
fn main() {}
```
"###;
    let output = format(input);
    insta::assert_snapshot!(output, @r###"
    # Project Title

    Intro paragraph with *emphasis*
    and a second line.

    - first
    - second
      1. nested one
      2. nested two

    > Quote line

    ```rust
    fn main() {}
    ```
    "###);
    assert_eq!(format(&output), output);
}
