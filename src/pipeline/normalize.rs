//! Normalisation: surface-level spacing cleanup before pandoc sees the text.
//!
//! pandoc is strict about blank lines: a heading glued to the paragraph below
//! it, or a `---` rule directly under a line of text (which pandoc reads as a
//! setext heading), renders differently from what the author meant. Hand-
//! written and LLM-generated Markdown is full of such spacing slips.
//!
//! This module applies five regex rewrites that put exactly one blank line
//! around headings, code fences and horizontal rules. The rules are purely
//! textual. They do not know about code blocks, so a `# comment` or a `---`
//! inside a fence is spaced like any other. The output is a best-effort
//! cleanup, not a validated Markdown transformation.
//!
//! ## Rule Order
//!
//! Later rules see the output of earlier ones. Heading spacing can create
//! blank-line runs, so collapsing runs comes third. Fence and rule spacing
//! come last and never create runs longer than one blank line themselves.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to the content of a Markdown document.
///
/// Rules (applied in order):
/// 1. Blank line after a heading when the next line is text
/// 2. Blank line before a heading when the previous line is text
/// 3. Collapse 3+ consecutive newlines down to 2
/// 4. Blank line after a fenced code block when the next line is text
/// 5. Exactly one blank line on each side of a `---` rule
pub fn normalize_markdown(input: &str) -> String {
    let s = space_after_headings(input);
    let s = space_before_headings(&s);
    let s = collapse_blank_lines(&s);
    let s = space_after_code_blocks(&s);
    space_around_rules(&s)
}

// ── Rule 1: Blank line after headings ───────────────────────────────────────
//
// `\s+` may span a newline, and the `#` need not start the line. Both are
// kept: the rule is a pattern, not a parser.

static RE_HEADING_THEN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(#+\s+.*?)\n([^#\n])").unwrap());

fn space_after_headings(input: &str) -> String {
    RE_HEADING_THEN_TEXT
        .replace_all(input, "${1}\n\n${2}")
        .into_owned()
}

// ── Rule 2: Blank line before headings ──────────────────────────────────────
//
// Requires a non-newline character before the line break, so a heading on
// the first line is left alone.

static RE_TEXT_THEN_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\n])\n(#+\s+)").unwrap());

fn space_before_headings(input: &str) -> String {
    RE_TEXT_THEN_HEADING
        .replace_all(input, "${1}\n\n${2}")
        .into_owned()
}

// ── Rule 3: Collapse blank-line runs ────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 4: Blank line after code fences ────────────────────────────────────
//
// Lazy match from one ``` to the next. When a closing fence is already
// followed by a blank line the match keeps extending to a later fence, which
// can pair a closing fence with the next opening one and put the blank line
// inside the following block.

static RE_FENCE_THEN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(```.*?```)\n([^#\n])").unwrap());

fn space_after_code_blocks(input: &str) -> String {
    RE_FENCE_THEN_TEXT
        .replace_all(input, "${1}\n\n${2}")
        .into_owned()
}

// ── Rule 5: Blank lines around horizontal rules ─────────────────────────────
//
// Absorbs whatever newlines already surround the rule so the result is one
// blank line per side, never more.

static RE_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+---\n+").unwrap());

fn space_around_rules(input: &str) -> String {
    RE_RULE.replace_all(input, "\n\n---\n\n").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
