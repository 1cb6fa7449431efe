//! Syntax highlighting and terminal colors for hunt.
//!
//! Search output shows matching source lines: each line is syntax highlighted by the file's
//! extension, and the byte spans of matched terms are marked on top. Configuration output
//! is highlighted as TOML.

#![warn(missing_docs)]

use std::ops::Range;

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// A syntax highlighter for terminal output.
pub struct Highlighter {
    /// Language definitions, including the two-face extras (TOML, properties, ...).
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// The theme in use.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter with the Dracula theme.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML content.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights `content` as the language of `extension` (or syntax name).
    ///
    /// Unknown languages come back as plain text followed by a color reset.
    pub fn highlight(&self, content: &str, extension: &str) -> String {
        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(self.syntax(extension), theme);
        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }

    /// Highlights one source line and marks the matched byte spans.
    ///
    /// Marked spans are shown bold on a highlight background instead of the syntax colors.
    /// Lines are highlighted without their neighbours, so multi-line constructs such as
    /// block comments may be colored as code.
    pub fn highlight_match_line(
        &self,
        line: &str,
        extension: &str,
        spans: &[Range<usize>],
    ) -> String {
        let spans = normalize_spans(line, spans);
        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(self.syntax(extension), theme);
        let ranges: Vec<(Style, &str)> = highlighter
            .highlight_line(line, &self.syntax_set)
            .unwrap_or_else(|_| vec![(Style::default(), line)]);

        let mut output = String::new();
        let mut offset = 0;
        for (style, piece) in ranges {
            let piece_range = offset..offset + piece.len();
            offset = piece_range.end;
            let mut cursor = piece_range.start;
            for span in spans
                .iter()
                .filter(|s| s.start < piece_range.end && s.end > piece_range.start)
            {
                let start = span.start.max(piece_range.start);
                let end = span.end.min(piece_range.end);
                if cursor < start {
                    output.push_str(&styled(style, &line[cursor..start]));
                }
                output.push_str(&mark(&line[start..end]));
                cursor = end;
            }
            if cursor < piece_range.end {
                output.push_str(&styled(style, &line[cursor..piece_range.end]));
            }
        }
        output.push_str(colors::RESET);
        output
    }

    /// Finds the syntax of an extension or language name, falling back to plain text.
    fn syntax(&self, extension: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_extension(extension)
            .or_else(|| self.syntax_set.find_syntax_by_name(extension))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

/// Renders one syntax-colored piece.
fn styled(style: Style, text: &str) -> String {
    as_24_bit_terminal_escaped(&[(style, text)], false)
}

/// Renders a matched span.
fn mark(text: &str) -> String {
    format!(
        "{}{}{}{text}{}",
        colors::RESET,
        colors::BOLD,
        colors::MATCH,
        colors::RESET
    )
}

/// Marks byte spans of `line` without syntax colors.
pub fn mark_matches(line: &str, spans: &[Range<usize>]) -> String {
    let mut output = String::new();
    let mut cursor = 0;
    for span in normalize_spans(line, spans) {
        output.push_str(&line[cursor..span.start]);
        output.push_str(&mark(&line[span.clone()]));
        cursor = span.end;
    }
    output.push_str(&line[cursor..]);
    output
}

/// Sorts and merges spans, clamped to `line` and snapped to char boundaries.
fn normalize_spans(line: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut sorted: Vec<Range<usize>> = spans
        .iter()
        .map(|s| floor_boundary(line, s.start)..ceil_boundary(line, s.end))
        .filter(|s| s.start < s.end)
        .collect();
    sorted.sort_by_key(|s| s.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Largest char boundary at or before `index`.
fn floor_boundary(line: &str, index: usize) -> usize {
    let mut index = index.min(line.len());
    while !line.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary at or after `index`.
fn ceil_boundary(line: &str, index: usize) -> usize {
    let mut index = index.min(line.len());
    while !line.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// ANSI color codes for terminal output.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (headers and file paths).
    pub const CYAN: &str = "\x1b[36m";
    /// Green text (success).
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow text (warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Red text (errors).
    pub const RED: &str = "\x1b[31m";
    /// Black on yellow (matched terms).
    pub const MATCH: &str = "\x1b[30;43m";
    /// Dim text (secondary information).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats a header with bold cyan styling.
pub fn header(text: &str) -> String {
    format!("{}{}{}{}", colors::BOLD, colors::CYAN, text, colors::RESET)
}

/// Formats an indexed file path: the project segment bold, the rest cyan.
pub fn file_path(path: &str) -> String {
    let (project, rest) = path
        .strip_prefix('/')
        .and_then(|p| p.split_once('/'))
        .unwrap_or((path, ""));
    if rest.is_empty() {
        return format!("{}{}{}", colors::CYAN, path, colors::RESET);
    }
    format!(
        "{}/{project}/{}{}{rest}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        colors::RESET
    )
}

/// Formats text as dimmed.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a success message (green).
pub fn success(text: &str) -> String {
    format!("{}{}{}", colors::GREEN, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Formats text as an error (red).
pub fn error(text: &str) -> String {
    format!("{}{}{}", colors::RED, text, colors::RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_is_colored() {
        let output = Highlighter::new().highlight_toml("[search]\nlimit = 25\n");
        assert!(output.contains("\x1b[38;2;"));
        assert!(output.ends_with(colors::RESET));
    }

    #[test]
    fn unknown_language_keeps_text() {
        let output = Highlighter::new().highlight("plain words", "no-such-language");
        assert!(output.contains("plain words"));
    }

    #[test]
    fn extras_include_config_languages() {
        let syntaxes = extra_syntaxes();
        assert!(syntaxes.find_syntax_by_extension("toml").is_some());
        assert!(syntaxes.find_syntax_by_extension("java").is_some());
    }

    #[test]
    fn match_line_marks_spans() {
        let line = "Map<String, Integer> map = new HashMap<>();";
        let start = line.find("HashMap").unwrap();
        let output = Highlighter::new().highlight_match_line(line, "java", &[start..start + 7]);
        assert!(output.contains(colors::MATCH));
        assert_eq!(strip_ansi(&output), line);
    }

    fn strip_ansi(text: &str) -> String {
        let mut plain = String::new();
        let mut in_escape = false;
        for c in text.chars() {
            match c {
                '\x1b' => in_escape = true,
                'm' if in_escape => in_escape = false,
                _ if in_escape => {}
                _ => plain.push(c),
            }
        }
        plain
    }

    #[test]
    fn spans_are_merged_and_clamped() {
        assert_eq!(normalize_spans("abcdef", &[4..10, 0..2, 1..3]), vec![0..3, 4..6]);
        // 'é' is two bytes; a span ending inside it is widened.
        assert_eq!(normalize_spans("café!", &[3..4]), vec![3..5]);
        assert!(normalize_spans("abc", &[2..2, 5..9]).is_empty());
    }

    #[test]
    fn plain_marking() {
        let output = mark_matches("find the needle here", &[9..15]);
        assert!(output.starts_with("find the "));
        assert!(output.ends_with(" here"));
        assert_eq!(strip_ansi(&output), "find the needle here");
    }

    #[test]
    fn file_path_styling() {
        let styled = file_path("/core/src/App.java");
        assert!(styled.contains("/core/"));
        assert!(styled.contains("src/App.java"));
        assert!(file_path("loose").contains("loose"));
        assert!(header("Results").contains(colors::CYAN));
        assert!(dim("x").starts_with(colors::DIM));
    }
}
