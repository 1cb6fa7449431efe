//! Code-aware tokenizer chain.
//!
//! Source text is first cut into coarse tokens by [`CodeTokenizer`], then each token is
//! decomposed by a series of [`SplitFilter`]s. A split filter emits the original token followed
//! by its parts, all at the same position, so both `AbstractBaseClass` and `Base` match while
//! phrase distances stay unchanged. [`LengthFilter`] drops tokens outside a character range.
//!
//! The splitting functions themselves are pure and exposed for reuse.

use std::{collections::VecDeque, str::CharIndices};

use tantivy::tokenizer::{Token, TokenFilter, TokenStream, Tokenizer};

/// Longest token kept by the chain, in characters.
pub const MAX_TOKEN_LENGTH: usize = 128;

/// Returns true for characters that belong to a coarse token.
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '\'' | '.' | '$' | '@' | '#')
}

/// Characters trimmed from both ends of a coarse token (sentence dots, quotes).
fn is_edge_char(c: char) -> bool {
    matches!(c, '.' | '\'')
}

/// Coarse segmentation on whitespace and punctuation.
///
/// Dots, underscores and apostrophes stay inside tokens so that qualified names and
/// identifiers survive intact; a trailing sentence dot is trimmed.
#[derive(Clone, Default)]
pub struct CodeTokenizer {
    /// Token buffer reused between streams.
    token: Token,
}

/// Token stream produced by [`CodeTokenizer`].
pub struct CodeTokenStream<'a> {
    /// Input text.
    text: &'a str,
    /// Remaining characters.
    chars: CharIndices<'a>,
    /// Current token.
    token: &'a mut Token,
}

impl Tokenizer for CodeTokenizer {
    type TokenStream<'a> = CodeTokenStream<'a>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> CodeTokenStream<'a> {
        self.token.reset();
        CodeTokenStream {
            text,
            chars: text.char_indices(),
            token: &mut self.token,
        }
    }
}

impl CodeTokenStream<'_> {
    /// Consumes characters up to the end of the current token and returns its end offset.
    fn token_end(&mut self) -> usize {
        self.chars
            .by_ref()
            .find(|(_, c)| !is_token_char(*c))
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}

impl TokenStream for CodeTokenStream<'_> {
    fn advance(&mut self) -> bool {
        self.token.text.clear();
        while let Some((start, c)) = self.chars.next() {
            if !is_token_char(c) {
                continue;
            }
            let end = self.token_end();
            let raw = &self.text[start..end];
            let trimmed = raw.trim_matches(is_edge_char);
            if trimmed.is_empty() {
                continue;
            }
            let offset_from = start + raw.len() - raw.trim_start_matches(is_edge_char).len();
            self.token.position = self.token.position.wrapping_add(1);
            self.token.offset_from = offset_from;
            self.token.offset_to = offset_from + trimmed.len();
            self.token.text.push_str(trimmed);
            return true;
        }
        false
    }

    fn token(&self) -> &Token {
        self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        self.token
    }
}

/// Splits on every character that is not alphanumeric, `_`, `'` or `.`.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '\'' | '.')))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Splits qualified names on `.`.
pub fn split_dots(text: &str) -> Vec<&str> {
    text.split('.').filter(|part| !part.is_empty()).collect()
}

/// Splits identifiers at camel-case humps and underscores.
///
/// A boundary falls before an uppercase letter that follows a lowercase letter or that is
/// followed by one, so `getHTTPResponse` yields `get`, `HTTP`, `Response`.
pub fn split_camel_case(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for segment in text.split('_') {
        let chars: Vec<(usize, char)> = segment.char_indices().collect();
        let mut start = 0;
        for (i, &(offset, c)) in chars.iter().enumerate().skip(1) {
            if !c.is_uppercase() {
                continue;
            }
            let after_lower = chars[i - 1].1.is_lowercase();
            let before_lower = chars.get(i + 1).is_some_and(|&(_, next)| next.is_lowercase());
            if after_lower || before_lower {
                parts.push(&segment[start..offset]);
                start = offset;
            }
        }
        parts.push(&segment[start..]);
    }
    parts.retain(|part| !part.is_empty());
    parts
}

/// The decomposition applied by a [`SplitFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splitter {
    /// [`split_words`].
    Word,
    /// [`split_dots`].
    Dot,
    /// [`split_camel_case`].
    CamelCase,
}

impl Splitter {
    /// Splits `text` into its parts.
    pub fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Word => split_words(text),
            Self::Dot => split_dots(text),
            Self::CamelCase => split_camel_case(text),
        }
    }
}

/// Emits every token followed by its parts at the same position.
///
/// Parts are only emitted when a real split occurred. Part offsets point at the first
/// occurrence of the part inside the original token.
#[derive(Debug, Clone, Copy)]
pub struct SplitFilter {
    /// How tokens are decomposed.
    splitter: Splitter,
}

impl SplitFilter {
    /// Creates a filter using the given splitter.
    pub fn new(splitter: Splitter) -> Self {
        Self { splitter }
    }
}

impl TokenFilter for SplitFilter {
    type Tokenizer<T: Tokenizer> = SplitFilterWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> SplitFilterWrapper<T> {
        SplitFilterWrapper {
            splitter: self.splitter,
            inner: tokenizer,
        }
    }
}

/// Tokenizer wrapped by a [`SplitFilter`].
#[derive(Clone)]
pub struct SplitFilterWrapper<T> {
    /// How tokens are decomposed.
    splitter: Splitter,
    /// Upstream tokenizer.
    inner: T,
}

impl<T: Tokenizer> Tokenizer for SplitFilterWrapper<T> {
    type TokenStream<'a> = SplitFilterStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        SplitFilterStream {
            splitter: self.splitter,
            tail: self.inner.token_stream(text),
            pending: VecDeque::new(),
            current: Token::default(),
        }
    }
}

/// Token stream of a [`SplitFilter`].
pub struct SplitFilterStream<T> {
    /// How tokens are decomposed.
    splitter: Splitter,
    /// Upstream stream.
    tail: T,
    /// Parts of the last upstream token not yet emitted.
    pending: VecDeque<Token>,
    /// Token currently exposed.
    current: Token,
}

impl<T: TokenStream> SplitFilterStream<T> {
    /// Queues the parts of the current upstream token.
    fn queue_parts(&mut self) {
        let original = self.tail.token();
        let parts = self.splitter.split(&original.text);
        let unsplit = match parts.as_slice() {
            [] => true,
            [only] => *only == original.text,
            _ => false,
        };
        if unsplit {
            return;
        }
        for part in parts {
            let start = original.offset_from + original.text.find(part).unwrap_or(0);
            self.pending.push_back(Token {
                offset_from: start,
                offset_to: start + part.len(),
                position: original.position,
                text: part.to_string(),
                position_length: 1,
            });
        }
    }
}

impl<T: TokenStream> TokenStream for SplitFilterStream<T> {
    fn advance(&mut self) -> bool {
        if let Some(part) = self.pending.pop_front() {
            self.current = part;
            return true;
        }
        if !self.tail.advance() {
            return false;
        }
        self.current.clone_from(self.tail.token());
        self.queue_parts();
        true
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }
}

/// Drops tokens whose character count falls outside `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct LengthFilter {
    /// Shortest kept token.
    min: usize,
    /// Longest kept token.
    max: usize,
}

impl LengthFilter {
    /// Keeps tokens of at least `min` characters and at most [`MAX_TOKEN_LENGTH`].
    pub fn new(min: usize) -> Self {
        Self {
            min,
            max: MAX_TOKEN_LENGTH,
        }
    }
}

impl TokenFilter for LengthFilter {
    type Tokenizer<T: Tokenizer> = LengthFilterWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> LengthFilterWrapper<T> {
        LengthFilterWrapper {
            filter: self,
            inner: tokenizer,
        }
    }
}

/// Tokenizer wrapped by a [`LengthFilter`].
#[derive(Clone)]
pub struct LengthFilterWrapper<T> {
    /// Length bounds.
    filter: LengthFilter,
    /// Upstream tokenizer.
    inner: T,
}

impl<T: Tokenizer> Tokenizer for LengthFilterWrapper<T> {
    type TokenStream<'a> = LengthFilterStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        LengthFilterStream {
            filter: self.filter,
            tail: self.inner.token_stream(text),
        }
    }
}

/// Token stream of a [`LengthFilter`].
pub struct LengthFilterStream<T> {
    /// Length bounds.
    filter: LengthFilter,
    /// Upstream stream.
    tail: T,
}

impl<T: TokenStream> TokenStream for LengthFilterStream<T> {
    fn advance(&mut self) -> bool {
        while self.tail.advance() {
            let len = self.tail.token().text.chars().count();
            if (self.filter.min..=self.filter.max).contains(&len) {
                return true;
            }
        }
        false
    }

    fn token(&self) -> &Token {
        self.tail.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.tail.token_mut()
    }
}

#[cfg(test)]
mod test {
    use tantivy::tokenizer::TextAnalyzer;

    use super::*;

    /// Collects `(text, position)` pairs from an analyzer.
    fn tokens(analyzer: &mut TextAnalyzer, text: &str) -> Vec<(String, usize)> {
        let mut stream = analyzer.token_stream(text);
        let mut out = Vec::new();
        while stream.advance() {
            let token = stream.token();
            out.push((token.text.clone(), token.position));
        }
        out
    }

    /// Collects token texts only.
    fn texts(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
        tokens(analyzer, text).into_iter().map(|(t, _)| t).collect()
    }

    fn chain() -> TextAnalyzer {
        TextAnalyzer::builder(CodeTokenizer::default())
            .filter(SplitFilter::new(Splitter::Word))
            .filter(SplitFilter::new(Splitter::Dot))
            .filter(SplitFilter::new(Splitter::CamelCase))
            .filter(LengthFilter::new(1))
            .build()
    }

    #[test]
    fn base_tokenizer_splits_on_punctuation() {
        let mut analyzer = TextAnalyzer::from(CodeTokenizer::default());
        assert_eq!(
            texts(&mut analyzer, "foo-bar (baz) end. next_one"),
            vec!["foo", "bar", "baz", "end", "next_one"]
        );
    }

    #[test]
    fn base_tokenizer_keeps_qualified_names() {
        let mut analyzer = TextAnalyzer::from(CodeTokenizer::default());
        let mut stream = analyzer.token_stream("import com.app.Foo;");
        assert!(stream.advance());
        assert_eq!(stream.token().text, "import");
        assert!(stream.advance());
        assert_eq!(stream.token().text, "com.app.Foo");
        assert_eq!(stream.token().offset_from, 7);
        assert_eq!(stream.token().offset_to, 18);
        assert!(!stream.advance());
    }

    #[test]
    fn split_functions() {
        assert_eq!(split_words("a$b=c"), vec!["a", "b", "c"]);
        assert_eq!(split_words("it's.ok"), vec!["it's.ok"]);
        assert_eq!(split_dots("com.app.Foo"), vec!["com", "app", "Foo"]);
        assert_eq!(
            split_camel_case("AbstractBaseClass"),
            vec!["Abstract", "Base", "Class"]
        );
        assert_eq!(
            split_camel_case("getHTTPResponse"),
            vec!["get", "HTTP", "Response"]
        );
        assert_eq!(split_camel_case("MAX_VALUE"), vec!["MAX", "VALUE"]);
        assert_eq!(split_camel_case("utf8Decoder"), vec!["utf8", "Decoder"]);
    }

    #[test]
    fn single_part_is_not_duplicated() {
        let mut analyzer = chain();
        assert_eq!(tokens(&mut analyzer, "Foo"), vec![("Foo".to_string(), 0)]);
        assert_eq!(texts(&mut analyzer, "ABC"), vec!["ABC"]);
    }

    #[test]
    fn camel_case_keeps_original_at_same_position() {
        let mut analyzer = chain();
        assert_eq!(
            tokens(&mut analyzer, "AbstractBaseClass"),
            vec![
                ("AbstractBaseClass".to_string(), 0),
                ("Abstract".to_string(), 0),
                ("Base".to_string(), 0),
                ("Class".to_string(), 0),
            ]
        );
    }

    #[test]
    fn dot_split_contains_parts_and_original() {
        let mut analyzer = chain();
        let out = texts(&mut analyzer, "com.app.Foo");
        assert_eq!(out[0], "com.app.Foo");
        for part in ["com", "app", "Foo"] {
            assert!(out.iter().any(|t| t == part), "missing {part} in {out:?}");
        }
    }

    #[test]
    fn part_offsets_point_into_source() {
        let mut analyzer = chain();
        let text = "new HashMap()";
        let mut stream = analyzer.token_stream(text);
        let mut seen = Vec::new();
        while stream.advance() {
            let token = stream.token();
            seen.push((token.text.clone(), token.position));
            assert_eq!(&text[token.offset_from..token.offset_to], token.text);
        }
        assert_eq!(
            seen,
            vec![
                ("new".to_string(), 0),
                ("HashMap".to_string(), 1),
                ("Hash".to_string(), 1),
                ("Map".to_string(), 1),
            ]
        );
    }

    #[test]
    fn length_filter_bounds() {
        let mut analyzer = TextAnalyzer::builder(CodeTokenizer::default())
            .filter(LengthFilter::new(3))
            .build();
        let long = "x".repeat(MAX_TOKEN_LENGTH + 1);
        let text = format!("ab abc {long} abcd");
        assert_eq!(texts(&mut analyzer, &text), vec!["abc", "abcd"]);
    }
}
