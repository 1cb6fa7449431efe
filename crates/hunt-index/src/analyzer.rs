//! Text analysis for indexing and querying.
//!
//! The index side runs the full chain from [`crate::tokenizer`] and lowercases the result:
//! 1. `CodeTokenizer` - coarse split on whitespace and punctuation
//! 2. `SplitFilter(Word)` - non-word characters
//! 3. `SplitFilter(Dot)` - qualified names
//! 4. `SplitFilter(CamelCase)` - identifier humps
//! 5. `LengthFilter` - drops tokens outside `min_word_length..=128` characters
//! 6. `LowerCaser`
//!
//! The query side runs the same chain without lowercasing, because identifier case drives
//! query rewriting. Lowercasing happens later, as a rewrite of the clause tree.

use std::collections::BTreeMap;

use tantivy::tokenizer::{LowerCaser, TextAnalyzer, TokenStream};

use crate::tokenizer::{CodeTokenizer, LengthFilter, SplitFilter, Splitter};

/// Name of the contents tokenizer registered with Tantivy.
pub const CODE_TOKENIZER: &str = "hunt_code";

/// How a query value is turned into terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// The whole value is a single term.
    Keyword,
    /// Coarse tokens, lowercased. Used for exact multi-word searches.
    Standard,
    /// The query-side chain for contents; keyword for every other field.
    Tokenized,
}

/// Builds the analyzer used when indexing file contents.
pub fn build_index_analyzer(min_word_length: usize) -> TextAnalyzer {
    TextAnalyzer::builder(CodeTokenizer::default())
        .filter(SplitFilter::new(Splitter::Word))
        .filter(SplitFilter::new(Splitter::Dot))
        .filter(SplitFilter::new(Splitter::CamelCase))
        .filter(LengthFilter::new(min_word_length))
        .filter(LowerCaser)
        .build()
}

/// Builds the analyzer applied to query text searched in the contents field.
pub fn build_query_analyzer(min_word_length: usize) -> TextAnalyzer {
    TextAnalyzer::builder(CodeTokenizer::default())
        .filter(SplitFilter::new(Splitter::Word))
        .filter(SplitFilter::new(Splitter::Dot))
        .filter(SplitFilter::new(Splitter::CamelCase))
        .filter(LengthFilter::new(min_word_length))
        .build()
}

/// Builds the coarse lowercasing analyzer used for exact multi-word searches.
pub fn build_standard_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(CodeTokenizer::default())
        .filter(LowerCaser)
        .build()
}

/// Runs `text` through `analyzer` and groups tokens sharing a position.
///
/// Groups keep token order; duplicate texts within a group are dropped.
pub fn token_groups(analyzer: &mut TextAnalyzer, text: &str) -> Vec<Vec<String>> {
    let mut groups: Vec<(usize, Vec<String>)> = Vec::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        let token = stream.token();
        match groups.last_mut() {
            Some((position, group)) if *position == token.position => {
                if !group.contains(&token.text) {
                    group.push(token.text.clone());
                }
            }
            _ => groups.push((token.position, vec![token.text.clone()])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Maps each indexed term of `text` to the byte offsets where it starts.
///
/// Uses the index-side chain, so terms are lowercase and include identifier parts.
pub fn extract_text_terms(text: &str, min_word_length: usize) -> BTreeMap<String, Vec<usize>> {
    let mut analyzer = build_index_analyzer(min_word_length);
    let mut terms: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        let token = stream.token();
        let offsets = terms.entry(token.text.clone()).or_default();
        if !offsets.contains(&token.offset_from) {
            offsets.push(token.offset_from);
        }
    }
    terms
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_analyzer_lowercases_parts() {
        let mut analyzer = build_index_analyzer(1);
        assert_eq!(
            token_groups(&mut analyzer, "new HashMap"),
            vec![vec!["new"], vec!["hashmap", "hash", "map"]]
        );
    }

    #[test]
    fn query_analyzer_keeps_case() {
        let mut analyzer = build_query_analyzer(1);
        assert_eq!(
            token_groups(&mut analyzer, "HashMap"),
            vec![vec!["HashMap", "Hash", "Map"]]
        );
    }

    #[test]
    fn standard_analyzer_does_not_split_identifiers() {
        let mut analyzer = build_standard_analyzer();
        assert_eq!(
            token_groups(&mut analyzer, "new HashMap<String>"),
            vec![vec!["new"], vec!["hashmap"], vec!["string"]]
        );
    }

    #[test]
    fn min_word_length_applies() {
        let mut analyzer = build_index_analyzer(3);
        assert_eq!(
            token_groups(&mut analyzer, "a ab abc"),
            vec![vec!["abc".to_string()]]
        );
    }

    #[test]
    fn extract_text_terms_offsets() {
        let terms = extract_text_terms("Foo foo.bar", 1);
        assert_eq!(terms.get("foo"), Some(&vec![0, 4]));
        assert_eq!(terms.get("bar"), Some(&vec![8]));
        assert_eq!(terms.get("foo.bar"), Some(&vec![4]));
    }
}
