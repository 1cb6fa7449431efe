//! Builds clause trees from parsed query expressions.
//!
//! Field names are resolved against canonical names only; anything else survives as an
//! unresolved field so the alias rewrite can pick it up. Bare values target contents.

use hunt_query::QueryExpr;
use tantivy::tokenizer::TextAnalyzer;

use crate::{
    analyzer::{AnalysisMode, build_query_analyzer, build_standard_analyzer, token_groups},
    clause::{BooleanClause, Clause, FieldRef, Occur, PhraseClause, TermClause},
    field::Field,
};

/// Default positional distance for phrases.
pub const DEFAULT_PHRASE_SLOP: u32 = 0;

/// Turns [`QueryExpr`] trees into [`Clause`] trees using one analysis mode.
pub struct ClauseBuilder {
    /// How values are split into terms.
    mode: AnalysisMode,
    /// Query-side code chain.
    tokenized: TextAnalyzer,
    /// Coarse lowercasing analyzer.
    standard: TextAnalyzer,
}

impl ClauseBuilder {
    /// Creates a builder for `mode`.
    pub fn new(mode: AnalysisMode, min_word_length: usize) -> Self {
        Self {
            mode,
            tokenized: build_query_analyzer(min_word_length),
            standard: build_standard_analyzer(),
        }
    }

    /// Builds the clause tree for `expr`.
    ///
    /// Returns `None` when analysis leaves no terms at all.
    pub fn build(&mut self, expr: &QueryExpr) -> Option<Clause> {
        self.build_in(expr, &FieldRef::Known(Field::Contents))
    }

    /// Builds `expr` with `field` as the default field.
    fn build_in(&mut self, expr: &QueryExpr, field: &FieldRef) -> Option<Clause> {
        match expr {
            QueryExpr::Term(text) => self.value(text, field, false),
            QueryExpr::Phrase(text) => self.value(text, field, true),
            QueryExpr::Not(inner) => {
                let inner = self.build_in(inner, field)?;
                Some(Clause::Boolean(BooleanClause::new().with(Occur::MustNot, inner)))
            }
            QueryExpr::And(exprs) => self.boolean(exprs, field, Occur::Must),
            QueryExpr::Or(exprs) => self.boolean(exprs, field, Occur::Should),
            QueryExpr::Field { name, expr } => self.build_in(expr, &FieldRef::parse(name)),
            QueryExpr::Boost { expr, factor } => {
                let clause = self.build_in(expr, field)?;
                let boost = clause.boost() * factor;
                Some(clause.with_boost(boost))
            }
        }
    }

    /// Builds a boolean whose positive children use `occur`.
    ///
    /// Negations become MUST_NOT children. A single positive child stands on its own.
    fn boolean(&mut self, exprs: &[QueryExpr], field: &FieldRef, occur: Occur) -> Option<Clause> {
        let mut boolean = BooleanClause::new();
        for expr in exprs {
            match expr {
                QueryExpr::Not(inner) => {
                    if let Some(clause) = self.build_in(inner, field) {
                        boolean.add(Occur::MustNot, clause);
                    }
                }
                other => {
                    if let Some(clause) = self.build_in(other, field) {
                        boolean.add(occur, clause);
                    }
                }
            }
        }
        match boolean.clauses.len() {
            0 => None,
            1 if boolean.clauses[0].0 != Occur::MustNot => {
                boolean.clauses.pop().map(|(_, clause)| clause)
            }
            _ => Some(Clause::Boolean(boolean)),
        }
    }

    /// Builds the clause for a single value.
    fn value(&mut self, text: &str, field: &FieldRef, quoted: bool) -> Option<Clause> {
        if !quoted && let Some(clause) = wildcard_clause(text, field) {
            return Some(clause);
        }
        if !field.is(Field::Contents) {
            return Some(Clause::Term(TermClause::new(field.clone(), text)));
        }
        let analyzer = match (self.mode, quoted) {
            (AnalysisMode::Keyword, false) => {
                return Some(Clause::Term(TermClause::new(field.clone(), text)));
            }
            (AnalysisMode::Tokenized, _) => &mut self.tokenized,
            _ => &mut self.standard,
        };
        let groups = token_groups(analyzer, text);
        from_groups(field, groups)
    }
}

/// Builds a prefix or wildcard clause when `text` contains glob characters.
///
/// A single trailing `*` is a prefix; anything else is a wildcard.
fn wildcard_clause(text: &str, field: &FieldRef) -> Option<Clause> {
    if !text.contains(['*', '?']) {
        return None;
    }
    let clause = match text.strip_suffix('*') {
        Some(stem) if !stem.is_empty() && !stem.contains(['*', '?']) => {
            Clause::Prefix(TermClause::new(field.clone(), stem))
        }
        _ => Clause::Wildcard(TermClause::new(field.clone(), text)),
    };
    Some(clause)
}

/// Turns analysed token groups into a clause.
///
/// One token is a term, one position with several tokens is an OR, several positions
/// form a phrase over the leading token of each position.
fn from_groups(field: &FieldRef, mut groups: Vec<Vec<String>>) -> Option<Clause> {
    match groups.len() {
        0 => None,
        1 => {
            let mut group = groups.pop()?;
            if group.len() == 1 {
                let text = group.pop()?;
                Some(Clause::Term(TermClause::new(field.clone(), text)))
            } else {
                Some(Clause::should(
                    group
                        .into_iter()
                        .map(|t| Clause::Term(TermClause::new(field.clone(), t))),
                ))
            }
        }
        _ => Some(Clause::Phrase(PhraseClause {
            field: field.clone(),
            terms: groups
                .into_iter()
                .filter_map(|group| group.into_iter().next())
                .collect(),
            slop: DEFAULT_PHRASE_SLOP,
            boost: 1.0,
        })),
    }
}

/// Turns an exact multi-word query into a phrase when every term targets contents.
///
/// Excluded clauses take no part in the phrase; they stay attached to it as exclusions.
/// Queries containing prefix, wildcard, fuzzy or range clauses, or terms of other fields,
/// are returned unchanged.
pub fn convert_to_phrase(clause: Clause) -> Clause {
    let mut terms = Vec::new();
    let mut excluded = Vec::new();
    if !collect_contents_terms(&clause, &mut terms, &mut excluded) || terms.is_empty() {
        return clause;
    }
    let phrase = Clause::Phrase(PhraseClause {
        field: Field::Contents.into(),
        terms,
        slop: DEFAULT_PHRASE_SLOP,
        boost: 1.0,
    });
    if excluded.is_empty() {
        return phrase;
    }
    let mut boolean = BooleanClause::new().with(Occur::Must, phrase);
    for clause in excluded {
        boolean.add(Occur::MustNot, clause);
    }
    Clause::Boolean(boolean)
}

/// Collects distinct contents terms in order, setting excluded clauses aside; false if a
/// clause cannot take part.
fn collect_contents_terms(
    clause: &Clause,
    terms: &mut Vec<String>,
    excluded: &mut Vec<Clause>,
) -> bool {
    let mut push = |text: &String| {
        if !terms.contains(text) {
            terms.push(text.clone());
        }
    };
    match clause {
        Clause::Term(t) if t.field.is(Field::Contents) => {
            push(&t.text);
            true
        }
        Clause::Phrase(p) if p.field.is(Field::Contents) => {
            p.terms.iter().for_each(push);
            true
        }
        Clause::Boolean(b) => b.clauses.iter().all(|(occur, child)| {
            if *occur == Occur::MustNot {
                excluded.push(child.clone());
                true
            } else {
                collect_contents_terms(child, terms, excluded)
            }
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use hunt_query::parse;

    use super::*;

    fn build(mode: AnalysisMode, query: &str) -> Option<String> {
        let expr = parse(query).unwrap()?;
        ClauseBuilder::new(mode, 1)
            .build(&expr)
            .map(|c| c.to_string())
    }

    #[test]
    fn keyword_keeps_whole_value() {
        assert_eq!(
            build(AnalysisMode::Keyword, "HashMap").as_deref(),
            Some("contents:HashMap")
        );
        assert_eq!(
            build(AnalysisMode::Keyword, "foo.bar").as_deref(),
            Some("contents:foo.bar")
        );
    }

    #[test]
    fn tokenized_stacks_identifier_parts() {
        assert_eq!(
            build(AnalysisMode::Tokenized, "HashMap").as_deref(),
            Some("contents:HashMap contents:Hash contents:Map")
        );
    }

    #[test]
    fn tokenized_multi_position_value_is_a_phrase() {
        assert_eq!(
            build(AnalysisMode::Tokenized, "\"new HashMap\"").as_deref(),
            Some("contents:\"new HashMap\"")
        );
    }

    #[test]
    fn standard_lowercases_words() {
        assert_eq!(
            build(AnalysisMode::Standard, "New HashMap").as_deref(),
            Some("+contents:new +contents:hashmap")
        );
    }

    #[test]
    fn other_fields_are_keyword() {
        assert_eq!(
            build(AnalysisMode::Tokenized, "ext:java proj:\"my app\"").as_deref(),
            Some("+ext:java +proj:my app")
        );
    }

    #[test]
    fn unknown_fields_survive() {
        assert_eq!(
            build(AnalysisMode::Tokenized, "project:core").as_deref(),
            Some("project:core")
        );
    }

    #[test]
    fn wildcards_and_prefixes() {
        assert_eq!(
            build(AnalysisMode::Tokenized, "get* *Reader a?c").as_deref(),
            Some("+contents:get* +contents:*Reader +contents:a?c")
        );
    }

    #[test]
    fn negation_and_boost() {
        assert_eq!(
            build(AnalysisMode::Keyword, "reader -test ext:java^2").as_deref(),
            Some("+contents:reader -contents:test +ext:java^2")
        );
        assert_eq!(
            build(AnalysisMode::Keyword, "-test").as_deref(),
            Some("-contents:test")
        );
    }

    #[test]
    fn or_groups() {
        assert_eq!(
            build(AnalysisMode::Keyword, "reader OR writer").as_deref(),
            Some("contents:reader contents:writer")
        );
    }

    #[test]
    fn analysis_can_remove_everything() {
        assert_eq!(build(AnalysisMode::Tokenized, "\"...\""), None);
    }

    #[test]
    fn phrase_conversion() {
        let expr = parse("new hashmap").unwrap().unwrap();
        let clause = ClauseBuilder::new(AnalysisMode::Standard, 1)
            .build(&expr)
            .unwrap();
        assert_eq!(
            convert_to_phrase(clause).to_string(),
            "contents:\"new hashmap\""
        );

        let expr = parse("new ext:java").unwrap().unwrap();
        let clause = ClauseBuilder::new(AnalysisMode::Standard, 1)
            .build(&expr)
            .unwrap();
        assert_eq!(
            convert_to_phrase(clause).to_string(),
            "+contents:new +ext:java"
        );
    }

    #[test]
    fn phrase_conversion_keeps_exclusions_out() {
        let expr = parse("new hashmap -old").unwrap().unwrap();
        let clause = ClauseBuilder::new(AnalysisMode::Standard, 1)
            .build(&expr)
            .unwrap();
        assert_eq!(
            convert_to_phrase(clause).to_string(),
            "+contents:\"new hashmap\" -contents:old"
        );

        let expr = parse("foo -bar").unwrap().unwrap();
        let clause = ClauseBuilder::new(AnalysisMode::Standard, 1)
            .build(&expr)
            .unwrap();
        assert_eq!(
            convert_to_phrase(clause).to_string(),
            "+contents:\"foo\" -contents:bar"
        );
    }
}
