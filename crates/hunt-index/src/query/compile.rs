//! Clause compiler.
//!
//! Compiles a rewritten clause tree into Tantivy queries. Prefix, wildcard and fuzzy clauses
//! are expanded against the term dictionary while compiling, both to enforce the clause
//! ceiling and to learn which contents terms the query can match.

use std::{collections::BTreeMap, ops::Bound, str};

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, SINK_STATE};
use tantivy::{
    Searcher as TvSearcher, Term,
    query::{
        AllQuery, BooleanQuery, BoostQuery, EmptyQuery, FuzzyTermQuery, Occur as TvOccur,
        PhraseQuery, Query, QueryClone, RangeQuery, RegexQuery, TermQuery,
    },
    schema::{Field as TvField, IndexRecordOption},
};
use tantivy_fst::{Automaton, Regex};
use tracing::debug;

use crate::{
    IndexError,
    clause::{BooleanClause, Clause, Occur, PhraseClause, RangeClause, TermClause},
    field::Field,
    schema::IndexSchema,
};

/// Most clauses a compiled query may contain, counting dictionary expansions.
pub const MAX_CLAUSE_COUNT: usize = 5000;

/// Largest edit distance used for fuzzy clauses.
const MAX_FUZZY_DISTANCE: u8 = 2;

/// Wrapper that implements `tantivy_fst::Automaton` for `levenshtein_automata::DFA`.
struct LevenshteinDfa(levenshtein_automata::DFA);

impl Automaton for LevenshteinDfa {
    type State = u32;

    fn start(&self) -> Self::State {
        self.0.initial_state()
    }

    fn is_match(&self, state: &Self::State) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &Self::State) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &Self::State, byte: u8) -> Self::State {
        self.0.transition(*state, byte)
    }
}

/// A compiled query and what it can match.
pub struct CompiledQuery {
    /// The executable query.
    pub query: Box<dyn Query>,
    /// Contents terms the query can match, with their accumulated boost.
    ///
    /// Terms under a negation are excluded.
    pub terms: BTreeMap<String, f32>,
    /// Clauses counted against [`MAX_CLAUSE_COUNT`].
    pub clause_count: usize,
}

/// Edit distance for a fuzzy term of `text`.
pub fn fuzzy_distance(text: &str) -> u8 {
    let half = text.chars().count() / 2;
    u8::try_from(half).map_or(MAX_FUZZY_DISTANCE, |d| d.min(MAX_FUZZY_DISTANCE))
}

/// Converts a `*`/`?` glob to an anchored regular expression.
pub fn glob_to_regex(glob: &str) -> String {
    let mut pattern = String::with_capacity(glob.len() + 8);
    let mut literal = String::new();
    for ch in glob.chars() {
        match ch {
            '*' | '?' => {
                pattern.push_str(&regex::escape(&literal));
                literal.clear();
                pattern.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    pattern.push_str(&regex::escape(&literal));
    pattern
}

/// Compiles clause trees against one index snapshot.
pub struct QueryCompiler<'a> {
    /// Field handles.
    schema: &'a IndexSchema,
    /// Snapshot used for dictionary expansion.
    searcher: &'a TvSearcher,
    /// Clauses counted so far.
    count: usize,
    /// Matchable contents terms.
    terms: BTreeMap<String, f32>,
    /// Automaton builders by edit distance.
    builders: [Option<LevenshteinAutomatonBuilder>; 3],
}

impl<'a> QueryCompiler<'a> {
    /// Creates a compiler for `searcher`.
    pub fn new(schema: &'a IndexSchema, searcher: &'a TvSearcher) -> Self {
        Self {
            schema,
            searcher,
            count: 0,
            terms: BTreeMap::new(),
            builders: [None, None, None],
        }
    }

    /// Compiles `clause`.
    pub fn compile(mut self, clause: &Clause) -> Result<CompiledQuery, IndexError> {
        let query = self.compile_clause(clause, 1.0, false)?;
        debug!(clauses = self.count, terms = self.terms.len(), "compiled query");
        Ok(CompiledQuery {
            query,
            terms: self.terms,
            clause_count: self.count,
        })
    }

    /// Adds `n` clauses to the count, failing past the ceiling.
    fn count(&mut self, n: usize) -> Result<(), IndexError> {
        self.count += n.max(1);
        if self.count > MAX_CLAUSE_COUNT {
            return Err(IndexError::TooManyClauses {
                limit: MAX_CLAUSE_COUNT,
            });
        }
        Ok(())
    }

    /// Records a matchable contents term.
    fn note_term(&mut self, text: &str, weight: f32, negated: bool) {
        if negated {
            return;
        }
        let entry = self.terms.entry(text.to_string()).or_insert(weight);
        *entry = entry.max(weight);
    }

    /// Compiles one clause. `weight` is the product of enclosing boosts.
    fn compile_clause(
        &mut self,
        clause: &Clause,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        let weight = weight * clause.boost();
        let query = match clause {
            Clause::Term(t) => self.compile_term(t, weight, negated)?,
            Clause::Prefix(t) => {
                let pattern = format!("{}.*", regex::escape(&t.text));
                self.compile_expansion(t, &pattern, weight, negated)?
            }
            Clause::Wildcard(t) => {
                let pattern = glob_to_regex(&t.text);
                self.compile_expansion(t, &pattern, weight, negated)?
            }
            Clause::Fuzzy(t) => self.compile_fuzzy(t, weight, negated)?,
            Clause::Phrase(p) => self.compile_phrase(p, weight, negated)?,
            Clause::Range(r) => self.compile_range(r)?,
            Clause::Boolean(b) => self.compile_boolean(b, weight, negated)?,
        };
        let boost = clause.boost();
        if boost == 1.0 {
            Ok(query)
        } else {
            Ok(Box::new(BoostQuery::new(query, boost)))
        }
    }

    /// Resolves a known, indexed field.
    fn tv_field(&self, field: Option<Field>) -> Option<(Field, TvField)> {
        let field = field?;
        self.schema.field(field).map(|tv| (field, tv))
    }

    /// Compiles a single term.
    fn compile_term(
        &mut self,
        term: &TermClause,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        self.count(1)?;
        let Some((field, tv_field)) = self.tv_field(term.field.known()) else {
            return Ok(Box::new(EmptyQuery));
        };
        match field {
            Field::Modified => match term.text.parse::<i64>() {
                Ok(value) => Ok(Box::new(TermQuery::new(
                    Term::from_field_i64(tv_field, value),
                    IndexRecordOption::Basic,
                ))),
                Err(_) => Ok(Box::new(EmptyQuery)),
            },
            Field::Contents => {
                self.note_term(&term.text, weight, negated);
                Ok(Box::new(TermQuery::new(
                    Term::from_field_text(tv_field, &term.text),
                    IndexRecordOption::WithFreqs,
                )))
            }
            _ => Ok(Box::new(TermQuery::new(
                Term::from_field_text(tv_field, &term.text),
                IndexRecordOption::Basic,
            ))),
        }
    }

    /// Compiles a prefix or wildcard into a regex query, counting its expansions.
    fn compile_expansion(
        &mut self,
        term: &TermClause,
        pattern: &str,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        let Some((field, tv_field)) = self.tv_field(term.field.known()) else {
            self.count(1)?;
            return Ok(Box::new(EmptyQuery));
        };
        if field == Field::Modified {
            self.count(1)?;
            return Ok(Box::new(EmptyQuery));
        }
        let automaton = Regex::new(pattern)
            .map_err(|e| IndexError::QueryCompile(format!("{pattern}: {e}")))?;
        let expanded = self.expand(tv_field, &automaton)?;
        self.count(expanded.len())?;
        if field == Field::Contents {
            for text in &expanded {
                self.note_term(text, weight, negated);
            }
        }
        let query = RegexQuery::from_pattern(pattern, tv_field)
            .map_err(|e| IndexError::QueryCompile(format!("{pattern}: {e}")))?;
        Ok(Box::new(query))
    }

    /// Compiles a fuzzy term.
    fn compile_fuzzy(
        &mut self,
        term: &TermClause,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        let Some((field, tv_field)) = self.tv_field(term.field.known()) else {
            self.count(1)?;
            return Ok(Box::new(EmptyQuery));
        };
        if field == Field::Modified {
            self.count(1)?;
            return Ok(Box::new(EmptyQuery));
        }
        let distance = fuzzy_distance(&term.text);
        let builder = self.builders[usize::from(distance)]
            .get_or_insert_with(|| LevenshteinAutomatonBuilder::new(distance, true));
        let dfa = LevenshteinDfa(builder.build_dfa(&term.text));
        let expanded = self.expand(tv_field, &dfa)?;
        self.count(expanded.len())?;
        if field == Field::Contents {
            for text in &expanded {
                self.note_term(text, weight, negated);
            }
        }
        Ok(Box::new(FuzzyTermQuery::new(
            Term::from_field_text(tv_field, &term.text),
            distance,
            true,
        )))
    }

    /// Compiles a phrase. Single-term phrases become term queries.
    fn compile_phrase(
        &mut self,
        phrase: &PhraseClause,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        let Some((field, tv_field)) = self.tv_field(phrase.field.known()) else {
            self.count(1)?;
            return Ok(Box::new(EmptyQuery));
        };
        if field != Field::Contents {
            let text = phrase.terms.join(" ");
            return self.compile_term(&TermClause::new(field, text), weight, negated);
        }
        match phrase.terms.as_slice() {
            [] => {
                self.count(1)?;
                Ok(Box::new(EmptyQuery))
            }
            [single] => self.compile_term(&TermClause::new(field, single.as_str()), weight, negated),
            terms => {
                self.count(terms.len())?;
                for text in terms {
                    self.note_term(text, weight, negated);
                }
                let mut query = PhraseQuery::new(
                    terms
                        .iter()
                        .map(|t| Term::from_field_text(tv_field, t))
                        .collect(),
                );
                query.set_slop(phrase.slop);
                Ok(Box::new(query))
            }
        }
    }

    /// Compiles an inclusive range on a numeric field.
    fn compile_range(&mut self, range: &RangeClause) -> Result<Box<dyn Query>, IndexError> {
        self.count(1)?;
        if range.field != Field::Modified {
            return Ok(Box::new(EmptyQuery));
        }
        Ok(Box::new(RangeQuery::new_i64_bounds(
            range.field.name().to_string(),
            Bound::Included(range.lower),
            Bound::Included(range.upper),
        )))
    }

    /// Compiles a boolean. A boolean with only negative children matches everything else.
    ///
    /// A minimum-should-match of `k` becomes a required group that matches when any `k` of
    /// the optional children match.
    fn compile_boolean(
        &mut self,
        boolean: &BooleanClause,
        weight: f32,
        negated: bool,
    ) -> Result<Box<dyn Query>, IndexError> {
        if boolean.clauses.is_empty() {
            return Ok(Box::new(EmptyQuery));
        }
        let mut subqueries: Vec<(TvOccur, Box<dyn Query>)> =
            Vec::with_capacity(boolean.clauses.len() + 1);
        let mut optional: Vec<Box<dyn Query>> = Vec::new();
        for (occur, child) in &boolean.clauses {
            match occur {
                Occur::Must => {
                    subqueries.push((TvOccur::Must, self.compile_clause(child, weight, negated)?));
                }
                Occur::Should => optional.push(self.compile_clause(child, weight, negated)?),
                Occur::MustNot => {
                    subqueries.push((TvOccur::MustNot, self.compile_clause(child, weight, true)?));
                }
            }
        }

        let required = boolean.minimum_should_match;
        if required > optional.len() {
            return Ok(Box::new(EmptyQuery));
        }
        match required {
            0 => subqueries.extend(optional.into_iter().map(|q| (TvOccur::Should, q))),
            1 => subqueries.push((TvOccur::Must, Box::new(BooleanQuery::union(optional)))),
            k => {
                let group = self.any_k_of(&optional, k)?;
                subqueries.push((TvOccur::Must, group));
            }
        }

        if subqueries.iter().all(|(o, _)| *o == TvOccur::MustNot) {
            subqueries.push((TvOccur::Must, Box::new(AllQuery)));
        }
        Ok(Box::new(BooleanQuery::new(subqueries)))
    }

    /// Matches documents matching at least `k` of `queries`, as a union of every `k`-sized
    /// intersection. Each intersection counts as a clause.
    fn any_k_of(
        &mut self,
        queries: &[Box<dyn Query>],
        k: usize,
    ) -> Result<Box<dyn Query>, IndexError> {
        let mut groups: Vec<Box<dyn Query>> = Vec::new();
        let mut picked: Vec<usize> = (0..k).collect();
        loop {
            self.count(1)?;
            groups.push(Box::new(BooleanQuery::intersection(
                picked.iter().map(|&i| queries[i].box_clone()).collect(),
            )));
            // Advance to the next combination in lexicographic order.
            let Some(pos) = (0..k).rev().find(|&pos| picked[pos] < queries.len() - k + pos) else {
                break;
            };
            picked[pos] += 1;
            for next in pos + 1..k {
                picked[next] = picked[next - 1] + 1;
            }
        }
        Ok(Box::new(BooleanQuery::union(groups)))
    }

    /// Lists the distinct dictionary terms of `field` accepted by `automaton`.
    fn expand<A: Automaton>(&self, field: TvField, automaton: &A) -> Result<Vec<String>, IndexError>
    where
        A::State: Clone,
    {
        let mut found = Vec::new();
        for segment_reader in self.searcher.segment_readers() {
            let inverted_index = segment_reader
                .inverted_index(field)
                .map_err(|e| IndexError::read(&e))?;
            let mut stream = inverted_index
                .terms()
                .search(automaton)
                .into_stream()
                .map_err(IndexError::Io)?;
            while stream.advance() {
                if let Ok(text) = str::from_utf8(stream.key())
                    && !found.iter().any(|f| f == text)
                {
                    found.push(text.to_string());
                }
                if found.len() > MAX_CLAUSE_COUNT {
                    return Err(IndexError::TooManyClauses {
                        limit: MAX_CLAUSE_COUNT,
                    });
                }
            }
        }
        found.sort();
        Ok(found)
    }
}

/// Lists the distinct dictionary terms of `field` starting with `prefix`, in order.
pub(crate) fn dictionary_prefix(
    searcher: &TvSearcher,
    field: TvField,
    prefix: &str,
) -> Result<Vec<String>, IndexError> {
    let pattern = format!("{}.*", regex::escape(prefix));
    let automaton = Regex::new(&pattern)
        .map_err(|e| IndexError::QueryCompile(format!("{pattern}: {e}")))?;
    let mut found = Vec::new();
    for segment_reader in searcher.segment_readers() {
        let inverted_index = segment_reader
            .inverted_index(field)
            .map_err(|e| IndexError::read(&e))?;
        let mut stream = inverted_index
            .terms()
            .search(&automaton)
            .into_stream()
            .map_err(IndexError::Io)?;
        while stream.advance() {
            if let Ok(text) = str::from_utf8(stream.key()) {
                found.push(text.to_string());
            }
        }
    }
    found.sort();
    found.dedup();
    Ok(found)
}
