//! Term completion from the index dictionary.

use super::Searcher;
use crate::{IndexError, field::Field, query::dictionary_prefix};

#[allow(clippy::multiple_inherent_impl)]
impl Searcher {
    /// Lists the distinct indexed values of `field` starting with `prefix`, ignoring case.
    ///
    /// Values are returned in dictionary order with their original case.
    pub fn proposals(&self, prefix: &str, field: Field) -> Result<Vec<String>, IndexError> {
        let (searcher, schema) = self.reader.searcher()?;
        if field == Field::Modified {
            return Ok(Vec::new());
        }
        let Some(tv_field) = schema.field(field) else {
            return Ok(Vec::new());
        };
        let prefix = prefix.to_lowercase();
        let terms = dictionary_prefix(&searcher, tv_field, "")?;
        Ok(terms
            .into_iter()
            .filter(|term| term.to_lowercase().starts_with(&prefix))
            .collect())
    }

    /// Lists the names of every indexed project.
    pub fn index_projects(&self) -> Result<Vec<String>, IndexError> {
        self.proposals("", Field::Proj)
    }
}
