//! Index schema definition for the hunt code index.
//!
//! One document per source file:
//! - `contents`: tokenized with the code chain, positions kept for phrases, no length norms
//! - `file`, `name`, `ext`, `proj`, `jar`: single untokenized terms, stored
//! - `modified`: milliseconds since the epoch, indexed for range queries
//!
//! `ws` and `dir` exist only in queries; they are rewritten onto stored fields before a
//! query is compiled.

use tantivy::schema::{
    FAST, Field as TvField, INDEXED, IndexRecordOption, STORED, STRING, Schema,
    TextFieldIndexing, TextOptions,
};

use crate::{analyzer::CODE_TOKENIZER, field::Field};

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// File contents.
    pub contents: TvField,
    /// `/<project>/<relative path>`.
    pub file: TvField,
    /// Last path segment.
    pub name: TvField,
    /// Lowercase extension.
    pub ext: TvField,
    /// Project name.
    pub proj: TvField,
    /// Archive name.
    pub jar: TvField,
    /// Modification time in milliseconds.
    pub modified: TvField,
}

impl IndexSchema {
    /// Creates the schema.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        // Long files must not be penalized, so contents carries no field norms.
        let contents_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(CODE_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions)
                .set_fieldnorms(false),
        );
        let contents = builder.add_text_field(Field::Contents.name(), contents_options);

        let file = builder.add_text_field(Field::File.name(), STRING | STORED);
        let name = builder.add_text_field(Field::Name.name(), STRING | STORED);
        let ext = builder.add_text_field(Field::Ext.name(), STRING | STORED);
        let proj = builder.add_text_field(Field::Proj.name(), STRING | STORED | FAST);
        let jar = builder.add_text_field(Field::Jar.name(), STRING | STORED);

        let modified = builder.add_i64_field(Field::Modified.name(), INDEXED | STORED | FAST);

        let schema = builder.build();

        Self {
            schema,
            contents,
            file,
            name,
            ext,
            proj,
            jar,
            modified,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the Tantivy field backing `field`, or `None` for query-only fields.
    pub fn field(&self, field: Field) -> Option<TvField> {
        match field {
            Field::Contents => Some(self.contents),
            Field::File => Some(self.file),
            Field::Name => Some(self.name),
            Field::Ext => Some(self.ext),
            Field::Proj => Some(self.proj),
            Field::Jar => Some(self.jar),
            Field::Modified => Some(self.modified),
            Field::Ws | Field::Dir => None,
        }
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use tantivy::schema::FieldType;

    use super::*;

    #[test]
    fn schema_has_stored_fields() {
        let schema = IndexSchema::new();
        for field in Field::ALL {
            let found = schema.schema().get_field(field.name()).is_ok();
            assert_eq!(found, schema.field(field).is_some(), "{field}");
        }
    }

    #[test]
    fn contents_is_tokenized_without_norms() {
        let schema = IndexSchema::new();
        let entry = schema.schema().get_field_entry(schema.contents);

        assert!(entry.is_indexed());
        assert!(!entry.is_stored());
        assert!(!entry.has_fieldnorms());

        if let FieldType::Str(opts) = entry.field_type() {
            let indexing = opts.get_indexing_options().unwrap();
            assert_eq!(indexing.tokenizer(), CODE_TOKENIZER);
            assert_eq!(
                indexing.index_option(),
                IndexRecordOption::WithFreqsAndPositions
            );
        } else {
            panic!("contents field should be text type");
        }
    }

    #[test]
    fn keyword_fields_are_raw_and_stored() {
        let schema = IndexSchema::new();

        for (name, field) in [
            ("file", schema.file),
            ("name", schema.name),
            ("ext", schema.ext),
            ("proj", schema.proj),
            ("jar", schema.jar),
        ] {
            let entry = schema.schema().get_field_entry(field);
            assert!(entry.is_indexed(), "{name} should be indexed");
            assert!(entry.is_stored(), "{name} should be stored");

            if let FieldType::Str(opts) = entry.field_type() {
                let indexing = opts.get_indexing_options().unwrap();
                assert_eq!(indexing.tokenizer(), "raw", "{name} should be untokenized");
            } else {
                panic!("{name} field should be text type");
            }
        }
    }

    #[test]
    fn modified_is_indexed_i64() {
        let schema = IndexSchema::new();
        let entry = schema.schema().get_field_entry(schema.modified);

        assert!(entry.is_indexed());
        assert!(entry.is_fast());
        assert!(matches!(entry.field_type(), FieldType::I64(_)));
    }
}
