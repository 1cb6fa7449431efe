//! Document types for indexing.
//!
//! The [`FileDocument`] struct is one source file ready for indexing: its contents plus the
//! metadata stored alongside them.

use tantivy::{
    TantivyDocument,
    tokenizer::{TokenStream, Tokenizer},
};

use crate::{field::NO_VALUE, schema::IndexSchema, tokenizer::CodeTokenizer};

/// A source file ready for indexing.
#[derive(Debug, Clone)]
pub struct FileDocument {
    /// Project the file belongs to.
    pub project: String,
    /// Path relative to the project root, `/`-separated.
    pub rel_path: String,
    /// File contents.
    pub contents: String,
    /// Modification time, milliseconds since the epoch.
    pub modified: i64,
    /// Archive the file was read from.
    pub jar: Option<String>,
}

impl FileDocument {
    /// Creates a document for a plain workspace file.
    pub fn new(
        project: impl Into<String>,
        rel_path: impl Into<String>,
        contents: String,
        modified: i64,
    ) -> Self {
        Self {
            project: project.into(),
            rel_path: rel_path.into(),
            contents,
            modified,
            jar: None,
        }
    }

    /// Indexed file path: `/<project>/<relative path>`.
    pub fn file_path(&self) -> String {
        file_path(&self.project, &self.rel_path)
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.rel_path
            .rsplit('/')
            .next()
            .unwrap_or(self.rel_path.as_str())
    }

    /// Lowercase extension, or [`NO_VALUE`] when the name has none.
    pub fn extension(&self) -> String {
        extension_of(self.name()).map_or_else(|| NO_VALUE.to_string(), str::to_lowercase)
    }

    /// Builds the Tantivy document, keeping at most `max_terms` contents tokens.
    pub(crate) fn to_tantivy(&self, schema: &IndexSchema, max_terms: usize) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(schema.contents, truncate_terms(&self.contents, max_terms));
        doc.add_text(schema.file, self.file_path());
        doc.add_text(schema.name, self.name());
        doc.add_text(schema.ext, self.extension());
        doc.add_text(schema.proj, &self.project);
        doc.add_text(schema.jar, self.jar.as_deref().unwrap_or(NO_VALUE));
        doc.add_i64(schema.modified, self.modified);
        doc
    }
}

/// Builds the indexed path of a project file.
pub fn file_path(project: &str, rel_path: &str) -> String {
    format!("/{project}/{}", rel_path.trim_start_matches('/'))
}

/// Returns the extension of a file name. Leading dots do not start an extension.
fn extension_of(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Cuts `text` after the `max_terms`th coarse token.
fn truncate_terms(text: &str, max_terms: usize) -> &str {
    let mut tokenizer = CodeTokenizer::default();
    let mut stream = tokenizer.token_stream(text);
    let mut seen = 0;
    while stream.advance() {
        seen += 1;
        if seen == max_terms {
            return &text[..stream.token().offset_to];
        }
    }
    text
}
