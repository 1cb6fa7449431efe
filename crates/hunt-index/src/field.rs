//! Document fields of the code search index.
//!
//! Every indexed file becomes one document with a fixed set of fields. Users address them in
//! queries by canonical name (`ext:java`) or by one of the friendlier aliases (`type:java`).

use std::fmt;

use crate::clause::{Clause, TermClause};

/// Placeholder stored in the `ext` and `jar` fields when a file has no value for them.
pub const NO_VALUE: &str = "<none>";

/// A field of an indexed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Tokenized file contents.
    Contents,
    /// Full path: `/<project>/<relative path>`.
    File,
    /// Last path segment.
    Name,
    /// Lowercase extension.
    Ext,
    /// Project name.
    Proj,
    /// Working set. Never stored; expanded to project terms before searching.
    Ws,
    /// Archive the file was read from.
    Jar,
    /// Directory. Never stored; rewritten to file path matches before searching.
    Dir,
    /// Modification time in milliseconds since the epoch.
    Modified,
}

impl Field {
    /// All fields, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Contents,
        Self::File,
        Self::Name,
        Self::Ext,
        Self::Proj,
        Self::Ws,
        Self::Jar,
        Self::Dir,
        Self::Modified,
    ];

    /// Canonical lowercase name, used as the index field key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Contents => "contents",
            Self::File => "file",
            Self::Name => "name",
            Self::Ext => "ext",
            Self::Proj => "proj",
            Self::Ws => "ws",
            Self::Jar => "jar",
            Self::Dir => "dir",
            Self::Modified => "modified",
        }
    }

    /// Human readable title. Falls back to the canonical name.
    pub fn title(self) -> &'static str {
        match self {
            Self::Ext => "Extension",
            Self::Proj => "Project",
            Self::Ws => "Working Set",
            Self::Modified => "Modified",
            other => other.name(),
        }
    }

    /// Looks up a field by canonical name, ignoring case.
    ///
    /// Unknown names yield `None`.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Resolves an alternate user-typed field name, ignoring case.
    ///
    /// Only aliases are resolved here; canonical names go through [`Field::by_name`].
    pub fn by_alias(alias: &str) -> Option<Self> {
        match alias.to_ascii_lowercase().as_str() {
            "project" => Some(Self::Proj),
            "filetype" | "type" => Some(Self::Ext),
            "workingset" => Some(Self::Ws),
            "age" => Some(Self::Modified),
            "folder" => Some(Self::Dir),
            _ => None,
        }
    }

    /// Creates a term clause for this field with default boost.
    pub fn create_term(self, text: impl Into<String>) -> Clause {
        Clause::Term(TermClause::new(self, text))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(Field::by_name("contents"), Some(Field::Contents));
        assert_eq!(Field::by_name("EXT"), Some(Field::Ext));
        assert_eq!(Field::by_name("Modified"), Some(Field::Modified));
    }

    #[test]
    fn by_name_unknown_is_none() {
        assert_eq!(Field::by_name("project"), None);
        assert_eq!(Field::by_name(""), None);
    }

    #[test]
    fn aliases() {
        assert_eq!(Field::by_alias("project"), Some(Field::Proj));
        assert_eq!(Field::by_alias("Type"), Some(Field::Ext));
        assert_eq!(Field::by_alias("filetype"), Some(Field::Ext));
        assert_eq!(Field::by_alias("workingset"), Some(Field::Ws));
        assert_eq!(Field::by_alias("age"), Some(Field::Modified));
        assert_eq!(Field::by_alias("folder"), Some(Field::Dir));
        assert_eq!(Field::by_alias("proj"), None);
    }

    #[test]
    fn titles_fall_back_to_name() {
        assert_eq!(Field::Ws.title(), "Working Set");
        assert_eq!(Field::Contents.title(), "contents");
    }

    #[test]
    fn create_term() {
        let clause = Field::Proj.create_term("core");
        assert_eq!(clause.to_string(), "proj:core");
    }
}
