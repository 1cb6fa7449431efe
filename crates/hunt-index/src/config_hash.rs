//! Configuration hash computation for index versioning.
//!
//! The index stores a hash of the settings that shape indexed documents. When one of them
//! changes, existing documents no longer match what a fresh build would produce, so the
//! next update turns into a full rebuild.
//!
//! Settings that affect the hash:
//! - Schema version (internal, bumped when field definitions or analysis change)
//! - Minimum word length of the tokenizer chain
//! - Contents cap per document
//! - Whether archives are indexed
//!
//! Extension and exclusion changes are not hashed; the manifest diff adds and removes the
//! affected files incrementally.

use std::hash::{Hash, Hasher};

use hunt_config::Config;
use siphasher::sip::SipHasher24;

/// Current schema version. Bump this when index field definitions change.
pub const SCHEMA_VERSION: u32 = 1;

/// Settings that affect indexing and are included in the config hash.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IndexingConfig {
    /// Schema version.
    pub schema_version: u32,
    /// Shortest token kept.
    pub min_word_length: usize,
    /// Contents tokens indexed per document.
    pub max_terms_per_doc: usize,
    /// Whether archive attachments are indexed.
    pub index_archives: bool,
}

impl IndexingConfig {
    /// Extracts indexing-relevant settings from a config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            min_word_length: config.index.min_word_length,
            max_terms_per_doc: config.index.max_terms_per_doc,
            index_archives: config.index.index_archives,
        }
    }

    /// Computes the hash as a 16-digit hex string.
    pub fn hash_string(&self) -> String {
        let mut hasher = SipHasher24::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

/// Computes the config hash of `config`.
pub fn compute_config_hash(config: &Config) -> String {
    IndexingConfig::from_config(config).hash_string()
}
