//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use hunt_config::Config;
use hunt_index::{IndexJobs, Indexer, Searcher, SharedReader, detect_index_status};

use crate::cli::output::{ConsoleReporter, dim};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (may be default if no config files found).
    pub config: Config,
    /// Whether `-v` was given.
    pub verbose: bool,
    /// Index jobs and the searcher listening to them, opened on first use.
    opened: Option<(IndexJobs, Arc<Searcher>)>,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self {
            cwd,
            config,
            verbose: false,
            opened: None,
        })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which should work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
            verbose: false,
            opened: None,
        })
    }

    /// Returns the index jobs, opening the indexer on first use.
    pub fn jobs(&mut self) -> Result<IndexJobs, ExitCode> {
        self.open().map(|(jobs, _)| jobs)
    }

    /// Returns a searcher over an up-to-date index.
    ///
    /// The index is built when missing, rebuilt when indexing settings changed and
    /// updated incrementally otherwise.
    pub fn searcher(&mut self) -> Result<Arc<Searcher>, ExitCode> {
        let (jobs, searcher) = self.open()?;
        if detect_index_status(&self.config).needs_rebuild() {
            eprintln!("{}", dim("Index needs rebuild, indexing..."));
        }
        if let Err(e) = jobs.update(&mut ConsoleReporter::quiet()) {
            eprintln!("error: indexing failed: {e}");
            return Err(ExitCode::FAILURE);
        }
        Ok(searcher)
    }

    /// Returns a searcher over the index as it is, without updating it.
    pub fn searcher_as_is(&mut self) -> Result<Arc<Searcher>, ExitCode> {
        self.open().map(|(_, searcher)| searcher)
    }

    /// Name of the project containing the working directory.
    pub fn cwd_project(&self) -> Option<String> {
        self.config
            .project_for_path(&self.cwd)
            .map(|p| p.name.clone())
    }

    /// Opens the indexer and a searcher registered as its change listener.
    fn open(&mut self) -> Result<(IndexJobs, Arc<Searcher>), ExitCode> {
        if let Some((jobs, searcher)) = &self.opened {
            return Ok((jobs.clone(), Arc::clone(searcher)));
        }

        let mut indexer = match Indexer::new(self.config.clone()) {
            Ok(indexer) => indexer,
            Err(e) => {
                eprintln!("error: {e}");
                return Err(ExitCode::FAILURE);
            }
        };
        let reader = Arc::new(SharedReader::new(
            indexer.index_dir(),
            self.config.index.min_word_length,
        ));
        let searcher = Arc::new(Searcher::new(reader, &self.config));
        let listener: Arc<Searcher> = Arc::clone(&searcher);
        indexer.add_listener(listener);

        let jobs = IndexJobs::new(indexer);
        self.opened = Some((jobs.clone(), Arc::clone(&searcher)));
        Ok((jobs, searcher))
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
