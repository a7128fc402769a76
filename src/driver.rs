//! Orchestrates a full run: discover documentation files, collect every
//! compound and alias (phase 1), rewrite every stored type against the
//! frozen alias table (phase 2), then freeze the member maps behind a
//! read-only query surface.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ingest::ingest_file;
use crate::model::{CompoundMetadata, MemberDefinition};
use crate::registry::ResolutionContext;
use crate::rewrite::ResolutionError;
use crate::xml::ParseError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid documentation root `{}`: {source}", root.display())]
    Pattern {
        root: PathBuf,
        source: glob::PatternError,
    },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Read-only symbol table produced by a full run over a documentation tree.
#[derive(Debug)]
pub struct ApiIndex {
    metadata: BTreeMap<String, CompoundMetadata>,
    members: BTreeMap<String, BTreeMap<String, MemberDefinition>>,
    fallbacks: BTreeSet<String>,
    failures: Vec<(PathBuf, ParseError)>,
}

impl ApiIndex {
    /// Metadata for a compound by qualified name, `None` when unknown.
    pub fn metadata(&self, name: &str) -> Option<&CompoundMetadata> {
        self.metadata.get(name)
    }

    /// Name→member map for a compound by qualified name, `None` when
    /// unknown.
    pub fn members(&self, name: &str) -> Option<&BTreeMap<String, MemberDefinition>> {
        self.members.get(name)
    }

    /// Every known compound, in lexicographic order.
    pub fn compound_names(&self) -> impl Iterator<Item = &str> {
        self.metadata.keys().map(String::as_str)
    }

    /// Raw spellings that matched nothing and were only sanitized; meant for
    /// human review of the generated stubs.
    pub fn fallback_spellings(&self) -> impl Iterator<Item = &str> {
        self.fallbacks.iter().map(String::as_str)
    }

    /// Files that failed to parse and were skipped.
    pub fn parse_failures(&self) -> &[(PathBuf, ParseError)] {
        &self.failures
    }
}

/// Run both phases over every `xml/*.xml` file under the documentation root.
///
/// A file that fails to parse is logged, recorded and skipped; the run
/// continues with the remaining files. An alias cycle during the rewrite
/// phase aborts the whole run, since it means the alias graph itself is
/// unrepresentable. Identical input always produces an identical index.
pub fn load_directory(root: impl AsRef<Path>) -> Result<ApiIndex, DriverError> {
    let root = root.as_ref();
    let pattern = root.join("xml").join("*.xml");
    let paths = glob(&pattern.to_string_lossy()).map_err(|source| DriverError::Pattern {
        root: root.to_path_buf(),
        source,
    })?;

    let mut context = ResolutionContext::new();
    let mut failures = Vec::new();

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                warn!(error = %error, "skipping unreadable path");
                continue;
            }
        };
        if let Err(error) = ingest_path(&path, &mut context) {
            warn!(file = %path.display(), error = %error, "skipping malformed documentation file");
            failures.push((path, error));
        }
    }

    info!(
        compounds = context.compound_count(),
        members = context.member_count(),
        "collection phase complete"
    );

    context.rewrite_types()?;

    let tables = context.finalize();
    debug!(fallbacks = tables.fallbacks.len(), "rewrite phase complete");

    Ok(ApiIndex {
        metadata: tables.metadata,
        members: tables.members,
        fallbacks: tables.fallbacks,
        failures,
    })
}

fn ingest_path(path: &Path, context: &mut ResolutionContext) -> Result<(), ParseError> {
    debug!(file = %path.display(), "ingesting documentation file");
    let content = fs::read_to_string(path)?;
    ingest_file(&content, context)
}
