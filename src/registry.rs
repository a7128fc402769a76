//! Symbol table built during ingestion and consumed by the rewrite pass.
//!
//! All state lives in an explicit [`ResolutionContext`] owned by the driver;
//! there is no process-global table. The context is mutated in two strictly
//! ordered phases (collect, then rewrite) and torn down into read-only maps.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::model::{CompoundMetadata, MemberDefinition, MemberId};
use crate::rewrite::{BUILTIN_ALIASES, ResolutionError, rewrite_type};

/// Mapping from Symbol Id or raw spelling to a replacement spelling.
///
/// First writer wins: a later registration for an existing key is ignored,
/// so a compound's id→name entry can never be clobbered by a typedef that
/// happens to collide on the same id.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn with_builtins() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|&(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self { entries }
    }

    pub fn register(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Everything collected from the documentation tree: per-member definitions,
/// per-compound metadata and raw member-id lists, and the alias table.
#[derive(Debug)]
pub struct ResolutionContext {
    members: HashMap<MemberId, MemberDefinition>,
    compound_member_ids: HashMap<String, Vec<MemberId>>,
    metadata: HashMap<String, CompoundMetadata>,
    aliases: AliasTable,
    fallbacks: BTreeSet<String>,
}

/// Read-only maps handed to the query surface once both phases are done.
#[derive(Debug)]
pub struct ResolvedTables {
    pub metadata: BTreeMap<String, CompoundMetadata>,
    pub members: BTreeMap<String, BTreeMap<String, MemberDefinition>>,
    pub fallbacks: BTreeSet<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            compound_member_ids: HashMap::new(),
            metadata: HashMap::new(),
            aliases: AliasTable::with_builtins(),
            fallbacks: BTreeSet::new(),
        }
    }

    pub fn aliases_mut(&mut self) -> &mut AliasTable {
        &mut self.aliases
    }

    pub fn register_compound(&mut self, metadata: CompoundMetadata) {
        self.compound_member_ids
            .entry(metadata.name.clone())
            .or_default();
        self.metadata.insert(metadata.name.clone(), metadata);
    }

    pub fn register_member(&mut self, id: MemberId, definition: MemberDefinition) {
        self.members.insert(id, definition);
    }

    pub fn push_compound_member(&mut self, compound: &str, id: MemberId) {
        self.compound_member_ids
            .entry(compound.to_string())
            .or_default()
            .push(id);
    }

    pub fn compound_count(&self) -> usize {
        self.metadata.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Phase 2: rewrite every stored member and parameter type exactly once
    /// against the now-frozen alias table. Fatal on an unresolvable alias
    /// graph.
    pub fn rewrite_types(&mut self) -> Result<(), ResolutionError> {
        for definition in self.members.values_mut() {
            rewrite_slot(&mut definition.ty, &self.aliases, &mut self.fallbacks)?;
            for param in &mut definition.params {
                rewrite_slot(&mut param.ty, &self.aliases, &mut self.fallbacks)?;
            }
        }
        Ok(())
    }

    /// Resolve every compound's member-id list against the member table and
    /// tear the context down into read-only maps. Ids that were never
    /// collected are dropped.
    pub fn finalize(self) -> ResolvedTables {
        let mut members = BTreeMap::new();
        for (compound, ids) in self.compound_member_ids {
            let mut resolved = BTreeMap::new();
            for id in ids {
                match self.members.get(&id) {
                    Some(definition) => {
                        resolved.insert(definition.name.clone(), definition.clone());
                    }
                    None => {
                        debug!(
                            compound = %compound,
                            id = %id.as_str(),
                            "dropping unresolved member reference"
                        );
                    }
                }
            }
            members.insert(compound, resolved);
        }

        ResolvedTables {
            metadata: self.metadata.into_iter().collect(),
            members,
            fallbacks: self.fallbacks,
        }
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

fn rewrite_slot(
    slot: &mut Option<String>,
    aliases: &AliasTable,
    fallbacks: &mut BTreeSet<String>,
) -> Result<(), ResolutionError> {
    if let Some(raw) = slot.take() {
        let rewritten = rewrite_type(&raw, aliases)?;
        if rewritten.fallback {
            fallbacks.insert(raw);
        }
        *slot = Some(rewritten.canonical);
    }
    Ok(())
}
