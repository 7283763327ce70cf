//! Collection of embedding records discovered during mesh partitioning.
//!
//! The registry keeps records unique, applies a [`ConflictPolicy`] when two
//! records claim the same primary sequence for one beam cluster, and groups
//! related records into similarity clusters.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embedded::{CoreNumber, EmbeddedInfo, Relation, Tag};
use crate::errors::RegistryError;

/// What to do with a record that conflicts with one already stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Refuse the record and report both sides of the conflict.
    #[default]
    Reject,
    /// Drop the record, log a warning and keep going.
    Skip,
}

impl FromStr for ConflictPolicy {
    type Err = RegistryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(ConflictPolicy::Reject),
            "skip" => Ok(ConflictPolicy::Skip),
            _ => Err(RegistryError::UnknownPolicy(value.to_string())),
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictPolicy::Reject => f.write_str("reject"),
            ConflictPolicy::Skip => f.write_str("skip"),
        }
    }
}

/// Settings for an [`EmbeddingRegistry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Handling of conflicting records.
    pub conflict_policy: ConflictPolicy,
}

/// Result of [`EmbeddingRegistry::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The record was stored at this index.
    Added(usize),
    /// An equal record is already stored at this index.
    Duplicate(usize),
    /// The record conflicted and was dropped under [`ConflictPolicy::Skip`].
    Skipped,
}

/// Deduplicating store of [`EmbeddedInfo`] records.
///
/// # Examples
///
/// ```
/// use femora_embed::{EmbeddedInfo, EmbeddingRegistry, Insertion};
///
/// let mut registry = EmbeddingRegistry::new();
/// let pile = EmbeddedInfo::new([1, 2], 0, vec![(vec![1, 2], vec![10, 11])]);
/// assert_eq!(registry.insert(pile.clone()), Ok(Insertion::Added(0)));
/// assert_eq!(registry.insert(pile), Ok(Insertion::Duplicate(0)));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EmbeddingRegistry {
    /// Behaviour settings.
    config: RegistryConfig,
    /// Stored records in insertion order.
    records: Vec<EmbeddedInfo>,
    /// Indices of the records sharing each beam cluster.
    by_beams: HashMap<BTreeSet<Tag>, Vec<usize>>,
    /// Indices of the records naming each solid.
    by_solid: HashMap<Tag, Vec<usize>>,
    /// Number of records dropped under [`ConflictPolicy::Skip`].
    skipped: usize,
}

impl EmbeddingRegistry {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with an explicit configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of conflicting records dropped so far.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Record stored at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EmbeddedInfo> {
        self.records.get(index)
    }

    /// Stored records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedInfo> {
        self.records.iter()
    }

    /// Stored records whose beam cluster is exactly `beams`.
    #[must_use]
    pub fn with_beams(&self, beams: &BTreeSet<Tag>) -> Vec<&EmbeddedInfo> {
        self.by_beams
            .get(beams)
            .map(|indices| indices.iter().map(|&index| &self.records[index]).collect())
            .unwrap_or_default()
    }

    /// Store a record unless an equal one is already present.
    ///
    /// Only records sharing the incoming beam cluster can be equal to it or
    /// conflict with it, so only those are compared.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] when the record conflicts with a
    /// stored one and the policy is [`ConflictPolicy::Reject`].
    pub fn insert(&mut self, info: EmbeddedInfo) -> Result<Insertion, RegistryError> {
        if let Some((index, relation)) = self.strongest_match(&info) {
            match relation {
                Relation::Equal => {
                    debug!(%info, index, "duplicate embedding record ignored");
                    return Ok(Insertion::Duplicate(index));
                }
                Relation::Conflict => match self.config.conflict_policy {
                    ConflictPolicy::Reject => {
                        return Err(RegistryError::Conflict {
                            incoming: Box::new(info),
                            existing: Box::new(self.records[index].clone()),
                        });
                    }
                    ConflictPolicy::Skip => {
                        warn!(
                            %info,
                            existing = %self.records[index],
                            "conflicting embedding record skipped"
                        );
                        self.skipped += 1;
                        return Ok(Insertion::Skipped);
                    }
                },
                Relation::Similar | Relation::Unrelated => {}
            }
        }

        let index = self.records.len();
        self.by_beams
            .entry(info.beams().clone())
            .or_default()
            .push(index);
        for &solid in info.associated_ids() {
            self.by_solid.entry(solid).or_default().push(index);
        }
        debug!(%info, index, "stored embedding record");
        self.records.push(info);
        Ok(Insertion::Added(index))
    }

    /// Insert every record in order, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RegistryError`] returned by [`Self::insert`].
    pub fn extend<I>(&mut self, records: I) -> Result<Vec<Insertion>, RegistryError>
    where
        I: IntoIterator<Item = EmbeddedInfo>,
    {
        records
            .into_iter()
            .map(|record| self.insert(record))
            .collect()
    }

    /// Equal match first, then conflict, among records on the same beams.
    fn strongest_match(&self, info: &EmbeddedInfo) -> Option<(usize, Relation)> {
        let candidates = self.by_beams.get(info.beams())?;
        let mut conflict = None;
        for &index in candidates {
            match info.compare(&self.records[index]) {
                Relation::Equal => return Some((index, Relation::Equal)),
                Relation::Conflict if conflict.is_none() => {
                    conflict = Some((index, Relation::Conflict));
                }
                _ => {}
            }
        }
        conflict
    }

    /// Classify `probe` against every stored record it is related to.
    ///
    /// Results are ordered by record index. Unrelated records are omitted.
    #[must_use]
    pub fn relations(&self, probe: &EmbeddedInfo) -> Vec<(usize, Relation)> {
        let mut candidates = BTreeSet::new();
        if let Some(indices) = self.by_beams.get(probe.beams()) {
            candidates.extend(indices.iter().copied());
        }
        for solid in probe.associated_ids() {
            if let Some(indices) = self.by_solid.get(solid) {
                candidates.extend(indices.iter().copied());
            }
        }
        candidates
            .into_iter()
            .map(|index| (index, probe.compare(&self.records[index])))
            .filter(|(_, relation)| *relation != Relation::Unrelated)
            .collect()
    }

    /// Group the stored records into connected components of similarity.
    ///
    /// Records sharing a beam cluster or any solid end up in one component.
    /// Components list their members in insertion order and are ordered by
    /// their earliest member.
    #[must_use]
    pub fn clusters(&self) -> Vec<Vec<&EmbeddedInfo>> {
        let mut sets = UnionFind::<usize>::new(self.records.len());
        for group in self.by_beams.values().chain(self.by_solid.values()) {
            if let Some((&first, rest)) = group.split_first() {
                for &other in rest {
                    sets.union(first, other);
                }
            }
        }

        let labels = sets.into_labeling();
        let mut slots: HashMap<usize, usize> = HashMap::new();
        let mut clusters: Vec<Vec<&EmbeddedInfo>> = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let slot = *slots.entry(labels[index]).or_insert_with(|| {
                clusters.push(Vec::new());
                clusters.len() - 1
            });
            clusters[slot].push(record);
        }
        clusters
    }

    /// Move every record owned by core `from` onto core `to`.
    ///
    /// Records are rebuilt with [`EmbeddedInfo::with_core_number`]; any that
    /// become equal to another collapse into one. Returns how many records
    /// were moved.
    ///
    /// # Errors
    ///
    /// The [`RegistryError::Conflict`] branch is unreachable. Stored records
    /// never conflict with each other, and a conflict depends only on beams
    /// and primary sequences, which a core change leaves untouched. The
    /// `Result` is kept so the signature matches [`EmbeddingRegistry::insert`].
    pub fn reassign_core(
        &mut self,
        from: CoreNumber,
        to: CoreNumber,
    ) -> Result<usize, RegistryError> {
        if from == to {
            return Ok(0);
        }
        let mut rebuilt = Self::with_config(self.config);
        rebuilt.skipped = self.skipped;
        let mut moved = 0;
        for record in &self.records {
            let record = if record.core_number() == from {
                moved += 1;
                record.with_core_number(to)
            } else {
                record.clone()
            };
            rebuilt.insert(record)?;
        }
        debug!(
            from,
            to,
            moved,
            before = self.records.len(),
            after = rebuilt.records.len(),
            "reassigned embedding records"
        );
        *self = rebuilt;
        Ok(moved)
    }
}

impl<'a> IntoIterator for &'a EmbeddingRegistry {
    type Item = &'a EmbeddedInfo;
    type IntoIter = std::slice::Iter<'a, EmbeddedInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
