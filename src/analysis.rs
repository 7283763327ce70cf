use std::collections::BTreeSet;

use femora_embed::{
    ConflictPolicy, CoreNumber, EmbeddedInfo, EmbeddingRegistry, Insertion, RegistryConfig,
    RegistryError, Relation,
};

/// Pairwise classification counts over the input records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationTally {
    /// Pairs classified [`Relation::Equal`].
    pub equal: usize,
    /// Pairs classified [`Relation::Conflict`].
    pub conflict: usize,
    /// Pairs classified [`Relation::Similar`].
    pub similar: usize,
    /// Pairs classified [`Relation::Unrelated`].
    pub unrelated: usize,
}

impl RelationTally {
    /// Count one classified pair.
    fn record(&mut self, relation: Relation) {
        match relation {
            Relation::Equal => self.equal += 1,
            Relation::Conflict => self.conflict += 1,
            Relation::Similar => self.similar += 1,
            Relation::Unrelated => self.unrelated += 1,
        }
    }
}

/// One similarity cluster of stored records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Number of records in the cluster.
    pub records: usize,
    /// Distinct beams across the cluster.
    pub beams: usize,
    /// Distinct solids across the cluster.
    pub solids: usize,
    /// Cores owning the cluster's records.
    pub cores: BTreeSet<CoreNumber>,
}

/// Outcome of feeding a batch of records through an [`EmbeddingRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Policy applied to conflicts.
    pub policy: ConflictPolicy,
    /// Records read from the input.
    pub received: usize,
    /// Records stored after deduplication.
    pub stored: usize,
    /// Records recognised as duplicates.
    pub duplicates: usize,
    /// Conflicting records dropped.
    pub skipped: usize,
    /// Pairwise relations among the input records.
    pub relations: RelationTally,
    /// Similarity clusters, largest first.
    pub clusters: Vec<ClusterSummary>,
}

/// Deduplicate and cluster `records`.
///
/// Every input pair is also classified directly so the report can show how
/// the raw partitioner output relates before deduplication.
pub fn run_analysis(
    records: &[EmbeddedInfo],
    config: RegistryConfig,
) -> Result<AnalysisSummary, RegistryError> {
    let mut relations = RelationTally::default();
    for (index, first) in records.iter().enumerate() {
        for second in &records[index + 1..] {
            relations.record(first.compare(second));
        }
    }

    let mut registry = EmbeddingRegistry::with_config(config);
    let mut duplicates = 0;
    for insertion in registry.extend(records.iter().cloned())? {
        if let Insertion::Duplicate(_) = insertion {
            duplicates += 1;
        }
    }

    let mut clusters: Vec<ClusterSummary> = registry
        .clusters()
        .into_iter()
        .map(|members| {
            let beams: BTreeSet<_> = members
                .iter()
                .flat_map(|info| info.beams().iter())
                .collect();
            let solids: BTreeSet<_> = members
                .iter()
                .flat_map(|info| info.associated_ids().iter())
                .collect();
            ClusterSummary {
                records: members.len(),
                beams: beams.len(),
                solids: solids.len(),
                cores: members.iter().map(|info| info.core_number()).collect(),
            }
        })
        .collect();
    clusters.sort_by(|a, b| b.records.cmp(&a.records));

    Ok(AnalysisSummary {
        policy: config.conflict_policy,
        received: records.len(),
        stored: registry.len(),
        duplicates,
        skipped: registry.skipped(),
        relations,
        clusters,
    })
}
