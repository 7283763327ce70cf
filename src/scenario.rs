use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use femora_embed::{CoreNumber, EmbeddedInfo, EmbeddedRecord, Tag};

/// Shape of the built-in pile group used when no input file is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PileGroupLayout {
    /// Number of piles in the row.
    pub piles: usize,
    /// Beam segments per pile.
    pub segments_per_pile: usize,
    /// Number of partitions the piles are dealt across.
    pub cores: CoreNumber,
    /// Soil elements surrounding each beam segment.
    pub solids_per_segment: usize,
}

impl Default for PileGroupLayout {
    fn default() -> Self {
        Self {
            piles: 4,
            segments_per_pile: 3,
            cores: 2,
            solids_per_segment: 4,
        }
    }
}

/// Build one record per pile, as a partitioner would report them.
///
/// Piles are paired off: both piles of a pair reach a common soil element
/// under their tips, so each pair forms one similarity cluster. The first
/// pile is reported a second time with its inputs in reverse order, which the
/// registry must recognise as a duplicate.
pub fn build_pile_group(layout: &PileGroupLayout) -> Vec<EmbeddedInfo> {
    let mut pairs_by_pile = Vec::with_capacity(layout.piles);
    for pile in 0..layout.piles {
        let first_beam = (pile * layout.segments_per_pile) as Tag + 1;
        let beams: Vec<Tag> = (0..layout.segments_per_pile as Tag)
            .map(|segment| first_beam + segment)
            .collect();

        let mut beams_solids: Vec<(Vec<Tag>, Vec<Tag>)> = beams
            .iter()
            .enumerate()
            .map(|(segment, &beam)| {
                let first_solid = 1_000 * (pile as Tag + 1)
                    + (segment * layout.solids_per_segment) as Tag;
                let solids: Vec<Tag> = (0..layout.solids_per_segment as Tag)
                    .map(|offset| first_solid + offset)
                    .collect();
                (vec![beam], solids)
            })
            .collect();

        let partner = pile ^ 1;
        if partner < layout.piles {
            if let Some((_, tip_solids)) = beams_solids.last_mut() {
                tip_solids.push(9_000 + (pile / 2) as Tag);
            }
        }

        let core = pile as CoreNumber % layout.cores.max(1);
        pairs_by_pile.push((beams, core, beams_solids));
    }

    let mut records: Vec<EmbeddedInfo> = pairs_by_pile
        .iter()
        .map(|(beams, core, pairs)| {
            EmbeddedInfo::new(beams.iter().copied(), *core, pairs.clone())
        })
        .collect();

    if let Some((beams, core, pairs)) = pairs_by_pile.first() {
        let reversed_pairs = pairs.iter().rev().map(|(primary, solids)| {
            let solids: Vec<Tag> = solids.iter().rev().copied().collect();
            (primary.clone(), solids)
        });
        records.push(EmbeddedInfo::new(
            beams.iter().rev().copied(),
            *core,
            reversed_pairs,
        ));
    }
    records
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<EmbeddedInfo>, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<EmbeddedRecord> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(EmbeddedInfo::from).collect())
}
