//! Immutable beam-to-solid embedding records and their classification.

use std::any::Any;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::errors::ComparisonError;
use crate::signature::{primary_signature, structure_signature, Signature};

/// Identifier of a beam or solid element.
pub type Tag = i64;

/// Identifier of the partition that owns a record.
pub type CoreNumber = i64;

/// One association between an ordered primary sequence and a set of solids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeamSolidPair {
    /// Primary identifiers in caller order.
    primary: Vec<Tag>,
    /// Associated solid identifiers.
    associated: BTreeSet<Tag>,
}

impl BeamSolidPair {
    /// Build a pair, collapsing duplicate solid identifiers.
    #[must_use]
    pub fn new<P, A>(primary: P, associated: A) -> Self
    where
        P: IntoIterator<Item = Tag>,
        A: IntoIterator<Item = Tag>,
    {
        Self {
            primary: primary.into_iter().collect(),
            associated: associated.into_iter().collect(),
        }
    }

    /// Primary identifiers in the order they were supplied.
    #[must_use]
    pub fn primary(&self) -> &[Tag] {
        &self.primary
    }

    /// Associated solid identifiers in ascending order.
    #[must_use]
    pub fn associated(&self) -> &BTreeSet<Tag> {
        &self.associated
    }
}

/// Outcome of comparing two records with [`EmbeddedInfo::compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Same beams, same core and the same canonical association structure.
    Equal,
    /// Same beams with at least one primary sequence claimed by both records.
    Conflict,
    /// Same beams without a conflict, or beams that touch a shared solid.
    Similar,
    /// Nothing in common.
    Unrelated,
}

impl Relation {
    /// Lowercase name of the relation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Relation::Equal => "equal",
            Relation::Conflict => "conflict",
            Relation::Similar => "similar",
            Relation::Unrelated => "unrelated",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cluster of beams embedded into one core, with its beam-to-solid
/// associations.
///
/// All comparison data is derived once in [`EmbeddedInfo::new`]. Every query
/// afterwards is a lookup over those frozen fields, and there is no way to
/// mutate a record in place: [`EmbeddedInfo::with_core_number`] returns a new
/// one.
///
/// # Examples
///
/// ```
/// use femora_embed::{EmbeddedInfo, Relation};
///
/// let first = EmbeddedInfo::new([1, 2, 3], 5, vec![(vec![1, 2], vec![3, 4]), (vec![5, 6], vec![7, 8])]);
/// let second = EmbeddedInfo::new([3, 2, 1], 5, vec![(vec![5, 6], vec![8, 7]), (vec![1, 2], vec![4, 3])]);
/// assert_eq!(first.compare(&second), Relation::Equal);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "EmbeddedRecord", into = "EmbeddedRecord")]
pub struct EmbeddedInfo {
    /// Beam identifiers belonging to the record.
    beams: BTreeSet<Tag>,
    /// Owning partition.
    core_number: CoreNumber,
    /// Associations in caller order.
    beams_solids: Vec<BeamSolidPair>,
    /// Associations sorted by `(primary, associated)`.
    canonical_pairs: Vec<(Vec<Tag>, Vec<Tag>)>,
    /// One signature per distinct primary sequence.
    primary_signatures: HashSet<Signature>,
    /// Signature over `canonical_pairs`.
    structure_signature: Signature,
    /// Every solid named by any association.
    associated_ids: HashSet<Tag>,
}

impl EmbeddedInfo {
    /// Build a record. Construction never fails; empty inputs are allowed.
    ///
    /// Duplicate beams and duplicate solids within one association are
    /// collapsed. The order of primary identifiers is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use femora_embed::EmbeddedInfo;
    ///
    /// let info = EmbeddedInfo::new([2, 1, 2], 0, vec![(vec![1, 2], vec![9, 9, 8])]);
    /// assert_eq!(info.beams().len(), 2);
    /// assert_eq!(info.canonical_pairs(), &[(vec![1, 2], vec![8, 9])]);
    /// ```
    #[must_use]
    pub fn new<B, S, P, A>(beams: B, core_number: CoreNumber, beams_solids: S) -> Self
    where
        B: IntoIterator<Item = Tag>,
        S: IntoIterator<Item = (P, A)>,
        P: IntoIterator<Item = Tag>,
        A: IntoIterator<Item = Tag>,
    {
        let pairs = beams_solids
            .into_iter()
            .map(|(primary, associated)| BeamSolidPair::new(primary, associated))
            .collect();
        Self::from_parts(beams.into_iter().collect(), core_number, pairs)
    }

    /// Build a record from already-collected parts and freeze its derived
    /// fields.
    fn from_parts(
        beams: BTreeSet<Tag>,
        core_number: CoreNumber,
        beams_solids: Vec<BeamSolidPair>,
    ) -> Self {
        let mut canonical_pairs: Vec<(Vec<Tag>, Vec<Tag>)> = beams_solids
            .iter()
            .map(|pair| {
                (
                    pair.primary.clone(),
                    pair.associated.iter().copied().collect(),
                )
            })
            .collect();
        canonical_pairs.sort();

        let primary_signatures = canonical_pairs
            .iter()
            .map(|(primary, _)| primary_signature(primary))
            .collect();
        let structure_signature = structure_signature(&canonical_pairs);
        let associated_ids = beams_solids
            .iter()
            .flat_map(|pair| pair.associated.iter().copied())
            .collect();

        Self {
            beams,
            core_number,
            beams_solids,
            canonical_pairs,
            primary_signatures,
            structure_signature,
            associated_ids,
        }
    }

    /// Beam identifiers in ascending order.
    #[must_use]
    pub fn beams(&self) -> &BTreeSet<Tag> {
        &self.beams
    }

    /// Partition that owns the record.
    #[must_use]
    pub fn core_number(&self) -> CoreNumber {
        self.core_number
    }

    /// Associations in the order they were supplied.
    #[must_use]
    pub fn beams_solids(&self) -> &[BeamSolidPair] {
        &self.beams_solids
    }

    /// Order-independent form of the associations.
    #[must_use]
    pub fn canonical_pairs(&self) -> &[(Vec<Tag>, Vec<Tag>)] {
        &self.canonical_pairs
    }

    /// Signatures of the distinct primary sequences.
    #[must_use]
    pub fn primary_signatures(&self) -> &HashSet<Signature> {
        &self.primary_signatures
    }

    /// Signature of the canonical association structure.
    #[must_use]
    pub fn structure_signature(&self) -> Signature {
        self.structure_signature
    }

    /// Every solid identifier named by any association.
    #[must_use]
    pub fn associated_ids(&self) -> &HashSet<Tag> {
        &self.associated_ids
    }

    /// Same beams, same core and the same canonical structure.
    ///
    /// The beam and core checks run first so most mismatches never reach the
    /// signature comparison.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.beams == other.beams
            && self.core_number == other.core_number
            && self.structure_signature == other.structure_signature
    }

    /// Same beams with at least one primary sequence claimed by both records.
    #[must_use]
    pub fn is_conflict(&self, other: &Self) -> bool {
        self.beams == other.beams
            && !self
                .primary_signatures
                .is_disjoint(&other.primary_signatures)
    }

    /// Related without conflicting: the same beams, or any shared solid.
    #[must_use]
    pub fn is_similar(&self, other: &Self) -> bool {
        if self.is_conflict(other) {
            return false;
        }
        self.beams == other.beams || !self.associated_ids.is_disjoint(&other.associated_ids)
    }

    /// Classify the relationship between two records.
    ///
    /// The checks run in a fixed order, so exactly one [`Relation`] applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use femora_embed::{EmbeddedInfo, Relation};
    ///
    /// let pile = EmbeddedInfo::new([1, 2, 3], 5, vec![(vec![1, 2], vec![3, 4])]);
    /// let moved = EmbeddedInfo::new([1, 2, 3], 10, vec![(vec![1, 2], vec![9, 10])]);
    /// assert_eq!(pile.compare(&moved), Relation::Conflict);
    /// ```
    #[must_use]
    pub fn compare(&self, other: &Self) -> Relation {
        if self.equals(other) {
            return Relation::Equal;
        }
        if self.beams == other.beams {
            if !self.primary_signatures.is_disjoint(&other.primary_signatures) {
                return Relation::Conflict;
            }
            return Relation::Similar;
        }
        if !self.associated_ids.is_disjoint(&other.associated_ids) {
            return Relation::Similar;
        }
        Relation::Unrelated
    }

    /// Classify against a value whose type is only known at run time.
    ///
    /// A boxed value passed as `&Box<dyn Any>` is unwrapped first, so both
    /// `&*boxed` and `&boxed` reach the record inside.
    ///
    /// # Errors
    ///
    /// Returns [`ComparisonError::TypeMismatch`] when `other` is not an
    /// [`EmbeddedInfo`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::any::Any;
    /// use femora_embed::{ComparisonError, EmbeddedInfo, Relation};
    ///
    /// let info = EmbeddedInfo::new([1, 2], 0, vec![(vec![1, 2], vec![10])]);
    /// let erased: Box<dyn Any> = Box::new(info.clone());
    /// assert_eq!(info.compare_dyn(&*erased), Ok(Relation::Equal));
    /// assert_eq!(info.compare_dyn(&7_u8), Err(ComparisonError::TypeMismatch));
    /// ```
    pub fn compare_dyn(&self, other: &dyn Any) -> Result<Relation, ComparisonError> {
        if let Some(other) = other.downcast_ref::<Self>() {
            return Ok(self.compare(other));
        }
        match other.downcast_ref::<Box<dyn Any>>() {
            Some(inner) => self.compare_dyn(&**inner),
            None => Err(ComparisonError::TypeMismatch),
        }
    }

    /// Copy of this record owned by another core.
    ///
    /// # Examples
    ///
    /// ```
    /// use femora_embed::EmbeddedInfo;
    ///
    /// let info = EmbeddedInfo::new([1], 0, vec![(vec![1], vec![20])]);
    /// let moved = info.with_core_number(3);
    /// assert_eq!(moved.core_number(), 3);
    /// assert_eq!(info.core_number(), 0);
    /// assert_eq!(moved.structure_signature(), info.structure_signature());
    /// ```
    #[must_use]
    pub fn with_core_number(&self, core_number: CoreNumber) -> Self {
        Self {
            core_number,
            ..self.clone()
        }
    }
}

impl PartialEq for EmbeddedInfo {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for EmbeddedInfo {}

impl Hash for EmbeddedInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.beams.hash(state);
        self.core_number.hash(state);
        self.structure_signature.hash(state);
    }
}

impl fmt::Display for EmbeddedInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EmbeddedInfo(core={}, beams={:?}, pairs={})",
            self.core_number,
            self.beams,
            self.beams_solids.len()
        )
    }
}

/// Plain mirror of [`EmbeddedInfo`] used for serialization.
///
/// Deserializing an [`EmbeddedInfo`] always goes through this type and the
/// constructor, so derived fields are recomputed rather than trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRecord {
    /// Beam identifiers.
    pub beams: Vec<Tag>,
    /// Owning partition.
    pub core_number: CoreNumber,
    /// `(primary, associated)` pairs.
    #[serde(default)]
    pub beams_solids: Vec<(Vec<Tag>, Vec<Tag>)>,
}

impl From<EmbeddedRecord> for EmbeddedInfo {
    fn from(record: EmbeddedRecord) -> Self {
        EmbeddedInfo::new(record.beams, record.core_number, record.beams_solids)
    }
}

impl From<&EmbeddedInfo> for EmbeddedRecord {
    fn from(info: &EmbeddedInfo) -> Self {
        Self {
            beams: info.beams.iter().copied().collect(),
            core_number: info.core_number,
            beams_solids: info
                .beams_solids
                .iter()
                .map(|pair| {
                    (
                        pair.primary.clone(),
                        pair.associated.iter().copied().collect(),
                    )
                })
                .collect(),
        }
    }
}

impl From<EmbeddedInfo> for EmbeddedRecord {
    fn from(info: EmbeddedInfo) -> Self {
        Self::from(&info)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(info: &EmbeddedInfo) -> u64 {
        let mut hasher = DefaultHasher::new();
        info.hash(&mut hasher);
        hasher.finish()
    }

    fn reference() -> EmbeddedInfo {
        EmbeddedInfo::new(
            [1, 2, 3],
            5,
            vec![(vec![1, 2], vec![3, 4]), (vec![5, 6], vec![7, 8])],
        )
    }

    #[test]
    fn reordered_inputs_are_equal() {
        let other = EmbeddedInfo::new(
            [3, 2, 1],
            5,
            vec![(vec![5, 6], vec![8, 7]), (vec![1, 2], vec![4, 3])],
        );
        assert_eq!(reference().compare(&other), Relation::Equal);
        assert_eq!(reference(), other);
        assert_eq!(hash_of(&reference()), hash_of(&other));
    }

    #[test]
    fn shared_primary_on_same_beams_conflicts() {
        let other = EmbeddedInfo::new([1, 2, 3], 10, vec![(vec![1, 2], vec![9, 10])]);
        assert!(reference().is_conflict(&other));
        assert!(!reference().is_similar(&other));
        assert_eq!(reference().compare(&other), Relation::Conflict);
    }

    #[test]
    fn same_beams_without_shared_primary_are_similar() {
        let other = EmbeddedInfo::new([1, 2, 3], 7, vec![(vec![9, 10], vec![11, 12])]);
        assert!(!reference().is_conflict(&other));
        assert!(reference().is_similar(&other));
        assert_eq!(reference().compare(&other), Relation::Similar);
    }

    #[test]
    fn disjoint_records_are_unrelated() {
        let other = EmbeddedInfo::new([4, 5, 6], 5, vec![(vec![1, 2], vec![30, 40])]);
        assert!(!reference().is_similar(&other));
        assert_eq!(reference().compare(&other), Relation::Unrelated);
    }

    #[test]
    fn disjoint_beams_sharing_solids_are_similar() {
        // Solids 3 and 4 appear in both records.
        let other = EmbeddedInfo::new([4, 5, 6], 5, vec![(vec![1, 2], vec![3, 4])]);
        assert!(!reference().is_conflict(&other));
        assert_eq!(reference().compare(&other), Relation::Similar);

        let a = EmbeddedInfo::new([10], 0, vec![(vec![10], vec![100])]);
        let b = EmbeddedInfo::new([20], 1, vec![(vec![20], vec![100, 101])]);
        assert_eq!(a.compare(&b), Relation::Similar);
    }

    #[test]
    fn primary_order_is_significant() {
        let forward = EmbeddedInfo::new([1, 2], 5, vec![(vec![1, 2], vec![3, 4])]);
        let reversed = EmbeddedInfo::new([1, 2], 6, vec![(vec![2, 1], vec![3, 4])]);
        assert!(!forward.is_conflict(&reversed));
        assert_eq!(forward.compare(&reversed), Relation::Similar);

        let same_order = EmbeddedInfo::new([1, 2], 6, vec![(vec![1, 2], vec![5])]);
        assert_eq!(forward.compare(&same_order), Relation::Conflict);
    }

    #[test]
    fn equal_takes_precedence_over_conflict() {
        // Identical records share every primary, but equality wins.
        assert!(reference().is_conflict(&reference()));
        assert_eq!(reference().compare(&reference()), Relation::Equal);
    }

    #[test]
    fn empty_records_are_valid() {
        let empty = EmbeddedInfo::new(Vec::new(), 0, Vec::<(Vec<Tag>, Vec<Tag>)>::new());
        assert!(empty.beams().is_empty());
        assert!(empty.canonical_pairs().is_empty());
        assert!(empty.primary_signatures().is_empty());
        assert!(empty.associated_ids().is_empty());
        assert_eq!(empty.compare(&empty.clone()), Relation::Equal);
        assert_eq!(empty.compare(&empty.with_core_number(1)), Relation::Similar);
    }

    #[test]
    fn with_core_number_leaves_original_untouched() {
        let original = reference();
        let moved = original.with_core_number(9);
        assert_eq!(original.core_number(), 5);
        assert_eq!(moved.core_number(), 9);
        assert_eq!(moved.beams_solids(), original.beams_solids());
        assert_eq!(original.with_core_number(5), original);
        assert_eq!(moved.compare(&original), Relation::Conflict);
    }

    #[test]
    fn compare_dyn_rejects_other_types() {
        let info = reference();
        assert_eq!(info.compare_dyn(&reference()), Ok(Relation::Equal));
        assert_eq!(
            info.compare_dyn(&String::from("beam")),
            Err(ComparisonError::TypeMismatch)
        );
        let boxed_tag: Box<dyn Any> = Box::new(7_i64);
        assert_eq!(
            info.compare_dyn(&boxed_tag),
            Err(ComparisonError::TypeMismatch)
        );
    }

    #[test]
    fn compare_dyn_sees_through_erased_records() {
        let info = reference();
        let erased: Box<dyn Any> = Box::new(info.with_core_number(9));
        assert_eq!(info.compare_dyn(&*erased), Ok(Relation::Conflict));
        assert_eq!(info.compare_dyn(&erased), Ok(Relation::Conflict));
        assert_eq!(
            info.compare_dyn(&*Box::new(reference()) as &dyn Any),
            Ok(Relation::Equal)
        );
    }

    #[test]
    fn duplicate_pairs_are_kept_as_a_multiset() {
        let once = EmbeddedInfo::new([1], 0, vec![(vec![1], vec![2])]);
        let twice = EmbeddedInfo::new([1], 0, vec![(vec![1], vec![2]), (vec![1], vec![2])]);
        assert_eq!(twice.primary_signatures().len(), 1);
        assert_ne!(once.structure_signature(), twice.structure_signature());
        assert_eq!(once.compare(&twice), Relation::Conflict);
    }

    #[test]
    fn records_are_shared_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(reference());
        let handles: Vec<_> = (0..4)
            .map(|core| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || shared.compare(&shared.with_core_number(core)))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread finishes"), Relation::Conflict);
        }
    }

    #[test]
    fn display_summarises_record() {
        assert_eq!(
            reference().to_string(),
            "EmbeddedInfo(core=5, beams={1, 2, 3}, pairs=2)"
        );
        assert_eq!(Relation::Unrelated.to_string(), "unrelated");
    }

    #[test]
    fn serde_goes_through_constructor() {
        let json = r#"{"beams":[3,1,1],"core_number":2,"beams_solids":[[[1,3],[8,7,7]]]}"#;
        let info: EmbeddedInfo = serde_json::from_str(json).expect("valid record");
        assert_eq!(info.beams().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(info.canonical_pairs(), &[(vec![1, 3], vec![7, 8])]);

        let encoded = serde_json::to_string(&info).expect("record serializes");
        let decoded: EmbeddedInfo = serde_json::from_str(&encoded).expect("round trip");
        assert_eq!(decoded, info);
        assert_eq!(
            serde_json::to_string(&Relation::Conflict).expect("relation serializes"),
            "\"conflict\""
        );
    }
}
