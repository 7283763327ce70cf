use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use femora_embed::{EmbeddedInfo, Relation, Tag};
use proptest::prelude::*;

type Pairs = Vec<(Vec<Tag>, Vec<Tag>)>;

fn hash_of(info: &EmbeddedInfo) -> u64 {
    let mut hasher = DefaultHasher::new();
    info.hash(&mut hasher);
    hasher.finish()
}

fn tags(max_len: usize) -> impl Strategy<Value = Vec<Tag>> {
    prop::collection::vec(0..50_i64, 0..max_len)
}

fn pairs() -> impl Strategy<Value = Pairs> {
    prop::collection::vec((tags(4), tags(6)), 0..5)
}

fn record() -> impl Strategy<Value = (Vec<Tag>, i64, Pairs)> {
    (tags(6), 0..4_i64, pairs())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn beam_order_is_irrelevant((beams, core, pairs) in record()) {
        let forward = EmbeddedInfo::new(beams.clone(), core, pairs.clone());
        let reversed = EmbeddedInfo::new(beams.into_iter().rev(), core, pairs);
        prop_assert!(forward.equals(&reversed));
        prop_assert_eq!(hash_of(&forward), hash_of(&reversed));
    }

    #[test]
    fn associated_order_is_irrelevant(
        (beams, core, pairs) in record(),
        (other_beams, other_core, other_pairs) in record(),
    ) {
        let shuffled: Pairs = pairs
            .iter()
            .map(|(primary, associated)| {
                (primary.clone(), associated.iter().rev().copied().collect())
            })
            .collect();
        let original = EmbeddedInfo::new(beams.clone(), core, pairs);
        let permuted = EmbeddedInfo::new(beams, core, shuffled);
        let other = EmbeddedInfo::new(other_beams, other_core, other_pairs);

        prop_assert!(original.equals(&permuted));
        prop_assert_eq!(original.is_conflict(&other), permuted.is_conflict(&other));
        prop_assert_eq!(original.is_similar(&other), permuted.is_similar(&other));
    }

    #[test]
    fn pair_order_is_irrelevant((beams, core, pairs) in record()) {
        let mut rotated = pairs.clone();
        if !rotated.is_empty() {
            rotated.rotate_left(1);
        }
        rotated.reverse();
        let original = EmbeddedInfo::new(beams.clone(), core, pairs);
        let reordered = EmbeddedInfo::new(beams, core, rotated);
        prop_assert_eq!(original.structure_signature(), reordered.structure_signature());
        prop_assert_eq!(original.compare(&reordered), Relation::Equal);
    }

    #[test]
    fn equal_records_hash_alike(
        (beams, core, pairs) in record(),
        (other_beams, other_core, other_pairs) in record(),
    ) {
        let a = EmbeddedInfo::new(beams, core, pairs);
        let b = EmbeddedInfo::new(other_beams, other_core, other_pairs);
        if a.equals(&b) {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
        prop_assert_eq!(hash_of(&a), hash_of(&a.clone()));
    }

    #[test]
    fn classification_matches_predicates(
        (beams, core, pairs) in record(),
        (other_beams, other_core, other_pairs) in record(),
    ) {
        let a = EmbeddedInfo::new(beams, core, pairs);
        let b = EmbeddedInfo::new(other_beams, other_core, other_pairs);
        match a.compare(&b) {
            Relation::Equal => prop_assert!(a.equals(&b)),
            Relation::Conflict => {
                prop_assert!(!a.equals(&b));
                prop_assert!(a.is_conflict(&b));
                prop_assert!(!a.is_similar(&b));
            }
            Relation::Similar => {
                prop_assert!(!a.equals(&b));
                prop_assert!(a.is_similar(&b));
            }
            Relation::Unrelated => {
                prop_assert!(!a.is_conflict(&b));
                prop_assert!(!a.is_similar(&b));
            }
        }
        prop_assert_eq!(a.compare(&b), b.compare(&a));
    }

    #[test]
    fn same_core_reassignment_is_identity((beams, core, pairs) in record()) {
        let info = EmbeddedInfo::new(beams, core, pairs);
        prop_assert!(info.with_core_number(info.core_number()).equals(&info));
    }
}
