//! Content signatures over canonical tag sequences.
//!
//! Signatures are blake3 digests of a length-prefixed little-endian encoding,
//! so two sequences hash alike only when they hold the same tags in the same
//! order. Each kind of signature is domain-separated by a prefix, keeping a
//! primary sequence from ever matching a whole structure by accident.
//!
//! Signatures are derived, process-local state. They are never persisted.

use std::fmt;

use blake3::Hasher;

use crate::embedded::Tag;

/// Domain prefix for signatures over a single primary sequence.
const PRIMARY_DOMAIN: &[u8] = b"femora.embedded.primary";
/// Domain prefix for signatures over a full canonical pair list.
const STRUCTURE_DOMAIN: &[u8] = b"femora.embedded.structure";

/// Fixed-size digest standing in for a canonical sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(blake3::Hash);

impl Signature {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Lowercase hexadecimal rendering of the digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use femora_embed::signature::primary_signature;
    ///
    /// let hex = primary_signature(&[1, 2]).to_hex();
    /// assert_eq!(hex.len(), 64);
    /// assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first eight bytes are plenty to tell signatures apart in logs.
        let hex = self.0.to_hex();
        write!(f, "Signature({}..)", &hex[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

/// Feed a sequence into `hasher` with its length up front.
fn update_sequence(hasher: &mut Hasher, tags: &[Tag]) {
    hasher.update(&(tags.len() as u64).to_le_bytes());
    for tag in tags {
        hasher.update(&tag.to_le_bytes());
    }
}

/// Signature of one primary sequence. Order is significant.
#[must_use]
pub fn primary_signature(primary: &[Tag]) -> Signature {
    let mut hasher = Hasher::new();
    hasher.update(PRIMARY_DOMAIN);
    update_sequence(&mut hasher, primary);
    Signature(hasher.finalize())
}

/// Signature of a canonical pair list.
///
/// The caller is responsible for canonical ordering; this function hashes the
/// pairs exactly as given.
#[must_use]
pub fn structure_signature(pairs: &[(Vec<Tag>, Vec<Tag>)]) -> Signature {
    let mut hasher = Hasher::new();
    hasher.update(STRUCTURE_DOMAIN);
    hasher.update(&(pairs.len() as u64).to_le_bytes());
    for (primary, associated) in pairs {
        update_sequence(&mut hasher, primary);
        update_sequence(&mut hasher, associated);
    }
    Signature(hasher.finalize())
}
