//! Keyword-set signatures.
//!
//! The cache compares signatures to decide whether a stored cluster index
//! was built from the caller's current keywords.

use std::collections::BTreeSet;

use sha3::{Digest, Sha3_256};

/// Domain separator mixed into every signature.
const DOMAIN_SIGNATURE: &[u8] = b"KWCLUSTER_SIGNATURE_V1";

/// Computes the signature of a keyword set.
///
/// Keywords are trimmed, lowercased, de-duplicated and sorted before hashing,
/// so the result ignores order, case and repeats. Returns 64 hex chars.
pub fn keyword_signature<I, K>(keywords: I) -> String
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let normalized: BTreeSet<String> = keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let mut hasher = Sha3_256::new();
    hasher.update(DOMAIN_SIGNATURE);
    for keyword in &normalized {
        // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart.
        hasher.update((keyword.len() as u64).to_le_bytes());
        hasher.update(keyword.as_bytes());
    }
    hex::encode(hasher.finalize())
}
