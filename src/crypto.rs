//! Hash primitives for TranscriptChain
//!
//! Every digest in the ledger (Merkle leaves, Merkle nodes and block hashes)
//! is a SHA-256 output. Digests are kept as byte vectors because the empty
//! digest (zero bytes) is a meaningful value: it is the Merkle root of an
//! empty course list and the previous hash of the genesis block.

use sha2::{Digest as _, Sha256};

/// A hash value. Either 32 bytes of SHA-256 output or empty.
pub type Digest = Vec<u8>;

/// SHA-256 of a single byte string.
pub fn sha256(data: &[u8]) -> Digest {
    Sha256::digest(data).to_vec()
}

/// SHA-256 of the concatenation of `parts`, with no separators.
pub fn sha256_concat(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Convert a digest to a hex string for display.
pub fn digest_to_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}
