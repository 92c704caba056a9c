use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use tracing::{debug, info};

use crate::crypto::{digest_to_hex, sha256_concat, Digest};
use crate::transcript::Transcript;

use super::merkle::calculate_merkle_root;

/// Student id carried by the genesis transcript.
pub const GENESIS_STUDENT_ID: &str = "GENESIS";
/// Student name carried by the genesis transcript.
pub const GENESIS_STUDENT_NAME: &str = "Genesis";
/// Unix time of the genesis block and its transcript: 2024-01-01T00:00:00Z.
pub const GENESIS_TIMESTAMP_SECS: i64 = 1_704_067_200;

/// Textual form of a block timestamp as it enters the block hash.
///
/// Second precision with an explicit UTC offset, e.g. `2024-01-01T00:00:00+00:00`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// `sha256(prev_hash || transcript bytes || merkle_root || timestamp text)`
pub fn calculate_block_hash(
    prev_hash: &[u8],
    transcript: &Transcript,
    merkle_root: &[u8],
    timestamp: &DateTime<Utc>,
) -> Digest {
    let transcript_bytes = transcript.canonical_bytes();
    let timestamp_text = format_timestamp(timestamp);
    sha256_concat(&[
        prev_hash,
        &transcript_bytes,
        merkle_root,
        timestamp_text.as_bytes(),
    ])
}

/// A sealed ledger entry. Fields are read-only outside the crate's tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) transcript: Transcript,
    pub(crate) prev_hash: Digest,
    pub(crate) merkle_root: Digest,
    pub(crate) hash: Digest,
}

impl Block {
    /// Seal `transcript` on top of `prev_hash`, stamped with the current time.
    pub fn new(transcript: Transcript, prev_hash: Digest) -> Self {
        Self::new_at(transcript, prev_hash, Utc::now())
    }

    /// Seal `transcript` with an explicit timestamp.
    pub fn new_at(transcript: Transcript, prev_hash: Digest, timestamp: DateTime<Utc>) -> Self {
        let merkle_root = calculate_merkle_root(&transcript.courses);
        let hash = calculate_block_hash(&prev_hash, &transcript, &merkle_root, &timestamp);

        debug!(
            student_id = %transcript.student_id,
            courses = transcript.courses.len(),
            hash = %digest_to_hex(&hash),
            "block.created"
        );

        Block {
            timestamp,
            transcript,
            prev_hash,
            merkle_root,
            hash,
        }
    }

    /// The fixed first block of every chain.
    pub fn genesis() -> Self {
        let at = genesis_time();
        let transcript = Transcript {
            student_id: GENESIS_STUDENT_ID.to_string(),
            student_name: GENESIS_STUDENT_NAME.to_string(),
            faculty: String::new(),
            major: String::new(),
            university: String::new(),
            courses: Vec::new(),
            gpa: 0.0,
            issue_date: at,
        };
        Self::new_at(transcript, Digest::new(), at)
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn prev_hash(&self) -> &[u8] {
        &self.prev_hash
    }

    pub fn merkle_root(&self) -> &[u8] {
        &self.merkle_root
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        digest_to_hex(&self.hash)
    }

    /// Recompute the hash from the stored fields.
    pub fn calculate_hash(&self) -> Digest {
        calculate_block_hash(&self.prev_hash, &self.transcript, &self.merkle_root, &self.timestamp)
    }
}

fn genesis_time() -> DateTime<Utc> {
    Utc.timestamp_opt(GENESIS_TIMESTAMP_SECS, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Append-only chain of transcript blocks. Index 0 is always the genesis block.
#[derive(Debug, Clone)]
pub struct Blockchain {
    pub(crate) blocks: Vec<Block>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a chain holding only the genesis block.
    pub fn new() -> Self {
        Blockchain {
            blocks: vec![Block::genesis()],
        }
    }

    /// Seal `transcript` on top of the current tip. No validation happens here;
    /// integrity is established by [`Blockchain::validate`].
    pub fn add_block(&mut self, transcript: Transcript) -> &Block {
        let prev_hash = self.last_block().hash.clone();
        let block = Block::new(transcript, prev_hash);

        info!(
            index = self.blocks.len(),
            student_id = %block.transcript.student_id,
            hash = %block.hash_hex(),
            "block.appended"
        );

        self.blocks.push(block);
        self.last_block()
    }

    /// Block at `index`, or `None` when the index is negative or past the tip.
    pub fn get_block(&self, index: i64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn last_block(&self) -> &Block {
        // The genesis block is pushed on construction and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a chain carries its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
impl Blockchain {
    /// Direct access for fault-injection tests.
    pub(crate) fn block_mut(&mut self, index: usize) -> &mut Block {
        &mut self.blocks[index]
    }

    /// Swap in a block from elsewhere without touching its fields.
    pub(crate) fn replace_block(&mut self, index: usize, block: Block) {
        self.blocks[index] = block;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::core::fixtures::sample_transcript;

    #[test]
    fn test_genesis_is_reproducible() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert!(a.prev_hash().is_empty());
        assert!(a.merkle_root().is_empty());
        assert_eq!(a.hash().len(), 32);
        assert_eq!(a.transcript().student_id, GENESIS_STUDENT_ID);
        assert_eq!(format_timestamp(a.timestamp()), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_block_hash_formula() {
        let transcript = sample_transcript("B6419936");
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 8, 30, 15).unwrap();
        let prev = vec![7u8; 32];
        let block = Block::new_at(transcript.clone(), prev.clone(), at);

        let root = calculate_merkle_root(&transcript.courses);
        let expected = sha256_concat(&[
            &prev,
            &transcript.canonical_bytes(),
            &root,
            b"2024-06-02T08:30:15+00:00",
        ]);
        assert_eq!(block.merkle_root(), root.as_slice());
        assert_eq!(block.hash(), expected.as_slice());
        assert_eq!(block.calculate_hash(), expected);
    }

    #[test]
    fn test_sub_second_precision_does_not_affect_hash() {
        let transcript = sample_transcript("B6419936");
        let whole = Utc.with_ymd_and_hms(2024, 6, 2, 8, 30, 15).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(750);

        let a = Block::new_at(transcript.clone(), Digest::new(), whole);
        let b = Block::new_at(transcript, Digest::new(), fractional);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.timestamp(), b.timestamp());
    }

    #[test]
    fn test_chain_growth_links_blocks() {
        let mut chain = Blockchain::new();
        chain.add_block(sample_transcript("B6419936"));
        chain.add_block(sample_transcript("B6419937"));

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.blocks()[1].prev_hash(), chain.blocks()[0].hash());
        assert_eq!(chain.blocks()[2].prev_hash(), chain.blocks()[1].hash());
        assert_eq!(chain.last_block().transcript().student_id, "B6419937");
    }

    #[test]
    fn test_get_block_out_of_range() {
        let mut chain = Blockchain::new();
        chain.add_block(sample_transcript("B6419936"));

        assert!(chain.get_block(-1).is_none());
        assert!(chain.get_block(chain.len() as i64).is_none());
        assert!(chain.get_block(0).is_some());
        assert_eq!(
            chain.get_block(1).map(|b| b.transcript().student_id.as_str()),
            Some("B6419936")
        );
    }
}
