use tracing::warn;

use crate::error::{ChainValidationError, TamperCause};

use super::chain::{Block, Blockchain};
use super::merkle::calculate_merkle_root;

/// Check one block against itself.
///
/// The Merkle root is checked before the hash, so editing a course reports
/// `TamperedMerkleRoot` even though the hash no longer matches either.
pub fn validate_block(block: &Block) -> Result<(), TamperCause> {
    let expected_merkle_root = calculate_merkle_root(&block.transcript().courses);
    if block.merkle_root() != expected_merkle_root.as_slice() {
        return Err(TamperCause::TamperedMerkleRoot);
    }

    if block.hash() != block.calculate_hash().as_slice() {
        return Err(TamperCause::TamperedHash);
    }

    Ok(())
}

/// Scan `blocks` in order and stop at the first failure.
pub fn validate_blocks(blocks: &[Block]) -> Result<(), ChainValidationError> {
    for (index, block) in blocks.iter().enumerate() {
        let fail = |cause: TamperCause| {
            warn!(index, %cause, hash = %block.hash_hex(), "chain.validation_failed");
            ChainValidationError { index, cause }
        };

        validate_block(block).map_err(&fail)?;

        if index > 0 && block.prev_hash() != blocks[index - 1].hash() {
            return Err(fail(TamperCause::BrokenLink));
        }
    }
    Ok(())
}

impl Blockchain {
    /// Read-only integrity scan of the whole chain.
    pub fn validate(&self) -> Result<(), ChainValidationError> {
        validate_blocks(self.blocks())
    }
}
