//! The ledger: a chain plus the staging area that feeds it
//!
//! The ledger has no internal locking. Callers sharing it between tasks wrap
//! the whole value in a single lock so appends and reads never interleave.

use tracing::info;

use crate::blockchain::{Block, Blockchain};
use crate::error::{ChainValidationError, Result};
use crate::staging::StagingArea;
use crate::transcript::{Course, TranscriptHeader};

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    chain: Blockchain,
    staging: StagingArea,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_course(&mut self, course: Course) -> Result<()> {
        self.staging.add_course(course)?;
        info!(staged = self.staging.len(), "course.staged");
        Ok(())
    }

    pub fn staged_courses(&self) -> &[Course] {
        self.staging.courses()
    }

    /// Seal every staged course into a new block for the given student.
    pub fn commit(&mut self, header: TranscriptHeader) -> Result<&Block> {
        let transcript = self.staging.take_transcript(header)?;
        info!(
            student_id = %transcript.student_id,
            courses = transcript.courses.len(),
            "transcript.committed"
        );
        Ok(self.chain.add_block(transcript))
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn validate(&self) -> std::result::Result<(), ChainValidationError> {
        self.chain.validate()
    }
}

#[cfg(test)]
impl Ledger {
    /// Direct chain access for fault-injection tests.
    pub(crate) fn chain_mut(&mut self) -> &mut Blockchain {
        &mut self.chain
    }
}
