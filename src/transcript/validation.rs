//! Field validation for records arriving from outside the ledger
use crate::error::ChainError;
use crate::transcript::types::{Course, TranscriptHeader};

/// Upper bound on credits for a single course.
pub const MAX_COURSE_CREDITS: u32 = 30;

fn require(field: &str, value: &str, err: fn(String) -> ChainError) -> Result<(), ChainError> {
    if value.trim().is_empty() {
        return Err(err(format!("{} is required", field)));
    }
    Ok(())
}

impl Course {
    /// Checks that every required field is present before the course is staged.
    pub fn validate(&self) -> Result<(), ChainError> {
        require("course_code", &self.course_code, ChainError::InvalidCourse)?;
        require("course_name", &self.course_name, ChainError::InvalidCourse)?;
        require("semester", &self.semester, ChainError::InvalidCourse)?;
        require("grade", &self.grade, ChainError::InvalidCourse)?;

        if self.credits == 0 || self.credits > MAX_COURSE_CREDITS {
            return Err(ChainError::InvalidCourse(format!(
                "credits must be between 1 and {}, got {}",
                MAX_COURSE_CREDITS, self.credits
            )));
        }
        Ok(())
    }
}

impl TranscriptHeader {
    pub fn validate(&self) -> Result<(), ChainError> {
        require("student_id", &self.student_id, ChainError::InvalidTranscript)?;
        require("student_name", &self.student_name, ChainError::InvalidTranscript)?;

        if !self.gpa.is_finite() || self.gpa < 0.0 {
            return Err(ChainError::InvalidTranscript(format!(
                "gpa must be a non-negative number, got {}",
                self.gpa
            )));
        }
        Ok(())
    }
}
