//! Staging area for courses waiting to be sealed into the next block
//!
//! Courses are validated as they arrive and kept in insertion order. The
//! buffer is drained as a whole when a transcript is committed.

use chrono::Utc;

use crate::error::{ChainError, Result};
use crate::transcript::{Course, Transcript, TranscriptHeader};

#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    courses: Vec<Course>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a course.
    pub fn add_course(&mut self, course: Course) -> Result<()> {
        course.validate()?;
        self.courses.push(course);
        Ok(())
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Drain every staged course into a transcript issued now.
    ///
    /// On error the staged courses are left in place.
    pub fn take_transcript(&mut self, header: TranscriptHeader) -> Result<Transcript> {
        if self.courses.is_empty() {
            return Err(ChainError::EmptyStagingArea);
        }
        header.validate()?;

        let courses = std::mem::take(&mut self.courses);
        Ok(header.into_transcript(courses, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TranscriptHeader {
        TranscriptHeader {
            student_id: "B6419936".to_string(),
            student_name: "Teerachot Sonnok".to_string(),
            faculty: "Engineering".to_string(),
            major: "Computer Engineering".to_string(),
            university: "Khon Kaen University".to_string(),
            gpa: 3.75,
        }
    }

    #[test]
    fn test_add_and_list_in_order() {
        let mut staging = StagingArea::new();
        staging
            .add_course(Course::new("ENG101", "English for Communication 1", "1/2023", 3, "A"))
            .unwrap();
        staging
            .add_course(Course::new("CPE102", "Computer Programming I", "1/2023", 3, "B+"))
            .unwrap();

        let codes: Vec<&str> = staging.courses().iter().map(|c| c.course_code.as_str()).collect();
        assert_eq!(codes, vec!["ENG101", "CPE102"]);
    }

    #[test]
    fn test_invalid_course_is_rejected() {
        let mut staging = StagingArea::new();
        let result = staging.add_course(Course::new("ENG101", "", "1/2023", 3, "A"));
        assert!(matches!(result, Err(ChainError::InvalidCourse(_))));
        assert!(staging.is_empty());
    }

    #[test]
    fn test_take_transcript_drains_buffer() {
        let mut staging = StagingArea::new();
        staging
            .add_course(Course::new("MAT101", "Calculus I", "1/2023", 4, "A"))
            .unwrap();

        let transcript = staging.take_transcript(header()).unwrap();
        assert_eq!(transcript.student_id, "B6419936");
        assert_eq!(transcript.courses.len(), 1);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_take_transcript_from_empty_buffer() {
        let mut staging = StagingArea::new();
        assert!(matches!(
            staging.take_transcript(header()),
            Err(ChainError::EmptyStagingArea)
        ));
    }

    #[test]
    fn test_bad_header_keeps_staged_courses() {
        let mut staging = StagingArea::new();
        staging
            .add_course(Course::new("PHY101", "Physics I", "1/2023", 3, "B"))
            .unwrap();

        let mut bad = header();
        bad.student_id = String::new();
        assert!(matches!(
            staging.take_transcript(bad),
            Err(ChainError::InvalidTranscript(_))
        ));
        assert_eq!(staging.len(), 1);
    }
}
