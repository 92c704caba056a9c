//! Transcript types for TranscriptChain
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{sha256, Digest};

/// One graded course on a transcript.
///
/// The field order is part of the canonical encoding and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    pub semester: String,
    pub credits: u32,
    pub grade: String,
}

impl Course {
    pub fn new(
        course_code: impl Into<String>,
        course_name: impl Into<String>,
        semester: impl Into<String>,
        credits: u32,
        grade: impl Into<String>,
    ) -> Self {
        Course {
            course_code: course_code.into(),
            course_name: course_name.into(),
            semester: semester.into(),
            credits,
            grade: grade.into(),
        }
    }

    /// Canonical byte encoding used for the Merkle leaf.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json(self)
    }

    /// Merkle leaf digest of this course.
    pub fn hash(&self) -> Digest {
        sha256(&self.canonical_bytes())
    }
}

/// A student's transcript: the payload of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub student_id: String,
    pub student_name: String,
    pub faculty: String,
    pub major: String,
    pub university: String,
    /// Order is significant: it changes the Merkle root.
    pub courses: Vec<Course>,
    /// Finite values encode as JSON numbers; NaN and the infinities as strings.
    #[serde(with = "gpa_format")]
    pub gpa: f64,
    pub issue_date: DateTime<Utc>,
}

impl Transcript {
    /// Canonical byte encoding folded into the block hash.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json(self)
    }
}

/// Student and institution details submitted alongside staged courses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptHeader {
    pub student_id: String,
    pub student_name: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub gpa: f64,
}

impl TranscriptHeader {
    /// Combine the header with an ordered course list into a transcript.
    pub fn into_transcript(self, courses: Vec<Course>, issue_date: DateTime<Utc>) -> Transcript {
        Transcript {
            student_id: self.student_id,
            student_name: self.student_name,
            faculty: self.faculty,
            major: self.major,
            university: self.university,
            courses,
            gpa: self.gpa,
            issue_date,
        }
    }
}

/// Compact JSON in struct declaration order.
///
/// # Panics
///
/// Only if serde_json fails on one of the plain structs above, which would be
/// a programming error rather than a validation outcome.
fn canonical_json<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("transcript types always serialize to JSON")
}

/// serde_json writes every non-finite float as `null`, which would make NaN,
/// `inf` and `-inf` indistinguishable in the canonical bytes.
mod gpa_format {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(gpa: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if gpa.is_finite() {
            serializer.serialize_f64(*gpa)
        } else if gpa.is_nan() {
            serializer.serialize_str("NaN")
        } else if gpa.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(gpa) => Ok(gpa),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(de::Error::custom(format!("invalid gpa {:?}", other))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_course_canonical_bytes_field_order() {
        let course = Course::new("ENG101", "English for Communication 1", "1/2023", 3, "A");
        let json = String::from_utf8(course.canonical_bytes()).unwrap();
        assert_eq!(
            json,
            r#"{"course_code":"ENG101","course_name":"English for Communication 1","semester":"1/2023","credits":3,"grade":"A"}"#
        );
    }

    #[test]
    fn test_course_hash_changes_with_any_field() {
        let base = Course::new("CPE102", "Computer Programming I", "1/2023", 3, "B+");
        let mut other = base.clone();
        other.grade = "B".to_string();
        assert_ne!(base.hash(), other.hash());

        let mut other = base.clone();
        other.credits = 4;
        assert_ne!(base.hash(), other.hash());

        assert_eq!(base.hash(), base.clone().hash());
    }

    #[test]
    fn test_transcript_canonical_bytes_include_course_order() {
        let issue = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let a = Course::new("MAT101", "Calculus I", "1/2023", 4, "A");
        let b = Course::new("PHY101", "Physics I", "1/2023", 3, "B");
        let header = TranscriptHeader {
            student_id: "B6419936".to_string(),
            student_name: "Teerachot Sonnok".to_string(),
            faculty: "Engineering".to_string(),
            major: "Computer Engineering".to_string(),
            university: "Khon Kaen University".to_string(),
            gpa: 3.75,
        };

        let forward = header.clone().into_transcript(vec![a.clone(), b.clone()], issue);
        let reversed = header.into_transcript(vec![b, a], issue);
        assert_ne!(forward.canonical_bytes(), reversed.canonical_bytes());
    }

    #[test]
    fn test_non_finite_gpa_encodings_are_distinct() {
        let issue = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let transcript = |gpa: f64| TranscriptHeader {
            student_id: "B6419936".to_string(),
            student_name: "Teerachot Sonnok".to_string(),
            faculty: String::new(),
            major: String::new(),
            university: String::new(),
            gpa,
        }
        .into_transcript(Vec::new(), issue);

        let encodings: Vec<String> = [3.75, f64::NAN, f64::INFINITY, f64::NEG_INFINITY]
            .into_iter()
            .map(|gpa| String::from_utf8(transcript(gpa).canonical_bytes()).unwrap())
            .collect();

        assert!(encodings[0].contains(r#""gpa":3.75"#));
        assert!(encodings[1].contains(r#""gpa":"NaN""#));
        assert!(encodings[2].contains(r#""gpa":"inf""#));
        assert!(encodings[3].contains(r#""gpa":"-inf""#));
        assert!(encodings.iter().all(|e| !e.contains("null")));
    }

    #[test]
    fn test_gpa_encoding_reads_back() {
        let issue = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut transcript = TranscriptHeader {
            student_id: "B6419936".to_string(),
            student_name: "Teerachot Sonnok".to_string(),
            faculty: String::new(),
            major: String::new(),
            university: String::new(),
            gpa: 3.5,
        }
        .into_transcript(Vec::new(), issue);

        let parsed: Transcript = serde_json::from_slice(&transcript.canonical_bytes()).unwrap();
        assert_eq!(parsed.gpa, 3.5);

        transcript.gpa = f64::NEG_INFINITY;
        let parsed: Transcript = serde_json::from_slice(&transcript.canonical_bytes()).unwrap();
        assert_eq!(parsed.gpa, f64::NEG_INFINITY);
    }
}
