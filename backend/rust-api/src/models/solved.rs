use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::bson_datetime_as_chrono;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionSource {
    Practice,
    Lesson,
    Module,
    FinalQuiz,
}

impl SubmissionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionSource::Practice => "practice",
            SubmissionSource::Lesson => "lesson",
            SubmissionSource::Module => "module",
            SubmissionSource::FinalQuiz => "finalQuiz",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub code: String,
    #[serde(default)]
    pub complexity: Vec<String>,
    #[serde(rename = "submissionTime", with = "bson_datetime_as_chrono")]
    pub submission_time: DateTime<Utc>,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(rename = "passedTestCases", default)]
    pub passed_test_cases: i32,
}

/// One record per (user, problem) pair; submissions accumulate under the
/// stored field name `solution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolvedProblemDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: ObjectId,
    pub problem: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest: Option<ObjectId>,
    pub source: SubmissionSource,
    #[serde(default)]
    pub star: bool,
    #[serde(default)]
    pub solution: Vec<SubmissionRecord>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub code: String,
    pub complexity: Vec<String>,
    #[serde(rename = "submissionTime")]
    pub submission_time: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(rename = "passedTestCases")]
    pub passed_test_cases: i32,
}

#[derive(Debug, Serialize)]
pub struct SolvedProblemView {
    pub id: String,
    pub user: String,
    pub problem: String,
    pub source: SubmissionSource,
    pub star: bool,
    pub solution: Vec<SubmissionView>,
}

impl SolvedProblemView {
    pub fn from_doc(doc: &SolvedProblemDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            user: doc.user.to_hex(),
            problem: doc.problem.to_hex(),
            source: doc.source,
            star: doc.star,
            solution: doc
                .solution
                .iter()
                .map(|submission| SubmissionView {
                    code: submission.code.clone(),
                    complexity: submission.complexity.clone(),
                    submission_time: submission.submission_time,
                    status: submission.status,
                    passed_test_cases: submission.passed_test_cases,
                })
                .collect(),
        }
    }
}

/// Request to append a submission for a problem, addressed by its external id.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionRequest {
    #[serde(rename = "problemId")]
    #[validate(length(min = 1, message = "problemId is required"))]
    pub problem_id: String,

    pub source: SubmissionSource,

    #[validate(length(min = 1, message = "Submission code is required"))]
    pub code: String,

    #[serde(default)]
    pub complexity: Vec<String>,

    #[serde(default)]
    pub status: SubmissionStatus,

    #[serde(rename = "passedTestCases", default)]
    pub passed_test_cases: i32,

    #[serde(default)]
    pub star: bool,
}

#[cfg(test)]
mod tests {
    use super::{SolvedProblemDocument, SubmissionSource, SubmissionStatus};
    use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};

    #[test]
    fn source_names_match_stored_values() {
        assert_eq!(SubmissionSource::Practice.as_str(), "practice");
        assert_eq!(SubmissionSource::FinalQuiz.as_str(), "finalQuiz");
    }

    #[test]
    fn solved_problem_deserializes_with_submissions() {
        let doc = doc! {
            "_id": ObjectId::new(),
            "user": ObjectId::new(),
            "problem": ObjectId::new(),
            "source": "finalQuiz",
            "solution": [
                {
                    "code": "fn main() {}",
                    "complexity": ["O(1)"],
                    "submissionTime": BsonDateTime::now(),
                    "status": "accepted",
                    "passedTestCases": 4,
                },
            ],
        };

        let parsed: SolvedProblemDocument =
            mongodb::bson::from_document(doc).expect("record should deserialize");
        assert_eq!(parsed.source, SubmissionSource::FinalQuiz);
        assert!(!parsed.star);
        assert_eq!(parsed.solution.len(), 1);
        assert_eq!(parsed.solution[0].status, SubmissionStatus::Accepted);
        assert_eq!(parsed.solution[0].passed_test_cases, 4);
    }
}
