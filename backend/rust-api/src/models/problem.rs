use lazy_static::lazy_static;
use mongodb::bson::oid::ObjectId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    pub static ref PROBLEM_ID_PATTERN: Regex =
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ProblemDifficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl ProblemDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemDifficulty::Easy => "Easy",
            ProblemDifficulty::Medium => "Medium",
            ProblemDifficulty::Hard => "Hard",
        }
    }
}

/// Input and output are line lists; their lengths are caller-defined and not
/// checked against each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

/// Problem as stored in the MongoDB "problems" collection. `problem_id` is
/// the external slug under the wire name `id`; it carries a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "id")]
    pub problem_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "problemStatement", default)]
    pub problem_statement: String,
    #[serde(rename = "inputFormat", default)]
    pub input_format: String,
    #[serde(rename = "outputFormat", default)]
    pub output_format: String,
    #[serde(rename = "sampleInput", default)]
    pub sample_input: String,
    #[serde(rename = "sampleOutput", default)]
    pub sample_output: String,
    #[serde(default = "default_likes")]
    pub likes: i32,
    #[serde(default)]
    pub dislikes: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(rename = "starterCode", default)]
    pub starter_code: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub difficulty: ProblemDifficulty,
    #[serde(default = "default_problem_points")]
    pub points: i32,
    #[serde(rename = "videoId", default)]
    pub video_id: String,
    #[serde(rename = "testCases", default)]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Serialize)]
pub struct ProblemView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "id")]
    pub problem_id: String,
    pub title: String,
    #[serde(rename = "problemStatement")]
    pub problem_statement: String,
    #[serde(rename = "inputFormat")]
    pub input_format: String,
    #[serde(rename = "outputFormat")]
    pub output_format: String,
    #[serde(rename = "sampleInput")]
    pub sample_input: String,
    #[serde(rename = "sampleOutput")]
    pub sample_output: String,
    pub likes: i32,
    pub dislikes: i32,
    pub order: i32,
    pub category: String,
    pub constraints: String,
    pub companies: Vec<String>,
    #[serde(rename = "starterCode")]
    pub starter_code: String,
    pub solution: String,
    pub difficulty: ProblemDifficulty,
    pub points: i32,
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(rename = "testCases")]
    pub test_cases: Vec<TestCase>,
}

impl ProblemView {
    pub fn from_doc(doc: &ProblemDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            problem_id: doc.problem_id.clone(),
            title: doc.title.clone(),
            problem_statement: doc.problem_statement.clone(),
            input_format: doc.input_format.clone(),
            output_format: doc.output_format.clone(),
            sample_input: doc.sample_input.clone(),
            sample_output: doc.sample_output.clone(),
            likes: doc.likes,
            dislikes: doc.dislikes,
            order: doc.order,
            category: doc.category.clone(),
            constraints: doc.constraints.clone(),
            companies: doc.companies.clone(),
            starter_code: doc.starter_code.clone(),
            solution: doc.solution.clone(),
            difficulty: doc.difficulty,
            points: doc.points,
            video_id: doc.video_id.clone(),
            test_cases: doc.test_cases.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProblemCreateRequest {
    #[validate(regex(
        path = *PROBLEM_ID_PATTERN,
        message = "Problem id must be a lowercase slug"
    ))]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "problemStatement", default)]
    pub problem_statement: String,
    #[serde(rename = "inputFormat", default)]
    pub input_format: String,
    #[serde(rename = "outputFormat", default)]
    pub output_format: String,
    #[serde(rename = "sampleInput", default)]
    pub sample_input: String,
    #[serde(rename = "sampleOutput", default)]
    pub sample_output: String,
    #[serde(default = "default_likes")]
    pub likes: i32,
    #[serde(default)]
    pub dislikes: i32,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(rename = "starterCode", default)]
    pub starter_code: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub difficulty: ProblemDifficulty,
    #[serde(default = "default_problem_points")]
    #[validate(range(min = 1, max = 3, message = "Problem points must be between 1 and 3"))]
    pub points: i32,
    #[serde(rename = "videoId", default)]
    pub video_id: String,
    #[serde(rename = "testCases", default)]
    pub test_cases: Vec<TestCase>,
}

fn default_likes() -> i32 {
    10
}

fn default_problem_points() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::{ProblemCreateRequest, ProblemDifficulty, ProblemDocument, PROBLEM_ID_PATTERN};
    use mongodb::bson::{doc, oid::ObjectId};
    use validator::Validate;

    #[test]
    fn problem_id_pattern_accepts_slugs() {
        assert!(PROBLEM_ID_PATTERN.is_match("two-sum"));
        assert!(PROBLEM_ID_PATTERN.is_match("3sum"));
        assert!(!PROBLEM_ID_PATTERN.is_match("Two Sum"));
        assert!(!PROBLEM_ID_PATTERN.is_match("-leading"));
        assert!(!PROBLEM_ID_PATTERN.is_match(""));
    }

    #[test]
    fn problem_document_applies_defaults() {
        let object_id = ObjectId::new();
        let doc = doc! {
            "_id": object_id,
            "id": "two-sum",
            "title": "Two Sum",
        };

        let parsed: ProblemDocument =
            mongodb::bson::from_document(doc).expect("problem should deserialize");
        assert_eq!(parsed.problem_id, "two-sum");
        assert_eq!(parsed.likes, 10);
        assert_eq!(parsed.dislikes, 0);
        assert_eq!(parsed.points, 1);
        assert_eq!(parsed.difficulty, ProblemDifficulty::Easy);
        assert!(parsed.test_cases.is_empty());
    }

    #[test]
    fn create_request_rejects_malformed_id() {
        let request: ProblemCreateRequest = serde_json::from_value(serde_json::json!({
            "id": "Not A Slug",
            "title": "Broken",
        }))
        .expect("request should deserialize");

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_case_line_counts_are_independent() {
        let parsed: ProblemDocument = mongodb::bson::from_document(doc! {
            "_id": ObjectId::new(),
            "id": "echo",
            "testCases": [
                { "input": ["1", "2", "3"], "output": ["6"] },
            ],
        })
        .expect("problem should deserialize");

        assert_eq!(parsed.test_cases[0].input.len(), 3);
        assert_eq!(parsed.test_cases[0].output.len(), 1);
    }
}
