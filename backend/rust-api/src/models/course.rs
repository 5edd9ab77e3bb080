use chrono::{DateTime, LocalResult, TimeZone, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseDifficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseDifficulty::Beginner => "beginner",
            CourseDifficulty::Intermediate => "intermediate",
            CourseDifficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionCriteria {
    View,
    QuizPass,
    #[default]
    Both,
}

impl CompletionCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionCriteria::View => "view",
            CompletionCriteria::QuizPass => "quiz-pass",
            CompletionCriteria::Both => "both",
        }
    }
}

impl FromStr for CompletionCriteria {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view" => Ok(CompletionCriteria::View),
            "quiz-pass" => Ok(CompletionCriteria::QuizPass),
            "both" => Ok(CompletionCriteria::Both),
            _ => Err(format!("Unknown completion criteria: {}", value)),
        }
    }
}

// Stored values outside the known set collapse to Both.
impl<'de> Deserialize<'de> for CompletionCriteria {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(CompletionCriteria::Both))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
    pub text: String,
    #[serde(rename = "isCorrect", default)]
    pub is_correct: bool,
}

/// Question payload split by type so that a multiple-choice question cannot
/// carry a free-text answer and vice versa. The wire tag is the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum QuestionBody {
    #[serde(rename = "multiple-choice")]
    MultipleChoice {
        #[serde(default)]
        options: Vec<AnswerOption>,
    },
    #[serde(rename = "true-false")]
    TrueFalse {
        #[serde(rename = "correctAnswer", default)]
        correct_answer: String,
    },
    #[serde(rename = "coding")]
    Coding {
        #[serde(rename = "correctAnswer", default)]
        correct_answer: String,
    },
    #[serde(rename = "short-answer")]
    ShortAnswer {
        #[serde(rename = "correctAnswer", default)]
        correct_answer: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub text: String,
    #[serde(flatten)]
    pub body: QuestionBody,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: CourseDifficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(rename = "completionCriteria", default)]
    pub completion_criteria: CompletionCriteria,
    #[serde(rename = "passingScore", default = "default_passing_score")]
    pub passing_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalQuiz {
    #[serde(rename = "isEnabled", default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(rename = "passingScore", default = "default_passing_score")]
    pub passing_score: f64,
}

impl Default for FinalQuiz {
    fn default() -> Self {
        Self {
            is_enabled: false,
            questions: Vec::new(),
            passing_score: default_passing_score(),
        }
    }
}

/// Module ids are 1-based and dense within a course; the create path
/// renumbers whatever the client sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: i32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(rename = "finalQuiz", default, skip_serializing_if = "Option::is_none")]
    pub final_quiz: Option<FinalQuiz>,
}

/// Course as stored in the MongoDB "courses" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub difficulty: CourseDifficulty,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: mongodb::bson::DateTime,
    #[serde(rename = "updatedAt", alias = "updated_at")]
    pub updated_at: mongodb::bson::DateTime,
}

#[derive(Debug, Serialize)]
pub struct CourseView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub difficulty: CourseDifficulty,
    pub modules: Vec<Module>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl CourseView {
    pub fn from_doc(doc: &CourseDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            thumbnail: doc.thumbnail.clone(),
            difficulty: doc.difficulty,
            modules: doc.modules.clone(),
            created_at: bson_to_iso(&doc.created_at),
            updated_at: bson_to_iso(&doc.updated_at),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseCreateRequest {
    #[validate(length(min = 1, message = "Course title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub difficulty: CourseDifficulty,
    #[serde(default)]
    #[validate(nested)]
    pub modules: Vec<ModuleCreateRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ModuleCreateRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(length(min = 1, message = "Module title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Module description is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<LessonCreateRequest>,
    #[serde(rename = "finalQuiz", default)]
    #[validate(nested)]
    pub final_quiz: Option<FinalQuizCreateRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LessonCreateRequest {
    #[validate(length(min = 1, message = "Lesson title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Lesson content is required"))]
    pub content: String,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionCreateRequest>,
    #[serde(rename = "completionCriteria", default)]
    pub completion_criteria: CompletionCriteria,
    #[serde(rename = "passingScore", default = "default_passing_score")]
    pub passing_score: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionCreateRequest {
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    #[serde(flatten)]
    pub body: QuestionBody,
    #[serde(default = "default_points")]
    pub points: f64,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: CourseDifficulty,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FinalQuizCreateRequest {
    #[serde(rename = "isEnabled", default)]
    pub is_enabled: bool,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionCreateRequest>,
    #[serde(rename = "passingScore", default = "default_passing_score")]
    pub passing_score: f64,
}

impl Default for FinalQuizCreateRequest {
    fn default() -> Self {
        Self {
            is_enabled: false,
            questions: Vec::new(),
            passing_score: default_passing_score(),
        }
    }
}

impl From<QuestionCreateRequest> for Question {
    fn from(request: QuestionCreateRequest) -> Self {
        Question {
            text: request.text,
            body: request.body,
            points: request.points,
            explanation: request.explanation,
            difficulty: request.difficulty,
        }
    }
}

impl From<LessonCreateRequest> for Lesson {
    fn from(request: LessonCreateRequest) -> Self {
        Lesson {
            title: request.title,
            content: request.content,
            questions: request.questions.into_iter().map(Question::from).collect(),
            completion_criteria: request.completion_criteria,
            passing_score: request.passing_score,
        }
    }
}

impl From<FinalQuizCreateRequest> for FinalQuiz {
    fn from(request: FinalQuizCreateRequest) -> Self {
        FinalQuiz {
            is_enabled: request.is_enabled,
            questions: request.questions.into_iter().map(Question::from).collect(),
            passing_score: request.passing_score,
        }
    }
}

pub(crate) fn default_points() -> f64 {
    10.0
}

pub(crate) fn default_passing_score() -> f64 {
    70.0
}

fn bson_to_iso(dt: &mongodb::bson::DateTime) -> String {
    match Utc.timestamp_millis_opt(dt.timestamp_millis()) {
        LocalResult::Single(value) => value.to_rfc3339(),
        LocalResult::Ambiguous(first, _) => first.to_rfc3339(),
        LocalResult::None => DateTime::<Utc>::UNIX_EPOCH.to_rfc3339(),
    }
}
