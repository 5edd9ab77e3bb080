use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Learner profile and progress stored in the MongoDB "user_infos" collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(rename = "coursesEnrolled", default)]
    pub courses_enrolled: Vec<ObjectId>,
    #[serde(rename = "courseProgress", default)]
    pub course_progress: Vec<CourseProgress>,
    #[serde(default)]
    pub solved: Vec<ObjectId>,
    #[serde(rename = "contestPart", default)]
    pub contest_part: Vec<ObjectId>,
    #[serde(default = "default_rating")]
    pub rating: i32,
    #[serde(default)]
    pub assigned: Vec<ObjectId>,
    #[serde(rename = "createdAt", with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", with = "bson_datetime_as_chrono")]
    pub updated_at: DateTime<Utc>,
}

// Serde converters for chrono::DateTime <-> mongodb::bson::DateTime
pub(super) mod bson_datetime_as_chrono {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bson_dt = bson::DateTime::from_millis(date.timestamp_millis());
        bson_dt.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bson_dt = bson::DateTime::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
            .ok_or_else(|| serde::de::Error::custom("timestamp out of chrono range"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Per-course progress record; one entry per enrolled course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseProgress {
    #[serde(rename = "courseId")]
    pub course_id: ObjectId,
    #[serde(default)]
    pub modules: Vec<ModuleProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleProgress {
    #[serde(rename = "moduleId")]
    pub module_id: i32,
    #[serde(rename = "completedLessons", default)]
    pub completed_lessons: Vec<String>,
    #[serde(rename = "finalQuiz", default, skip_serializing_if = "Option::is_none")]
    pub final_quiz: Option<FinalQuizProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FinalQuizProgress {
    #[serde(default)]
    pub attempted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,
    #[serde(rename = "solvedQuestionIds", default)]
    pub solved_question_ids: Vec<String>,
}

pub(crate) fn default_rating() -> i32 {
    50
}

/// Profile returned to the client; ObjectIds flattened to hex strings.
#[derive(Debug, Serialize)]
pub struct UserProfileView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub college: String,
    pub city: String,
    pub country: String,
    pub phone: String,
    pub admin: bool,
    pub rating: i32,
    #[serde(rename = "coursesEnrolled")]
    pub courses_enrolled: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&UserInfoDocument> for UserProfileView {
    fn from(doc: &UserInfoDocument) -> Self {
        UserProfileView {
            id: doc.id.to_hex(),
            name: doc.name.clone(),
            age: doc.age,
            gender: doc.gender,
            college: doc.college.clone(),
            city: doc.city.clone(),
            country: doc.country.clone(),
            phone: doc.phone.clone(),
            admin: doc.admin,
            rating: doc.rating,
            courses_enrolled: doc.courses_enrolled.iter().map(|id| id.to_hex()).collect(),
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseProgressView {
    #[serde(rename = "courseId")]
    pub course_id: String,
    pub modules: Vec<ModuleProgressView>,
}

#[derive(Debug, Serialize)]
pub struct ModuleProgressView {
    #[serde(rename = "moduleId")]
    pub module_id: i32,
    #[serde(rename = "completedLessons")]
    pub completed_lessons: Vec<String>,
    #[serde(rename = "finalQuiz", skip_serializing_if = "Option::is_none")]
    pub final_quiz: Option<FinalQuizProgress>,
}

#[derive(Debug, Serialize)]
pub struct UserProgressView {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "courseProgress")]
    pub course_progress: Vec<CourseProgressView>,
    pub solved: Vec<String>,
}

impl UserProgressView {
    pub fn from_doc(doc: &UserInfoDocument) -> Self {
        Self {
            user_id: doc.id.to_hex(),
            course_progress: doc
                .course_progress
                .iter()
                .map(|course| CourseProgressView {
                    course_id: course.course_id.to_hex(),
                    modules: course
                        .modules
                        .iter()
                        .map(|module| ModuleProgressView {
                            module_id: module.module_id,
                            completed_lessons: module.completed_lessons.clone(),
                            final_quiz: module.final_quiz.clone(),
                        })
                        .collect(),
                })
                .collect(),
            solved: doc.solved.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

/// Request to create a learner profile
#[derive(Debug, Deserialize, Validate)]
pub struct UserCreateRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 150, message = "Age must be plausible"))]
    pub age: Option<i32>,

    #[serde(default)]
    pub gender: Option<Gender>,

    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
}

/// Request to enroll a user in a course
#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    #[serde(rename = "courseId")]
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,
}

/// Request to mark a lesson completed inside a module
#[derive(Debug, Deserialize, Validate)]
pub struct LessonCompletionRequest {
    #[serde(rename = "courseId")]
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,

    #[serde(rename = "moduleId")]
    pub module_id: i32,

    #[serde(rename = "lessonTitle")]
    #[validate(length(min = 1, message = "lessonTitle is required"))]
    pub lesson_title: String,
}

/// Request to record a final-quiz attempt. `passed` is recomputed server-side
/// from the stored passing score, so the client only reports the raw score.
#[derive(Debug, Deserialize, Validate)]
pub struct FinalQuizResultRequest {
    #[serde(rename = "courseId")]
    #[validate(length(min = 1, message = "courseId is required"))]
    pub course_id: String,

    #[serde(rename = "moduleId")]
    pub module_id: i32,

    #[validate(range(min = 0, max = 100, message = "Score must be a percentage"))]
    pub score: i32,

    #[serde(rename = "solvedQuestionIds", default)]
    pub solved_question_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{FinalQuizProgress, UserInfoDocument};
    use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};

    #[test]
    fn user_info_applies_defaults() {
        let user_id = ObjectId::new();
        let now = BsonDateTime::now();
        let doc = doc! {
            "_id": user_id,
            "name": "Ani",
            "createdAt": now,
            "updatedAt": now,
        };

        let parsed: UserInfoDocument =
            mongodb::bson::from_document(doc).expect("user info should deserialize");
        assert_eq!(parsed.rating, 50);
        assert!(!parsed.admin);
        assert!(parsed.courses_enrolled.is_empty());
        assert!(parsed.course_progress.is_empty());
    }

    #[test]
    fn nested_progress_deserializes() {
        let user_id = ObjectId::new();
        let course_id = ObjectId::new();
        let now = BsonDateTime::now();
        let doc = doc! {
            "_id": user_id,
            "name": "Ani",
            "courseProgress": [
                {
                    "courseId": course_id,
                    "modules": [
                        {
                            "moduleId": 1,
                            "completedLessons": ["Intro"],
                            "finalQuiz": { "attempted": true, "score": 80, "passed": true },
                        },
                    ],
                },
            ],
            "createdAt": now,
            "updatedAt": now,
        };

        let parsed: UserInfoDocument =
            mongodb::bson::from_document(doc).expect("user info should deserialize");
        let module = &parsed.course_progress[0].modules[0];
        assert_eq!(module.module_id, 1);
        assert_eq!(module.completed_lessons, vec!["Intro".to_string()]);
        let quiz: &FinalQuizProgress = module.final_quiz.as_ref().unwrap();
        assert!(quiz.attempted);
        assert_eq!(quiz.score, Some(80));
        assert_eq!(quiz.passed, Some(true));
    }
}
