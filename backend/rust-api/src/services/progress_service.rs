use crate::{
    metrics::{QUIZ_RESULTS_RECORDED_TOTAL, SUBMISSIONS_RECORDED_TOTAL},
    models::course::CourseDocument,
    models::problem::ProblemDocument,
    models::solved::{
        SolvedProblemDocument, SolvedProblemView, SubmissionRecord, SubmissionRequest,
    },
    models::user::{
        default_rating, FinalQuizProgress, UserCreateRequest, UserInfoDocument, UserProfileView,
        UserProgressView,
    },
    services::AppState,
    utils::time::chrono_to_bson,
};
use anyhow::{anyhow, Context};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson},
    options::UpdateOptions,
    Collection, Database,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("User not found")]
    UserNotFound,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Problem not found")]
    ProblemNotFound,
    #[error("Module has no enabled final quiz")]
    FinalQuizUnavailable,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Everything that touches the user_infos collection: account creation,
/// enrollments, per-lesson and final-quiz progress, and solved problems.
pub struct ProgressService {
    mongo: Database,
}

impl ProgressService {
    pub fn new(state: &AppState) -> Self {
        Self {
            mongo: state.mongo.clone(),
        }
    }

    fn users(&self) -> Collection<UserInfoDocument> {
        self.mongo.collection("user_infos")
    }

    fn courses(&self) -> Collection<CourseDocument> {
        self.mongo.collection("courses")
    }

    fn problems(&self) -> Collection<ProblemDocument> {
        self.mongo.collection("problems")
    }

    fn solved_problems(&self) -> Collection<SolvedProblemDocument> {
        self.mongo.collection("solved_problems")
    }

    pub async fn create_user(
        &self,
        payload: UserCreateRequest,
    ) -> Result<UserProfileView, ProgressError> {
        let now = Utc::now();
        let document = UserInfoDocument {
            id: ObjectId::new(),
            name: payload.name,
            age: payload.age,
            gender: payload.gender,
            college: payload.college,
            city: payload.city,
            country: payload.country,
            phone: payload.phone,
            admin: false,
            courses_enrolled: Vec::new(),
            course_progress: Vec::new(),
            solved: Vec::new(),
            contest_part: Vec::new(),
            rating: default_rating(),
            assigned: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.users()
            .insert_one(&document)
            .await
            .context("Failed to insert user")?;

        Ok(UserProfileView::from(&document))
    }

    pub async fn get_progress(
        &self,
        user_id: &ObjectId,
    ) -> Result<UserProgressView, ProgressError> {
        let user = self.find_user(user_id).await?;
        Ok(UserProgressView::from_doc(&user))
    }

    /// Adds a course to the user's enrollments. Enrolling twice is a no-op.
    pub async fn enroll(
        &self,
        user_id: &ObjectId,
        course_id: &ObjectId,
    ) -> Result<UserProfileView, ProgressError> {
        let count = self
            .courses()
            .count_documents(doc! { "_id": course_id })
            .await
            .context("Failed to verify course exists")?;
        if count == 0 {
            return Err(ProgressError::CourseNotFound);
        }

        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$addToSet": { "coursesEnrolled": course_id },
                    "$set": { "updatedAt": chrono_to_bson(Utc::now()) },
                },
            )
            .await
            .context("Failed to enroll user")?;
        if result.matched_count == 0 {
            return Err(ProgressError::UserNotFound);
        }

        let user = self.find_user(user_id).await?;
        Ok(UserProfileView::from(&user))
    }

    /// Marks a lesson complete inside the user's progress tree. The course
    /// and module entries are created on first touch.
    pub async fn record_lesson_completion(
        &self,
        user_id: &ObjectId,
        course_id: &ObjectId,
        module_id: i32,
        lesson_title: &str,
    ) -> Result<UserProgressView, ProgressError> {
        self.find_user(user_id).await?;
        self.ensure_progress_entries(user_id, course_id, module_id)
            .await?;

        let options = UpdateOptions::builder()
            .array_filters(vec![
                doc! { "c.courseId": course_id },
                doc! { "m.moduleId": module_id },
            ])
            .build();
        self.users()
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$addToSet": {
                        "courseProgress.$[c].modules.$[m].completedLessons": lesson_title,
                    },
                    "$set": { "updatedAt": chrono_to_bson(Utc::now()) },
                },
            )
            .with_options(options)
            .await
            .context("Failed to record lesson completion")?;

        self.get_progress(user_id).await
    }

    /// Stores a final-quiz attempt. The pass verdict is recomputed here from
    /// the module's stored passing score, not taken from the client.
    pub async fn record_final_quiz(
        &self,
        user_id: &ObjectId,
        course_id: &ObjectId,
        module_id: i32,
        score: i32,
        solved_question_ids: Vec<String>,
    ) -> Result<FinalQuizProgress, ProgressError> {
        let course = self
            .courses()
            .find_one(doc! { "_id": course_id })
            .await
            .context("Failed to fetch course")?
            .ok_or(ProgressError::CourseNotFound)?;

        let quiz = course
            .modules
            .iter()
            .find(|module| module.id == module_id)
            .and_then(|module| module.final_quiz.as_ref())
            .filter(|quiz| quiz.is_enabled)
            .ok_or(ProgressError::FinalQuizUnavailable)?;

        let progress = FinalQuizProgress {
            attempted: true,
            score: Some(score),
            passed: Some(f64::from(score) >= quiz.passing_score),
            solved_question_ids,
        };

        self.find_user(user_id).await?;
        self.ensure_progress_entries(user_id, course_id, module_id)
            .await?;

        let encoded = to_bson(&progress).context("Failed to encode quiz progress")?;
        let options = UpdateOptions::builder()
            .array_filters(vec![
                doc! { "c.courseId": course_id },
                doc! { "m.moduleId": module_id },
            ])
            .build();
        self.users()
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$set": {
                        "courseProgress.$[c].modules.$[m].finalQuiz": encoded,
                        "updatedAt": chrono_to_bson(Utc::now()),
                    },
                },
            )
            .with_options(options)
            .await
            .context("Failed to record final quiz result")?;

        QUIZ_RESULTS_RECORDED_TOTAL.inc();
        Ok(progress)
    }

    /// Appends a submission to the user's record for a problem, creating the
    /// record on first submission, and links the problem into `solved`.
    pub async fn record_submission(
        &self,
        user_id: &ObjectId,
        payload: SubmissionRequest,
    ) -> Result<SolvedProblemView, ProgressError> {
        let problem = self
            .problems()
            .find_one(doc! { "id": &payload.problem_id })
            .await
            .context("Failed to fetch problem")?
            .ok_or(ProgressError::ProblemNotFound)?;

        self.find_user(user_id).await?;

        let record = SubmissionRecord {
            code: payload.code,
            complexity: payload.complexity,
            submission_time: Utc::now(),
            status: payload.status,
            passed_test_cases: payload.passed_test_cases,
        };

        let existing = self
            .solved_problems()
            .find_one(doc! { "user": user_id, "problem": problem.id })
            .await
            .context("Failed to fetch solved problem record")?;

        match existing {
            Some(found) => {
                let encoded = to_bson(&record).context("Failed to encode submission")?;
                self.solved_problems()
                    .update_one(
                        doc! { "_id": found.id },
                        doc! {
                            "$push": { "solution": encoded },
                            "$set": { "star": payload.star },
                        },
                    )
                    .await
                    .context("Failed to append submission")?;
            }
            None => {
                let document = SolvedProblemDocument {
                    id: ObjectId::new(),
                    user: *user_id,
                    problem: problem.id,
                    contest: None,
                    source: payload.source,
                    star: payload.star,
                    solution: vec![record],
                };
                self.solved_problems()
                    .insert_one(&document)
                    .await
                    .context("Failed to insert solved problem record")?;
            }
        }

        self.users()
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$addToSet": { "solved": problem.id },
                    "$set": { "updatedAt": chrono_to_bson(Utc::now()) },
                },
            )
            .await
            .context("Failed to link solved problem")?;

        let document = self
            .solved_problems()
            .find_one(doc! { "user": user_id, "problem": problem.id })
            .await
            .context("Failed to reload solved problem record")?
            .ok_or_else(|| anyhow!("Solved problem record missing after write"))?;

        SUBMISSIONS_RECORDED_TOTAL.inc();
        Ok(SolvedProblemView::from_doc(&document))
    }

    async fn find_user(&self, user_id: &ObjectId) -> Result<UserInfoDocument, ProgressError> {
        self.users()
            .find_one(doc! { "_id": user_id })
            .await
            .context("Failed to fetch user")?
            .ok_or(ProgressError::UserNotFound)
    }

    /// Materializes the courseProgress entry and its module entry so that
    /// later array-filter updates have something to match.
    async fn ensure_progress_entries(
        &self,
        user_id: &ObjectId,
        course_id: &ObjectId,
        module_id: i32,
    ) -> Result<(), ProgressError> {
        self.users()
            .update_one(
                doc! {
                    "_id": user_id,
                    "courseProgress.courseId": { "$ne": course_id },
                },
                doc! {
                    "$push": {
                        "courseProgress": { "courseId": course_id, "modules": [] },
                    },
                },
            )
            .await
            .context("Failed to create course progress entry")?;

        self.users()
            .update_one(
                doc! {
                    "_id": user_id,
                    "courseProgress": {
                        "$elemMatch": {
                            "courseId": course_id,
                            "modules.moduleId": { "$ne": module_id },
                        },
                    },
                },
                doc! {
                    "$push": {
                        "courseProgress.$.modules": {
                            "moduleId": module_id,
                            "completedLessons": [],
                        },
                    },
                },
            )
            .await
            .context("Failed to create module progress entry")?;

        Ok(())
    }
}
