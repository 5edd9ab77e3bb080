use crate::{
    metrics::COURSES_CREATED_TOTAL,
    models::course::{
        CourseCreateRequest, CourseDocument, CourseView, FinalQuiz, Lesson, Module,
        ModuleCreateRequest,
    },
    services::AppState,
    utils::time::chrono_to_bson,
};
use anyhow::{Context, Result};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::FindOptions,
    Collection, Database,
};

pub struct CourseService {
    mongo: Database,
}

impl CourseService {
    pub fn new(state: &AppState) -> Self {
        Self {
            mongo: state.mongo.clone(),
        }
    }

    fn collection(&self) -> Collection<CourseDocument> {
        self.mongo.collection("courses")
    }

    /// Lists every course, oldest first.
    pub async fn list_courses(&self) -> Result<Vec<CourseView>> {
        let find_options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();

        let cursor = self
            .collection()
            .find(doc! {})
            .with_options(find_options)
            .await
            .context("Failed to query courses")?;

        let courses: Vec<CourseDocument> = cursor
            .try_collect()
            .await
            .context("Failed to collect course documents")?;

        Ok(courses.iter().map(CourseView::from_doc).collect())
    }

    pub async fn get_course(&self, course_id: &ObjectId) -> Result<Option<CourseView>> {
        let found = self
            .collection()
            .find_one(doc! { "_id": course_id })
            .await
            .context("Failed to fetch course")?;

        Ok(found.as_ref().map(CourseView::from_doc))
    }

    /// Inserts a new course. Whatever module ids the client sent are
    /// discarded; modules get ids 1..=n in payload order.
    pub async fn create_course(&self, payload: CourseCreateRequest) -> Result<CourseView> {
        let now = chrono_to_bson(Utc::now());
        let document = CourseDocument {
            id: ObjectId::new(),
            title: payload.title,
            description: payload.description,
            thumbnail: payload.thumbnail,
            difficulty: payload.difficulty,
            modules: build_modules(payload.modules),
            created_at: now,
            updated_at: now,
        };

        self.collection()
            .insert_one(&document)
            .await
            .context("Failed to insert course")?;

        COURSES_CREATED_TOTAL.inc();
        Ok(CourseView::from_doc(&document))
    }
}

fn build_modules(payload: Vec<ModuleCreateRequest>) -> Vec<Module> {
    payload
        .into_iter()
        .enumerate()
        .map(|(index, module)| Module {
            id: index as i32 + 1,
            title: module.title,
            description: module.description,
            lessons: module.lessons.into_iter().map(Lesson::from).collect(),
            final_quiz: module.final_quiz.map(FinalQuiz::from),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::build_modules;
    use crate::models::course::ModuleCreateRequest;

    fn module_request(id: Option<i32>, title: &str) -> ModuleCreateRequest {
        ModuleCreateRequest {
            id,
            title: title.to_string(),
            description: "description".to_string(),
            lessons: Vec::new(),
            final_quiz: None,
        }
    }

    #[test]
    fn client_module_ids_are_replaced_with_dense_ones() {
        let modules = build_modules(vec![
            module_request(Some(7), "First"),
            module_request(None, "Second"),
            module_request(Some(7), "Third"),
        ]);

        assert_eq!(
            modules.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(modules[2].title, "Third");
    }
}
