use crate::{
    metrics::PROBLEMS_CREATED_TOTAL,
    models::problem::{ProblemCreateRequest, ProblemDocument, ProblemView},
    services::AppState,
};
use anyhow::{anyhow, Context, Result};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};

pub struct ProblemService {
    mongo: Database,
}

impl ProblemService {
    pub fn new(state: &AppState) -> Self {
        Self {
            mongo: state.mongo.clone(),
        }
    }

    fn collection(&self) -> Collection<ProblemDocument> {
        self.mongo.collection("problems")
    }

    /// Lists every problem in display order.
    pub async fn list_problems(&self) -> Result<Vec<ProblemView>> {
        let find_options = FindOptions::builder().sort(doc! { "order": 1 }).build();

        let cursor = self
            .collection()
            .find(doc! {})
            .with_options(find_options)
            .await
            .context("Failed to query problems")?;

        let problems: Vec<ProblemDocument> = cursor
            .try_collect()
            .await
            .context("Failed to collect problem documents")?;

        Ok(problems.iter().map(ProblemView::from_doc).collect())
    }

    pub async fn create_problem(&self, payload: ProblemCreateRequest) -> Result<ProblemView> {
        self.ensure_unique_problem_id(&payload.id).await?;

        let document = ProblemDocument {
            id: ObjectId::new(),
            problem_id: payload.id,
            title: payload.title,
            problem_statement: payload.problem_statement,
            input_format: payload.input_format,
            output_format: payload.output_format,
            sample_input: payload.sample_input,
            sample_output: payload.sample_output,
            likes: payload.likes,
            dislikes: payload.dislikes,
            order: payload.order,
            category: payload.category,
            constraints: payload.constraints,
            companies: payload.companies,
            starter_code: payload.starter_code,
            solution: payload.solution,
            difficulty: payload.difficulty,
            points: payload.points,
            video_id: payload.video_id,
            test_cases: payload.test_cases,
        };

        match self.collection().insert_one(&document).await {
            Ok(_) => {
                PROBLEMS_CREATED_TOTAL.inc();
                Ok(ProblemView::from_doc(&document))
            }
            // A racing insert can slip past the pre-check and trip the
            // unique index instead.
            Err(error) if is_duplicate_key(&error) => {
                Err(duplicate_id_error(&document.problem_id))
            }
            Err(error) => Err(error).context("Failed to insert problem"),
        }
    }

    async fn ensure_unique_problem_id(&self, problem_id: &str) -> Result<()> {
        let count = self
            .collection()
            .count_documents(doc! { "id": problem_id })
            .await
            .context("Failed to check problem id uniqueness")?;

        if count > 0 {
            Err(duplicate_id_error(problem_id))
        } else {
            Ok(())
        }
    }
}

fn duplicate_id_error(problem_id: &str) -> anyhow::Error {
    anyhow!("Problem with id '{}' already exists", problem_id)
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        *error.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

/// Creates the unique index backing problem slug uniqueness. Called once at
/// startup.
pub async fn ensure_indexes(mongo: &Database) -> Result<()> {
    let options = IndexOptions::builder().unique(true).build();
    let model = IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(options)
        .build();

    mongo
        .collection::<ProblemDocument>("problems")
        .create_index(model)
        .await
        .context("Failed to create unique index on problem ids")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_error_names_the_conflicting_id() {
        let error = duplicate_id_error("two-sum");
        assert_eq!(error.to_string(), "Problem with id 'two-sum' already exists");
    }
}
