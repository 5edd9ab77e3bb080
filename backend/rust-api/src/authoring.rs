use thiserror::Error;

use crate::models::course::{
    CompletionCriteria, CourseCreateRequest, CourseDifficulty, FinalQuizCreateRequest,
    LessonCreateRequest, ModuleCreateRequest, QuestionCreateRequest,
};

/// Course under construction. Module ids are renumbered to 1..=n after every
/// command, so drafts never carry stale or duplicate ids.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub difficulty: CourseDifficulty,
    pub modules: Vec<ModuleDraft>,
}

#[derive(Debug, Clone)]
pub struct ModuleDraft {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub lessons: Vec<LessonCreateRequest>,
    pub final_quiz: Option<FinalQuizCreateRequest>,
}

/// One edit step. Indices are 0-based positions in the draft, not module ids.
#[derive(Debug, Clone)]
pub enum DraftCommand {
    SetTitle(String),
    SetDescription(String),
    SetThumbnail(String),
    SetDifficulty(CourseDifficulty),
    AddModule {
        title: String,
        description: String,
    },
    RemoveModule {
        module: usize,
    },
    SetModuleTitle {
        module: usize,
        title: String,
    },
    SetModuleDescription {
        module: usize,
        description: String,
    },
    AddLesson {
        module: usize,
        lesson: LessonCreateRequest,
    },
    RemoveLesson {
        module: usize,
        lesson: usize,
    },
    SetLessonTitle {
        module: usize,
        lesson: usize,
        title: String,
    },
    SetLessonContent {
        module: usize,
        lesson: usize,
        content: String,
    },
    SetLessonCriteria {
        module: usize,
        lesson: usize,
        criteria: CompletionCriteria,
    },
    AddQuestion {
        module: usize,
        lesson: usize,
        question: QuestionCreateRequest,
    },
    RemoveQuestion {
        module: usize,
        lesson: usize,
        question: usize,
    },
    EnableFinalQuiz {
        module: usize,
        passing_score: f64,
    },
    DisableFinalQuiz {
        module: usize,
    },
    AddFinalQuizQuestion {
        module: usize,
        question: QuestionCreateRequest,
    },
    RemoveFinalQuizQuestion {
        module: usize,
        question: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("module index {0} is out of range")]
    ModuleOutOfRange(usize),
    #[error("lesson index {0} is out of range")]
    LessonOutOfRange(usize),
    #[error("question index {0} is out of range")]
    QuestionOutOfRange(usize),
    #[error("module has no enabled final quiz")]
    FinalQuizDisabled,
}

/// Applies one command and returns the resulting draft. A rejected command
/// leaves the input untouched.
pub fn apply(draft: &CourseDraft, command: DraftCommand) -> Result<CourseDraft, DraftError> {
    let mut next = draft.clone();
    match command {
        DraftCommand::SetTitle(title) => next.title = title,
        DraftCommand::SetDescription(description) => next.description = description,
        DraftCommand::SetThumbnail(thumbnail) => next.thumbnail = thumbnail,
        DraftCommand::SetDifficulty(difficulty) => next.difficulty = difficulty,
        DraftCommand::AddModule { title, description } => {
            next.modules.push(ModuleDraft {
                id: 0,
                title,
                description,
                lessons: Vec::new(),
                final_quiz: None,
            });
        }
        DraftCommand::RemoveModule { module } => {
            if module >= next.modules.len() {
                return Err(DraftError::ModuleOutOfRange(module));
            }
            next.modules.remove(module);
        }
        DraftCommand::SetModuleTitle { module, title } => {
            module_mut(&mut next, module)?.title = title;
        }
        DraftCommand::SetModuleDescription {
            module,
            description,
        } => {
            module_mut(&mut next, module)?.description = description;
        }
        DraftCommand::AddLesson { module, lesson } => {
            module_mut(&mut next, module)?.lessons.push(lesson);
        }
        DraftCommand::RemoveLesson { module, lesson } => {
            let target = module_mut(&mut next, module)?;
            if lesson >= target.lessons.len() {
                return Err(DraftError::LessonOutOfRange(lesson));
            }
            target.lessons.remove(lesson);
        }
        DraftCommand::SetLessonTitle {
            module,
            lesson,
            title,
        } => {
            lesson_mut(&mut next, module, lesson)?.title = title;
        }
        DraftCommand::SetLessonContent {
            module,
            lesson,
            content,
        } => {
            lesson_mut(&mut next, module, lesson)?.content = content;
        }
        DraftCommand::SetLessonCriteria {
            module,
            lesson,
            criteria,
        } => {
            lesson_mut(&mut next, module, lesson)?.completion_criteria = criteria;
        }
        DraftCommand::AddQuestion {
            module,
            lesson,
            question,
        } => {
            lesson_mut(&mut next, module, lesson)?.questions.push(question);
        }
        DraftCommand::RemoveQuestion {
            module,
            lesson,
            question,
        } => {
            let target = lesson_mut(&mut next, module, lesson)?;
            if question >= target.questions.len() {
                return Err(DraftError::QuestionOutOfRange(question));
            }
            target.questions.remove(question);
        }
        DraftCommand::EnableFinalQuiz {
            module,
            passing_score,
        } => {
            let quiz = module_mut(&mut next, module)?
                .final_quiz
                .get_or_insert_with(FinalQuizCreateRequest::default);
            quiz.is_enabled = true;
            quiz.passing_score = passing_score;
        }
        DraftCommand::DisableFinalQuiz { module } => {
            if let Some(quiz) = module_mut(&mut next, module)?.final_quiz.as_mut() {
                quiz.is_enabled = false;
            }
        }
        DraftCommand::AddFinalQuizQuestion { module, question } => {
            final_quiz_mut(&mut next, module)?.questions.push(question);
        }
        DraftCommand::RemoveFinalQuizQuestion { module, question } => {
            let quiz = final_quiz_mut(&mut next, module)?;
            if question >= quiz.questions.len() {
                return Err(DraftError::QuestionOutOfRange(question));
            }
            quiz.questions.remove(question);
        }
    }

    renumber_modules(&mut next);
    Ok(next)
}

impl CourseDraft {
    /// Converts the draft into the payload accepted by the course create
    /// endpoint.
    pub fn into_request(self) -> CourseCreateRequest {
        CourseCreateRequest {
            title: self.title,
            description: self.description,
            thumbnail: self.thumbnail,
            difficulty: self.difficulty,
            modules: self
                .modules
                .into_iter()
                .map(|module| ModuleCreateRequest {
                    id: Some(module.id),
                    title: module.title,
                    description: module.description,
                    lessons: module.lessons,
                    final_quiz: module.final_quiz,
                })
                .collect(),
        }
    }
}

fn renumber_modules(draft: &mut CourseDraft) {
    for (index, module) in draft.modules.iter_mut().enumerate() {
        module.id = index as i32 + 1;
    }
}

fn module_mut(draft: &mut CourseDraft, module: usize) -> Result<&mut ModuleDraft, DraftError> {
    draft
        .modules
        .get_mut(module)
        .ok_or(DraftError::ModuleOutOfRange(module))
}

fn lesson_mut(
    draft: &mut CourseDraft,
    module: usize,
    lesson: usize,
) -> Result<&mut LessonCreateRequest, DraftError> {
    module_mut(draft, module)?
        .lessons
        .get_mut(lesson)
        .ok_or(DraftError::LessonOutOfRange(lesson))
}

fn final_quiz_mut(
    draft: &mut CourseDraft,
    module: usize,
) -> Result<&mut FinalQuizCreateRequest, DraftError> {
    match module_mut(draft, module)?.final_quiz.as_mut() {
        Some(quiz) if quiz.is_enabled => Ok(quiz),
        _ => Err(DraftError::FinalQuizDisabled),
    }
}
