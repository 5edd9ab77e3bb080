use serde::Serialize;
use std::collections::HashMap;

use crate::models::course::{CompletionCriteria, CourseDocument};
use crate::quiz::{score_quiz, QuizAnswer};

/// What is known about a learner's interaction with one lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonFacts {
    pub viewed: bool,
    pub quiz_passed: bool,
}

/// Completion policy for a single lesson. A lesson nobody has touched is
/// never complete.
pub fn lesson_complete(criteria: CompletionCriteria, facts: LessonFacts) -> bool {
    match criteria {
        CompletionCriteria::View => facts.viewed,
        CompletionCriteria::QuizPass => facts.quiz_passed,
        CompletionCriteria::Both => facts.viewed && facts.quiz_passed,
    }
}

#[derive(Debug, Clone, Default)]
pub struct LessonInteraction {
    pub viewed: bool,
    pub quiz_answers: Option<HashMap<usize, QuizAnswer>>,
}

/// In-memory record of lesson interactions for one course, keyed by
/// `(module index, lesson index)`.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    records: HashMap<(usize, usize), LessonInteraction>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_viewed(&mut self, module_index: usize, lesson_index: usize) {
        self.records
            .entry((module_index, lesson_index))
            .or_default()
            .viewed = true;
    }

    /// Stores the answers from a completed quiz run. A later run replaces an
    /// earlier one.
    pub fn record_quiz(
        &mut self,
        module_index: usize,
        lesson_index: usize,
        answers: HashMap<usize, QuizAnswer>,
    ) {
        self.records
            .entry((module_index, lesson_index))
            .or_default()
            .quiz_answers = Some(answers);
    }

    pub fn get(&self, module_index: usize, lesson_index: usize) -> Option<&LessonInteraction> {
        self.records.get(&(module_index, lesson_index))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LessonStatus {
    pub module_index: usize,
    pub lesson_index: usize,
    pub title: String,
    pub viewed: bool,
    pub quiz_score: Option<i32>,
    pub quiz_passed: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseStatus {
    pub lessons: Vec<LessonStatus>,
    pub lessons_total: usize,
    pub lessons_complete: usize,
}

/// Walks every lesson of a course and judges it against the interaction log.
/// Quiz runs are re-scored from the stored answers so the judgement always
/// reflects the current question list.
pub fn evaluate_course(course: &CourseDocument, log: &InteractionLog) -> CourseStatus {
    let mut lessons = Vec::new();
    let mut lessons_complete = 0;

    for (module_index, module) in course.modules.iter().enumerate() {
        for (lesson_index, lesson) in module.lessons.iter().enumerate() {
            let interaction = log.get(module_index, lesson_index);
            let viewed = interaction.map(|record| record.viewed).unwrap_or(false);

            let quiz_score = interaction
                .and_then(|record| record.quiz_answers.as_ref())
                .map(|answers| score_quiz(&lesson.questions, answers, lesson.passing_score));
            let quiz_passed = quiz_score.map(|(_, passed)| passed).unwrap_or(false);

            let facts = LessonFacts { viewed, quiz_passed };
            let complete = lesson_complete(lesson.completion_criteria, facts);
            if complete {
                lessons_complete += 1;
            }

            lessons.push(LessonStatus {
                module_index,
                lesson_index,
                title: lesson.title.clone(),
                viewed,
                quiz_score: quiz_score.map(|(score, _)| score),
                quiz_passed,
                complete,
            });
        }
    }

    CourseStatus {
        lessons_total: lessons.len(),
        lessons_complete,
        lessons,
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate_course, lesson_complete, InteractionLog, LessonFacts};
    use crate::models::course::{
        AnswerOption, CompletionCriteria, CourseDifficulty, CourseDocument, Lesson, Module,
        Question, QuestionBody,
    };
    use crate::quiz::QuizAnswer;
    use mongodb::bson::oid::ObjectId;
    use mongodb::bson::DateTime;
    use std::collections::HashMap;

    #[test]
    fn completion_policy_truth_table() {
        let facts = |viewed, quiz_passed| LessonFacts { viewed, quiz_passed };

        assert!(lesson_complete(CompletionCriteria::View, facts(true, false)));
        assert!(!lesson_complete(CompletionCriteria::View, facts(false, true)));

        assert!(lesson_complete(
            CompletionCriteria::QuizPass,
            facts(false, true)
        ));
        assert!(!lesson_complete(
            CompletionCriteria::QuizPass,
            facts(true, false)
        ));

        assert!(lesson_complete(CompletionCriteria::Both, facts(true, true)));
        assert!(!lesson_complete(CompletionCriteria::Both, facts(true, false)));
        assert!(!lesson_complete(CompletionCriteria::Both, facts(false, true)));
    }

    #[test]
    fn untouched_lesson_is_never_complete() {
        for criteria in [
            CompletionCriteria::View,
            CompletionCriteria::QuizPass,
            CompletionCriteria::Both,
        ] {
            assert!(!lesson_complete(criteria, LessonFacts::default()));
        }
    }

    fn quiz_question() -> Question {
        Question {
            text: "pick one".to_string(),
            body: QuestionBody::MultipleChoice {
                options: vec![
                    AnswerOption {
                        text: "wrong".to_string(),
                        is_correct: false,
                    },
                    AnswerOption {
                        text: "right".to_string(),
                        is_correct: true,
                    },
                ],
            },
            points: 10.0,
            explanation: None,
            difficulty: CourseDifficulty::Beginner,
        }
    }

    fn course_with_two_lessons() -> CourseDocument {
        let viewed_lesson = Lesson {
            title: "Reading".to_string(),
            content: "read this".to_string(),
            questions: Vec::new(),
            completion_criteria: CompletionCriteria::View,
            passing_score: 70.0,
        };
        let quiz_lesson = Lesson {
            title: "Checkpoint".to_string(),
            content: "answer this".to_string(),
            questions: vec![quiz_question()],
            completion_criteria: CompletionCriteria::Both,
            passing_score: 70.0,
        };
        CourseDocument {
            id: ObjectId::new(),
            title: "Course".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            difficulty: CourseDifficulty::Beginner,
            modules: vec![Module {
                id: 1,
                title: "Module".to_string(),
                description: String::new(),
                lessons: vec![viewed_lesson, quiz_lesson],
                final_quiz: None,
            }],
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        }
    }

    #[test]
    fn evaluation_rescores_quizzes_from_answers() {
        let course = course_with_two_lessons();
        let mut log = InteractionLog::new();
        log.mark_viewed(0, 0);
        log.mark_viewed(0, 1);
        log.record_quiz(0, 1, HashMap::from([(0, QuizAnswer::Choice(1))]));

        let status = evaluate_course(&course, &log);
        assert_eq!(status.lessons_total, 2);
        assert_eq!(status.lessons_complete, 2);

        let checkpoint = &status.lessons[1];
        assert_eq!(checkpoint.quiz_score, Some(100));
        assert!(checkpoint.quiz_passed);
        assert!(checkpoint.complete);
    }

    #[test]
    fn viewing_alone_does_not_complete_a_quiz_gated_lesson() {
        let course = course_with_two_lessons();
        let mut log = InteractionLog::new();
        log.mark_viewed(0, 1);

        let status = evaluate_course(&course, &log);
        let checkpoint = &status.lessons[1];
        assert!(checkpoint.viewed);
        assert_eq!(checkpoint.quiz_score, None);
        assert!(!checkpoint.complete);
        assert_eq!(status.lessons_complete, 0);
    }

    #[test]
    fn failed_quiz_leaves_the_lesson_incomplete() {
        let course = course_with_two_lessons();
        let mut log = InteractionLog::new();
        log.mark_viewed(0, 1);
        log.record_quiz(0, 1, HashMap::from([(0, QuizAnswer::Choice(0))]));

        let status = evaluate_course(&course, &log);
        let checkpoint = &status.lessons[1];
        assert_eq!(checkpoint.quiz_score, Some(0));
        assert!(!checkpoint.quiz_passed);
        assert!(!checkpoint.complete);
    }
}
