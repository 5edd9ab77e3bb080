use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::models::course::{Question, QuestionBody};

/// A recorded answer: an option index for multiple-choice questions, free
/// text for everything else (true/false answers are the strings "true" and
/// "false").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QuizAnswer {
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering(usize),
    Results,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizStateError {
    #[error("current question has no recorded answer")]
    AnswerRequired,
    #[error("already at the first question")]
    AtFirstQuestion,
    #[error("no question at the current position")]
    NoCurrentQuestion,
    #[error("quiz already finished")]
    AlreadyFinished,
    #[error("quiz is still in progress")]
    StillInProgress,
}

/// Terminal result of a quiz run. Returned exactly once, by the `next` call
/// that leaves the last question.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: i32,
    pub passed: bool,
    pub answers: HashMap<usize, QuizAnswer>,
}

/// One-question-at-a-time walk over an ordered question list.
///
/// Starts at question 0. `next` refuses to advance until the current
/// question has a recorded answer; leaving the last question scores the run
/// and moves to `Results`, from which only `retry` is accepted.
#[derive(Debug)]
pub struct QuizRunner {
    questions: Vec<Question>,
    passing_score: f64,
    answers: HashMap<usize, QuizAnswer>,
    phase: QuizPhase,
}

impl QuizRunner {
    pub fn new(questions: Vec<Question>, passing_score: f64) -> Self {
        Self {
            questions,
            passing_score,
            answers: HashMap::new(),
            phase: QuizPhase::Answering(0),
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Answering(index) => self.questions.get(index),
            QuizPhase::Results => None,
        }
    }

    pub fn recorded_answer(&self, index: usize) -> Option<&QuizAnswer> {
        self.answers.get(&index)
    }

    /// Records (or replaces) the answer for the current question.
    pub fn record_answer(&mut self, answer: QuizAnswer) -> Result<(), QuizStateError> {
        match self.phase {
            QuizPhase::Results => Err(QuizStateError::AlreadyFinished),
            QuizPhase::Answering(index) if index < self.questions.len() => {
                self.answers.insert(index, answer);
                Ok(())
            }
            QuizPhase::Answering(_) => Err(QuizStateError::NoCurrentQuestion),
        }
    }

    /// Advances to the next question, or finishes the quiz when the current
    /// question is the last one. The terminal transition scores the run and
    /// returns the outcome; intermediate transitions return `None`.
    ///
    /// A quiz with no questions finishes immediately with score 0.
    pub fn next(&mut self) -> Result<Option<QuizOutcome>, QuizStateError> {
        match self.phase {
            QuizPhase::Results => Err(QuizStateError::AlreadyFinished),
            QuizPhase::Answering(index) => {
                if !self.questions.is_empty() && !self.answers.contains_key(&index) {
                    return Err(QuizStateError::AnswerRequired);
                }
                if index + 1 < self.questions.len() {
                    self.phase = QuizPhase::Answering(index + 1);
                    Ok(None)
                } else {
                    self.phase = QuizPhase::Results;
                    let (score, passed) =
                        score_quiz(&self.questions, &self.answers, self.passing_score);
                    Ok(Some(QuizOutcome {
                        score,
                        passed,
                        answers: self.answers.clone(),
                    }))
                }
            }
        }
    }

    /// Steps back one question. Recorded answers are kept; no answer is
    /// required to go backwards.
    pub fn previous(&mut self) -> Result<(), QuizStateError> {
        match self.phase {
            QuizPhase::Results => Err(QuizStateError::AlreadyFinished),
            QuizPhase::Answering(0) => Err(QuizStateError::AtFirstQuestion),
            QuizPhase::Answering(index) => {
                self.phase = QuizPhase::Answering(index - 1);
                Ok(())
            }
        }
    }

    /// Restarts a finished quiz: clears every recorded answer and returns to
    /// question 0.
    pub fn retry(&mut self) -> Result<(), QuizStateError> {
        match self.phase {
            QuizPhase::Answering(_) => Err(QuizStateError::StillInProgress),
            QuizPhase::Results => {
                self.answers.clear();
                self.phase = QuizPhase::Answering(0);
                Ok(())
            }
        }
    }
}

/// Scores a quiz: earned points over total points, rounded to a whole
/// percentage. A quiz whose points sum to zero scores 0 and does not pass.
pub fn score_quiz(
    questions: &[Question],
    answers: &HashMap<usize, QuizAnswer>,
    passing_score: f64,
) -> (i32, bool) {
    let total: f64 = questions.iter().map(|question| question.points).sum();
    if total <= 0.0 {
        return (0, false);
    }

    let mut earned = 0.0;
    for (index, question) in questions.iter().enumerate() {
        if let Some(answer) = answers.get(&index) {
            if answer_is_correct(question, answer) {
                earned += question.points;
            }
        }
    }

    let score = ((earned / total) * 100.0).round() as i32;
    (score, f64::from(score) >= passing_score)
}

/// Multiple-choice answers match by the index of the first option flagged
/// correct; everything else matches by exact, case-sensitive string equality.
pub fn answer_is_correct(question: &Question, answer: &QuizAnswer) -> bool {
    match (&question.body, answer) {
        (QuestionBody::MultipleChoice { options }, QuizAnswer::Choice(chosen)) => {
            options.iter().position(|option| option.is_correct) == Some(*chosen)
        }
        (QuestionBody::TrueFalse { correct_answer }, QuizAnswer::Text(text))
        | (QuestionBody::Coding { correct_answer }, QuizAnswer::Text(text))
        | (QuestionBody::ShortAnswer { correct_answer }, QuizAnswer::Text(text)) => {
            text == correct_answer
        }
        _ => false,
    }
}
