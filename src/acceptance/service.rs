//! Acceptance orchestration - toggle, sweep, reputation, notification

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::NotificationKind;
use crate::notify::NotificationDispatcher;
use crate::store::{ContentStore, UserStore};

/// Errors an acceptance toggle can fail with
#[derive(Debug)]
pub enum AcceptError {
    AnswerNotFound,
    QuestionNotFound,
    /// Only the question's author may accept or unaccept answers
    NotQuestionAuthor,
    /// Persistence failure; the toggle may be partially applied (the
    /// multi-document update is not transactional)
    Store(anyhow::Error),
}

impl std::fmt::Display for AcceptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptError::AnswerNotFound => write!(f, "Answer not found"),
            AcceptError::QuestionNotFound => write!(f, "Question not found"),
            AcceptError::NotQuestionAuthor => {
                write!(f, "Only question author can accept answers")
            }
            AcceptError::Store(e) => write!(f, "Failed to persist acceptance: {}", e),
        }
    }
}

impl std::error::Error for AcceptError {}

/// Result of a successful toggle
#[derive(Debug, Clone, Copy)]
pub struct AcceptOutcome {
    pub answer_id: Uuid,
    /// True when the answer ended up accepted, false when un-accepted
    pub accepted: bool,
}

/// Toggles the accepted answer of a question.
pub struct AcceptanceService {
    users: Arc<UserStore>,
    content: Arc<ContentStore>,
    dispatcher: Arc<NotificationDispatcher>,
    /// Reputation bonus for an accepted answer's author (15 by default)
    accept_bonus: i64,
}

impl AcceptanceService {
    pub fn new(
        users: Arc<UserStore>,
        content: Arc<ContentStore>,
        dispatcher: Arc<NotificationDispatcher>,
        accept_bonus: i64,
    ) -> Self {
        Self {
            users,
            content,
            dispatcher,
            accept_bonus,
        }
    }

    /// Toggle acceptance of an answer, as the question's author.
    ///
    /// Accepting first sweeps any other accepted answer of the question
    /// (restoring the single-accept invariant even if it was previously
    /// violated), then marks this one accepted, credits its author, and
    /// notifies them unless they are the requester. Un-accepting reverses
    /// the flag, the pointer, and the reputation bonus.
    pub async fn toggle_accept(
        &self,
        answer_id: Uuid,
        requester: Uuid,
    ) -> Result<AcceptOutcome, AcceptError> {
        let mut answer = self
            .content
            .get_answer(answer_id)
            .await
            .ok_or(AcceptError::AnswerNotFound)?;
        let mut question = self
            .content
            .get_question(answer.question)
            .await
            .ok_or(AcceptError::QuestionNotFound)?;

        if question.author != requester {
            return Err(AcceptError::NotQuestionAuthor);
        }

        let accepting = !answer.is_accepted;

        if accepting {
            self.sweep_other_accepted(&question.id, answer_id).await?;

            answer.is_accepted = true;
            question.accepted_answer = Some(answer.id);

            self.users
                .adjust_reputation(answer.author, self.accept_bonus)
                .await
                .map_err(AcceptError::Store)?;
        } else {
            answer.is_accepted = false;
            question.accepted_answer = None;

            self.users
                .adjust_reputation(answer.author, -self.accept_bonus)
                .await
                .map_err(AcceptError::Store)?;
        }

        answer.updated_at = Utc::now();
        question.updated_at = Utc::now();

        // Two writes, no cross-document transaction; a crash in between
        // leaves the sweep on the next accept to repair the flags
        self.content
            .save_answer(&answer)
            .await
            .map_err(AcceptError::Store)?;
        self.content
            .save_question(&question)
            .await
            .map_err(AcceptError::Store)?;

        if accepting && answer.author != requester {
            // Push failures are swallowed by the dispatcher; a failed
            // durable write surfaces as a store error
            self.dispatcher
                .notify(
                    answer.author,
                    requester,
                    NotificationKind::Accept,
                    format!("Your answer was accepted for: \"{}\"", question.title),
                    Some(question.id),
                    Some(answer.id),
                )
                .await
                .map_err(AcceptError::Store)?;
        }

        info!(
            question_id = %question.id,
            answer_id = %answer.id,
            accepted = accepting,
            "Acceptance toggled"
        );

        Ok(AcceptOutcome {
            answer_id: answer.id,
            accepted: accepting,
        })
    }

    /// Un-accept every other accepted answer of the question, reversing
    /// the reputation bonus of each swept author.
    async fn sweep_other_accepted(
        &self,
        question_id: &Uuid,
        keep: Uuid,
    ) -> Result<(), AcceptError> {
        let others: Vec<_> = self
            .content
            .answers_for_question(*question_id)
            .await
            .into_iter()
            .filter(|a| a.is_accepted && a.id != keep)
            .collect();

        if others.len() > 1 {
            warn!(
                question_id = %question_id,
                count = others.len(),
                "Multiple accepted answers found; repairing"
            );
        }

        for mut other in others {
            other.is_accepted = false;
            other.updated_at = Utc::now();
            self.content
                .save_answer(&other)
                .await
                .map_err(AcceptError::Store)?;
            self.users
                .adjust_reputation(other.author, -self.accept_bonus)
                .await
                .map_err(AcceptError::Store)?;
        }

        Ok(())
    }
}
