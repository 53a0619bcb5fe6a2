//! Vote orchestration - load, decide, persist, adjust reputation

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{VoteDirection, VoteState, VoteTarget};
use crate::store::{ContentStore, UserStore};
use crate::voting::engine::{decide, VoteAction};

/// Reputation weights for vote and acceptance side effects.
///
/// Configurable through `ReputationConfig`; defaults match the classic
/// values (question 5, answer 10, refund 2, accept 15).
#[derive(Debug, Clone, Copy)]
pub struct ReputationPoints {
    pub question_vote: i64,
    pub answer_vote: i64,
    pub vote_refund: i64,
    pub accept_bonus: i64,
}

impl ReputationPoints {
    fn unit_for(&self, target: VoteTarget) -> i64 {
        match target {
            VoteTarget::Question => self.question_vote,
            VoteTarget::Answer => self.answer_vote,
        }
    }
}

impl Default for ReputationPoints {
    fn default() -> Self {
        Self {
            question_vote: 5,
            answer_vote: 10,
            vote_refund: 2,
            accept_bonus: 15,
        }
    }
}

/// Errors a vote request can fail with, detected before any mutation
#[derive(Debug)]
pub enum VoteError {
    /// The target entity does not exist
    NotFound(VoteTarget),
    /// Voting on one's own question or answer is forbidden
    SelfVote(VoteTarget),
    /// Persistence failure; no reputation was applied
    Store(anyhow::Error),
}

impl std::fmt::Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::NotFound(target) => write!(f, "{} not found", target.label()),
            VoteError::SelfVote(target) => {
                write!(f, "Cannot vote on your own {}", target.label())
            }
            VoteError::Store(e) => write!(f, "Failed to persist vote: {}", e),
        }
    }
}

impl std::error::Error for VoteError {}

/// Result of a successful vote request
#[derive(Debug, Clone, Serialize)]
pub struct VoteReceipt {
    #[serde(skip)]
    pub action: VoteAction,
    pub vote_score: i64,
    pub upvotes: usize,
    pub downvotes: usize,
    pub user_vote: Option<VoteState>,
}

/// Applies vote requests to questions and answers.
///
/// The read-modify-write cycle is not protected by a cross-process lock;
/// two concurrent votes on the same entity may interleave with
/// last-write-wins semantics on the vote sets (a tolerated weak
/// consistency point of the design).
pub struct VoteService {
    users: Arc<UserStore>,
    content: Arc<ContentStore>,
    points: ReputationPoints,
}

impl VoteService {
    pub fn new(users: Arc<UserStore>, content: Arc<ContentStore>, points: ReputationPoints) -> Self {
        Self {
            users,
            content,
            points,
        }
    }

    /// Apply one vote request.
    ///
    /// Precondition failures abort before any state change; on success the
    /// entity is persisted exactly once and the author's reputation is
    /// adjusted when the net delta is non-zero.
    pub async fn cast_vote(
        &self,
        voter: Uuid,
        target: VoteTarget,
        item_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteReceipt, VoteError> {
        let unit = self.points.unit_for(target);
        let refund = self.points.vote_refund;

        match target {
            VoteTarget::Question => {
                let mut question = self
                    .content
                    .get_question(item_id)
                    .await
                    .ok_or(VoteError::NotFound(target))?;
                if question.author == voter {
                    return Err(VoteError::SelfVote(target));
                }

                let decision = decide(&question.votes, voter, direction, unit, refund);
                question.votes = decision.sets;
                question.updated_at = Utc::now();

                self.content
                    .save_question(&question)
                    .await
                    .map_err(VoteError::Store)?;
                self.apply_reputation(question.author, decision.reputation_delta)
                    .await?;

                self.receipt(&question.votes, voter, decision.action, item_id, target)
            }
            VoteTarget::Answer => {
                let mut answer = self
                    .content
                    .get_answer(item_id)
                    .await
                    .ok_or(VoteError::NotFound(target))?;
                if answer.author == voter {
                    return Err(VoteError::SelfVote(target));
                }

                let decision = decide(&answer.votes, voter, direction, unit, refund);
                answer.votes = decision.sets;
                answer.updated_at = Utc::now();

                self.content
                    .save_answer(&answer)
                    .await
                    .map_err(VoteError::Store)?;
                self.apply_reputation(answer.author, decision.reputation_delta)
                    .await?;

                self.receipt(&answer.votes, voter, decision.action, item_id, target)
            }
        }
    }

    async fn apply_reputation(&self, author: Uuid, delta: i64) -> Result<(), VoteError> {
        if delta == 0 {
            return Ok(());
        }
        self.users
            .adjust_reputation(author, delta)
            .await
            .map_err(|e| {
                warn!(author = %author, delta = delta, error = %e, "Reputation write failed");
                VoteError::Store(e)
            })
    }

    fn receipt(
        &self,
        sets: &crate::models::VoteSets,
        voter: Uuid,
        action: VoteAction,
        item_id: Uuid,
        target: VoteTarget,
    ) -> Result<VoteReceipt, VoteError> {
        let receipt = VoteReceipt {
            action,
            vote_score: sets.score(),
            upvotes: sets.upvotes.len(),
            downvotes: sets.downvotes.len(),
            user_vote: sets.state_for(voter),
        };

        info!(
            item_id = %item_id,
            item_type = target.label(),
            voter = %voter,
            action = action.label(),
            vote_score = receipt.vote_score,
            "Vote applied"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, Question, User};

    async fn setup() -> (Arc<UserStore>, Arc<ContentStore>, VoteService) {
        let users = Arc::new(UserStore::new());
        let content = Arc::new(ContentStore::new());
        let service = VoteService::new(
            users.clone(),
            content.clone(),
            ReputationPoints::default(),
        );
        (users, content, service)
    }

    async fn seed_user(users: &UserStore, name: &str) -> Uuid {
        let user = User::new(
            name.to_string(),
            format!("{}@example.com", name),
            "hash".to_string(),
        );
        let id = user.id;
        users.insert_user(user).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_question_upvote_rewards_author() {
        let (users, content, service) = setup().await;
        let author = seed_user(&users, "author").await;
        let voter = seed_user(&users, "voter").await;

        let question = Question::new("Q".into(), "D".into(), vec![], author);
        let question_id = question.id;
        content.save_question(&question).await.unwrap();

        let receipt = service
            .cast_vote(voter, VoteTarget::Question, question_id, VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(receipt.vote_score, 1);
        assert_eq!(receipt.upvotes, 1);
        assert_eq!(receipt.user_vote, Some(VoteState::Up));
        assert_eq!(users.get_user(author).await.unwrap().reputation, 5);
    }

    #[tokio::test]
    async fn test_answer_toggle_nets_zero_reputation() {
        let (users, content, service) = setup().await;
        let author = seed_user(&users, "author").await;
        let voter = seed_user(&users, "voter").await;

        let answer = Answer::new(Uuid::new_v4(), author, "A".into());
        let answer_id = answer.id;
        content.save_answer(&answer).await.unwrap();

        service
            .cast_vote(voter, VoteTarget::Answer, answer_id, VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(users.get_user(author).await.unwrap().reputation, 10);

        let receipt = service
            .cast_vote(voter, VoteTarget::Answer, answer_id, VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(receipt.vote_score, 0);
        assert_eq!(receipt.user_vote, None);
        assert_eq!(users.get_user(author).await.unwrap().reputation, 0);
    }

    #[tokio::test]
    async fn test_switch_from_downvote_refunds() {
        let (users, content, service) = setup().await;
        let author = seed_user(&users, "author").await;
        let voter = seed_user(&users, "voter").await;

        let answer = Answer::new(Uuid::new_v4(), author, "A".into());
        let answer_id = answer.id;
        content.save_answer(&answer).await.unwrap();

        service
            .cast_vote(voter, VoteTarget::Answer, answer_id, VoteDirection::Down)
            .await
            .unwrap();
        assert_eq!(users.get_user(author).await.unwrap().reputation, -2);

        let receipt = service
            .cast_vote(voter, VoteTarget::Answer, answer_id, VoteDirection::Up)
            .await
            .unwrap();

        // -2 from the downvote, then +2 refund +10 unit
        assert_eq!(receipt.vote_score, 1);
        assert_eq!(receipt.downvotes, 0);
        assert_eq!(users.get_user(author).await.unwrap().reputation, 10);
    }

    #[tokio::test]
    async fn test_self_vote_rejected_without_mutation() {
        let (users, content, service) = setup().await;
        let author = seed_user(&users, "author").await;

        let question = Question::new("Q".into(), "D".into(), vec![], author);
        let question_id = question.id;
        content.save_question(&question).await.unwrap();

        let err = service
            .cast_vote(author, VoteTarget::Question, question_id, VoteDirection::Up)
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::SelfVote(VoteTarget::Question)));
        assert_eq!(content.get_question(question_id).await.unwrap().votes.score(), 0);
        assert_eq!(users.get_user(author).await.unwrap().reputation, 0);
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found() {
        let (users, _content, service) = setup().await;
        let voter = seed_user(&users, "voter").await;

        let err = service
            .cast_vote(voter, VoteTarget::Answer, Uuid::new_v4(), VoteDirection::Up)
            .await
            .unwrap_err();

        assert!(matches!(err, VoteError::NotFound(VoteTarget::Answer)));
    }
}
