//! Questions and answers - the two votable entity kinds

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which entity kind a vote targets.
///
/// Parsed from the wire as a tagged value; unknown strings are rejected by
/// serde rather than being passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTarget {
    Question,
    Answer,
}

impl VoteTarget {
    /// Lowercase name used in API messages ("question" / "answer")
    pub fn label(&self) -> &'static str {
        match self {
            VoteTarget::Question => "question",
            VoteTarget::Answer => "answer",
        }
    }
}

/// Requested vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// The caller's resulting vote state on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    Up,
    Down,
}

/// The two voter-id sets carried by every votable entity.
///
/// Invariant: a voter appears in at most one of the two sets. The vote
/// engine preserves this; `score()` is always derived, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteSets {
    pub upvotes: HashSet<Uuid>,
    pub downvotes: HashSet<Uuid>,
}

impl VoteSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived vote score: |upvotes| - |downvotes|
    pub fn score(&self) -> i64 {
        self.upvotes.len() as i64 - self.downvotes.len() as i64
    }

    /// The given voter's current vote, if any
    pub fn state_for(&self, voter: Uuid) -> Option<VoteState> {
        if self.upvotes.contains(&voter) {
            Some(VoteState::Up)
        } else if self.downvotes.contains(&voter) {
            Some(VoteState::Down)
        } else {
            None
        }
    }
}

/// A question posted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub author: Uuid,
    pub votes: VoteSets,
    /// At most one answer of this question is accepted at a time
    pub accepted_answer: Option<Uuid>,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    pub fn new(title: String, description: String, tags: Vec<String>, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            tags,
            author,
            votes: VoteSets::new(),
            accepted_answer: None,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An answer to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub question: Uuid,
    pub author: Uuid,
    pub content: String,
    pub votes: VoteSets,
    /// Kept consistent with the owning question's `accepted_answer` pointer
    pub is_accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question: Uuid, author: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            question,
            author,
            content,
            votes: VoteSets::new(),
            is_accepted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_score_derivation() {
        let mut sets = VoteSets::new();
        sets.upvotes.insert(Uuid::new_v4());
        sets.upvotes.insert(Uuid::new_v4());
        sets.downvotes.insert(Uuid::new_v4());
        assert_eq!(sets.score(), 1);
    }

    #[test]
    fn test_vote_state_lookup() {
        let voter = Uuid::new_v4();
        let mut sets = VoteSets::new();
        assert_eq!(sets.state_for(voter), None);

        sets.downvotes.insert(voter);
        assert_eq!(sets.state_for(voter), Some(VoteState::Down));
    }

    #[test]
    fn test_unknown_vote_target_rejected() {
        let parsed: Result<VoteTarget, _> = serde_json::from_str("\"comment\"");
        assert!(parsed.is_err());
    }
}
