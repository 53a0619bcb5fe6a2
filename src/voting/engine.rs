//! Pure vote decision logic
//!
//! Given an entity's current vote sets, a voter, and a requested
//! direction, computes the new sets and the reputation delta for the
//! entity's author. No I/O happens here; persistence and the
//! reputation write belong to `VoteService`.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{VoteDirection, VoteSets};

/// What a vote request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Upvoted,
    RemovedUpvote,
    Downvoted,
    RemovedDownvote,
}

impl VoteAction {
    /// Human-readable label for API messages
    pub fn label(&self) -> &'static str {
        match self {
            VoteAction::Upvoted => "upvoted",
            VoteAction::RemovedUpvote => "removed upvote",
            VoteAction::Downvoted => "downvoted",
            VoteAction::RemovedDownvote => "removed downvote",
        }
    }
}

/// Outcome of applying one vote request to an entity's vote sets
#[derive(Debug, Clone)]
pub struct VoteDecision {
    /// The entity's vote sets after the request
    pub sets: VoteSets,
    /// Reputation delta for the entity's author (may be zero only when
    /// unit and refund cancel out, which the defaults never do)
    pub reputation_delta: i64,
    pub action: VoteAction,
}

/// Apply one vote request to a copy of the entity's vote sets.
///
/// `unit` is the per-vote reputation weight of the entity kind (question
/// 5, answer 10 by default); `refund` is the flat credit for removing an
/// opposite vote before switching sides (2 by default).
///
/// The mutual-exclusion invariant (a voter in at most one set) holds on
/// the returned sets whenever it held on the input.
pub fn decide(sets: &VoteSets, voter: Uuid, direction: VoteDirection, unit: i64, refund: i64) -> VoteDecision {
    let mut sets = sets.clone();
    let has_up = sets.upvotes.contains(&voter);
    let has_down = sets.downvotes.contains(&voter);

    match direction {
        VoteDirection::Up => {
            if has_up {
                // Toggle off
                sets.upvotes.remove(&voter);
                VoteDecision {
                    sets,
                    reputation_delta: -unit,
                    action: VoteAction::RemovedUpvote,
                }
            } else {
                let mut delta = 0;
                if has_down {
                    sets.downvotes.remove(&voter);
                    delta += refund;
                }
                sets.upvotes.insert(voter);
                delta += unit;
                VoteDecision {
                    sets,
                    reputation_delta: delta,
                    action: VoteAction::Upvoted,
                }
            }
        }
        VoteDirection::Down => {
            if has_down {
                // Toggle off
                sets.downvotes.remove(&voter);
                VoteDecision {
                    sets,
                    reputation_delta: refund,
                    action: VoteAction::RemovedDownvote,
                }
            } else {
                let mut delta = 0;
                if has_up {
                    sets.upvotes.remove(&voter);
                    delta -= unit;
                }
                sets.downvotes.insert(voter);
                delta -= refund;
                VoteDecision {
                    sets,
                    reputation_delta: delta,
                    action: VoteAction::Downvoted,
                }
            }
        }
    }
}
