//! Voting and Reputation
//!
//! Implements the vote toggle/switch state machine for questions and
//! answers, and the reputation side effects that votes apply to the
//! entity's author.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ VoteDecision │◄────│ VoteService │────►│ ContentStore │
//! │ (pure logic) │     │ (load/save, │     │ UserStore    │
//! └──────────────┘     │  reputation)│     └──────────────┘
//!                      └─────────────┘
//! ```
//!
//! ## Vote Model
//!
//! - One vote per voter per entity, stored as membership in the entity's
//!   upvote or downvote set (never both)
//! - A repeated vote in the same direction toggles the vote off
//! - A vote in the opposite direction switches sides, refunding the
//!   removed vote before applying the new one
//! - Reputation deltas land on the entity's author, not the voter:
//!   question vote 5 points, answer vote 10, opposite-vote refund 2

mod engine;
mod service;

pub use engine::{decide, VoteAction, VoteDecision};
pub use service::{ReputationPoints, VoteError, VoteReceipt, VoteService};
