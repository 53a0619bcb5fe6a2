//! Answer Acceptance
//!
//! State machine for the single accepted answer of a question. Only the
//! question's author can toggle acceptance; accepting hands the answer's
//! author a reputation bonus, un-accepting takes it back, and accepting
//! someone else's answer emits an `accept` notification.
//!
//! ## State Model
//!
//! Per question: `NoAcceptedAnswer` or `AcceptedAnswer(id)`. The
//! question's `accepted_answer` pointer and the answers' `is_accepted`
//! flags are kept consistent by a defensive sweep on every accept, so a
//! previously violated single-accept invariant heals on the next
//! transition.

mod service;

pub use service::{AcceptError, AcceptOutcome, AcceptanceService};
