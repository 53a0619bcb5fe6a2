//! Integration tests for the Asklet Q&A core
//!
//! These tests exercise end-to-end flows across the stores and services:
//! voting with reputation side effects, answer acceptance, and durable
//! notification delivery with live push.

use std::sync::Arc;

use asklet::{
    AcceptError, AcceptanceService, Answer, ConnectionRegistry, ContentStore,
    NotificationDispatcher, NotificationEvent, NotificationKind, NotificationStore, Question,
    ReputationPoints, User, UserStore, VoteDirection, VoteError, VoteService, VoteState,
    VoteTarget,
};
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

struct TestApp {
    users: Arc<UserStore>,
    content: Arc<ContentStore>,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<NotificationDispatcher>,
    votes: VoteService,
    acceptance: AcceptanceService,
}

fn create_test_app() -> TestApp {
    let users = Arc::new(UserStore::new());
    let content = Arc::new(ContentStore::new());
    let notifications = Arc::new(NotificationStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(notifications, registry.clone()));

    let points = ReputationPoints::default();
    let votes = VoteService::new(users.clone(), content.clone(), points);
    let acceptance = AcceptanceService::new(
        users.clone(),
        content.clone(),
        dispatcher.clone(),
        points.accept_bonus,
    );

    TestApp {
        users,
        content,
        registry,
        dispatcher,
        votes,
        acceptance,
    }
}

async fn register_user(app: &TestApp, name: &str) -> Uuid {
    let user = User::new(
        name.to_string(),
        format!("{}@example.com", name),
        "hashed".to_string(),
    );
    let id = user.id;
    app.users.insert_user(user).await.unwrap();
    id
}

async fn ask_question(app: &TestApp, author: Uuid, title: &str) -> Uuid {
    let question = Question::new(
        title.to_string(),
        "details".to_string(),
        vec!["rust".to_string()],
        author,
    );
    let id = question.id;
    app.content.save_question(&question).await.unwrap();
    id
}

async fn post_answer(app: &TestApp, question: Uuid, author: Uuid) -> Uuid {
    let answer = Answer::new(question, author, "try this".to_string());
    let id = answer.id;
    app.content.save_answer(&answer).await.unwrap();
    id
}

async fn reputation_of(app: &TestApp, user: Uuid) -> i64 {
    app.users.get_user(user).await.unwrap().reputation
}

// ============================================================================
// Voting Flows
// ============================================================================

mod voting_flows {
    use super::*;

    #[tokio::test]
    async fn test_vote_toggle_and_switch_cycle() {
        let app = create_test_app();
        let author = register_user(&app, "alice").await;
        let voter = register_user(&app, "bob").await;
        let question = ask_question(&app, author, "How do I borrow twice?").await;

        // Upvote: author gains the question unit
        let receipt = app
            .votes
            .cast_vote(voter, VoteTarget::Question, question, VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(receipt.vote_score, 1);
        assert_eq!(receipt.user_vote, Some(VoteState::Up));
        assert_eq!(reputation_of(&app, author).await, 5);

        // Switch to downvote: remove 5, refund 2, subtract 2
        let receipt = app
            .votes
            .cast_vote(voter, VoteTarget::Question, question, VoteDirection::Down)
            .await
            .unwrap();
        assert_eq!(receipt.vote_score, -1);
        assert_eq!(receipt.user_vote, Some(VoteState::Down));
        assert_eq!(reputation_of(&app, author).await, -2);

        // Toggle the downvote off: back to neutral
        let receipt = app
            .votes
            .cast_vote(voter, VoteTarget::Question, question, VoteDirection::Down)
            .await
            .unwrap();
        assert_eq!(receipt.vote_score, 0);
        assert_eq!(receipt.user_vote, None);
        assert_eq!(reputation_of(&app, author).await, 0);
    }

    #[tokio::test]
    async fn test_multiple_voters_accumulate() {
        let app = create_test_app();
        let author = register_user(&app, "alice").await;
        let question = ask_question(&app, author, "Lifetimes?").await;
        let answer = post_answer(&app, question, author).await;

        let voters = [
            register_user(&app, "v1").await,
            register_user(&app, "v2").await,
            register_user(&app, "v3").await,
        ];
        for voter in voters {
            app.votes
                .cast_vote(voter, VoteTarget::Answer, answer, VoteDirection::Up)
                .await
                .unwrap();
        }

        let answer = app.content.get_answer(answer).await.unwrap();
        assert_eq!(answer.votes.score(), 3);
        assert_eq!(reputation_of(&app, author).await, 30);
    }

    #[tokio::test]
    async fn test_self_vote_is_rejected() {
        let app = create_test_app();
        let author = register_user(&app, "alice").await;
        let question = ask_question(&app, author, "Can I vote myself up?").await;

        let err = app
            .votes
            .cast_vote(author, VoteTarget::Question, question, VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::SelfVote(VoteTarget::Question)));
        assert_eq!(reputation_of(&app, author).await, 0);
    }

    #[tokio::test]
    async fn test_vote_on_missing_entity_fails() {
        let app = create_test_app();
        let voter = register_user(&app, "bob").await;

        let err = app
            .votes
            .cast_vote(voter, VoteTarget::Question, Uuid::new_v4(), VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::NotFound(VoteTarget::Question)));
    }
}

// ============================================================================
// Acceptance Flows
// ============================================================================

mod acceptance_flows {
    use super::*;

    #[tokio::test]
    async fn test_accept_then_switch_to_other_answer() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let first = register_user(&app, "first").await;
        let second = register_user(&app, "second").await;
        let question = ask_question(&app, asker, "Which answer wins?").await;
        let answer_a = post_answer(&app, question, first).await;
        let answer_b = post_answer(&app, question, second).await;

        let outcome = app.acceptance.toggle_accept(answer_a, asker).await.unwrap();
        assert!(outcome.accepted);
        assert_eq!(reputation_of(&app, first).await, 15);

        // Accepting the second answer sweeps the first and reverses its bonus
        let outcome = app.acceptance.toggle_accept(answer_b, asker).await.unwrap();
        assert!(outcome.accepted);
        assert_eq!(reputation_of(&app, first).await, 0);
        assert_eq!(reputation_of(&app, second).await, 15);

        let question = app.content.get_question(question).await.unwrap();
        assert_eq!(question.accepted_answer, Some(answer_b));
        assert!(!app.content.get_answer(answer_a).await.unwrap().is_accepted);
        assert!(app.content.get_answer(answer_b).await.unwrap().is_accepted);
    }

    #[tokio::test]
    async fn test_unaccept_returns_to_neutral() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let question = ask_question(&app, asker, "Toggle?").await;
        let answer = post_answer(&app, question, answerer).await;

        app.acceptance.toggle_accept(answer, asker).await.unwrap();
        let outcome = app.acceptance.toggle_accept(answer, asker).await.unwrap();

        assert!(!outcome.accepted);
        assert_eq!(reputation_of(&app, answerer).await, 0);
        let question = app.content.get_question(question).await.unwrap();
        assert_eq!(question.accepted_answer, None);
    }

    #[tokio::test]
    async fn test_only_question_author_may_accept() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let stranger = register_user(&app, "stranger").await;
        let question = ask_question(&app, asker, "Whose call is it?").await;
        let answer = post_answer(&app, question, answerer).await;

        let err = app
            .acceptance
            .toggle_accept(answer, stranger)
            .await
            .unwrap_err();
        assert!(matches!(err, AcceptError::NotQuestionAuthor));
        assert!(!app.content.get_answer(answer).await.unwrap().is_accepted);
    }

    #[tokio::test]
    async fn test_acceptance_notifies_answer_author() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let question = ask_question(&app, asker, "Notify me").await;
        let answer = post_answer(&app, question, answerer).await;

        app.acceptance.toggle_accept(answer, asker).await.unwrap();

        let page = app.dispatcher.list(answerer, 1, 20, false).await;
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].kind, NotificationKind::Accept);
        assert_eq!(page.notifications[0].related_answer, Some(answer));
        assert_eq!(page.unread_count, 1);
    }
}

// ============================================================================
// Notification Delivery
// ============================================================================

mod notification_delivery {
    use super::*;

    #[tokio::test]
    async fn test_live_push_reaches_connected_recipient() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let question = ask_question(&app, asker, "Live?").await;
        let answer = post_answer(&app, question, answerer).await;

        let mut rx = app.registry.connect(answerer);

        // First frame is always the connection handshake
        match rx.recv().await.unwrap() {
            NotificationEvent::Connected { message } => assert_eq!(message, "Connected"),
            other => panic!("expected handshake, got {:?}", other),
        }

        app.acceptance.toggle_accept(answer, asker).await.unwrap();

        match rx.recv().await.unwrap() {
            NotificationEvent::Notification { data } => {
                assert_eq!(data.recipient, answerer);
                assert_eq!(data.kind, NotificationKind::Accept);
            }
            other => panic!("expected notification, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_offline_recipient_still_gets_durable_record() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let question = ask_question(&app, asker, "Offline?").await;
        let answer = post_answer(&app, question, answerer).await;

        // No channel registered for the answerer
        app.acceptance.toggle_accept(answer, asker).await.unwrap();

        let page = app.dispatcher.list(answerer, 1, 20, true).await;
        assert_eq!(page.notifications.len(), 1);
        assert!(!page.notifications[0].is_read);
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_recipient() {
        let app = create_test_app();
        let sender = register_user(&app, "sender").await;
        let recipient = register_user(&app, "recipient").await;
        let bystander = register_user(&app, "bystander").await;

        let notification = app
            .dispatcher
            .notify(
                recipient,
                sender,
                NotificationKind::Mention,
                "you were mentioned".to_string(),
                None,
                None,
            )
            .await
            .unwrap();

        // A different user marking the same id is a no-op
        app.dispatcher
            .mark_read(&[notification.id], bystander)
            .await
            .unwrap();
        assert_eq!(app.dispatcher.list(recipient, 1, 20, false).await.unread_count, 1);

        app.dispatcher
            .mark_read(&[notification.id], recipient)
            .await
            .unwrap();
        assert_eq!(app.dispatcher.list(recipient, 1, 20, false).await.unread_count, 0);
    }

    #[tokio::test]
    async fn test_pagination_newest_first() {
        let app = create_test_app();
        let sender = register_user(&app, "sender").await;
        let recipient = register_user(&app, "recipient").await;

        for i in 0..25 {
            app.dispatcher
                .notify(
                    recipient,
                    sender,
                    NotificationKind::Comment,
                    format!("comment {}", i),
                    None,
                    None,
                )
                .await
                .unwrap();
        }

        let first = app.dispatcher.list(recipient, 1, 20, false).await;
        assert_eq!(first.notifications.len(), 20);
        assert_eq!(first.notifications[0].message, "comment 24");
        assert_eq!(first.pagination.pages, 2);
        assert!(first.pagination.has_next);
        assert!(!first.pagination.has_prev);

        let second = app.dispatcher.list(recipient, 2, 20, false).await;
        assert_eq!(second.notifications.len(), 5);
        assert!(second.pagination.has_prev);
    }

    #[tokio::test]
    async fn test_reconnect_replaces_previous_channel() {
        let app = create_test_app();
        let user = register_user(&app, "reconnector").await;

        let _old = app.registry.connect(user);
        let mut new = app.registry.connect(user);
        assert_eq!(app.registry.connection_count(), 1);

        // Drain the handshake on the live channel
        assert!(matches!(
            new.recv().await,
            Some(NotificationEvent::Connected { .. })
        ));
    }
}

// ============================================================================
// End-to-End Journey
// ============================================================================

mod full_journey {
    use super::*;

    #[tokio::test]
    async fn test_ask_answer_vote_accept_journey() {
        let app = create_test_app();
        let asker = register_user(&app, "asker").await;
        let answerer = register_user(&app, "answerer").await;
        let voter = register_user(&app, "voter").await;

        let question = ask_question(&app, asker, "The full journey").await;
        let answer = post_answer(&app, question, answerer).await;

        app.votes
            .cast_vote(voter, VoteTarget::Question, question, VoteDirection::Up)
            .await
            .unwrap();
        app.votes
            .cast_vote(voter, VoteTarget::Answer, answer, VoteDirection::Up)
            .await
            .unwrap();
        app.acceptance.toggle_accept(answer, asker).await.unwrap();

        // Asker: +5 question vote. Answerer: +10 answer vote, +15 accept.
        assert_eq!(reputation_of(&app, asker).await, 5);
        assert_eq!(reputation_of(&app, answerer).await, 25);

        let answers = app.content.answers_for_question(question).await;
        assert_eq!(answers.len(), 1);
        assert!(answers[0].is_accepted);

        let inbox = app.dispatcher.list(answerer, 1, 20, false).await;
        assert_eq!(inbox.notifications.len(), 1);
        assert_eq!(inbox.notifications[0].kind, NotificationKind::Accept);
    }
}
