use anyhow::Result;
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};

use asklet::api::middleware::{
    logging_middleware, rate_limit_middleware, security_headers_middleware, RateLimitState,
};
use asklet::api::{answers, auth, notifications, questions, vote, ApiState, SessionStore};
use asklet::{
    AcceptanceService, AskletConfig, ConnectionRegistry, ContentStore, DatabasePool,
    NotificationDispatcher, NotificationStore, UserStore, VoteService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(AskletConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?);

    init_logging(&config)?;

    info!("Starting Asklet Q&A server");

    // Connect PostgreSQL when enabled; otherwise stores stay in-memory only
    let db = if config.database.postgres_enabled {
        let pool = DatabasePool::new(&config.database.postgres_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
        pool.init_schema()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize schema: {}", e))?;
        info!("PostgreSQL persistence enabled");
        Some(Arc::new(pool))
    } else {
        warn!("PostgreSQL disabled, running with in-memory storage only");
        None
    };

    // Stores
    let mut users = UserStore::new();
    let mut content = ContentStore::new();
    let mut notification_store = NotificationStore::new();
    if let Some(db) = &db {
        users = users.with_database(db.clone());
        content = content.with_database(db.clone());
        notification_store = notification_store.with_database(db.clone());
    }
    let users = Arc::new(users);
    let content = Arc::new(content);
    let notification_store = Arc::new(notification_store);

    // Services
    let points = config.reputation.to_points();
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notification_store.clone(),
        registry.clone(),
    ));
    let votes = Arc::new(VoteService::new(users.clone(), content.clone(), points));
    let acceptance = Arc::new(AcceptanceService::new(
        users.clone(),
        content.clone(),
        dispatcher.clone(),
        points.accept_bonus,
    ));
    info!(
        question_vote = points.question_vote,
        answer_vote = points.answer_vote,
        vote_refund = points.vote_refund,
        accept_bonus = points.accept_bonus,
        "Reputation weights configured"
    );

    let state = ApiState {
        sessions: Arc::new(SessionStore::new()),
        users,
        content,
        notifications: notification_store,
        registry,
        votes,
        acceptance,
        dispatcher,
    };

    let rate_limit = RateLimitState::new(config.security.rate_limit_per_minute);

    let app = Router::new()
        .nest("/api/auth", auth::create_router(state.clone()))
        .nest("/api/vote", vote::create_router(state.clone()))
        .nest("/api/questions", questions::create_router(state.clone()))
        .nest("/api/answers", answers::create_router(state.clone()))
        .nest("/api/notifications", notifications::create_router(state))
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Asklet server listening on {}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn init_logging(config: &AskletConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
