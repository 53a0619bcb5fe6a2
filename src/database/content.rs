//! Content Repository - PostgreSQL operations for questions and answers
//!
//! Vote sets are stored as uuid[] columns and rebuilt into HashSets on
//! load; the vote score itself is never stored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Answer, Question, VoteSets};

pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id UUID PRIMARY KEY,
                title VARCHAR(400) NOT NULL,
                description TEXT NOT NULL,
                tags TEXT[] NOT NULL DEFAULT '{}',
                author UUID NOT NULL,
                upvotes UUID[] NOT NULL DEFAULT '{}',
                downvotes UUID[] NOT NULL DEFAULT '{}',
                accepted_answer UUID,
                views BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create questions table: {}", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS answers (
                id UUID PRIMARY KEY,
                question UUID NOT NULL,
                author UUID NOT NULL,
                content TEXT NOT NULL,
                upvotes UUID[] NOT NULL DEFAULT '{}',
                downvotes UUID[] NOT NULL DEFAULT '{}',
                is_accepted BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create answers table: {}", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_answers_question ON answers (question)")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create answers index: {}", e))?;

        Ok(())
    }

    pub async fn upsert_question(&self, question: &Question) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO questions
            (id, title, description, tags, author, upvotes, downvotes,
             accepted_answer, views, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                tags = EXCLUDED.tags,
                upvotes = EXCLUDED.upvotes,
                downvotes = EXCLUDED.downvotes,
                accepted_answer = EXCLUDED.accepted_answer,
                views = EXCLUDED.views,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(question.id)
        .bind(&question.title)
        .bind(&question.description)
        .bind(&question.tags)
        .bind(question.author)
        .bind(set_to_vec(&question.votes.upvotes))
        .bind(set_to_vec(&question.votes.downvotes))
        .bind(question.accepted_answer)
        .bind(question.views)
        .bind(question.created_at)
        .bind(question.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert question: {}", e))?;

        debug!(question_id = %question.id, "Question upserted");
        Ok(())
    }

    pub async fn get_question(&self, id: Uuid) -> Result<Option<Question>, String> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, tags, author, upvotes, downvotes,
                   accepted_answer, views, created_at, updated_at
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to get question: {}", e))?;

        Ok(row.map(row_to_question))
    }

    pub async fn upsert_answer(&self, answer: &Answer) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO answers
            (id, question, author, content, upvotes, downvotes,
             is_accepted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                content = EXCLUDED.content,
                upvotes = EXCLUDED.upvotes,
                downvotes = EXCLUDED.downvotes,
                is_accepted = EXCLUDED.is_accepted,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(answer.id)
        .bind(answer.question)
        .bind(answer.author)
        .bind(&answer.content)
        .bind(set_to_vec(&answer.votes.upvotes))
        .bind(set_to_vec(&answer.votes.downvotes))
        .bind(answer.is_accepted)
        .bind(answer.created_at)
        .bind(answer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert answer: {}", e))?;

        debug!(answer_id = %answer.id, "Answer upserted");
        Ok(())
    }

    pub async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>, String> {
        let row = sqlx::query(
            r#"
            SELECT id, question, author, content, upvotes, downvotes,
                   is_accepted, created_at, updated_at
            FROM answers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to get answer: {}", e))?;

        Ok(row.map(row_to_answer))
    }

    pub async fn get_answers_for_question(&self, question: Uuid) -> Result<Vec<Answer>, String> {
        let rows = sqlx::query(
            r#"
            SELECT id, question, author, content, upvotes, downvotes,
                   is_accepted, created_at, updated_at
            FROM answers
            WHERE question = $1
            ORDER BY is_accepted DESC, created_at ASC
            "#,
        )
        .bind(question)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to get answers: {}", e))?;

        Ok(rows.into_iter().map(row_to_answer).collect())
    }
}

fn set_to_vec(set: &HashSet<Uuid>) -> Vec<Uuid> {
    set.iter().copied().collect()
}

fn vote_sets(upvotes: Vec<Uuid>, downvotes: Vec<Uuid>) -> VoteSets {
    VoteSets {
        upvotes: upvotes.into_iter().collect(),
        downvotes: downvotes.into_iter().collect(),
    }
}

fn row_to_question(row: sqlx::postgres::PgRow) -> Question {
    Question {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        tags: row.get("tags"),
        author: row.get("author"),
        votes: vote_sets(row.get("upvotes"), row.get("downvotes")),
        accepted_answer: row.get("accepted_answer"),
        views: row.get("views"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

fn row_to_answer(row: sqlx::postgres::PgRow) -> Answer {
    Answer {
        id: row.get("id"),
        question: row.get("question"),
        author: row.get("author"),
        content: row.get("content"),
        votes: vote_sets(row.get("upvotes"), row.get("downvotes")),
        is_accepted: row.get("is_accepted"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}
