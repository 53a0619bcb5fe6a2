//! Content store - questions and answers

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{Answer, Question};

pub struct ContentStore {
    db: Option<Arc<DatabasePool>>,
    questions: Arc<RwLock<HashMap<Uuid, Question>>>,
    answers: Arc<RwLock<HashMap<Uuid, Answer>>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self {
            db: None,
            questions: Arc::new(RwLock::new(HashMap::new())),
            answers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_database(mut self, db: Arc<DatabasePool>) -> Self {
        self.db = Some(db);
        self
    }

    pub async fn get_question(&self, id: Uuid) -> Option<Question> {
        {
            let questions = self.questions.read().await;
            if let Some(question) = questions.get(&id) {
                return Some(question.clone());
            }
        }

        if let Some(ref db) = self.db {
            if let Ok(Some(question)) = db.content().get_question(id).await {
                let mut questions = self.questions.write().await;
                questions.insert(id, question.clone());
                return Some(question);
            }
        }

        None
    }

    pub async fn save_question(&self, question: &Question) -> Result<()> {
        if let Some(ref db) = self.db {
            db.content()
                .upsert_question(question)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        let mut questions = self.questions.write().await;
        questions.insert(question.id, question.clone());
        Ok(())
    }

    pub async fn get_answer(&self, id: Uuid) -> Option<Answer> {
        {
            let answers = self.answers.read().await;
            if let Some(answer) = answers.get(&id) {
                return Some(answer.clone());
            }
        }

        if let Some(ref db) = self.db {
            if let Ok(Some(answer)) = db.content().get_answer(id).await {
                let mut answers = self.answers.write().await;
                answers.insert(id, answer.clone());
                return Some(answer);
            }
        }

        None
    }

    pub async fn save_answer(&self, answer: &Answer) -> Result<()> {
        if let Some(ref db) = self.db {
            db.content()
                .upsert_answer(answer)
                .await
                .map_err(|e| anyhow!(e))?;
        }

        let mut answers = self.answers.write().await;
        answers.insert(answer.id, answer.clone());
        Ok(())
    }

    /// All answers for a question, accepted first, then oldest first
    pub async fn answers_for_question(&self, question: Uuid) -> Vec<Answer> {
        if let Some(ref db) = self.db {
            if let Ok(from_db) = db.content().get_answers_for_question(question).await {
                let mut answers = self.answers.write().await;
                for answer in &from_db {
                    answers.entry(answer.id).or_insert_with(|| answer.clone());
                }
            }
        }

        let answers = self.answers.read().await;
        let mut result: Vec<Answer> = answers
            .values()
            .filter(|a| a.question == question)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.is_accepted
                .cmp(&a.is_accepted)
                .then(a.created_at.cmp(&b.created_at))
        });
        result
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}
