// src/store.rs

//! Persistence for quiz sets and admin accounts.
//!
//! Every query goes through the shared pool, so a write is visible to the
//! next read issued by any handler.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        admin::AdminUser,
        quiz_set::{QuizDraft, QuizSet, QuizSummary, StepIds},
    },
};

#[derive(Clone)]
pub struct QuizStore {
    pool: SqlitePool,
}

impl QuizStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts a new, active quiz set and returns its internal id.
    pub async fn create(&self, draft: &QuizDraft, ids: &StepIds) -> Result<i64, AppError> {
        let [q1, q2, q3] = &draft.questions;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quiz_sets (
                quiz_name,
                step_1_id, step_2_id, step_3_id, result_id,
                question_1_text, question_1_placeholder, question_1_answer,
                question_2_text, question_2_placeholder, question_2_answer,
                question_3_text, question_3_placeholder, question_3_answer,
                result_message, reward_link,
                timer_duration, require_answer, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, 1, $19)
            RETURNING id
            "#,
        )
        .bind(&draft.quiz_name)
        .bind(&ids.step_1_id)
        .bind(&ids.step_2_id)
        .bind(&ids.step_3_id)
        .bind(&ids.result_id)
        .bind(&q1.text)
        .bind(&q1.placeholder)
        .bind(&q1.answer)
        .bind(&q2.text)
        .bind(&q2.placeholder)
        .bind(&q2.answer)
        .bind(&q3.text)
        .bind(&q3.placeholder)
        .bind(&q3.answer)
        .bind(&draft.result_message)
        .bind(&draft.reward_link)
        .bind(draft.timer_duration)
        .bind(draft.require_answer)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz set: {:?}", e);
            AppError::from(e)
        })?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<QuizSet>, AppError> {
        let quiz = sqlx::query_as::<_, QuizSet>("SELECT * FROM quiz_sets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quiz)
    }

    /// All quiz sets, newest first.
    pub async fn list_all(&self) -> Result<Vec<QuizSet>, AppError> {
        let quizzes = sqlx::query_as::<_, QuizSet>(
            "SELECT * FROM quiz_sets ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    /// Summaries of published quiz sets, newest first.
    pub async fn list_active(&self) -> Result<Vec<QuizSummary>, AppError> {
        let quizzes = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT id, quiz_name, step_1_id, step_2_id, step_3_id, result_id,
                   is_active, created_at
            FROM quiz_sets
            WHERE is_active = 1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    /// Finds the active quiz set owning `step_id` in any of its four slots.
    pub async fn find_active_by_step_id(&self, step_id: &str) -> Result<Option<QuizSet>, AppError> {
        let quiz = sqlx::query_as::<_, QuizSet>(
            r#"
            SELECT * FROM quiz_sets
            WHERE (step_1_id = $1 OR step_2_id = $1 OR step_3_id = $1 OR result_id = $1)
              AND is_active = 1
            LIMIT 1
            "#,
        )
        .bind(step_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    /// Replaces the authored content of a quiz set. Step ids and creation
    /// time never change. Returns `false` when no row has this id.
    pub async fn update(&self, id: i64, draft: &QuizDraft) -> Result<bool, AppError> {
        let [q1, q2, q3] = &draft.questions;

        let result = sqlx::query(
            r#"
            UPDATE quiz_sets SET
                quiz_name = $1,
                question_1_text = $2, question_1_placeholder = $3, question_1_answer = $4,
                question_2_text = $5, question_2_placeholder = $6, question_2_answer = $7,
                question_3_text = $8, question_3_placeholder = $9, question_3_answer = $10,
                result_message = $11, reward_link = $12,
                timer_duration = $13, require_answer = $14,
                is_active = COALESCE($15, is_active)
            WHERE id = $16
            "#,
        )
        .bind(&draft.quiz_name)
        .bind(&q1.text)
        .bind(&q1.placeholder)
        .bind(&q1.answer)
        .bind(&q2.text)
        .bind(&q2.placeholder)
        .bind(&q2.answer)
        .bind(&q3.text)
        .bind(&q3.placeholder)
        .bind(&q3.answer)
        .bind(&draft.result_message)
        .bind(&draft.reward_link)
        .bind(draft.timer_duration)
        .bind(draft.require_answer)
        .bind(draft.is_active)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update quiz set {}: {:?}", id, e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Flips the publish flag and returns the new value, or `None` if absent.
    pub async fn toggle_active(&self, id: i64) -> Result<Option<bool>, AppError> {
        let is_active = sqlx::query_scalar::<_, bool>(
            "UPDATE quiz_sets SET is_active = NOT is_active WHERE id = $1 RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(is_active)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM quiz_sets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete quiz set {}: {:?}", id, e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminUser>, AppError> {
        let admin = sqlx::query_as::<_, AdminUser>(
            "SELECT id, username, password_hash, last_login, created_at FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn insert_admin(&self, username: &str, password_hash: &str) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO admin_users (username, password_hash, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn record_login(&self, admin_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE admin_users SET last_login = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(admin_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
