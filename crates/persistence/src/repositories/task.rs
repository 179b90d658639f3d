//! Repository for task database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TaskEntity;
use crate::metrics::QueryTimer;

/// Repository for task operations. All reads and writes are scoped to the
/// owning user.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Creates a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new task for the given owner.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: i16,
        due_date: Option<DateTime<Utc>>,
        category: Option<&str>,
    ) -> Result<TaskEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_task");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            INSERT INTO tasks (owner_id, title, description, status, priority, due_date, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, title, description, status, priority, due_date, category,
                      created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(category)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finds a task by ID, scoped to its owner.
    ///
    /// Returns `None` when the task does not exist or belongs to another
    /// user, so callers cannot distinguish the two.
    pub async fn find_by_id(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_id");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, category,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Finds a task by ID without owner scoping. Administrator use only.
    pub async fn find_by_id_any(&self, task_id: Uuid) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_task_by_id_any");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, category,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists all tasks, optionally filtered by owner. Administrator use only.
    pub async fn list_all(
        &self,
        owner_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_tasks");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, category,
                   created_at, updated_at
            FROM tasks
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists a user's tasks, newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_tasks");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT id, owner_id, title, description, status, priority, due_date, category,
                   created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rewrites a task's mutable columns, scoped to its owner.
    ///
    /// The caller merges requested changes into the current row first.
    /// Returns the updated task, or `None` if no owned task matched.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: i16,
        due_date: Option<DateTime<Utc>>,
        category: Option<&str>,
    ) -> Result<Option<TaskEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_task");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            UPDATE tasks
            SET title = $3, description = $4, status = $5, priority = $6,
                due_date = $7, category = $8, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, status, priority, due_date, category,
                      created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(category)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes a task, scoped to its owner.
    ///
    /// Returns true if a task was deleted.
    pub async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_task");
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
