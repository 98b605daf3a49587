use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::reminder::{Reminder, ReminderTab, ReminderWithOwner};

const REMINDER_COLUMNS: &str =
    "id, title, description, remind_at, user_id, created_at, updated_at, deleted_at";

pub async fn create_reminder(
    pool: &PgPool,
    owner_id: i64,
    title: &str,
    description: &str,
    remind_at: DateTime<Utc>,
) -> Result<Reminder, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "INSERT INTO reminders (title, description, remind_at, user_id)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        REMINDER_COLUMNS
    ))
    .bind(title)
    .bind(description)
    .bind(remind_at)
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

/// 按页签列出某用户的提醒，连同所属用户信息
pub async fn list_reminders(
    pool: &PgPool,
    owner_id: i64,
    tab: ReminderTab,
    now: DateTime<Utc>,
) -> Result<Vec<ReminderWithOwner>, sqlx::Error> {
    let (comparison, order) = match tab {
        ReminderTab::Active => (">", "ASC"),
        ReminderTab::Inactive => ("<", "DESC"),
    };

    sqlx::query_as::<_, ReminderWithOwner>(&format!(
        r#"SELECT r.id, r.title, r.description, r.remind_at, r.user_id,
                  r.created_at, r.updated_at,
                  u.username AS owner_username, u.email AS owner_email,
                  u.created_at AS owner_created_at, u.updated_at AS owner_updated_at
           FROM reminders r
           JOIN users u ON u.id = r.user_id
           WHERE r.user_id = $1 AND r.remind_at {} $2 AND r.deleted_at IS NULL
           ORDER BY r.remind_at {}, r.id"#,
        comparison, order
    ))
    .bind(owner_id)
    .bind(now)
    .fetch_all(pool)
    .await
}

pub async fn find_reminder(pool: &PgPool, id: i64) -> Result<Option<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {} FROM reminders WHERE id = $1 AND deleted_at IS NULL",
        REMINDER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// 只取一次记录：不存在返回 404，非本人返回 403，否则物理删除
pub async fn delete_owned_reminder(pool: &PgPool, id: i64, caller_id: i64) -> AppResult<()> {
    let reminder = find_reminder(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reminder not found.".to_string()))?;

    if reminder.user_id != caller_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this reminder.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
        .bind(reminder.id)
        .bind(caller_id)
        .execute(pool)
        .await?;
    Ok(())
}
