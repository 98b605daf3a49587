use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::handlers::{json_body, query_params};
use crate::models::reminder::{
    CreateReminderRequest, ListRemindersQuery, ReminderResponse, ReminderResult, ReminderTab,
    RemindersResult,
};
use crate::models::response::ApiResponse;
use crate::models::user::CurrentUser;
use crate::services::reminder_service;
use crate::AppState;

/// 1. 创建提醒
pub async fn create_reminder(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<CreateReminderRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReminderResult>>)> {
    let payload = json_body(payload)?;
    let remind_at = payload.validate(Utc::now())?;

    let reminder = reminder_service::create_reminder(
        &state.db,
        user.id,
        &payload.title,
        &payload.description,
        remind_at,
    )
    .await?;

    tracing::info!(
        "<<< 提醒创建成功: id={}, user_id={}, remind_at={}",
        reminder.id,
        user.id,
        reminder.remind_at
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReminderResult {
            reminder: ReminderResponse::with_owner(reminder, user),
        })),
    ))
}

/// 2. 按页签获取当前用户的提醒列表
pub async fn list_reminders(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    query: Result<Query<ListRemindersQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<RemindersResult>>> {
    let query = query_params(query)?;
    let tab = ReminderTab::parse(query.tab.as_deref())?;

    let rows = reminder_service::list_reminders(&state.db, user.id, tab, Utc::now()).await?;
    let reminders = rows.into_iter().map(ReminderResponse::from).collect();

    Ok(Json(ApiResponse::success(RemindersResult { reminders })))
}

/// 3. 删除提醒（仅限本人）
pub async fn delete_reminder(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let id: i64 = id
        .parse()
        .map_err(|_| AppError::validation("Invalid reminder ID."))?;

    reminder_service::delete_owned_reminder(&state.db, id, user.id).await?;

    tracing::info!("提醒已删除: id={}, user_id={}", id, user.id);
    Ok(Json(ApiResponse::message("Reminder deleted successfully.")))
}
