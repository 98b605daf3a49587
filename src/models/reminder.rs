use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::models::user::UserResponse;

pub const MAX_TITLE_LEN: usize = 30;
pub const MAX_DESCRIPTION_LEN: usize = 100;

#[derive(Debug, Clone, FromRow)]
pub struct Reminder {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub remind_at: DateTime<Utc>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// 提醒与所属用户的联表行
#[derive(Debug, Clone, FromRow)]
pub struct ReminderWithOwner {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub remind_at: DateTime<Utc>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_username: String,
    pub owner_email: String,
    pub owner_created_at: DateTime<Utc>,
    pub owner_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub remind_at: DateTime<Utc>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl ReminderResponse {
    pub fn with_owner(reminder: Reminder, owner: UserResponse) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title,
            description: reminder.description,
            remind_at: reminder.remind_at,
            user_id: reminder.user_id,
            created_at: reminder.created_at,
            updated_at: reminder.updated_at,
            user: owner,
        }
    }
}

impl From<ReminderWithOwner> for ReminderResponse {
    fn from(row: ReminderWithOwner) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            remind_at: row.remind_at,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserResponse {
                id: row.user_id,
                username: row.owner_username,
                email: row.owner_email,
                created_at: row.owner_created_at,
                updated_at: row.owner_updated_at,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateReminderRequest {
    pub title: String,
    pub description: String,
    /// RFC 3339 时间字符串
    pub remind_at: String,
}

impl CreateReminderRequest {
    /// 校验标题、描述与提醒时间，返回解析后的 UTC 时间
    pub fn validate(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        let title_len = self.title.chars().count();
        if !(1..=MAX_TITLE_LEN).contains(&title_len) {
            return Err(AppError::validation(
                "Title must be between 1 and 30 characters.",
            ));
        }
        let description_len = self.description.chars().count();
        if !(1..=MAX_DESCRIPTION_LEN).contains(&description_len) {
            return Err(AppError::validation(
                "Description must be between 1 and 100 characters.",
            ));
        }

        let remind_at = DateTime::parse_from_rfc3339(self.remind_at.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(|_| AppError::validation("Invalid reminder time format."))?;

        if remind_at <= now {
            return Err(AppError::validation("Reminder time must be in the future."));
        }
        Ok(remind_at)
    }
}

/// 列表页签：active 为未到期，inactive 为已过期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTab {
    Active,
    Inactive,
}

impl ReminderTab {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            Some("active") => Ok(ReminderTab::Active),
            Some("inactive") => Ok(ReminderTab::Inactive),
            _ => Err(AppError::validation("Invalid tab value")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListRemindersQuery {
    pub tab: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResult {
    pub reminder: ReminderResponse,
}

#[derive(Debug, Serialize)]
pub struct RemindersResult {
    pub reminders: Vec<ReminderResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(title: &str, description: &str, remind_at: &str) -> CreateReminderRequest {
        CreateReminderRequest {
            title: title.to_string(),
            description: description.to_string(),
            remind_at: remind_at.to_string(),
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_reminder_parses_offset_to_utc() {
        let now = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let req = request("Dentist", "Bring insurance card", "2030-01-01T09:30:00+08:00");

        let at = req.validate(now).unwrap();
        assert_eq!(at.to_rfc3339(), "2030-01-01T01:30:00+00:00");
    }

    #[test]
    fn test_title_bounds() {
        let future = (Utc::now() + Duration::hours(1)).to_rfc3339();

        assert!(request(&"t".repeat(30), "d", &future).validate(Utc::now()).is_ok());
        assert_eq!(
            message(request("", "d", &future).validate(Utc::now()).unwrap_err()),
            "Title must be between 1 and 30 characters."
        );
        assert!(request(&"t".repeat(31), "d", &future)
            .validate(Utc::now())
            .is_err());
    }

    #[test]
    fn test_description_bounds() {
        let future = (Utc::now() + Duration::hours(1)).to_rfc3339();

        assert!(request("t", &"d".repeat(100), &future).validate(Utc::now()).is_ok());
        assert_eq!(
            message(request("t", "", &future).validate(Utc::now()).unwrap_err()),
            "Description must be between 1 and 100 characters."
        );
        assert!(request("t", &"d".repeat(101), &future)
            .validate(Utc::now())
            .is_err());
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let future = (Utc::now() + Duration::hours(1)).to_rfc3339();
        // 30 个汉字超过 30 字节，但按字符计数仍合法
        let title = "提".repeat(30);
        assert!(request(&title, "描述", &future).validate(Utc::now()).is_ok());
    }

    #[test]
    fn test_past_time_rejected_even_when_text_valid() {
        let past = (Utc::now() - Duration::minutes(1)).to_rfc3339();
        assert_eq!(
            message(request("t", "d", &past).validate(Utc::now()).unwrap_err()),
            "Reminder time must be in the future."
        );
    }

    #[test]
    fn test_time_equal_to_now_rejected() {
        let now = Utc::now();
        let req = request("t", "d", &now.to_rfc3339());
        assert!(req.validate(now).is_err());
    }

    #[test]
    fn test_unparseable_time_rejected() {
        assert_eq!(
            message(request("t", "d", "tomorrow").validate(Utc::now()).unwrap_err()),
            "Invalid reminder time format."
        );
    }

    #[test]
    fn test_tab_parsing() {
        assert_eq!(ReminderTab::parse(Some("active")).unwrap(), ReminderTab::Active);
        assert_eq!(
            ReminderTab::parse(Some("inactive")).unwrap(),
            ReminderTab::Inactive
        );
        assert!(ReminderTab::parse(Some("Active")).is_err());
        assert!(ReminderTab::parse(Some("")).is_err());
        assert!(ReminderTab::parse(None).is_err());
    }

    #[test]
    fn test_response_from_joined_row() {
        let now = Utc::now();
        let row = ReminderWithOwner {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            remind_at: now,
            user_id: 42,
            created_at: now,
            updated_at: now,
            owner_username: "alice".into(),
            owner_email: "alice@example.com".into(),
            owner_created_at: now,
            owner_updated_at: now,
        };
        let json = serde_json::to_value(ReminderResponse::from(row)).unwrap();

        assert_eq!(json["userId"], 42);
        assert_eq!(json["user"]["id"], 42);
        assert_eq!(json["user"]["username"], "alice");
        assert!(json.get("remindAt").is_some());
    }
}
