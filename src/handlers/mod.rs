pub mod auth_handler;
pub mod reminder_handler;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::error::AppError;

/// 把 Json 提取失败转成统一的 400 信封
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

/// 查询串同理
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reminder::ListRemindersQuery;
    use axum::http::{StatusCode, Uri};
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    fn parse(uri: &'static str) -> Result<ListRemindersQuery, AppError> {
        query_params(Query::try_from_uri(&Uri::from_static(uri)))
    }

    #[test]
    fn test_query_params_ok() {
        let query = parse("/api/reminders?tab=active").unwrap();
        assert_eq!(query.tab.as_deref(), Some("active"));
        assert!(parse("/api/reminders").unwrap().tab.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_query_field_renders_envelope() {
        let err = parse("/api/reminders?tab=active&tab=inactive").unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("duplicate field"));
    }
}
