pub mod password;
pub mod reminder_service;
pub mod schema;
pub mod token;
pub mod user_service;
