pub mod reminder;
pub mod response;
pub mod user;
