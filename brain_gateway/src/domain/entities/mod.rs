pub mod content;
pub mod content_point;
pub mod user;
pub mod user_email;
pub mod user_password;
