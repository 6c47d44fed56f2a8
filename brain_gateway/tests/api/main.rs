mod content;
mod create_account;
mod health_check;
mod log_in_account;
mod protections;
mod search_content;
mod sign_in_account;
