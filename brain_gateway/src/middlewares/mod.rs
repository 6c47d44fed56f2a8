pub mod jwt_authentication;
pub mod rate_limiting;
pub mod security_headers;
