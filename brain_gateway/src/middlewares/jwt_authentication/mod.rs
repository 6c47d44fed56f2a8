mod middleware;

pub use middleware::{AuthenticationError, AuthMiddleware, RequireAuth, UserIdFromToken};
