pub mod authentication_jwt_repository;
pub mod content_in_memory_repository;
pub mod content_point_in_memory_repository;
pub mod content_point_qdrant_repository;
pub mod content_postgres_repository;
pub mod user_in_memory_repository;
pub mod user_postgres_repository;
