pub mod content_point_repository;
pub mod content_repository;
pub mod embedding_service;
pub mod user_repository;
