pub mod hashing_embedding;
pub mod openai_embedding;
