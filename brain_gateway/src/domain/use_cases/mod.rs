pub mod delete_content;
pub mod ingest_content;
pub mod list_contents;
pub mod reindex_content;
pub mod search_content;

#[cfg(test)]
pub(crate) mod test_helpers;
