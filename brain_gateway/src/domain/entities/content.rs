use chrono::{DateTime, Utc};
use common::helper::error_chain_fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use typed_builder::TypedBuilder;
use uuid::Uuid;
use validator::validate_url;

/// Kind of content a user can capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Document,
    Tweet,
    Youtube,
    Link,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Document => "document",
            ContentType::Tweet => "tweet",
            ContentType::Youtube => "youtube",
            ContentType::Link => "link",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(ContentType::Document),
            "tweet" => Ok(ContentType::Tweet),
            "youtube" => Ok(ContentType::Youtube),
            "link" => Ok(ContentType::Link),
            _ => Err(format!("Invalid ContentType: {}", s)),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the vector index holds an entry for a content
///
/// A content is persisted as `Pending` and flipped to `Indexed` once its point
/// has been upserted. Pending contents are picked up by the index reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Pending,
    Indexed,
}

impl IndexStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStatus::Pending => "pending",
            IndexStatus::Indexed => "indexed",
        }
    }
}

impl FromStr for IndexStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IndexStatus::Pending),
            "indexed" => Ok(IndexStatus::Indexed),
            _ => Err(format!("Invalid IndexStatus: {}", s)),
        }
    }
}

/// A piece of content captured by a user
///
/// Serialized with the wire names used by the API: the body is exposed as `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[builder(default=Uuid::new_v4())]
    pub id: Uuid,

    pub owner_id: Uuid,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    pub title: String,

    #[serde(rename = "content")]
    pub body: String,

    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[builder(default)]
    #[serde(default)]
    pub tags: Vec<String>,

    #[builder(default=IndexStatus::Pending)]
    pub index_status: IndexStatus,

    #[builder(default=Utc::now())]
    pub created_at: DateTime<Utc>,

    #[builder(default=Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Text sent to the embeddings service for this content
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.title, &self.body)
    }
}

/// Builds the text that represents a content in the vector space.
///
/// The title comes first, followed by the body, separated by a single space.
/// The title is not repeated nor weighted: it only counts once, like any other word.
pub fn embedding_text(title: &str, body: &str) -> String {
    format!("{} {}", title, body)
}

/// Raw content submission, as received from a user
#[derive(Debug, Clone, Default)]
pub struct ContentSubmission {
    pub content_type: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A validated content submission, not persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewContent {
    pub content_type: ContentType,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub tags: Vec<String>,
}

impl NewContent {
    /// Validates every field of a submission
    ///
    /// All the invalid fields are reported at once, not only the first one.
    pub fn parse(submission: ContentSubmission) -> Result<NewContent, ContentValidationError> {
        let mut invalid_fields = vec![];

        let content_type = match submission.content_type.as_deref() {
            None => {
                invalid_fields.push(InvalidField::new("type", "is required"));
                None
            }
            Some(raw) => match ContentType::from_str(raw) {
                Ok(content_type) => Some(content_type),
                Err(_) => {
                    invalid_fields.push(InvalidField::new(
                        "type",
                        "must be one of: document, tweet, youtube, link",
                    ));
                    None
                }
            },
        };

        let title = non_empty_field("title", submission.title, &mut invalid_fields);
        let body = non_empty_field("content", submission.body, &mut invalid_fields);

        if let Some(link) = &submission.link {
            if !validate_url(link.as_str()) {
                invalid_fields.push(InvalidField::new("link", "must be a valid URL"));
            }
        }

        match (content_type, title, body) {
            (Some(content_type), Some(title), Some(body)) if invalid_fields.is_empty() => {
                Ok(NewContent {
                    content_type,
                    title,
                    body,
                    link: submission.link,
                    tags: submission.tags.unwrap_or_default(),
                })
            }
            _ => Err(ContentValidationError { invalid_fields }),
        }
    }

    pub fn embedding_text(&self) -> String {
        embedding_text(&self.title, &self.body)
    }

    /// Turns the validated submission into a content owned by `owner_id`
    ///
    /// The id and the timestamps are allocated here, right before persisting it.
    pub fn into_content_item(self, owner_id: Uuid) -> ContentItem {
        let now = Utc::now();

        ContentItem::builder()
            .owner_id(owner_id)
            .content_type(self.content_type)
            .title(self.title)
            .body(self.body)
            .link(self.link)
            .tags(self.tags)
            .created_at(now)
            .updated_at(now)
            .build()
    }
}

fn non_empty_field(
    name: &'static str,
    value: Option<String>,
    invalid_fields: &mut Vec<InvalidField>,
) -> Option<String> {
    match value {
        None => {
            invalid_fields.push(InvalidField::new(name, "is required"));
            None
        }
        Some(value) if value.trim().is_empty() => {
            invalid_fields.push(InvalidField::new(name, "must not be empty"));
            None
        }
        Some(value) => Some(value),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidField {
    pub field: &'static str,
    pub message: &'static str,
}

impl InvalidField {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl std::fmt::Display for InvalidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` {}", self.field, self.message)
    }
}

#[derive(thiserror::Error)]
#[error("Invalid content: {}", join_invalid_fields(.invalid_fields))]
pub struct ContentValidationError {
    pub invalid_fields: Vec<InvalidField>,
}

impl ContentValidationError {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.invalid_fields.iter().map(|f| f.field).collect()
    }
}

fn join_invalid_fields(invalid_fields: &[InvalidField]) -> String {
    invalid_fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Debug for ContentValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
