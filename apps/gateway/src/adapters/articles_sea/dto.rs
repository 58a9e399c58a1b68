//! DTOs for articles_sea adapter.

use uuid::Uuid;

/// DTO for creating a new article.
#[derive(Debug, Clone)]
pub struct ArticleCreate {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

impl ArticleCreate {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author_id: Uuid) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_id,
        }
    }
}

/// DTO for updating an existing article. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}
