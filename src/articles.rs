use log::info;
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::collection::{find_by_id, CollectionKind, Document};
use crate::error::SomanaError;
use crate::utils::Utils;

const DEFAULT_GENRE: &str = "Blog";
const DEFAULT_FEATURED_IMAGE: &str = "default-blog.jpg";
const SLUG_PREFIX_CHARS: usize = 40;
const WORDS_PER_MINUTE: usize = 200;
const MAX_CONTENT_CHARS: usize = 200_000;

/// Body of a create-article request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub heading: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub file_links: Option<String>,
    pub collected_images: Option<Vec<String>>,
    /// Accepted as an alias for `collectedImages`
    pub images: Option<Vec<String>>,
    pub tags: Option<String>,
    pub genre: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "usedAI")]
    pub used_ai: Option<bool>,
    pub author: Option<String>,
}

/// A `NewArticle` that passed every rule, ready to insert
#[derive(Debug)]
struct ValidArticle {
    heading: String,
    description: String,
    content: Option<String>,
    featured_image: String,
    file_links: Option<String>,
    collected_images: Vec<String>,
    tags: String,
    genre: String,
    source: Option<String>,
    used_ai: bool,
    author: String,
}

impl NewArticle {
    fn validate(self) -> Result<ValidArticle, SomanaError> {
        let author = Utils::required(self.author, "Author is required to create a blog.")?;

        let collected_images = match (self.collected_images, self.images) {
            (Some(collected), _) => collected,
            (None, Some(images)) => images,
            (None, None) => Vec::new(),
        };

        let heading = Utils::required(self.heading, "Heading is required and must be a string.")?;
        let heading = Utils::checked_length("Heading", &heading, 10, 100)?;

        let description = Utils::required(
            self.description,
            "Description is required and must be a string.",
        )?;
        let description = Utils::checked_length("Description", &description, 20, 300)?;

        // Only an absent or empty genre gets the default; whitespace is too short
        let genre = match self.genre.as_deref() {
            None | Some("") => DEFAULT_GENRE.to_owned(),
            Some(genre) => Utils::checked_length("Genre", genre, 3, 50)?,
        };

        let tags = match Utils::trimmed(self.tags) {
            Some(tags) => Utils::checked_length("Tags", &tags, 2, 60)?,
            None => String::new(),
        };

        let source = match Utils::trimmed(self.source) {
            Some(source) => Some(Utils::checked_length("Source", &source, 3, 100)?),
            None => None,
        };

        if let Some(content) = &self.content {
            let len = content.chars().count();
            if len > MAX_CONTENT_CHARS {
                return Err(SomanaError::ValidationError(format!(
                    "Content must be less than {MAX_CONTENT_CHARS} characters. Current length: {len}"
                )));
            }
        }

        Ok(ValidArticle {
            heading,
            description,
            content: self.content,
            featured_image: Utils::trimmed(self.featured_image)
                .unwrap_or_else(|| DEFAULT_FEATURED_IMAGE.to_owned()),
            file_links: Utils::trimmed(self.file_links),
            collected_images,
            tags,
            genre,
            source,
            used_ai: self.used_ai.unwrap_or(false),
            author,
        })
    }
}

pub struct Article;

impl Article {
    /// Builds the URL slug for an article: heading words joined with `-`,
    /// lowercased and cut to 40 characters, then the id. Anything outside
    /// `[a-zA-Z0-9-]` is dropped.
    pub fn slug_for(heading: &str, id: i64) -> String {
        let joined = heading.trim().split(' ').collect::<Vec<_>>().join("-").to_lowercase();
        let prefix: String = joined.chars().take(SLUG_PREFIX_CHARS).collect();

        format!("{prefix}-{id}")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect()
    }

    /// Minutes to read `content` at 200 words per minute, rounded up
    pub fn read_time(content: Option<&str>) -> i64 {
        let words = content.map_or(0, |c| c.split_whitespace().count());
        words.div_ceil(WORDS_PER_MINUTE) as i64
    }

    /// Validates and stores a new article, returning the stored document
    pub fn create(conn: &mut Connection, new_article: NewArticle) -> Result<Document, SomanaError> {
        let article = new_article.validate()?;
        let now = Utils::now_timestamp();
        let read_time = Self::read_time(article.content.as_deref());
        let collected_images = serde_json::to_string(&article.collected_images)?;

        let tx = conn.transaction()?;

        let id: i64 = tx.query_row(
            "INSERT INTO articles (heading, description, content, featured_image, file_links, collected_images, tags, genre, source, used_ai, read_time, author, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
             RETURNING id",
            params![
                article.heading,
                article.description,
                article.content,
                article.featured_image,
                article.file_links,
                collected_images,
                article.tags,
                article.genre,
                article.source,
                article.used_ai,
                read_time,
                article.author,
                now,
            ],
            |row| row.get(0),
        )?;

        let slug = Self::slug_for(&article.heading, id);
        tx.execute("UPDATE articles SET slug = ?1 WHERE id = ?2", params![slug, id])
            .map_err(|e| {
                Utils::map_unique_violation(
                    e,
                    "A blog with this title already exists. Please use a different title.",
                )
            })?;

        tx.commit()?;

        info!("Created article {id} with slug '{slug}'");

        find_by_id(conn, CollectionKind::Articles, id)?
            .ok_or_else(|| SomanaError::Error(format!("Article {id} missing after insert")))
    }
}
