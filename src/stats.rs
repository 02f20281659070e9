use rusqlite::Connection;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::collection::{Collection, CollectionKind};
use crate::config::QueryConfig;
use crate::error::SomanaError;
use crate::query::{build_query, ListQuery};

/// A number alongside its compact display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatValue {
    pub raw: i64,
    pub formatted: String,
}

impl StatValue {
    pub fn new(raw: i64) -> Self {
        StatValue {
            raw,
            formatted: format_number(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStats {
    pub author: String,
    pub blogs: StatValue,
    pub music: StatValue,
    pub podcasts: StatValue,
    pub total_stories: StatValue,
    pub total_plays: StatValue,
}

/// Formats with a `K` or `M` suffix and one decimal, dropping a trailing
/// `.0`: 12500 is "12.5K", 1000000 is "1M".
pub fn format_number(num: i64) -> String {
    let (scaled, suffix) = if num >= 1_000_000 {
        (num as f64 / 1_000_000.0, "M")
    } else if num >= 1_000 {
        (num as f64 / 1_000.0, "K")
    } else {
        return num.to_string();
    };

    let fixed = format!("{scaled:.1}");
    let trimmed = fixed.strip_suffix(".0").unwrap_or(&fixed);
    format!("{trimmed}{suffix}")
}

impl AuthorStats {
    /// Counts an author's records and sums their views across every collection
    pub fn for_author(conn: &Connection, author: &str) -> Result<Self, SomanaError> {
        // The keyed operator keeps an author like `ne:x` a literal match
        let list_query = ListQuery::from_pairs([("author[eq]", author)]);

        let mut counts = Vec::new();
        let mut total_plays = 0;

        for kind in CollectionKind::iter() {
            let descriptor =
                build_query(Collection::new(kind), &list_query, QueryConfig::default())?;
            counts.push(descriptor.count_matching(conn)?);
            total_plays += descriptor.sum(conn, "viewsCount")?;
        }

        let &[blogs, music, podcasts] = counts.as_slice() else {
            return Err(SomanaError::Error("Unexpected collection count".to_string()));
        };

        Ok(AuthorStats {
            author: author.to_owned(),
            blogs: StatValue::new(blogs),
            music: StatValue::new(music),
            podcasts: StatValue::new(podcasts),
            total_stories: StatValue::new(blogs + music + podcasts),
            total_plays: StatValue::new(total_plays),
        })
    }
}
