use log::info;
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::collection::{find_by_id, CollectionKind, Document};
use crate::error::SomanaError;
use crate::utils::Utils;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPodcast {
    pub podcast_name: Option<String>,
    pub podcast_category: Option<String>,
    pub audio_link: Option<String>,
    pub featured_image: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

pub struct Podcast;

impl Podcast {
    pub fn create(conn: &Connection, new_podcast: NewPodcast) -> Result<Document, SomanaError> {
        let author = Utils::required(new_podcast.author, "Author is required to upload a podcast.")?;
        let podcast_name = Utils::required(new_podcast.podcast_name, "Podcast must have a name.")?;
        let podcast_name = Utils::checked_length("Podcast name", &podcast_name, 1, 100)?;
        let audio_link =
            Utils::required(new_podcast.audio_link, "Podcast must have an audio link.")?;

        let now = Utils::now_timestamp();

        let id: i64 = conn.query_row(
            "INSERT INTO podcasts (podcast_name, podcast_category, audio_link, featured_image, language, description, author, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING id",
            params![
                podcast_name,
                Utils::trimmed(new_podcast.podcast_category),
                audio_link.trim(),
                Utils::trimmed(new_podcast.featured_image),
                Utils::trimmed(new_podcast.language),
                Utils::trimmed(new_podcast.description),
                author,
                now,
            ],
            |row| row.get(0),
        )?;

        info!("Created podcast {id}");

        find_by_id(conn, CollectionKind::Podcasts, id)?
            .ok_or_else(|| SomanaError::Error(format!("Podcast {id} missing after insert")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_podcast() {
        let conn = Database::open_in_memory().unwrap();
        let doc = Podcast::create(
            &conn,
            NewPodcast {
                podcast_name: Some("Weekly Notes".into()),
                podcast_category: Some("Tech".into()),
                audio_link: Some("https://cdn/p.mp3".into()),
                author: Some("u2".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(doc["_id"], 1);
        assert_eq!(doc["podcastName"], "Weekly Notes");
        assert_eq!(doc["podcastCategory"], "Tech");
        assert_eq!(doc["author"], "u2");
        assert_eq!(doc["likesCount"], 0);
    }

    #[test]
    fn test_missing_name() {
        let conn = Database::open_in_memory().unwrap();
        let err = Podcast::create(
            &conn,
            NewPodcast {
                audio_link: Some("https://cdn/p.mp3".into()),
                author: Some("u2".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Podcast must have a name.");
    }
}
