use log::info;
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::collection::{find_by_id, CollectionKind, Document};
use crate::error::SomanaError;
use crate::utils::Utils;

/// Body of an upload-music request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMusic {
    pub music_name: Option<String>,
    pub music_type: Option<String>,
    pub release_date: Option<String>,
    pub audio_link: Option<String>,
    pub featured_image: Option<String>,
    pub credits: Option<String>,
    pub album: Option<String>,
    pub song_lang: Option<String>,
    pub lyrics: Option<String>,
    pub author: Option<String>,
}

pub struct Music;

impl Music {
    pub fn create(conn: &Connection, new_music: NewMusic) -> Result<Document, SomanaError> {
        let author = Utils::required(new_music.author, "Author is required to upload music.")?;
        let music_name = Utils::required(new_music.music_name, "Music must have a name.")?;
        let music_name = Utils::checked_length("Music name", &music_name, 1, 100)?;
        let audio_link = Utils::required(new_music.audio_link, "Music must have an audio link.")?;

        let now = Utils::now_timestamp();

        let id: i64 = conn.query_row(
            "INSERT INTO music (music_name, music_type, release_date, audio_link, featured_image, credits, album, song_lang, lyrics, author, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             RETURNING id",
            params![
                music_name,
                Utils::trimmed(new_music.music_type),
                Utils::trimmed(new_music.release_date),
                audio_link.trim(),
                Utils::trimmed(new_music.featured_image),
                Utils::trimmed(new_music.credits),
                Utils::trimmed(new_music.album),
                Utils::trimmed(new_music.song_lang),
                new_music.lyrics,
                author,
                now,
            ],
            |row| row.get(0),
        )?;

        info!("Created music {id}");

        find_by_id(conn, CollectionKind::Music, id)?
            .ok_or_else(|| SomanaError::Error(format!("Music {id} missing after insert")))
    }
}
