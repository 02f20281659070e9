pub const SCHEMA_VERSION: &str = "1";

pub const CREATE_SCHEMA_SQL: &str = r#"
BEGIN TRANSACTION;

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', '1');

CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slug TEXT UNIQUE,
    heading TEXT NOT NULL,
    description TEXT NOT NULL,
    content TEXT,
    featured_image TEXT NOT NULL DEFAULT 'default-blog.jpg',
    file_links TEXT,
    collected_images TEXT NOT NULL DEFAULT '[]', -- JSON array of image URLs
    tags TEXT NOT NULL DEFAULT '',
    genre TEXT,
    source TEXT,
    used_ai INTEGER NOT NULL DEFAULT 0,
    read_time INTEGER NOT NULL DEFAULT 0,
    views_count INTEGER NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    author TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC 3339 UTC, millisecond precision
    updated_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_articles_created ON articles (created_at);
CREATE INDEX IF NOT EXISTS idx_articles_genre ON articles (genre);
CREATE INDEX IF NOT EXISTS idx_articles_author ON articles (author);

CREATE TABLE IF NOT EXISTS music (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    music_name TEXT NOT NULL,
    music_type TEXT,
    release_date TEXT,
    audio_link TEXT NOT NULL,
    featured_image TEXT,
    credits TEXT,
    album TEXT,
    song_lang TEXT,
    lyrics TEXT,
    views_count INTEGER NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    author TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_music_created ON music (created_at);
CREATE INDEX IF NOT EXISTS idx_music_author ON music (author);

CREATE TABLE IF NOT EXISTS podcasts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    podcast_name TEXT NOT NULL,
    podcast_category TEXT,
    audio_link TEXT NOT NULL,
    featured_image TEXT,
    language TEXT,
    description TEXT,
    views_count INTEGER NOT NULL DEFAULT 0,
    likes_count INTEGER NOT NULL DEFAULT 0,
    author TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_podcasts_created ON podcasts (created_at);
CREATE INDEX IF NOT EXISTS idx_podcasts_author ON podcasts (author);

COMMIT;
"#;
