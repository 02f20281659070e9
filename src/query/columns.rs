use phf_macros::phf_ordered_map;

pub type FieldMap = phf::OrderedMap<&'static str, FieldSpec>;

/// Storage type of a field, which decides how filter values are bound and
/// how stored values are read back into documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Id,
    Int,
    Bool,
    String,
    /// RFC 3339 UTC text, so lexical order is chronological order
    Date,
    /// JSON array stored as text
    List,
}

impl FieldType {
    pub fn is_sortable(&self) -> bool {
        !matches!(self, FieldType::List)
    }
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name_db: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    const fn new(name_db: &'static str, field_type: FieldType) -> Self {
        FieldSpec {
            name_db,
            field_type,
        }
    }
}

/// Name of the identifier attribute every collection carries
pub const ID_FIELD: &str = "_id";
/// Name of the optimistic-concurrency version attribute
pub const VERSION_FIELD: &str = "__v";
/// Name of the creation timestamp used by the default sort
pub const CREATED_AT_FIELD: &str = "createdAt";

pub const ARTICLE_FIELDS: FieldMap = phf_ordered_map! {
    "_id" => FieldSpec::new("id", FieldType::Id),
    "slug" => FieldSpec::new("slug", FieldType::String),
    "heading" => FieldSpec::new("heading", FieldType::String),
    "description" => FieldSpec::new("description", FieldType::String),
    "content" => FieldSpec::new("content", FieldType::String),
    "featuredImage" => FieldSpec::new("featured_image", FieldType::String),
    "fileLinks" => FieldSpec::new("file_links", FieldType::String),
    "collectedImages" => FieldSpec::new("collected_images", FieldType::List),
    "tags" => FieldSpec::new("tags", FieldType::String),
    "genre" => FieldSpec::new("genre", FieldType::String),
    "source" => FieldSpec::new("source", FieldType::String),
    "usedAI" => FieldSpec::new("used_ai", FieldType::Bool),
    "readTime" => FieldSpec::new("read_time", FieldType::Int),
    "viewsCount" => FieldSpec::new("views_count", FieldType::Int),
    "likesCount" => FieldSpec::new("likes_count", FieldType::Int),
    "author" => FieldSpec::new("author", FieldType::String),
    "createdAt" => FieldSpec::new("created_at", FieldType::Date),
    "updatedAt" => FieldSpec::new("updated_at", FieldType::Date),
    "__v" => FieldSpec::new("version", FieldType::Int),
};

pub const MUSIC_FIELDS: FieldMap = phf_ordered_map! {
    "_id" => FieldSpec::new("id", FieldType::Id),
    "musicName" => FieldSpec::new("music_name", FieldType::String),
    "musicType" => FieldSpec::new("music_type", FieldType::String),
    "releaseDate" => FieldSpec::new("release_date", FieldType::String),
    "audioLink" => FieldSpec::new("audio_link", FieldType::String),
    "featuredImage" => FieldSpec::new("featured_image", FieldType::String),
    "credits" => FieldSpec::new("credits", FieldType::String),
    "album" => FieldSpec::new("album", FieldType::String),
    "songLang" => FieldSpec::new("song_lang", FieldType::String),
    "lyrics" => FieldSpec::new("lyrics", FieldType::String),
    "viewsCount" => FieldSpec::new("views_count", FieldType::Int),
    "likesCount" => FieldSpec::new("likes_count", FieldType::Int),
    "author" => FieldSpec::new("author", FieldType::String),
    "createdAt" => FieldSpec::new("created_at", FieldType::Date),
    "updatedAt" => FieldSpec::new("updated_at", FieldType::Date),
    "__v" => FieldSpec::new("version", FieldType::Int),
};

pub const PODCAST_FIELDS: FieldMap = phf_ordered_map! {
    "_id" => FieldSpec::new("id", FieldType::Id),
    "podcastName" => FieldSpec::new("podcast_name", FieldType::String),
    "podcastCategory" => FieldSpec::new("podcast_category", FieldType::String),
    "audioLink" => FieldSpec::new("audio_link", FieldType::String),
    "featuredImage" => FieldSpec::new("featured_image", FieldType::String),
    "language" => FieldSpec::new("language", FieldType::String),
    "description" => FieldSpec::new("description", FieldType::String),
    "viewsCount" => FieldSpec::new("views_count", FieldType::Int),
    "likesCount" => FieldSpec::new("likes_count", FieldType::Int),
    "author" => FieldSpec::new("author", FieldType::String),
    "createdAt" => FieldSpec::new("created_at", FieldType::Date),
    "updatedAt" => FieldSpec::new("updated_at", FieldType::Date),
    "__v" => FieldSpec::new("version", FieldType::Int),
};

/// A schema field: its API name plus its storage spec.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub spec: &'static FieldSpec,
}

impl Field {
    pub fn name_db(&self) -> &'static str {
        self.spec.name_db
    }

    pub fn field_type(&self) -> FieldType {
        self.spec.field_type
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Copy, Clone)]
pub struct FieldSet {
    field_map: &'static FieldMap,
}

impl FieldSet {
    pub fn new(field_map: &'static FieldMap) -> Self {
        FieldSet { field_map }
    }

    pub fn get(&self, name: &str) -> Option<Field> {
        self.field_map
            .get_entry(name)
            .map(|(name, spec)| Field { name: *name, spec })
    }

    /// Fields in schema order
    pub fn fields(&self) -> impl Iterator<Item = Field> {
        let field_map: &'static FieldMap = self.field_map;
        field_map
            .entries()
            .map(|(name, spec)| Field { name: *name, spec })
    }
}
