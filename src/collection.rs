use log::{debug, Level};
use logging_timer::timer;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::QueryConfig;
use crate::error::SomanaError;
use crate::query::columns::{
    Field, FieldSet, FieldType, ARTICLE_FIELDS, ID_FIELD, MUSIC_FIELDS, PODCAST_FIELDS,
};
use crate::query::{build_query, ListQuery, QueryDescriptor};

/// One stored record, keyed by API field name
pub type Document = Map<String, Value>;

#[derive(AsRefStr, EnumIter, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "lowercase")]
pub enum CollectionKind {
    Articles,
    Music,
    Podcasts,
}

impl CollectionKind {
    pub fn table(&self) -> &'static str {
        match self {
            CollectionKind::Articles => "articles",
            CollectionKind::Music => "music",
            CollectionKind::Podcasts => "podcasts",
        }
    }

    pub fn field_set(&self) -> FieldSet {
        match self {
            CollectionKind::Articles => FieldSet::new(&ARTICLE_FIELDS),
            CollectionKind::Music => FieldSet::new(&MUSIC_FIELDS),
            CollectionKind::Podcasts => FieldSet::new(&PODCAST_FIELDS),
        }
    }

    /// Large body fields list endpoints never return
    pub fn list_exclusions(&self) -> &'static [&'static str] {
        match self {
            CollectionKind::Articles => &["content"],
            CollectionKind::Music => &["lyrics"],
            CollectionKind::Podcasts => &[],
        }
    }

    /// Key the documents are returned under in response envelopes
    pub fn data_key(&self) -> &'static str {
        match self {
            CollectionKind::Articles => "blogs",
            CollectionKind::Music => "music",
            CollectionKind::Podcasts => "podcasts",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CollectionKind::Articles => "Blogs",
            CollectionKind::Music => "Music",
            CollectionKind::Podcasts => "Podcasts",
        }
    }
}

/// A retrievable-collection handle: which collection, and which attributes
/// no query through this handle may return.
#[derive(Debug, Clone)]
pub struct Collection {
    kind: CollectionKind,
    excluded: Vec<&'static str>,
}

impl Collection {
    pub fn new(kind: CollectionKind) -> Self {
        Collection {
            kind,
            excluded: Vec::new(),
        }
    }

    /// The handle list endpoints start from
    pub fn for_listing(kind: CollectionKind) -> Self {
        let mut collection = Self::new(kind);
        collection.excluded.extend_from_slice(kind.list_exclusions());
        collection
    }

    pub fn table(&self) -> &'static str {
        self.kind.table()
    }

    pub fn field_set(&self) -> FieldSet {
        self.kind.field_set()
    }

    pub fn excluded(&self) -> &[&'static str] {
        &self.excluded
    }
}

impl QueryDescriptor {
    /// Runs the query, returning documents in sort order
    pub fn execute(&self, conn: &Connection) -> Result<Vec<Document>, SomanaError> {
        let _tmr = timer!(Level::Debug; "QueryDescriptor::execute", "{}", self.collection().table());

        let (sql, params_vec) = self.build_sql()?;
        debug!("List query: {}", sql.replace('\n', " "));

        let columns = self.columns();
        let sql_params: Vec<&dyn ToSql> = params_vec.iter().map(|b| &**b).collect();
        let mut sql_statement = conn.prepare(&sql)?;

        let documents = sql_statement
            .query_map(&sql_params[..], |row| read_document(row, &columns))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(documents)
    }

    /// Counts every matching record, ignoring pagination
    pub fn count_matching(&self, conn: &Connection) -> Result<i64, SomanaError> {
        let (sql, params_vec) = self.build_count_sql()?;
        let sql_params: Vec<&dyn ToSql> = params_vec.iter().map(|b| &**b).collect();
        let count = conn.query_row(&sql, &sql_params[..], |row| row.get(0))?;
        Ok(count)
    }

    /// Sums an integer field over every matching record
    pub fn sum(&self, conn: &Connection, field_name: &str) -> Result<i64, SomanaError> {
        let field = self
            .collection()
            .field_set()
            .get(field_name)
            .filter(|f| matches!(f.field_type(), FieldType::Int))
            .ok_or_else(|| {
                SomanaError::InvalidQuery(format!("Cannot sum field '{field_name}'"))
            })?;

        let (sql, params_vec) = self.build_sum_sql(field)?;
        let sql_params: Vec<&dyn ToSql> = params_vec.iter().map(|b| &**b).collect();
        let total = conn.query_row(&sql, &sql_params[..], |row| row.get(0))?;
        Ok(total)
    }
}

fn read_document(row: &Row, columns: &[Field]) -> Result<Document, rusqlite::Error> {
    let mut document = Document::new();

    for (idx, field) in columns.iter().enumerate() {
        let value = match field.field_type() {
            FieldType::Id | FieldType::Int => row
                .get::<_, Option<i64>>(idx)?
                .map(Value::from)
                .unwrap_or(Value::Null),
            FieldType::Bool => row
                .get::<_, Option<i64>>(idx)?
                .map(|v| Value::Bool(v != 0))
                .unwrap_or(Value::Null),
            FieldType::String | FieldType::Date => row
                .get::<_, Option<String>>(idx)?
                .map(Value::String)
                .unwrap_or(Value::Null),
            FieldType::List => match row.get::<_, Option<String>>(idx)? {
                Some(text) => serde_json::from_str(&text).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
                })?,
                None => Value::Array(Vec::new()),
            },
        };
        document.insert(field.name.to_string(), value);
    }

    Ok(document)
}

/// Runs a list request against one collection: the listing handle, every
/// `QueryFeatures` step, and the configured ceiling on page size.
pub fn list_documents(
    conn: &Connection,
    kind: CollectionKind,
    list_query: &ListQuery,
    options: &QueryConfig,
) -> Result<Vec<Document>, SomanaError> {
    let descriptor = build_query(Collection::for_listing(kind), list_query, *options)?
        .with_max_limit(options.max_limit);
    descriptor.execute(conn)
}

/// Fetches one full record by its identifier
pub fn find_by_id(
    conn: &Connection,
    kind: CollectionKind,
    id: i64,
) -> Result<Option<Document>, SomanaError> {
    let list_query = ListQuery::from_pairs([(ID_FIELD.to_string(), id.to_string())]);
    let descriptor = build_query(Collection::new(kind), &list_query, QueryConfig::default())?;
    Ok(descriptor.execute(conn)?.into_iter().next())
}
