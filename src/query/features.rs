use rusqlite::ToSql;

use crate::collection::Collection;
use crate::config::QueryConfig;
use crate::error::SomanaError;

use super::columns::Field;
use super::filter::FilterExpression;
use super::list_query::ListQuery;
use super::order::SortSpec;
use super::pagination::PaginationSpec;
use super::projection::Projection;

/// Fluent builder turning a `ListQuery` into a `QueryDescriptor`.
///
/// Each step consumes the builder and returns it with that step's part
/// recorded. The parts are assembled in a fixed order (filter, sort,
/// projection, pagination) no matter the order the steps were called in. A
/// step that is never called contributes its default: no filter, newest
/// first, every attribute but `__v`, first page of the default size.
#[derive(Debug)]
pub struct QueryFeatures<'q> {
    collection: Collection,
    list_query: &'q ListQuery,
    options: QueryConfig,
    filter: Option<FilterExpression>,
    sort: Option<SortSpec>,
    projection: Option<Projection>,
    pagination: Option<PaginationSpec>,
}

impl<'q> QueryFeatures<'q> {
    pub fn new(collection: Collection, list_query: &'q ListQuery, options: QueryConfig) -> Self {
        QueryFeatures {
            collection,
            list_query,
            options,
            filter: None,
            sort: None,
            projection: None,
            pagination: None,
        }
    }

    pub fn filter(mut self) -> Result<Self, SomanaError> {
        self.filter = Some(FilterExpression::from_list_query(
            self.list_query,
            self.collection.field_set(),
            self.options.strict_fields,
        )?);
        Ok(self)
    }

    pub fn sort(mut self) -> Result<Self, SomanaError> {
        let field_set = self.collection.field_set();
        let parsed = match self.list_query.get_non_blank("sort") {
            Some(value) => Some(SortSpec::parse(value, field_set, self.options.strict_fields)?),
            None => None,
        };
        // A sort with no usable keys counts as no sort at all
        self.sort = Some(match parsed {
            Some(sort) if !sort.keys().is_empty() => sort,
            _ => SortSpec::default_for(field_set)?,
        });
        Ok(self)
    }

    pub fn limit_fields(mut self) -> Result<Self, SomanaError> {
        let field_set = self.collection.field_set();
        self.projection = Some(match self.list_query.get_non_blank("fields") {
            Some(value) => Projection::parse(value, field_set, self.options.strict_fields)?,
            None => Projection::default_for(field_set),
        });
        Ok(self)
    }

    pub fn paginate(mut self) -> Self {
        self.pagination = Some(PaginationSpec::parse(
            self.list_query.get("page"),
            self.list_query.get("limit"),
            self.options.default_limit,
        ));
        self
    }

    pub fn build(self) -> Result<QueryDescriptor, SomanaError> {
        let field_set = self.collection.field_set();

        let filter = self.filter.unwrap_or_default();
        let sort = match self.sort {
            Some(sort) => sort,
            None => SortSpec::default_for(field_set)?,
        };
        let projection = self
            .projection
            .unwrap_or_else(|| Projection::default_for(field_set));
        let pagination = self
            .pagination
            .unwrap_or_else(|| PaginationSpec::parse(None, None, self.options.default_limit));

        Ok(QueryDescriptor {
            collection: self.collection,
            filter,
            sort,
            projection,
            pagination,
        })
    }
}

/// Applies every step of `QueryFeatures` to a collection handle
pub fn build_query(
    collection: Collection,
    list_query: &ListQuery,
    options: QueryConfig,
) -> Result<QueryDescriptor, SomanaError> {
    QueryFeatures::new(collection, list_query, options)
        .filter()?
        .sort()?
        .limit_fields()?
        .paginate()
        .build()
}

/// A fully shaped, not yet executed query against one collection.
#[derive(Debug, Clone)]
pub struct QueryDescriptor {
    collection: Collection,
    filter: FilterExpression,
    sort: SortSpec,
    projection: Projection,
    pagination: PaginationSpec,
}

impl QueryDescriptor {
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Caps the page size. List endpoints apply this to client-supplied limits.
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.pagination = self.pagination.clamped(max_limit);
        self
    }

    /// The attributes each returned document carries, in schema order
    pub fn columns(&self) -> Vec<Field> {
        self.projection
            .resolve(self.collection.field_set(), self.collection.excluded())
    }

    /// Builds the SELECT statement and its bound parameters
    pub fn build_sql(&self) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError> {
        let columns = self.columns();
        let select_list = match columns.is_empty() {
            true => "NULL".to_string(),
            false => columns
                .iter()
                .map(|field| field.name_db())
                .collect::<Vec<_>>()
                .join(", "),
        };

        let (where_clause, params_vec) = self.filter.to_where_clause()?;

        let sql = format!(
            "SELECT {select_list}\nFROM {}{where_clause}{}\nLIMIT {}\nOFFSET {}",
            self.collection.table(),
            self.sort.to_order_clause(),
            self.pagination.limit(),
            self.pagination.skip(),
        );

        Ok((sql, params_vec))
    }

    /// Builds a statement counting every match, ignoring sort and pagination
    pub fn build_count_sql(&self) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError> {
        let (where_clause, params_vec) = self.filter.to_where_clause()?;
        let sql = format!(
            "SELECT COUNT(*)\nFROM {}{where_clause}",
            self.collection.table()
        );
        Ok((sql, params_vec))
    }

    /// Builds a statement summing an integer field over every match
    pub fn build_sum_sql(&self, field: Field) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError> {
        let (where_clause, params_vec) = self.filter.to_where_clause()?;
        let sql = format!(
            "SELECT COALESCE(SUM({}), 0)\nFROM {}{where_clause}",
            field.name_db(),
            self.collection.table()
        );
        Ok((sql, params_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionKind;
    use pretty_assertions::assert_eq;

    fn options() -> QueryConfig {
        QueryConfig::default()
    }

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        ListQuery::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_defaults_only() {
        let list_query = ListQuery::new();
        let descriptor = build_query(
            Collection::for_listing(CollectionKind::Articles),
            &list_query,
            options(),
        )
        .unwrap();

        let (sql, params) = descriptor.build_sql().unwrap();
        assert!(params.is_empty());
        assert!(sql.starts_with("SELECT id, slug, heading, description, featured_image"));
        assert!(!sql.contains("content"));
        assert!(!sql.contains("version"));
        assert!(sql.ends_with(
            "\nFROM articles\nORDER BY created_at DESC, id ASC\nLIMIT 100\nOFFSET 0"
        ));
    }

    #[test]
    fn test_full_pipeline_sql() {
        let list_query = query(&[
            ("genre", "Blog"),
            ("viewsCount[gte]", "100"),
            ("sort", "-heading"),
            ("fields", "heading,genre"),
            ("page", "2"),
            ("limit", "5"),
        ]);
        let descriptor = build_query(
            Collection::for_listing(CollectionKind::Articles),
            &list_query,
            options(),
        )
        .unwrap();

        let (sql, params) = descriptor.build_sql().unwrap();
        assert_eq!(
            sql,
            "SELECT id, heading, genre\nFROM articles\nWHERE (genre = ?) AND (views_count >= ?)\nORDER BY heading DESC, id ASC\nLIMIT 5\nOFFSET 5"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_call_order_does_not_matter() {
        let list_query = query(&[("genre", "Music"), ("sort", "heading"), ("limit", "3")]);
        let collection = Collection::for_listing(CollectionKind::Articles);

        let forward = QueryFeatures::new(collection.clone(), &list_query, options())
            .filter()
            .unwrap()
            .sort()
            .unwrap()
            .limit_fields()
            .unwrap()
            .paginate()
            .build()
            .unwrap();
        let backward = QueryFeatures::new(collection, &list_query, options())
            .paginate()
            .limit_fields()
            .unwrap()
            .sort()
            .unwrap()
            .filter()
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(forward.build_sql().unwrap().0, backward.build_sql().unwrap().0);
    }

    #[test]
    fn test_skipped_filter_step_ignores_filters() {
        let list_query = query(&[("genre", "Music")]);
        let descriptor = QueryFeatures::new(
            Collection::new(CollectionKind::Music),
            &list_query,
            options(),
        )
        .sort()
        .unwrap()
        .build()
        .unwrap();
        let (sql, params) = descriptor.build_sql().unwrap();
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_default_limit_from_options_and_clamp() {
        let mut opts = options();
        opts.default_limit = 10;
        let list_query = ListQuery::new();
        let descriptor = build_query(Collection::new(CollectionKind::Podcasts), &list_query, opts)
            .unwrap();
        assert!(descriptor.build_sql().unwrap().0.ends_with("\nLIMIT 10\nOFFSET 0"));

        let list_query = query(&[("limit", "50000")]);
        let descriptor = build_query(Collection::new(CollectionKind::Podcasts), &list_query, opts)
            .unwrap()
            .with_max_limit(1000);
        assert!(descriptor.build_sql().unwrap().0.ends_with("\nLIMIT 1000\nOFFSET 0"));
    }

    #[test]
    fn test_sort_without_keys_keeps_newest_first() {
        let default_order = "\nORDER BY created_at DESC, id ASC\n";
        for sort in [",", " , ,"] {
            let list_query = query(&[("sort", sort)]);
            let descriptor =
                build_query(Collection::new(CollectionKind::Articles), &list_query, options())
                    .unwrap();
            assert!(descriptor.build_sql().unwrap().0.contains(default_order), "sort={sort:?}");
        }

        let mut opts = options();
        opts.strict_fields = false;
        let list_query = query(&[("sort", "bogus")]);
        let descriptor =
            build_query(Collection::new(CollectionKind::Articles), &list_query, opts).unwrap();
        assert!(descriptor.build_sql().unwrap().0.contains(default_order));
    }

    #[test]
    fn test_count_sql_ignores_paging() {
        let list_query = query(&[("author", "u1"), ("page", "3")]);
        let descriptor =
            build_query(Collection::new(CollectionKind::Music), &list_query, options()).unwrap();
        let (sql, params) = descriptor.build_count_sql().unwrap();
        assert_eq!(sql, "SELECT COUNT(*)\nFROM music\nWHERE (author = ?)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_invalid_query_surfaces() {
        let list_query = query(&[("bogus", "1")]);
        let err = build_query(Collection::new(CollectionKind::Music), &list_query, options())
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
