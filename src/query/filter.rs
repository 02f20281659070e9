use std::fmt::Debug;
use std::str::FromStr;

use rusqlite::ToSql;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::SomanaError;

use super::columns::{Field, FieldSet, FieldType};
use super::list_query::ListQuery;

/// Defines the behavior of a filter.
pub trait Filter: Debug {
    /// return predicate text and params
    fn to_predicate_parts(&self) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError>;
}

/// Comparison operators a filter value may carry. Declaration order is match
/// order: the first operator whose token matches wins.
#[derive(AsRefStr, EnumIter, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "lowercase")]
pub enum CompareOp {
    Gte,
    Gt,
    Lte,
    Lt,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Gte => ">=",
            CompareOp::Gt => ">",
            CompareOp::Lte => "<=",
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
        }
    }

    /// Splits an `op:value` filter value. A value without a recognized
    /// operator prefix is a literal equality match.
    pub fn split_value(value: &str) -> (CompareOp, &str) {
        CompareOp::iter()
            .find_map(|op| {
                value
                    .strip_prefix(op.as_ref())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .map(|rest| (op, rest))
            })
            .unwrap_or((CompareOp::Eq, value))
    }

    /// Splits a `field[op]` filter key into the field name and its operator
    fn split_key(key: &str) -> Result<(&str, Option<CompareOp>), SomanaError> {
        let Some(open) = key.find('[') else {
            return Ok((key, None));
        };

        let Some(token) = key[open + 1..].strip_suffix(']') else {
            return Ok((key, None));
        };

        let name = &key[..open];
        if name.is_empty() {
            return Err(SomanaError::InvalidQuery(format!(
                "Missing field name in '{key}'"
            )));
        }

        let op = CompareOp::from_str(token).map_err(|_| {
            SomanaError::InvalidQuery(format!("Unknown operator '{token}' in '{key}'"))
        })?;

        Ok((name, Some(op)))
    }
}

/// The attribute a clause constrains
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTarget {
    Field(Field),
    /// A name the schema does not know, kept when unknown fields are tolerated
    Missing(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub target: FilterTarget,
    pub op: CompareOp,
    pub value: String,
}

impl FilterClause {
    fn bind_value(field: &Field, value: &str) -> Result<Box<dyn ToSql>, SomanaError> {
        let cast_error = |type_name: &str| {
            SomanaError::InvalidQuery(format!(
                "Cannot use '{}' as {} for field '{}'",
                value, type_name, field.name
            ))
        };

        if value.is_empty() {
            return Ok(Box::new(String::new()));
        }

        let bound: Box<dyn ToSql> = match field.field_type() {
            FieldType::Id | FieldType::Int => {
                let n: i64 = value.trim().parse().map_err(|_| cast_error("a number"))?;
                Box::new(n)
            }
            FieldType::Bool => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Box::new(1i64),
                "false" | "0" => Box::new(0i64),
                _ => return Err(cast_error("a boolean")),
            },
            FieldType::String | FieldType::Date | FieldType::List => Box::new(value.to_owned()),
        };

        Ok(bound)
    }
}

impl Filter for FilterClause {
    fn to_predicate_parts(&self) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError> {
        let field = match &self.target {
            FilterTarget::Field(field) => field,
            // A missing attribute equals nothing, so only `ne` can hold
            FilterTarget::Missing(_) => {
                let pred_str = match self.op {
                    CompareOp::Ne => "(1 = 1)",
                    _ => "(1 = 0)",
                };
                return Ok((pred_str.to_owned(), Vec::new()));
            }
        };

        let col = field.name_db();
        let pred_vec = vec![Self::bind_value(field, &self.value)?];

        let pred_str = match (field.field_type(), self.op) {
            (FieldType::List, CompareOp::Ne) => format!(
                "(NOT EXISTS (SELECT 1 FROM json_each({col}) WHERE json_each.value = ?))"
            ),
            (FieldType::List, op) => format!(
                "(EXISTS (SELECT 1 FROM json_each({col}) WHERE json_each.value {} ?))",
                op.sql()
            ),
            (_, CompareOp::Ne) => format!("({col} IS NULL OR {col} != ?)"),
            (_, op) => format!("({col} {} ?)", op.sql()),
        };

        Ok((pred_str, pred_vec))
    }
}

/// The filter part of a list query: every non-reserved entry as a clause,
/// all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    clauses: Vec<FilterClause>,
}

impl FilterExpression {
    pub fn from_list_query(
        list_query: &ListQuery,
        field_set: FieldSet,
        strict_fields: bool,
    ) -> Result<Self, SomanaError> {
        let mut clauses = Vec::new();

        for (key, value) in list_query.filter_entries() {
            let (name, key_op) = CompareOp::split_key(key)?;
            // `page[gte]` and friends steer the query; they never filter
            if ListQuery::is_reserved(name) {
                continue;
            }

            let (op, value) = match key_op {
                Some(op) => (op, value),
                None => CompareOp::split_value(value),
            };

            let target = match field_set.get(name) {
                Some(field) => FilterTarget::Field(field),
                None if strict_fields => {
                    return Err(SomanaError::InvalidQuery(format!(
                        "Unknown filter field '{name}'"
                    )))
                }
                None => FilterTarget::Missing(name.to_owned()),
            };

            clauses.push(FilterClause {
                target,
                op,
                value: value.to_owned(),
            });
        }

        Ok(FilterExpression { clauses })
    }

    pub fn to_where_clause(&self) -> Result<(String, Vec<Box<dyn ToSql>>), SomanaError> {
        let mut where_clause = String::new();
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if self.clauses.is_empty() {
            return Ok((where_clause, params_vec));
        }

        where_clause.push_str("\nWHERE ");
        let mut first = true;
        for clause in &self.clauses {
            match first {
                true => first = false,
                false => where_clause.push_str(" AND "),
            }
            let (pred_str, pred_vec) = clause.to_predicate_parts()?;
            where_clause.push_str(&pred_str);
            params_vec.extend(pred_vec);
        }

        Ok((where_clause, params_vec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::columns::ARTICLE_FIELDS;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn articles() -> FieldSet {
        FieldSet::new(&ARTICLE_FIELDS)
    }

    fn field_name(clause: &FilterClause) -> &str {
        match &clause.target {
            FilterTarget::Field(field) => field.name,
            FilterTarget::Missing(name) => name,
        }
    }

    fn build(pairs: &[(&str, &str)], strict: bool) -> Result<FilterExpression, SomanaError> {
        FilterExpression::from_list_query(
            &ListQuery::from_pairs(pairs.iter().copied()),
            articles(),
            strict,
        )
    }

    #[test]
    fn test_split_value_operators() {
        assert_eq!(CompareOp::split_value("gte:100"), (CompareOp::Gte, "100"));
        assert_eq!(CompareOp::split_value("gt:100"), (CompareOp::Gt, "100"));
        assert_eq!(CompareOp::split_value("lte:5"), (CompareOp::Lte, "5"));
        assert_eq!(CompareOp::split_value("lt:5"), (CompareOp::Lt, "5"));
        assert_eq!(CompareOp::split_value("ne:Blog"), (CompareOp::Ne, "Blog"));
        assert_eq!(CompareOp::split_value("eq:gte:1"), (CompareOp::Eq, "gte:1"));
    }

    #[test]
    fn test_split_value_literals() {
        assert_eq!(CompareOp::split_value("Music"), (CompareOp::Eq, "Music"));
        assert_eq!(CompareOp::split_value(""), (CompareOp::Eq, ""));
        // Operator words without the separator are plain text
        assert_eq!(CompareOp::split_value("gtexample"), (CompareOp::Eq, "gtexample"));
        assert_eq!(CompareOp::split_value("GTE:1"), (CompareOp::Eq, "GTE:1"));
    }

    #[test]
    fn test_split_key() {
        assert_eq!(
            CompareOp::split_key("viewsCount[gte]").unwrap(),
            ("viewsCount", Some(CompareOp::Gte))
        );
        assert_eq!(CompareOp::split_key("genre").unwrap(), ("genre", None));
        assert_eq!(CompareOp::split_key("odd[").unwrap(), ("odd[", None));
        assert!(CompareOp::split_key("viewsCount[between]").is_err());
        assert!(CompareOp::split_key("[gt]").is_err());
    }

    #[test]
    fn test_key_and_value_conventions_agree() {
        let by_key = build(&[("viewsCount[gte]", "100")], true).unwrap();
        let by_value = build(&[("viewsCount", "gte:100")], true).unwrap();
        assert_eq!(by_key, by_value);
        assert_eq!(by_key.clauses[0].op, CompareOp::Gte);
        assert_eq!(by_key.clauses[0].value, "100");
    }

    #[test]
    fn test_key_operator_keeps_value_literal() {
        let expr = build(&[("genre[ne]", "lt:5")], true).unwrap();
        assert_eq!(expr.clauses[0].op, CompareOp::Ne);
        assert_eq!(expr.clauses[0].value, "lt:5");
    }

    #[test]
    fn test_equality_and_empty_string() {
        let expr = build(&[("genre", "Music"), ("tags", "")], true).unwrap();
        assert_eq!(expr.clauses.len(), 2);
        assert_eq!(expr.clauses[1].op, CompareOp::Eq);
        assert_eq!(expr.clauses[1].value, "");

        let (sql, params) = expr.to_where_clause().unwrap();
        assert_eq!(sql, "\nWHERE (genre = ?) AND (tags = ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_strict_rejects_unknown_field() {
        let err = build(&[("nonexistent", "x")], true).unwrap_err();
        assert!(matches!(err, SomanaError::InvalidQuery(_)));
    }

    #[test]
    fn test_permissive_missing_field_predicates() {
        let expr = build(&[("nonexistent", "x"), ("other[ne]", "y")], false).unwrap();
        assert_eq!(field_name(&expr.clauses[0]), "nonexistent");
        let (sql, params) = expr.to_where_clause().unwrap();
        assert_eq!(sql, "\nWHERE (1 = 0) AND (1 = 1)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_ne_matches_null() {
        let expr = build(&[("genre", "ne:Blog")], true).unwrap();
        let (sql, _) = expr.to_where_clause().unwrap();
        assert_eq!(sql, "\nWHERE (genre IS NULL OR genre != ?)");
    }

    #[test]
    fn test_list_field_predicates() {
        let expr = build(&[("collectedImages", "a.jpg")], true).unwrap();
        let (sql, _) = expr.to_where_clause().unwrap();
        assert_eq!(
            sql,
            "\nWHERE (EXISTS (SELECT 1 FROM json_each(collected_images) WHERE json_each.value = ?))"
        );
    }

    #[test]
    fn test_typed_values_must_cast() {
        let expr = build(&[("viewsCount", "gte:lots")], true).unwrap();
        assert!(matches!(
            expr.to_where_clause(),
            Err(SomanaError::InvalidQuery(_))
        ));

        let expr = build(&[("usedAI", "TRUE")], true).unwrap();
        assert!(expr.to_where_clause().is_ok());

        let expr = build(&[("usedAI", "maybe")], true).unwrap();
        assert!(expr.to_where_clause().is_err());
    }

    #[test]
    fn test_reserved_keys_with_operators_are_skipped() {
        for strict in [true, false] {
            let expr = build(
                &[("page[gte]", "1"), ("limit[lt]", "5"), ("genre", "Blog")],
                strict,
            )
            .unwrap();
            assert_eq!(expr.clauses.len(), 1);
            assert_eq!(field_name(&expr.clauses[0]), "genre");
        }
    }

    #[test]
    fn test_no_filters_no_where() {
        let expr = build(&[("page", "2"), ("sort", "heading")], true).unwrap();
        assert!(expr.clauses.is_empty());
        let (sql, params) = expr.to_where_clause().unwrap();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    proptest! {
        #[test]
        fn prop_reserved_keys_never_become_clauses(
            pairs in proptest::collection::vec(
                (prop_oneof![
                    Just("sort".to_string()),
                    Just("fields".to_string()),
                    Just("page".to_string()),
                    Just("limit".to_string()),
                    "(sort|fields|page|limit)\\[(gte|gt|lte|lt|eq|ne)\\]",
                    "[a-zA-Z]{1,12}",
                ], ".{0,12}"),
                0..12,
            )
        ) {
            let list_query = ListQuery::from_pairs(pairs);
            let expr = FilterExpression::from_list_query(&list_query, articles(), false).unwrap();
            for clause in &expr.clauses {
                prop_assert!(!ListQuery::is_reserved(field_name(clause)));
            }
        }
    }
}
