use crate::error::SomanaError;

use super::columns::{Field, FieldSet, CREATED_AT_FIELD, ID_FIELD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: Field,
    pub direction: Direction,
}

/// Ordered sort keys. Ties left by the keys are broken by `_id` ascending.
#[derive(Debug, Clone)]
pub struct SortSpec {
    field_set: FieldSet,
    keys: Vec<SortKey>,
}

impl SortSpec {
    fn new(field_set: FieldSet) -> Self {
        SortSpec {
            field_set,
            keys: Vec::new(),
        }
    }

    /// Newest-created first
    pub fn default_for(field_set: FieldSet) -> Result<Self, SomanaError> {
        Self::parse(&format!("-{CREATED_AT_FIELD}"), field_set, true)
    }

    /// Parses a comma-separated sort value such as `-createdAt,heading`.
    /// Unknown fields are rejected in strict mode and skipped otherwise.
    pub fn parse(value: &str, field_set: FieldSet, strict_fields: bool) -> Result<Self, SomanaError> {
        let mut sort = Self::new(field_set);

        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, direction) = match token.strip_prefix('-') {
                Some(name) => (name, Direction::Desc),
                None => (token.strip_prefix('+').unwrap_or(token), Direction::Asc),
            };

            match field_set.get(name) {
                Some(field) => sort.add_sort_key(field, direction)?,
                None if strict_fields => {
                    return Err(SomanaError::InvalidQuery(format!(
                        "Invalid field '{name}' in sort"
                    )))
                }
                None => {}
            }
        }

        Ok(sort)
    }

    pub fn add_sort_key(&mut self, field: Field, direction: Direction) -> Result<(), SomanaError> {
        if !field.field_type().is_sortable() {
            return Err(SomanaError::InvalidQuery(format!(
                "Field '{}' cannot be used to sort",
                field.name
            )));
        }

        if self.keys.iter().any(|key| key.field == field) {
            return Err(SomanaError::InvalidQuery(format!(
                "Field '{}' was already specified in sort",
                field.name
            )));
        }

        self.keys.push(SortKey { field, direction });
        Ok(())
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn to_order_clause(&self) -> String {
        let mut terms: Vec<String> = self
            .keys
            .iter()
            .map(|key| format!("{} {}", key.field.name_db(), key.direction.sql()))
            .collect();

        if !self.keys.iter().any(|key| key.field.name == ID_FIELD) {
            if let Some(id_field) = self.field_set.get(ID_FIELD) {
                terms.push(format!("{} ASC", id_field.name_db()));
            }
        }

        format!("\nORDER BY {}", terms.join(", "))
    }
}
