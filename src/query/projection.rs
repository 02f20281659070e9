use crate::error::SomanaError;

use super::columns::{Field, FieldSet, ID_FIELD, VERSION_FIELD};

/// Which attributes a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Every attribute except these
    Exclude(Vec<&'static str>),
    /// Only these attributes, plus `_id` unless it was excluded
    Include {
        fields: Vec<&'static str>,
        with_id: bool,
    },
}

impl Projection {
    /// All domain attributes: only the version bookkeeping attribute is hidden
    pub fn default_for(field_set: FieldSet) -> Self {
        let excluded = field_set
            .get(VERSION_FIELD)
            .map(|field| vec![field.name])
            .unwrap_or_default();
        Projection::Exclude(excluded)
    }

    /// Parses a comma-separated fields value such as `heading,genre` or
    /// `-content,-__v`. Inclusion and exclusion cannot be mixed, except for
    /// `-_id` alongside included fields.
    pub fn parse(value: &str, field_set: FieldSet, strict_fields: bool) -> Result<Self, SomanaError> {
        let mut included: Vec<&'static str> = Vec::new();
        let mut excluded: Vec<&'static str> = Vec::new();
        let mut exclude_id = false;

        for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, exclude) = match token.strip_prefix('-') {
                Some(name) => (name, true),
                None => (token.strip_prefix('+').unwrap_or(token), false),
            };

            let field = match field_set.get(name) {
                Some(field) => field,
                None if strict_fields => {
                    return Err(SomanaError::InvalidQuery(format!(
                        "Invalid field '{name}' in fields"
                    )))
                }
                None => continue,
            };

            let target = match exclude {
                true if field.name == ID_FIELD => {
                    exclude_id = true;
                    &mut excluded
                }
                true => &mut excluded,
                false => &mut included,
            };
            if !target.contains(&field.name) {
                target.push(field.name);
            }
        }

        let only_id_excluded = excluded.iter().all(|name| *name == ID_FIELD);
        if !included.is_empty() && !only_id_excluded {
            return Err(SomanaError::InvalidQuery(
                "Projection cannot mix inclusion and exclusion".to_string(),
            ));
        }

        if included.is_empty() && !excluded.is_empty() {
            return Ok(Projection::Exclude(excluded));
        }

        // An empty inclusion list here means every named field was unknown
        included.retain(|name| *name != ID_FIELD);
        Ok(Projection::Include {
            fields: included,
            with_id: !exclude_id,
        })
    }

    /// Resolves the projection to concrete fields in schema order, never
    /// returning anything in `base_excluded`.
    pub fn resolve(&self, field_set: FieldSet, base_excluded: &[&str]) -> Vec<Field> {
        let visible = field_set
            .fields()
            .filter(|field| !base_excluded.contains(&field.name));

        match self {
            Projection::Exclude(excluded) => visible
                .filter(|field| !excluded.contains(&field.name))
                .collect(),
            Projection::Include { fields, with_id } => visible
                .filter(|field| match field.name {
                    ID_FIELD => *with_id,
                    name => fields.contains(&name),
                })
                .collect(),
        }
    }
}
