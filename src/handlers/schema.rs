use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use crate::{
    errors::ServiceError,
    schema::{self, Gender},
};

#[derive(Debug, Deserialize)]
pub struct SchemaQuery {
    pub gender: Gender,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategorySchema {
    pub category: &'static str,
    pub label: String,
    pub fields: &'static [&'static str],
}

/// Measurement schema lookup backing the order form: all categories for a
/// gender, or a single category's field list.
pub async fn get_schema(
    Query(query): Query<SchemaQuery>,
) -> Result<Json<Vec<CategorySchema>>, ServiceError> {
    let entries = schema::categories(query.gender)
        .iter()
        .copied()
        .filter(|(key, _)| match query.category.as_deref() {
            Some(wanted) => *key == wanted,
            None => true,
        })
        .map(|(key, fields)| CategorySchema {
            category: key,
            label: schema::category_label(key),
            fields,
        })
        .collect::<Vec<_>>();

    if entries.is_empty() {
        if let Some(wanted) = query.category {
            return Err(ServiceError::ValidationError(format!(
                "Unknown category '{}' for gender '{}'",
                wanted, query.gender
            )));
        }
    }

    Ok(Json(entries))
}
