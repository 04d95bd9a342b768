use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::models::CourseQuery;

static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])$").expect("regex compiles"));

/// Field name to the list of problems found with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[error("invalid parameters: {}", .fields.keys().copied().collect::<Vec<_>>().join(", "))]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }
}

/// `venue` and `type` arrive as strings already, so only `month` has a format to check.
pub fn validate_course_query(query: &CourseQuery) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Some(month) = &query.month
        && !MONTH_PATTERN.is_match(month)
    {
        errors.add("month", "The month field must match the format YYYY-MM.");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
