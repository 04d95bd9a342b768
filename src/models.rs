use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One scheduled offering as it appears in the catalog document.
///
/// Only the fields the query engine inspects are typed; everything else is
/// carried through `extra` so a merged record has the same shape as its input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Course {
    pub venue: Venue,
    #[serde(alias = "formattedStartDate")]
    #[schema(example = "Sat 12th October 2024")]
    pub formatted_start_date: String,
    #[serde(alias = "formattedEndDate")]
    #[schema(example = "Sun 13th October 2024")]
    pub formatted_end_date: String,
    #[serde(default)]
    pub days: Vec<CourseDay>,
    #[serde(alias = "availableSpaces")]
    pub available_spaces: u64,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Venue {
    #[schema(example = "Leeds")]
    pub name: String,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CourseDay {
    #[serde(alias = "startDate")]
    #[schema(example = "2024-10-12T09:00:00")]
    pub start_date: String,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

/// Raw query string of `GET /api/courses`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CourseQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub venue: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "empty_as_none")]
    pub course_type: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}
