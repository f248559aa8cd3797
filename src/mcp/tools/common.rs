//! Argument types and schema fragments shared across the tool catalog.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::mcp::executor::ToolArgs;
use crate::mcp::validation::{
    check_limit, check_max_len, check_metadata, check_not_blank, Metadata, ValidationError,
    MAX_CRITERIA, MAX_LIMIT, MAX_OPTIONS,
};

// ============================================================================
// Shared argument types
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Criterion {
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Company,
    Person,
    Article,
    ResearchPaper,
    Custom,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityType,
    /// Only meaningful for `custom` entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (&self.kind, &self.description) {
            (EntityType::Custom, None) => Err(ValidationError::MissingCompanion {
                field: "entity.description".to_string(),
                when: "entity.type is custom".to_string(),
            }),
            (_, Some(description)) => check_not_blank("entity.description", description),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBehavior {
    Override,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentFormat {
    Text,
    Date,
    Number,
    Options,
    Email,
    Phone,
    Url,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentOption {
    pub label: String,
}

/// An enrichment definition, as accepted by `create_enrichment` and `create_webset`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSpec {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<EnrichmentFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<EnrichmentOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl EnrichmentSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("description", &self.description)?;
        check_options(self.format, self.options.as_deref(), true)?;
        check_metadata(self.metadata.as_ref())
    }
}

pub fn check_criteria(field: &str, criteria: Option<&[Criterion]>) -> Result<(), ValidationError> {
    let Some(criteria) = criteria else {
        return Ok(());
    };
    check_max_len(field, criteria, MAX_CRITERIA)?;
    for (i, criterion) in criteria.iter().enumerate() {
        check_not_blank(&format!("{}[{}].description", field, i), &criterion.description)?;
    }
    Ok(())
}

/// `options` belongs with `format = options` and nothing else.
///
/// With `format_required`, an options list and no format is a mistake; updates
/// may send options alone because the stored format can already be `options`.
pub fn check_options(
    format: Option<EnrichmentFormat>,
    options: Option<&[EnrichmentOption]>,
    format_required: bool,
) -> Result<(), ValidationError> {
    match (format, options) {
        (Some(EnrichmentFormat::Options), None) => Err(ValidationError::MissingCompanion {
            field: "options".to_string(),
            when: "format is options".to_string(),
        }),
        (Some(EnrichmentFormat::Options), Some(options)) => check_option_labels(options),
        (Some(_), Some(_)) => Err(ValidationError::NotAllowed {
            field: "options".to_string(),
            when: "format is not options".to_string(),
        }),
        (None, Some(_)) if format_required => Err(ValidationError::MissingCompanion {
            field: "format".to_string(),
            when: "options is set".to_string(),
        }),
        (None, Some(options)) => check_option_labels(options),
        (_, None) => Ok(()),
    }
}

fn check_option_labels(options: &[EnrichmentOption]) -> Result<(), ValidationError> {
    if options.is_empty() {
        return Err(ValidationError::Empty("options".to_string()));
    }
    check_max_len("options", options, MAX_OPTIONS)?;
    for (i, option) in options.iter().enumerate() {
        check_not_blank(&format!("options[{}].label", i), &option.label)?;
    }
    Ok(())
}

/// Cursor pagination shared by every `list_*` tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl Pagination {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_limit(self.limit)
    }

    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            query.push(("cursor".to_string(), cursor.to_string()));
        }
        query
    }
}

/// Arguments for tools addressing one resource by `id`.
#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

impl ToolArgs for IdArgs {
    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("id", self.id.as_str())]
    }
}

/// Arguments for list tools without filters.
#[derive(Debug, Deserialize)]
pub struct ListArgs {
    #[serde(flatten)]
    pub page: Pagination,
}

impl ToolArgs for ListArgs {
    fn query(&self) -> Vec<(String, String)> {
        self.page.query()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.page.validate()
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// Accumulates a JSON object, skipping absent optional fields.
#[derive(Default)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.0.insert(key.to_string(), json!(value));
        self
    }

    pub fn optional<T: Serialize>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Inserts a nested object unless it ended up empty.
    pub fn nested(mut self, key: &str, body: Body) -> Self {
        if !body.0.is_empty() {
            self.0.insert(key.to_string(), Value::Object(body.0));
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

// ============================================================================
// Schema fragments
// ============================================================================

pub fn id_schema(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

pub fn limit_schema() -> Value {
    json!({
        "type": "integer",
        "minimum": 1,
        "maximum": MAX_LIMIT,
        "description": format!("Number of results to return (1-{}, default 25)", MAX_LIMIT)
    })
}

pub fn cursor_schema() -> Value {
    json!({
        "type": "string",
        "description": "Pagination cursor returned as nextCursor by the previous page"
    })
}

pub fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": { "type": "string", "maxLength": 1000 },
        "description": "Key-value pairs to attach (values up to 1000 characters)"
    })
}

pub fn criteria_schema() -> Value {
    json!({
        "type": "array",
        "maxItems": MAX_CRITERIA,
        "items": {
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "minLength": 1,
                    "description": "A condition every result must satisfy"
                }
            },
            "required": ["description"]
        },
        "description": format!("Up to {} criteria results must match", MAX_CRITERIA)
    })
}

pub fn entity_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "type": {
                "type": "string",
                "enum": ["company", "person", "article", "research_paper", "custom"]
            },
            "description": {
                "type": "string",
                "description": "Describes the entity when type is custom"
            }
        },
        "required": ["type"],
        "description": "Kind of entity the search should return"
    })
}

pub fn search_behavior_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["override", "append"],
        "description": "override replaces existing items, append adds to them"
    })
}

pub fn format_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["text", "date", "number", "options", "email", "phone", "url"],
        "description": "Format of the extracted value"
    })
}

pub fn options_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "maxItems": MAX_OPTIONS,
        "items": {
            "type": "object",
            "properties": { "label": { "type": "string", "minLength": 1 } },
            "required": ["label"]
        },
        "description": "Allowed values; required when format is options"
    })
}

pub fn enrichment_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "description": {
                "type": "string",
                "description": "What to extract from each item"
            },
            "format": format_schema(),
            "options": options_schema(),
            "metadata": metadata_schema()
        },
        "required": ["description"]
    })
}

/// An object schema from `(name, schema)` pairs.
pub fn object_schema(properties: Vec<(&str, Value)>, required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

/// Schema for `list_*` tools, extended with extra filters.
pub fn list_schema(mut extra: Vec<(&str, Value)>, required: &[&str]) -> Value {
    extra.push(("limit", limit_schema()));
    extra.push(("cursor", cursor_schema()));
    object_schema(extra, required)
}
