//! Dynamic option loading.
//!
//! Each loader sends one query, reshapes the result into selector entries or
//! property descriptors, and sorts them for display. Nothing is cached.

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::description::{OptionItem, PropertyDescriptor, PropertyKind};
use crate::graphql::{Arg, Document};
use crate::operations::START_FORM_FIELDS;
use crate::{PipefyClient, PipefyError};

const PIPES_SELECTION: &str = "organizations { edges { node { id name pipes { id name } } } }";

/// Shape of one pipe field as returned by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipeField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub field_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PipeField {
    /// Label as shown in selectors, flagged with ` *` when required.
    fn display_label(&self, label: &str) -> String {
        if self.required {
            format!("{label} *")
        } else {
            label.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// getPipes
// ---------------------------------------------------------------------------

/// Every pipe the token can see, labelled with its organization.
#[instrument(skip_all)]
pub async fn get_pipes(client: &PipefyClient) -> Result<Vec<OptionItem>, PipefyError> {
    let data = client.execute(&Document::query("me", PIPES_SELECTION)).await?;

    let mut options = Vec::new();
    let edges = data
        .pointer("/me/organizations/edges")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for edge in edges {
        let Some(org) = edge.get("node") else { continue };
        let org_name = org.get("name").and_then(Value::as_str).unwrap_or_default();
        let Some(pipes) = org.get("pipes").and_then(Value::as_array) else {
            continue;
        };
        for pipe in pipes {
            let (Some(id), Some(name)) = (id_string(pipe.get("id")), pipe.get("name").and_then(Value::as_str))
            else {
                continue;
            };
            options.push(OptionItem::new(format!("{name} (Org: {org_name})"), id));
        }
    }

    sort_by_name(&mut options);
    info!(count = options.len(), "loaded pipes");
    Ok(options)
}

// ---------------------------------------------------------------------------
// getPipeFields
// ---------------------------------------------------------------------------

/// One property descriptor per field of the pipe's start form.
#[instrument(skip(client))]
pub async fn get_pipe_fields(
    client: &PipefyClient,
    pipe_id: &str,
) -> Result<Vec<PropertyDescriptor>, PipefyError> {
    if pipe_id.trim().is_empty() {
        return Ok(vec![PropertyDescriptor::notice(
            "placeholderInfo",
            "Select a Pipe first to see its fields",
            "",
        )]);
    }

    let Some(fields) = fetch_fields(client, pipe_id).await? else {
        warn!(pipe_id, "pipe has no fields branch in response");
        return Ok(vec![PropertyDescriptor::notice(
            "errorInfo",
            "Error or No Fields Found",
            "Could not load fields for the selected pipe. Check pipeId or API response.",
        )]);
    };

    Ok(fields.iter().map(field_property).collect())
}

/// Map a pipe field onto a form property.
pub fn field_property(field: &PipeField) -> PropertyDescriptor {
    let description = field
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| field.help.clone())
        .unwrap_or_default();

    let mut property = PropertyDescriptor::string(&field.id, &field.display_label(&field.label))
        .describe(description);
    property.required = field.required;

    match field.field_type.as_str() {
        "number" | "currency" => property.kind = PropertyKind::Number,
        "select" | "radio_vertical" | "radio_horizontal" => {
            property.kind = PropertyKind::Options;
            property.options = field
                .options
                .iter()
                .map(|opt| OptionItem::new(opt.clone(), opt.clone()))
                .collect();
        }
        "checkbox_vertical" | "checkbox_horizontal" => match field.options.as_slice() {
            [] => {
                property.kind = PropertyKind::Boolean;
                property.default = json!(false);
            }
            [only] => {
                property.kind = PropertyKind::Boolean;
                property.default = json!(false);
                property.display_name = field.display_label(only);
            }
            many => {
                property.description = format!(
                    "{} (Provide comma-separated values from: {})",
                    property.description,
                    many.join(", ")
                );
            }
        },
        "date" | "datetime" => property.kind = PropertyKind::DateTime,
        "time" => property.placeholder = Some("HH:MM:SS".to_string()),
        "assignee_select" | "member_select" => {
            property.description = format!("{} (Enter User/Assignee ID(s))", property.description);
        }
        // short_text, long_text, email, phone, url, and anything unknown.
        _ => {}
    }

    property
}

// ---------------------------------------------------------------------------
// getPipeFieldOptionsForSelect
// ---------------------------------------------------------------------------

/// Field selector entries for a pipe, sorted by label.
#[instrument(skip(client))]
pub async fn get_pipe_field_options_for_select(
    client: &PipefyClient,
    pipe_id: &str,
) -> Result<Vec<OptionItem>, PipefyError> {
    if pipe_id.trim().is_empty() {
        return Ok(vec![OptionItem::new("Select a Pipe ID first", "")]);
    }

    let mut options = match fetch_fields(client, pipe_id).await? {
        Some(fields) => fields
            .iter()
            .map(|field| OptionItem::new(field.display_label(&field.label), field.id.clone()))
            .collect(),
        None => vec![OptionItem::new("Could not load fields or no fields found", "_error")],
    };

    sort_by_name(&mut options);
    Ok(options)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `None` when the response has no `pipe.start_form_fields` list.
async fn fetch_fields(
    client: &PipefyClient,
    pipe_id: &str,
) -> Result<Option<Vec<PipeField>>, PipefyError> {
    let document = Document::query("pipe", START_FORM_FIELDS).arg("id", Arg::str(pipe_id));
    let mut data = client.execute(&document).await?;

    let Some(raw) = data.pointer_mut("/pipe/start_form_fields").map(Value::take) else {
        return Ok(None);
    };
    if !raw.is_array() {
        return Ok(None);
    }
    let fields: Vec<PipeField> =
        serde_json::from_value(raw).map_err(|e| PipefyError::InvalidResponse(e.to_string()))?;
    Ok(Some(fields))
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn sort_by_name(options: &mut [OptionItem]) {
    options.sort_by(|a, b| a.name.cmp(&b.name));
}
