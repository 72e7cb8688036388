//! The (resource, operation) → GraphQL document table.

use serde_json::{Map, Value};

use crate::graphql::{Arg, Document};
use crate::model::{Action, Operation, Resource, DEFAULT_INDUSTRY, DEFAULT_ROLE};
use crate::params::{scalar_string, Parameters};
use crate::PipefyError;

const ORGANIZATION_FIELDS: &str = "id name pipes { id name } tables { edges { node { id name } } } \
     members { role_name user { id name email } }";
const PIPE_FIELDS: &str = "id name color users_count cards_count organization { id name } \
     phases { id name } start_form_fields { id label }";
const PHASE_FIELDS: &str = "id name description fields { id label type } \
     phase_field_conditions { id field { id label } } cards_count";
const CARD_FIELDS: &str = "id title url createdAt due_date current_phase { id name } \
     assignees { id username } labels { id name }";

/// Fields requested for every pipe field, shared with the option loaders.
pub const START_FORM_FIELDS: &str =
    "start_form_fields { id label type required description options help }";

const CARD_SUMMARY: &str = "card { id title url }";
const SUCCESS: &str = "success";

/// Build the document for `action` from one item's parameters.
///
/// # Errors
/// [`PipefyError::MissingParameter`] or [`PipefyError::InvalidParameter`]
/// when the parameters do not satisfy the operation.
pub fn build_document(action: Action, params: &Parameters) -> Result<Document, PipefyError> {
    use Operation::*;
    use Resource::*;

    let id = |name: &str| params.required(name).map(Arg::Str);

    let doc = match (action.resource(), action.operation()) {
        // ------ organization ------
        (Organization, Get) => {
            Document::query("organization", ORGANIZATION_FIELDS).arg("id", id("organizationId")?)
        }
        (Organization, GetMany) => Document::query("organizations", "id name"),
        (Organization, Create) => Document::mutation(
            "createOrganization",
            vec![
                ("name", id("name")?),
                ("industry", Arg::Str(params.or_default("industry", DEFAULT_INDUSTRY))),
            ],
            "organization { id name }",
        ),
        (Organization, Update) => {
            let updates = params.collection("updateFields")?;
            Document::mutation(
                "updateOrganization",
                vec![
                    ("id", id("organizationId")?),
                    ("name", Arg::Str(field_string(&updates, "name").unwrap_or_default())),
                ],
                "organization { id name }",
            )
        }
        (Organization, Delete) => Document::mutation(
            "deleteOrganization",
            vec![("id", id("organizationId")?)],
            SUCCESS,
        ),

        // ------ user ------
        (User, GetMe) => Document::query("me", "id name email username"),
        (User, InviteMember) => Document::mutation(
            "inviteMembers",
            vec![
                ("organization_id", id("organizationId")?),
                (
                    "emails",
                    Arg::List(vec![Arg::Object(vec![
                        ("email", id("email")?),
                        ("role_name", Arg::Str(params.or_default("roleName", DEFAULT_ROLE))),
                    ])]),
                ),
            ],
            "clientMutationId",
        ),
        (User, RemoveUser) => Document::mutation(
            "removeUserFromOrg",
            vec![
                ("organization_id", id("organizationId")?),
                ("email", id("email")?),
            ],
            SUCCESS,
        ),
        (User, SetRole) => Document::mutation(
            "setRole",
            vec![
                ("organization_id", id("organizationId")?),
                (
                    "member",
                    Arg::Object(vec![
                        ("user_id", id("userId")?),
                        ("role_name", Arg::Str(params.or_default("roleName", DEFAULT_ROLE))),
                    ]),
                ),
            ],
            "member { role_name user { id } }",
        ),

        // ------ pipe ------
        (Pipe, Get) => Document::query("pipe", PIPE_FIELDS).arg("id", id("pipeId")?),
        (Pipe, Create) => Document::mutation(
            "createPipe",
            vec![
                ("name", id("name")?),
                ("organization_id", id("organizationId")?),
            ],
            "clientMutationId",
        ),
        (Pipe, Update) => {
            let updates = params.collection("updateFields")?;
            let mut input = vec![("id", id("pipeId")?)];
            if let Some(name) = non_empty_field(&updates, "name") {
                input.push(("name", Arg::Str(name)));
            }
            Document::mutation("updatePipe", input, "pipe { id name }")
        }
        (Pipe, Delete) => Document::mutation("deletePipe", vec![("id", id("pipeId")?)], SUCCESS),

        // ------ phase ------
        (Phase, Get) => Document::query("phase", PHASE_FIELDS).arg("id", id("phaseId")?),
        (Phase, Create) => Document::mutation(
            "createPhase",
            vec![
                ("pipe_id", id("pipeId")?),
                ("name", id("name")?),
                ("description", Arg::Str(params.optional("description").unwrap_or_default())),
            ],
            "phase { id name }",
        ),
        (Phase, Update) => {
            let updates = params.collection("updateFields")?;
            let mut input = vec![("id", id("phaseId")?)];
            for key in ["name", "description"] {
                if let Some(value) = non_empty_field(&updates, key) {
                    input.push((key, Arg::Str(value)));
                }
            }
            Document::mutation("updatePhase", input, "phase { id name description }")
        }
        (Phase, Delete) => Document::mutation("deletePhase", vec![("id", id("phaseId")?)], SUCCESS),

        // ------ field ------
        (Field, GetMany) => Document::query("pipe", START_FORM_FIELDS).arg("id", id("pipeId")?),

        // ------ card ------
        (Card, Get) => Document::query("card", CARD_FIELDS).arg("id", id("cardId")?),
        (Card, Create) => {
            let mut input = vec![("pipe_id", id("pipeId")?), ("title", id("title")?)];
            let attributes = card_field_attributes(params)?;
            if !attributes.is_empty() {
                input.push(("fields_attributes", Arg::List(attributes)));
            }
            Document::mutation("createCard", input, CARD_SUMMARY)
        }
        (Card, Update) => {
            let updates = params.collection("updateFields")?;
            let mut input = vec![("id", id("cardId")?)];
            // Present values are sent even when empty so a title or due date can be cleared.
            if let Some(title) = field_string(&updates, "title") {
                input.push(("title", Arg::Str(title)));
            }
            if let Some(due) = field_string(&updates, "dueDate") {
                input.push(("due_date", Arg::Str(due)));
            }
            Document::mutation("updateCard", input, CARD_SUMMARY)
        }
        (Card, UpdateField) => {
            let mut input = vec![("id", id("cardId")?)];
            if let Some(field_id) = params.optional("fieldId") {
                let value = params.optional("fieldValue").unwrap_or_default();
                input.push((
                    "fields_attributes",
                    Arg::List(vec![attribute(field_id, Arg::Str(value))]),
                ));
            }
            Document::mutation("updateCard", input, CARD_SUMMARY)
        }
        (Card, MoveToPhase) => Document::mutation(
            "moveCardToPhase",
            vec![
                ("card_id", id("cardId")?),
                ("destination_phase_id", id("destinationPhaseId")?),
            ],
            "card { id title current_phase { id name } }",
        ),
        (Card, Delete) => Document::mutation("deleteCard", vec![("id", id("cardId")?)], SUCCESS),

        (resource, operation) => {
            return Err(PipefyError::InvalidOperation {
                resource,
                operation,
            })
        }
    };

    Ok(doc)
}

/// `fields_attributes` entries for a new card.
///
/// `pipeFields` wins whenever it has entries; `fieldsUi.fieldValues` is the
/// fallback. Null and empty values are skipped. Entries keep the order the
/// user gave them in.
fn card_field_attributes(params: &Parameters) -> Result<Vec<Arg>, PipefyError> {
    let pipe_fields = params.collection("pipeFields")?;
    if !pipe_fields.is_empty() {
        let attributes = pipe_fields
            .iter()
            .filter_map(|(field_id, value)| {
                attribute_value(value).map(|v| attribute(field_id.clone(), v))
            })
            .collect();
        return Ok(attributes);
    }

    let fields_ui = params.collection("fieldsUi")?;
    let entries = match fields_ui.get("fieldValues") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(PipefyError::InvalidParameter {
                name: "fieldsUi".to_string(),
                reason: "fieldValues must be a list".to_string(),
            })
        }
    };

    let attributes = entries
        .iter()
        .filter_map(|entry| {
            let field_id = entry.get("fieldId").and_then(scalar_string)?;
            if field_id.is_empty() {
                return None;
            }
            let value = entry.get("fieldValue").and_then(scalar_string)?;
            if value.is_empty() {
                return None;
            }
            Some(attribute(field_id, Arg::Str(value)))
        })
        .collect();
    Ok(attributes)
}

fn attribute(field_id: String, value: Arg) -> Arg {
    Arg::Object(vec![("field_id", Arg::Str(field_id)), ("value", value)])
}

/// Lists render as a list of strings; every other value as a single string.
fn attribute_value(value: &Value) -> Option<Arg> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(values) => Some(Arg::List(
            values
                .iter()
                .map(|v| Arg::Str(scalar_string(v).unwrap_or_else(|| v.to_string())))
                .collect(),
        )),
        Value::Object(_) => Some(Arg::Str(value.to_string())),
        scalar => scalar_string(scalar).map(Arg::Str),
    }
}

fn field_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(scalar_string)
}

fn non_empty_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    field_string(fields, key).filter(|s| !s.is_empty())
}
