//! Node metadata: resources, operations, and the parameters each one takes.
//!
//! The host renders configuration forms from this; the node itself only
//! relies on it for names and defaults.

use serde::Serialize;
use serde_json::{json, Value};

use crate::credentials::CREDENTIAL_NAME;
use crate::model::{Action, Operation, Resource, DEFAULT_INDUSTRY, DEFAULT_ROLE, INDUSTRIES, ROLES};

pub const NODE_TYPE: &str = "pipefy";

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// One entry in a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    pub name: String,
    pub value: String,
}

impl OptionItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Input widget kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    DateTime,
    Options,
    Collection,
    FixedCollection,
    Notice,
}

/// Describes one configurable property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub required: bool,
    pub default: Value,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionItem>,
    /// Sub-properties of a collection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<PropertyDescriptor>,
    /// Option loader that fills `options` at configuration time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_options_method: Option<&'static str>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, kind: PropertyKind) -> Self {
        let default = match kind {
            PropertyKind::Boolean => json!(false),
            PropertyKind::Collection | PropertyKind::FixedCollection => json!({}),
            _ => json!(""),
        };
        Self {
            display_name: display_name.into(),
            name: name.into(),
            kind,
            required: false,
            default,
            description: String::new(),
            placeholder: None,
            options: Vec::new(),
            fields: Vec::new(),
            load_options_method: None,
        }
    }

    pub fn string(name: &str, display_name: &str) -> Self {
        Self::new(name, display_name, PropertyKind::String)
    }

    pub fn notice(name: &str, display_name: &str, text: &str) -> Self {
        Self::new(name, display_name, PropertyKind::Notice).with_default(json!(text))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_options(mut self, options: Vec<OptionItem>) -> Self {
        self.options = options;
        self
    }

    fn with_fields(mut self, fields: Vec<PropertyDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    fn loaded_by(mut self, method: &'static str) -> Self {
        self.load_options_method = Some(method);
        self
    }
}

// ---------------------------------------------------------------------------
// Node description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescription {
    pub value: Operation,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<PropertyDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    pub value: Resource,
    pub name: &'static str,
    pub default_operation: Operation,
    pub operations: Vec<OperationDescription>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: u32,
    pub credentials: Vec<&'static str>,
    pub default_resource: Resource,
    pub resources: Vec<ResourceDescription>,
}

impl NodeDescription {
    pub fn operation(&self, action: Action) -> Option<&OperationDescription> {
        self.resources
            .iter()
            .find(|r| r.value == action.resource())?
            .operations
            .iter()
            .find(|o| o.value == action.operation())
    }
}

/// The full node description.
pub fn describe() -> NodeDescription {
    let resources = Resource::ALL
        .into_iter()
        .map(|resource| ResourceDescription {
            value: resource,
            name: resource.display_name(),
            default_operation: resource.default_operation(),
            operations: resource
                .operations()
                .iter()
                .filter_map(|&operation| Action::new(resource, operation).ok())
                .map(|action| OperationDescription {
                    value: action.operation(),
                    name: action.operation().display_name(),
                    description: operation_summary(action),
                    parameters: parameters_for(action),
                })
                .collect(),
        })
        .collect();

    NodeDescription {
        name: NODE_TYPE,
        display_name: "Pipefy",
        description: "Consume Pipefy API",
        version: 1,
        credentials: vec![CREDENTIAL_NAME],
        default_resource: Resource::default(),
        resources,
    }
}

fn operation_summary(action: Action) -> &'static str {
    use Operation::*;
    use Resource::*;
    match (action.resource(), action.operation()) {
        (Organization, Get) => "Get an organization",
        (Organization, GetMany) => "Get many organizations",
        (Organization, Create) => "Create an organization",
        (Organization, Update) => "Update an organization",
        (Organization, Delete) => "Delete an organization",
        (User, GetMe) => "Get current user information",
        (User, InviteMember) => "Invite a member to an organization",
        (User, RemoveUser) => "Remove a user from an organization",
        (User, SetRole) => "Change user permissions",
        (Pipe, Get) => "Get a pipe",
        (Pipe, Create) => "Create a pipe",
        (Pipe, Update) => "Update a pipe",
        (Pipe, Delete) => "Delete a pipe",
        (Phase, Get) => "Get a phase",
        (Phase, Create) => "Create a phase",
        (Phase, Update) => "Update a phase",
        (Phase, Delete) => "Delete a phase",
        (Field, GetMany) => "Get the start form fields of a pipe",
        (Card, Get) => "Get a card",
        (Card, Create) => "Create a card",
        (Card, Update) => "Update a card",
        (Card, UpdateField) => "Update a field in a card",
        (Card, MoveToPhase) => "Move a card to another phase",
        (Card, Delete) => "Delete a card",
        _ => "",
    }
}

fn id_param(name: &str, display_name: &str, description: &str) -> PropertyDescriptor {
    PropertyDescriptor::string(name, display_name)
        .required()
        .describe(description)
}

fn option_items(pairs: &[(&str, &str)]) -> Vec<OptionItem> {
    pairs.iter().map(|(name, value)| OptionItem::new(*name, *value)).collect()
}

fn role_param() -> PropertyDescriptor {
    PropertyDescriptor::new("roleName", "Role", PropertyKind::Options)
        .with_options(option_items(&ROLES))
        .with_default(json!(DEFAULT_ROLE))
        .describe("Role of the user in the organization")
}

fn update_fields(fields: Vec<PropertyDescriptor>) -> PropertyDescriptor {
    PropertyDescriptor::new("updateFields", "Update Fields", PropertyKind::Collection)
        .with_placeholder("Add Field")
        .with_fields(fields)
}

/// Parameters an operation reads, in form order.
pub fn parameters_for(action: Action) -> Vec<PropertyDescriptor> {
    use Operation::*;
    use Resource::*;
    match (action.resource(), action.operation()) {
        (Organization, Get) => vec![id_param("organizationId", "Organization ID", "ID of the organization to get")],
        (Organization, GetMany) | (User, GetMe) => Vec::new(),
        (Organization, Create) => vec![
            PropertyDescriptor::string("name", "Name")
                .required()
                .describe("Name of the organization to create"),
            PropertyDescriptor::new("industry", "Industry", PropertyKind::Options)
                .with_options(option_items(&INDUSTRIES))
                .with_default(json!(DEFAULT_INDUSTRY))
                .describe("Industry of the organization"),
        ],
        (Organization, Update) => vec![
            id_param("organizationId", "Organization ID", "ID of the organization to update"),
            update_fields(vec![PropertyDescriptor::string("name", "Name")
                .describe("New name of the organization")]),
        ],
        (Organization, Delete) => vec![id_param("organizationId", "Organization ID", "ID of the organization to delete")],
        (User, InviteMember) => vec![
            id_param("organizationId", "Organization ID", "ID of the organization to invite member to"),
            id_param("email", "Email", "Email of the user to invite").with_placeholder("name@email.com"),
            role_param(),
        ],
        (User, RemoveUser) => vec![
            id_param("organizationId", "Organization ID", "ID of the organization to remove the user from"),
            id_param("email", "Email", "Email of the user to remove").with_placeholder("name@email.com"),
        ],
        (User, SetRole) => vec![
            id_param("organizationId", "Organization ID", "ID of the organization the user belongs to"),
            id_param("userId", "User ID", "ID of the user whose role changes"),
            role_param(),
        ],
        (Pipe, Get) => vec![id_param("pipeId", "Pipe ID", "ID of the pipe to get")],
        (Pipe, Create) => vec![
            id_param("organizationId", "Organization ID", "ID of the organization to create pipe in"),
            PropertyDescriptor::string("name", "Name")
                .required()
                .describe("Name of the pipe to create"),
        ],
        (Pipe, Update) => vec![
            id_param("pipeId", "Pipe ID", "ID of the pipe to update"),
            update_fields(vec![PropertyDescriptor::string("name", "Name").describe("New name of the pipe")]),
        ],
        (Pipe, Delete) => vec![id_param("pipeId", "Pipe ID", "ID of the pipe to delete")],
        (Phase, Get) => vec![id_param("phaseId", "Phase ID", "ID of the phase to get")],
        (Phase, Create) => vec![
            id_param("pipeId", "Pipe ID", "ID of the pipe to create phase in"),
            PropertyDescriptor::string("name", "Name")
                .required()
                .describe("Name of the phase to create"),
            PropertyDescriptor::string("description", "Description").describe("Description of the phase"),
        ],
        (Phase, Update) => vec![
            id_param("phaseId", "Phase ID", "ID of the phase to update"),
            update_fields(vec![
                PropertyDescriptor::string("name", "Name").describe("New name of the phase"),
                PropertyDescriptor::string("description", "Description")
                    .describe("New description of the phase"),
            ]),
        ],
        (Phase, Delete) => vec![id_param("phaseId", "Phase ID", "ID of the phase to delete")],
        (Field, GetMany) => vec![id_param("pipeId", "Pipe ID", "ID of the pipe whose fields to list")],
        (Card, Get) => vec![id_param("cardId", "Card ID", "ID of the card to get")],
        (Card, Create) => vec![
            id_param("pipeId", "Pipe ID", "Enter the ID of the Pipe where the card will be created.")
                .loaded_by("getPipes"),
            PropertyDescriptor::string("title", "Title")
                .required()
                .describe("Title of the card to create"),
            PropertyDescriptor::new("fieldsUi", "Fields", PropertyKind::FixedCollection)
                .with_placeholder("Add Field")
                .with_fields(vec![
                    PropertyDescriptor::new("fieldId", "Pipe Field", PropertyKind::Options)
                        .required()
                        .describe("Select the Pipefy field to set. Required fields are marked with *.")
                        .loaded_by("getPipeFieldOptionsForSelect"),
                    PropertyDescriptor::string("fieldValue", "Field Value")
                        .describe("Value to set for the field"),
                ]),
            PropertyDescriptor::new("pipeFields", "Pipe Fields", PropertyKind::Collection)
                .with_placeholder("Load Pipe Fields")
                .loaded_by("getPipeFields"),
        ],
        (Card, Update) => vec![
            id_param("cardId", "Card ID", "ID of the card to update"),
            update_fields(vec![
                PropertyDescriptor::string("title", "Title").describe("New title of the card"),
                PropertyDescriptor::new("dueDate", "Due Date", PropertyKind::DateTime)
                    .describe("New due date of the card"),
            ]),
        ],
        (Card, UpdateField) => vec![
            id_param("cardId", "Card ID", "ID of the card to update"),
            PropertyDescriptor::new("fieldId", "Field ID", PropertyKind::Options)
                .describe("ID of the field to set")
                .loaded_by("getPipeFieldOptionsForSelect"),
            PropertyDescriptor::string("fieldValue", "Field Value").describe("Value to set for the field"),
        ],
        (Card, MoveToPhase) => vec![
            id_param("cardId", "Card ID", "ID of the card to move"),
            id_param("destinationPhaseId", "Destination Phase ID", "ID of the phase to move the card to"),
        ],
        (Card, Delete) => vec![id_param("cardId", "Card ID", "ID of the card to delete")],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::build_document;
    use crate::params::Parameters;
    use serde_json::Map;

    #[test]
    fn every_action_is_described() {
        let description = describe();
        for action in Action::all() {
            let op = description
                .operation(action)
                .unwrap_or_else(|| panic!("{action} is not described"));
            assert!(!op.description.is_empty(), "{action} has no summary");
        }
    }

    #[test]
    fn required_parameters_are_enough_to_build() {
        for action in Action::all() {
            let mut values = Map::new();
            for param in parameters_for(action).into_iter().filter(|p| p.required) {
                values.insert(param.name, json!("1"));
            }
            build_document(action, &Parameters::new(values))
                .unwrap_or_else(|e| panic!("{action}: {e}"));
        }
    }

    #[test]
    fn serialises_with_host_field_names() {
        let value = serde_json::to_value(describe()).unwrap();
        assert_eq!(value["name"], "pipefy");
        assert_eq!(value["credentials"], json!(["pipefyApi"]));
        assert_eq!(value["defaultResource"], "organization");

        let user = &value["resources"][1];
        assert_eq!(user["value"], "user");
        assert_eq!(user["defaultOperation"], "getMe");

        let invite = &user["operations"][1];
        assert_eq!(invite["name"], "Invite Member");
        assert_eq!(invite["parameters"][2]["type"], "options");
        assert_eq!(invite["parameters"][2]["default"], "member");
    }
}
