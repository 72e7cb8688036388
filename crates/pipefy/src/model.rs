//! Resources, operations, and the fixed option sets the node exposes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PipefyError;

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// Pipefy entity an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    #[default]
    Organization,
    User,
    Pipe,
    Phase,
    Field,
    Card,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Organization,
        Resource::User,
        Resource::Pipe,
        Resource::Phase,
        Resource::Field,
        Resource::Card,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Organization => "organization",
            Resource::User => "user",
            Resource::Pipe => "pipe",
            Resource::Phase => "phase",
            Resource::Field => "field",
            Resource::Card => "card",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Resource::Organization => "Organization",
            Resource::User => "User",
            Resource::Pipe => "Pipe",
            Resource::Phase => "Phase",
            Resource::Field => "Field",
            Resource::Card => "Card",
        }
    }

    /// Operations valid for this resource; the first one is the default.
    pub fn operations(self) -> &'static [Operation] {
        use Operation::*;
        match self {
            Resource::Organization => &[Get, GetMany, Create, Update, Delete],
            Resource::User => &[GetMe, InviteMember, RemoveUser, SetRole],
            Resource::Pipe => &[Get, Create, Update, Delete],
            Resource::Phase => &[Get, Create, Update, Delete],
            Resource::Field => &[GetMany],
            Resource::Card => &[Get, Create, Update, UpdateField, MoveToPhase, Delete],
        }
    }

    pub fn default_operation(self) -> Operation {
        self.operations()[0]
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = PipefyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PipefyError::UnknownResource(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Get,
    GetMany,
    Create,
    Update,
    Delete,
    GetMe,
    InviteMember,
    RemoveUser,
    SetRole,
    UpdateField,
    MoveToPhase,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Get,
        Operation::GetMany,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::GetMe,
        Operation::InviteMember,
        Operation::RemoveUser,
        Operation::SetRole,
        Operation::UpdateField,
        Operation::MoveToPhase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::GetMany => "getMany",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::GetMe => "getMe",
            Operation::InviteMember => "inviteMember",
            Operation::RemoveUser => "removeUser",
            Operation::SetRole => "setRole",
            Operation::UpdateField => "updateField",
            Operation::MoveToPhase => "moveToPhase",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Operation::Get => "Get",
            Operation::GetMany => "Get Many",
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::GetMe => "Get Me",
            Operation::InviteMember => "Invite Member",
            Operation::RemoveUser => "Remove User",
            Operation::SetRole => "Set Role",
            Operation::UpdateField => "Update Field",
            Operation::MoveToPhase => "Move to Phase",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PipefyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| PipefyError::UnknownOperation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A validated (resource, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    resource: Resource,
    operation: Operation,
}

impl Action {
    /// # Errors
    /// [`PipefyError::InvalidOperation`] when the resource does not offer the operation.
    pub fn new(resource: Resource, operation: Operation) -> Result<Self, PipefyError> {
        if !resource.supports(operation) {
            return Err(PipefyError::InvalidOperation {
                resource,
                operation,
            });
        }
        Ok(Self {
            resource,
            operation,
        })
    }

    /// Pair the resource with its default operation when none is chosen.
    pub fn with_default(resource: Resource, operation: Option<Operation>) -> Result<Self, PipefyError> {
        Self::new(resource, operation.unwrap_or_else(|| resource.default_operation()))
    }

    pub fn resource(self) -> Resource {
        self.resource
    }

    pub fn operation(self) -> Operation {
        self.operation
    }

    /// Every valid pair, in resource then operation order.
    pub fn all() -> impl Iterator<Item = Action> {
        Resource::ALL.into_iter().flat_map(|resource| {
            resource.operations().iter().map(move |&operation| Action {
                resource,
                operation,
            })
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.resource)
    }
}

// ---------------------------------------------------------------------------
// Fixed option sets
// ---------------------------------------------------------------------------

/// Organization industries accepted by `createOrganization`.
pub const INDUSTRIES: [(&str, &str); 6] = [
    ("Financial Services", "financial_services"),
    ("Technology", "technology"),
    ("Manufacturing", "manufacturing"),
    ("Healthcare", "healthcare"),
    ("Education", "education"),
    ("Other", "other"),
];

pub const DEFAULT_INDUSTRY: &str = "other";

/// Organization member roles.
pub const ROLES: [(&str, &str); 3] = [("Admin", "admin"), ("Member", "member"), ("Guest", "guest")];

pub const DEFAULT_ROLE: &str = "member";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), resource);
        }
    }

    #[test]
    fn serde_uses_camel_case_wire_names() {
        let op: Operation = serde_json::from_str("\"moveToPhase\"").unwrap();
        assert_eq!(op, Operation::MoveToPhase);
        assert_eq!(serde_json::to_string(&Operation::GetMe).unwrap(), "\"getMe\"");
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            "board".parse::<Resource>(),
            Err(PipefyError::UnknownResource(name)) if name == "board"
        ));
        assert!(matches!(
            "archive".parse::<Operation>(),
            Err(PipefyError::UnknownOperation(_))
        ));
    }

    #[test]
    fn operation_must_belong_to_resource() {
        assert!(Action::new(Resource::Card, Operation::MoveToPhase).is_ok());
        assert!(matches!(
            Action::new(Resource::Pipe, Operation::GetMe),
            Err(PipefyError::InvalidOperation {
                resource: Resource::Pipe,
                operation: Operation::GetMe
            })
        ));
    }

    #[test]
    fn default_operations() {
        assert_eq!(Resource::default(), Resource::Organization);
        assert_eq!(Resource::User.default_operation(), Operation::GetMe);
        let action = Action::with_default(Resource::Card, None).unwrap();
        assert_eq!(action.operation(), Operation::Get);
    }

    #[test]
    fn action_table_size() {
        assert_eq!(Action::all().count(), 24);
        assert_eq!(
            Action::new(Resource::Card, Operation::Create).unwrap().to_string(),
            "create: card"
        );
    }
}
