//! GraphQL document rendering.
//!
//! Documents are assembled from a root field, its arguments, and a static
//! selection set. Every user-supplied value goes through [`Arg`], which
//! renders it as an escaped string literal.

use std::fmt;

/// Whether a document reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Query,
    Mutation,
}

impl Kind {
    fn keyword(self) -> &'static str {
        match self {
            Kind::Query => "query",
            Kind::Mutation => "mutation",
        }
    }
}

/// An argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// String literal; also used for `ID` values.
    Str(String),
    List(Vec<Arg>),
    Object(Vec<(&'static str, Arg)>),
}

impl Arg {
    pub fn str(value: impl Into<String>) -> Self {
        Arg::Str(value.into())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => write!(f, "\"{}\"", escape(s)),
            Arg::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Arg::Object(fields) => {
                f.write_str("{")?;
                write_fields(f, fields)?;
                f.write_str("}")
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[(&'static str, Arg)]) -> fmt::Result {
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: {value}")?;
    }
    Ok(())
}

/// Escape a string for use inside a GraphQL string literal.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// A single-root-field GraphQL document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    kind: Kind,
    field: &'static str,
    args: Vec<(&'static str, Arg)>,
    selection: &'static str,
}

impl Document {
    pub fn query(field: &'static str, selection: &'static str) -> Self {
        Self {
            kind: Kind::Query,
            field,
            args: Vec::new(),
            selection,
        }
    }

    /// A mutation taking a single `input` object.
    pub fn mutation(
        field: &'static str,
        input: Vec<(&'static str, Arg)>,
        selection: &'static str,
    ) -> Self {
        Self {
            kind: Kind::Mutation,
            field,
            args: vec![("input", Arg::Object(input))],
            selection,
        }
    }

    pub fn arg(mut self, name: &'static str, value: Arg) -> Self {
        self.args.push((name, value));
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {}", self.kind.keyword(), self.field)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            write_fields(f, &self.args)?;
            f.write_str(")")?;
        }
        write!(f, " {{ {} }} }}", self.selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_backslashes_and_control_characters() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\tmp"), r"C:\\tmp");
        assert_eq!(escape("line1\nline2\t"), "line1\\nline2\\t");
        assert_eq!(escape("\u{01}"), "\\u0001");
        assert_eq!(escape("Olá, café"), "Olá, café");
    }

    #[test]
    fn renders_query_without_arguments() {
        let doc = Document::query("organizations", "id name");
        assert_eq!(doc.to_string(), "query { organizations { id name } }");
    }

    #[test]
    fn renders_query_with_id_argument() {
        let doc = Document::query("card", "id title").arg("id", Arg::str("42"));
        assert_eq!(doc.to_string(), r#"query { card(id: "42") { id title } }"#);
    }

    #[test]
    fn renders_mutation_input_with_nested_values() {
        let doc = Document::mutation(
            "inviteMembers",
            vec![
                ("organization_id", Arg::str("7")),
                (
                    "emails",
                    Arg::List(vec![Arg::Object(vec![
                        ("email", Arg::str("a@b.co")),
                        ("role_name", Arg::str("admin")),
                    ])]),
                ),
            ],
            "clientMutationId",
        );
        assert_eq!(doc.kind(), Kind::Mutation);
        assert_eq!(
            doc.to_string(),
            r#"mutation { inviteMembers(input: {organization_id: "7", emails: [{email: "a@b.co", role_name: "admin"}]}) { clientMutationId } }"#
        );
    }

    #[test]
    fn injected_quotes_stay_inside_the_literal() {
        let doc = Document::mutation(
            "createPipe",
            vec![("name", Arg::str(r#"x"}) { pwned }"#))],
            "clientMutationId",
        );
        assert_eq!(
            doc.to_string(),
            r#"mutation { createPipe(input: {name: "x\"}) { pwned }"}) { clientMutationId } }"#
        );
    }
}
