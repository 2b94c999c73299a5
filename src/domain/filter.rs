//! Filter clause trees
//!
//! [`FilterClause`] mirrors the remote API's filter grammar closely enough to
//! serialize straight into a GraphQL `filter` variable. The client only ever
//! builds these trees; it never evaluates them.
//!
//! The `*_reference` constructors encode the reference precedence shared by
//! entity resolution and list filtering:
//!
//! 1. exact id, only when the reference is syntactically a UUID
//! 2. the kind's natural key (team key uppercased, project slug)
//! 3. exact display name

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use super::reference::is_uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    And(Vec<FilterClause>),
    Or(Vec<FilterClause>),
    /// Per-field clauses, rendered as one object in insertion order
    Fields(Vec<(String, FilterClause)>),
    Eq(Value),
    In(Vec<Value>),
    Gte(Value),
    IsNull(bool),
}

impl FilterClause {
    pub fn eq(value: impl Into<Value>) -> Self {
        FilterClause::Eq(value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        FilterClause::Gte(value.into())
    }

    pub fn is_null(null: bool) -> Self {
        FilterClause::IsNull(null)
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        FilterClause::In(values.into_iter().map(Into::into).collect())
    }

    /// `{ name: clause }`
    pub fn field(name: impl Into<String>, clause: FilterClause) -> Self {
        FilterClause::Fields(vec![(name.into(), clause)])
    }

    /// `{ name: { eq: value } }`
    pub fn field_eq(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(name, Self::eq(value))
    }

    /// `{ some: clause }` for to-many relations
    pub fn some(clause: FilterClause) -> Self {
        Self::field("some", clause)
    }

    /// Empty field set, the unconstrained filter
    pub fn empty() -> Self {
        FilterClause::Fields(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FilterClause::Fields(fields) if fields.is_empty())
    }

    /// Adds a field to a field set; other clause kinds are wrapped in `and`
    pub fn with_field(self, name: impl Into<String>, clause: FilterClause) -> Self {
        match self {
            FilterClause::Fields(mut fields) => {
                fields.push((name.into(), clause));
                FilterClause::Fields(fields)
            }
            other => FilterClause::And(vec![other, Self::field(name, clause)]),
        }
    }

    /// Converts into a JSON value for transport
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for FilterClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterClause::And(clauses) => single(serializer, "and", clauses),
            FilterClause::Or(clauses) => single(serializer, "or", clauses),
            FilterClause::Eq(value) => single(serializer, "eq", value),
            FilterClause::In(values) => single(serializer, "in", values),
            FilterClause::Gte(value) => single(serializer, "gte", value),
            FilterClause::IsNull(null) => single(serializer, "isNull", null),
            FilterClause::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, clause) in fields {
                    map.serialize_entry(name, clause)?;
                }
                map.end()
            }
        }
    }
}

fn single<S: Serializer, T: Serialize + ?Sized>(
    serializer: S,
    key: &str,
    value: &T,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

/// Builds `or[id?, natural keys..., name]` for a reference
fn precedence(reference: &str, natural_keys: Vec<(&str, String)>) -> FilterClause {
    let mut clauses = Vec::with_capacity(natural_keys.len() + 2);
    if is_uuid(reference) {
        clauses.push(FilterClause::field_eq("id", reference));
    }
    for (field, value) in natural_keys {
        clauses.push(FilterClause::field_eq(field, value));
    }
    clauses.push(FilterClause::field_eq("name", reference));
    FilterClause::Or(clauses)
}

/// Team by id, key (uppercased) or name
pub fn team_reference(reference: &str) -> FilterClause {
    precedence(reference, vec![("key", reference.to_uppercase())])
}

/// Project by id, slug or name
pub fn project_reference(reference: &str) -> FilterClause {
    precedence(reference, vec![("slugId", reference.to_string())])
}

/// Workflow state by id or name
pub fn state_reference(reference: &str) -> FilterClause {
    precedence(reference, Vec::new())
}

/// User by id or display name
pub fn user_reference(reference: &str) -> FilterClause {
    precedence(reference, Vec::new())
}

/// User by exact email
pub fn user_email(email: &str) -> FilterClause {
    FilterClause::field_eq("email", email)
}

/// Restricts a clause to one team: `and[{team: {id: {eq}}}, clause]`
pub fn scoped_to_team(team_id: &str, clause: FilterClause) -> FilterClause {
    FilterClause::And(vec![
        FilterClause::field("team", FilterClause::field_eq("id", team_id)),
        clause,
    ])
}
