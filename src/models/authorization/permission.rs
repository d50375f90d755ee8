//! Permission is a tuple for describing permissions

use models::authorization::{Action, Resource, Rule, Scope};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
    pub scope: Scope,
    pub rule: Rule,
}
