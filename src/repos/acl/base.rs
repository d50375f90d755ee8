//! Generic access control list traits shared by every repo

/// Access control layer for repos. It tells if a user can do a certain action with
/// certain resource. All logic for roles and permissions should be hardcoded into implementation
/// of this trait.
pub trait Acl<Resource, Action, Scope, Rule, Error, T> {
    /// Tells if a user with id `user_id` can do `action` on `resource`.
    /// `obj` is checked against `scope` by `scope_checker`, `rule` narrows the request
    /// to a subset of records.
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        rule: Option<Rule>,
        obj: Option<&T>,
    ) -> Result<bool, Error>;
}

/// Implement this trait on resource to signal if it's in the current scope
pub trait CheckScope<Scope, T> {
    fn is_in_scope(&self, user_id: i32, scope: &Scope, obj: Option<&T>) -> bool;
}

/// SystemACL allows all manipulation with resources for all
#[derive(Clone, Debug, Default)]
pub struct SystemACL;

impl<Resource, Action, Scope, Rule, Error, T> Acl<Resource, Action, Scope, Rule, Error, T> for SystemACL {
    fn allows(
        &self,
        _resource: Resource,
        _action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        _rule: Option<Rule>,
        _obj: Option<&T>,
    ) -> Result<bool, Error> {
        Ok(true)
    }
}
