//! Access control lists of the repo layer, one per staff role

#[macro_use]
pub mod macros;
pub mod base;

use std::collections::HashMap;
use std::rc::Rc;

use failure::Error as FailureError;

use errors::Error;
use models::authorization::*;
use models::Role;
use repos::acl::base::{Acl, CheckScope};

pub fn check<T>(
    acl: &Acl<Resource, Action, Scope, Rule, FailureError, T>,
    resource: Resource,
    action: Action,
    scope_checker: &CheckScope<Scope, T>,
    obj: Option<&T>,
) -> Result<(), FailureError> {
    acl.allows(resource, action, scope_checker, None, obj).and_then(|allowed| {
        if allowed {
            Ok(())
        } else {
            Err(format_err!("Denied request to do {:?} on {:?}", action, resource)
                .context(Error::Forbidden)
                .into())
        }
    })
}

pub fn check_with_rule<T>(
    acl: &Acl<Resource, Action, Scope, Rule, FailureError, T>,
    resource: Resource,
    action: Action,
    scope_checker: &CheckScope<Scope, T>,
    rule: Rule,
    obj: Option<&T>,
) -> Result<(), FailureError> {
    acl.allows(resource, action, scope_checker, Some(rule), obj).and_then(|allowed| {
        if allowed {
            Ok(())
        } else {
            Err(
                format_err!("Denied request to do {:?} on {:?} by rule: {:?}", action, resource, rule)
                    .context(Error::Forbidden)
                    .into(),
            )
        }
    })
}

/// ApplicationAcl contains main logic for manipulation with resources
#[derive(Clone)]
pub struct ApplicationAcl {
    acls: Rc<HashMap<Role, Vec<Permission>>>,
    roles: Vec<Role>,
    user_id: i32,
}

impl ApplicationAcl {
    pub fn new(roles: Vec<Role>, user_id: i32) -> Self {
        let mut hash = ::std::collections::HashMap::new();
        hash.insert(
            Role::Admin,
            vec![
                permission!(Resource::Bookings),
                permission!(Resource::Brands),
                permission!(Resource::Categories),
                permission!(Resource::ContactMessages),
                permission!(Resource::ContentBlocks),
                permission!(Resource::DeviceModels),
                permission!(Resource::RepairServices),
                permission!(Resource::Settings),
                permission!(Resource::StaffUsers),
            ],
        );
        hash.insert(
            Role::Technician,
            vec![
                permission!(Resource::Bookings),
                permission!(Resource::Brands, Action::Read),
                permission!(Resource::Categories, Action::Read),
                permission!(Resource::ContactMessages, Action::Read),
                permission!(Resource::ContentBlocks, Action::Read),
                permission!(Resource::DeviceModels, Action::Read),
                permission!(Resource::RepairServices, Action::Read),
                permission!(Resource::Settings, Action::Read),
                permission!(Resource::StaffUsers, Action::Read, Scope::Owned),
            ],
        );

        ApplicationAcl {
            acls: Rc::new(hash),
            roles,
            user_id,
        }
    }
}

impl<T> Acl<Resource, Action, Scope, Rule, FailureError, T> for ApplicationAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        rule: Option<Rule>,
        obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        let empty: Vec<Permission> = Vec::new();
        let user_id = self.user_id;
        let hashed_acls = self.acls.clone();
        let acls = self
            .roles
            .iter()
            .flat_map(|role| hashed_acls.get(role).unwrap_or(&empty))
            .filter(|permission| {
                let check_result =
                    (permission.resource == resource) && ((permission.action == action) || (permission.action == Action::All));

                let check_rule = match rule {
                    Some(rule) => (permission.rule == rule) || (permission.rule == Rule::Any),
                    None => true,
                };

                check_result && check_rule
            }).filter(|permission| scope_checker.is_in_scope(user_id, &permission.scope, obj));

        if acls.count() > 0 {
            Ok(true)
        } else {
            error!(
                "Denied request from user {} to do {} on {} by rule: {:?}.",
                user_id, action, resource, rule
            );
            Ok(false)
        }
    }
}

/// UnauthorizedAcl is used for the public site visitors
#[derive(Clone, Default)]
pub struct UnauthorizedAcl;

impl<T> Acl<Resource, Action, Scope, Rule, FailureError, T> for UnauthorizedAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        rule: Option<Rule>,
        _obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        let allowed = match (action, resource) {
            (Action::Read, Resource::Brands)
            | (Action::Read, Resource::Categories)
            | (Action::Read, Resource::ContentBlocks)
            | (Action::Read, Resource::DeviceModels)
            | (Action::Read, Resource::RepairServices)
            | (Action::Create, Resource::Bookings)
            | (Action::Create, Resource::ContactMessages) => true,
            (Action::Read, Resource::Settings) => rule == Some(Rule::Public),
            _ => false,
        };

        if !allowed {
            error!("Denied unauthorized request to do {} on {} by rule: {:?}.", action, resource, rule);
        }
        Ok(allowed)
    }
}
