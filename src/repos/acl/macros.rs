//! Shorthand for role permission tables

/// `permission!(resource[, action[, scope]])`, action defaults to `All`, scope to `All`.
/// Role permissions never narrow by rule, so it is always `Rule::Any`.
#[macro_export]
macro_rules! permission {
    ($resource:expr) => {
        permission!($resource, Action::All)
    };
    ($resource:expr, $action:expr) => {
        permission!($resource, $action, Scope::All)
    };
    ($resource:expr, $action:expr, $scope:expr) => {
        Permission {
            resource: $resource,
            action: $action,
            scope: $scope,
            rule: Rule::Any,
        }
    };
}
