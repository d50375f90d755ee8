use failure::Error as FailureError;

use models::authorization::*;
use repos::acl::base::Acl;

pub type RepoResult<T> = Result<T, FailureError>;
pub type RepoAcl<T> = Acl<Resource, Action, Scope, Rule, FailureError, T>;
