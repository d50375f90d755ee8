//! Scope for checking resource ownership
use std::fmt;

// All - every record of the resource.
// Owned - only records belonging to the current staff user.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scope {
    All,
    Owned,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Scope::All => write!(f, "all"),
            Scope::Owned => write!(f, "owned"),
        }
    }
}
