//! Rule narrows a permission to a subset of records
use std::fmt;

// Any - no restriction.
// Public - only records flagged for the public site.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Rule {
    Any,
    Public,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Rule::Any => write!(f, "any"),
            Rule::Public => write!(f, "public"),
        }
    }
}
