//! Back-office accounts. Authentication happens at the identity provider,
//! this table only says who is staff and with which role.
use std::fmt;

use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    users (id) {
        id -> Integer,
        email -> VarChar,
        full_name -> VarChar,
        role -> VarChar,
        is_active -> Bool,
        last_login -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Role::Admin => "admin",
            Role::Technician => "technician",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "admin" => Some(Role::Admin),
            "technician" => Some(Role::Technician),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod diesel_impl {
    use std::error::Error;
    use std::io::Write;
    use std::str;

    use diesel::deserialize::Queryable;
    use diesel::expression::bound::Bound;
    use diesel::expression::AsExpression;
    use diesel::pg::Pg;
    use diesel::row::Row;
    use diesel::serialize::Output;
    use diesel::sql_types::VarChar;
    use diesel::types::{FromSqlRow, IsNull, NotNull, SingleValue, ToSql};

    use super::Role;

    impl NotNull for Role {}
    impl SingleValue for Role {}

    impl FromSqlRow<VarChar, Pg> for Role {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"admin") => Ok(Role::Admin),
                Some(b"technician") => Ok(Role::Technician),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for Role: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `role`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for Role {
        type Row = Role;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for Role {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            out.write_all(self.as_str().as_bytes())?;
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for Role {
        type Expression = Bound<VarChar, Role>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a Role {
        type Expression = Bound<VarChar, &'a Role>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "users"]
pub struct StaffUser {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "users"]
pub struct NewStaffUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = "2", max = "100"), custom = "validate_not_blank")]
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "users"]
pub struct ReplaceStaffUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = "2", max = "100"), custom = "validate_not_blank")]
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "users"]
pub struct UpdateStaffUser {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = "2", max = "100"), custom = "validate_not_blank")]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateStaffUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.role.is_none() && self.is_active.is_none()
    }
}

impl From<ReplaceStaffUser> for UpdateStaffUser {
    fn from(payload: ReplaceStaffUser) -> Self {
        Self {
            email: Some(payload.email),
            full_name: Some(payload.full_name),
            role: Some(payload.role),
            is_active: Some(payload.is_active),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct StaffUsersSearchTerms {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
