//! Messages sent through the contact form
use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    contact_messages (id) {
        id -> Integer,
        name -> VarChar,
        email -> VarChar,
        phone -> Nullable<VarChar>,
        subject -> VarChar,
        message -> VarChar,
        is_read -> Bool,
        created_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "contact_messages"]
pub struct ContactMessage {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "contact_messages"]
pub struct NewContactMessage {
    #[validate(length(min = "2", max = "100"), custom = "validate_not_blank")]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
    #[validate(length(min = "3", max = "200"), custom = "validate_not_blank")]
    pub subject: String,
    #[validate(custom = "validate_contact_message")]
    pub message: String,
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Clone, Debug)]
#[table_name = "contact_messages"]
pub struct UpdateContactMessage {
    pub is_read: Option<bool>,
}

impl UpdateContactMessage {
    pub fn is_empty(&self) -> bool {
        self.is_read.is_none()
    }
}

#[derive(Default, Clone, Debug)]
pub struct ContactMessagesSearchTerms {
    pub search: Option<String>,
    pub is_read: Option<bool>,
}
