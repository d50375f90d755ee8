//! Key/value settings: contact data, addresses, business hours
use chrono::NaiveDateTime;
use serde_json;
use validator::Validate;

use models::validation_rules::*;

table! {
    settings (key) {
        key -> VarChar,
        value -> Jsonb,
        is_public -> Bool,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Clone, PartialEq)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub is_public: bool,
    pub updated_at: NaiveDateTime,
}

/// Body of `PUT /admin/settings/<key>`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PutSetting {
    pub value: serde_json::Value,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "settings"]
pub struct NewSetting {
    #[validate(length(min = "1", max = "100"), custom = "validate_setting_key")]
    pub key: String,
    pub value: serde_json::Value,
    pub is_public: bool,
}

impl NewSetting {
    /// Settings stay private unless marked otherwise
    pub fn new(key: String, payload: PutSetting) -> Self {
        Self {
            key,
            value: payload.value,
            is_public: payload.is_public.unwrap_or(false),
        }
    }
}
