//! Device models are concrete devices of a brand, e.g. "iPhone 15 Pro"
use chrono::NaiveDateTime;
use validator::Validate;

use models::matches_search;
use models::validation_rules::*;

table! {
    models (id) {
        id -> Integer,
        brand_id -> Integer,
        slug -> VarChar,
        name -> VarChar,
        release_year -> Nullable<Integer>,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "models"]
pub struct DeviceModel {
    pub id: i32,
    pub brand_id: i32,
    pub slug: String,
    pub name: String,
    pub release_year: Option<i32>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DeviceModel {
    /// Search on the wizard model step and the admin list, by display name only
    pub fn matches_name(&self, search: Option<&str>) -> bool {
        matches_search(search, &[&self.name])
    }
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "models"]
pub struct NewDeviceModel {
    pub brand_id: i32,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: String,
    #[validate(range(min = "1990", max = "2100"))]
    pub release_year: Option<i32>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "models"]
#[changeset_options(treat_none_as_null = "true")]
pub struct ReplaceDeviceModel {
    pub brand_id: i32,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: String,
    #[validate(range(min = "1990", max = "2100"))]
    pub release_year: Option<i32>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "models"]
pub struct UpdateDeviceModel {
    pub brand_id: Option<i32>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(range(min = "1990", max = "2100"))]
    pub release_year: Option<i32>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateDeviceModel {
    pub fn is_empty(&self) -> bool {
        self.brand_id.is_none()
            && self.slug.is_none()
            && self.name.is_none()
            && self.release_year.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Default, Clone, Debug)]
pub struct DeviceModelsSearchTerms {
    pub brand_id: Option<i32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}
