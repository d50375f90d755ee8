//! Brands are manufacturers grouped under a category
use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    brands (id) {
        id -> Integer,
        category_id -> Integer,
        slug -> VarChar,
        name -> VarChar,
        logo -> Nullable<VarChar>,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "brands"]
pub struct Brand {
    pub id: i32,
    pub category_id: i32,
    pub slug: String,
    pub name: String,
    pub logo: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "brands"]
pub struct NewBrand {
    pub category_id: i32,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = "255"))]
    pub logo: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "brands"]
#[changeset_options(treat_none_as_null = "true")]
pub struct ReplaceBrand {
    pub category_id: i32,
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: String,
    #[validate(length(max = "255"))]
    pub logo: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "brands"]
pub struct UpdateBrand {
    pub category_id: Option<i32>,
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(length(max = "255"))]
    pub logo: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateBrand {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.slug.is_none()
            && self.name.is_none()
            && self.logo.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Default, Clone, Debug)]
pub struct BrandsSearchTerms {
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}
