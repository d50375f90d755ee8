//! Editable text blocks of the static pages, addressed by `(page, block_key)`
use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    contents (id) {
        id -> Integer,
        page -> VarChar,
        block_key -> VarChar,
        title_de -> Nullable<VarChar>,
        title_en -> Nullable<VarChar>,
        body_de -> VarChar,
        body_en -> VarChar,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "contents"]
pub struct ContentBlock {
    pub id: i32,
    pub page: String,
    pub block_key: String,
    pub title_de: Option<String>,
    pub title_en: Option<String>,
    pub body_de: String,
    pub body_en: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "contents"]
pub struct NewContentBlock {
    #[validate(custom = "validate_slug")]
    pub page: String,
    #[validate(custom = "validate_slug")]
    pub block_key: String,
    #[validate(length(min = "1", max = "100"))]
    pub title_de: Option<String>,
    #[validate(length(min = "1", max = "100"))]
    pub title_en: Option<String>,
    #[validate(length(max = "20000"))]
    pub body_de: String,
    #[validate(length(max = "20000"))]
    pub body_en: String,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "contents"]
#[changeset_options(treat_none_as_null = "true")]
pub struct ReplaceContentBlock {
    #[validate(custom = "validate_slug")]
    pub page: String,
    #[validate(custom = "validate_slug")]
    pub block_key: String,
    #[validate(length(min = "1", max = "100"))]
    pub title_de: Option<String>,
    #[validate(length(min = "1", max = "100"))]
    pub title_en: Option<String>,
    #[validate(length(max = "20000"))]
    pub body_de: String,
    #[validate(length(max = "20000"))]
    pub body_en: String,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "contents"]
pub struct UpdateContentBlock {
    #[validate(custom = "validate_slug")]
    pub page: Option<String>,
    #[validate(custom = "validate_slug")]
    pub block_key: Option<String>,
    #[validate(length(min = "1", max = "100"))]
    pub title_de: Option<String>,
    #[validate(length(min = "1", max = "100"))]
    pub title_en: Option<String>,
    #[validate(length(max = "20000"))]
    pub body_de: Option<String>,
    #[validate(length(max = "20000"))]
    pub body_en: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateContentBlock {
    pub fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.block_key.is_none()
            && self.title_de.is_none()
            && self.title_en.is_none()
            && self.body_de.is_none()
            && self.body_en.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Default, Clone, Debug)]
pub struct ContentBlocksSearchTerms {
    pub page: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub fn create_content_block(id: i32, page: &str, block_key: &str) -> ContentBlock {
        let timestamp = NaiveDate::from_ymd(2024, 3, 1).and_hms(10, 0, 0);
        ContentBlock {
            id,
            page: page.to_string(),
            block_key: block_key.to_string(),
            title_de: Some("Über uns".to_string()),
            title_en: Some("About us".to_string()),
            body_de: "Seit 2010 in Berlin.".to_string(),
            body_en: "In Berlin since 2010.".to_string(),
            display_order: id,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}
