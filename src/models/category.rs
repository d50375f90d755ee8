//! Categories are the top level device classes (phone, notebook, ...)
use chrono::NaiveDateTime;
use validator::Validate;

use models::validation_rules::*;

table! {
    categories (id) {
        id -> Integer,
        slug -> VarChar,
        name_de -> VarChar,
        name_en -> VarChar,
        description_de -> Nullable<VarChar>,
        description_en -> Nullable<VarChar>,
        icon -> Nullable<VarChar>,
        badge -> Nullable<VarChar>,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "categories"]
pub struct Category {
    pub id: i32,
    pub slug: String,
    pub name_de: String,
    pub name_en: String,
    pub description_de: Option<String>,
    pub description_en: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating categories
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "categories"]
pub struct NewCategory {
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_de: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_en: String,
    #[validate(length(max = "2000"))]
    pub description_de: Option<String>,
    #[validate(length(max = "2000"))]
    pub description_en: Option<String>,
    #[validate(length(max = "255"))]
    pub icon: Option<String>,
    #[validate(length(max = "50"))]
    pub badge: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

/// Payload for replacing every mutable field of a category
#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "categories"]
#[changeset_options(treat_none_as_null = "true")]
pub struct ReplaceCategory {
    #[validate(custom = "validate_slug")]
    pub slug: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_de: String,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_en: String,
    #[validate(length(max = "2000"))]
    pub description_de: Option<String>,
    #[validate(length(max = "2000"))]
    pub description_en: Option<String>,
    #[validate(length(max = "255"))]
    pub icon: Option<String>,
    #[validate(length(max = "50"))]
    pub badge: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

/// Payload for updating categories, absent fields are left untouched
#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "categories"]
pub struct UpdateCategory {
    #[validate(custom = "validate_slug")]
    pub slug: Option<String>,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_de: Option<String>,
    #[validate(length(min = "1", max = "100"), custom = "validate_not_blank")]
    pub name_en: Option<String>,
    #[validate(length(max = "2000"))]
    pub description_de: Option<String>,
    #[validate(length(max = "2000"))]
    pub description_en: Option<String>,
    #[validate(length(max = "255"))]
    pub icon: Option<String>,
    #[validate(length(max = "50"))]
    pub badge: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateCategory {
    pub fn is_empty(&self) -> bool {
        self.slug.is_none()
            && self.name_de.is_none()
            && self.name_en.is_none()
            && self.description_de.is_none()
            && self.description_en.is_none()
            && self.icon.is_none()
            && self.badge.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct MoveCategory {
    pub direction: MoveDirection,
}

#[derive(Default, Clone, Debug)]
pub struct CategoriesSearchTerms {
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::*;
    use models::validation_rules::tests::error_fields;

    pub fn create_category(id: i32, slug: &str, display_order: i32) -> Category {
        let timestamp = NaiveDate::from_ymd(2024, 3, 1).and_hms(10, 0, 0);
        Category {
            id,
            slug: slug.to_string(),
            name_de: slug.to_string(),
            name_en: slug.to_string(),
            description_de: None,
            description_en: None,
            icon: None,
            badge: None,
            display_order,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn create_new_category(slug: &str) -> NewCategory {
        NewCategory {
            slug: slug.to_string(),
            name_de: "Notebook".to_string(),
            name_en: "Notebook".to_string(),
            description_de: None,
            description_en: None,
            icon: Some("laptop".to_string()),
            badge: None,
            display_order: 1,
            is_active: true,
        }
    }

    #[test]
    fn test_new_category_validation() {
        assert!(create_new_category("notebook").validate().is_ok());

        let mut invalid = create_new_category("Note Book");
        invalid.name_en = "   ".to_string();
        let fields = error_fields(&invalid.validate().unwrap_err());
        assert_eq!(fields, vec!["name_en".to_string(), "slug".to_string()]);
    }

    #[test]
    fn test_empty_update() {
        assert!(UpdateCategory::default().is_empty());
        let toggle = UpdateCategory {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!toggle.is_empty());
    }
}
