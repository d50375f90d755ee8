//! Repair services offered per category, e.g. "Display Reparatur" for phones
use chrono::NaiveDateTime;
use validator::{Validate, ValidationErrors};

use models::price::price_label;
use models::validation_rules::*;

table! {
    services (id) {
        id -> Integer,
        category_id -> Integer,
        slug -> VarChar,
        name_de -> VarChar,
        name_en -> VarChar,
        description_de -> Nullable<VarChar>,
        description_en -> Nullable<VarChar>,
        icon -> Nullable<VarChar>,
        duration -> Nullable<VarChar>,
        price_min -> Nullable<Integer>,
        price_max -> Nullable<Integer>,
        price_display -> Nullable<VarChar>,
        display_order -> Integer,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

#[derive(Debug, Serialize, Deserialize, Queryable, Identifiable, Clone, PartialEq)]
#[table_name = "services"]
pub struct RepairService {
    pub id: i32,
    pub category_id: i32,
    pub slug: String,
    pub name_de: String,
    pub name_en: String,
    pub description_de: Option<String>,
    pub description_en: Option<String>,
    pub icon: Option<String>,
    pub duration: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub price_display: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RepairService {
    pub fn price_label(&self) -> Option<String> {
        price_label(self.price_min, self.price_max, self.price_display.as_ref().map(String::as_str))
    }
}

/// Service as shown on the public site, with the rendered price
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PublicRepairService {
    #[serde(flatten)]
    pub service: RepairService,
    pub price_label: Option<String>,
}

impl From<RepairService> for PublicRepairService {
    fn from(service: RepairService) -> Self {
        let price_label = service.price_label();
        Self { service, price_label }
    }
}

#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[table_name = "services"]
pub struct NewRepairService {
    pub category_id: i32,
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
    #[validate(length(max = "100"))]
    pub duration: Option<String>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_min: Option<i32>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_max: Option<i32>,
    #[validate(length(max = "100"))]
    pub price_display: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

impl NewRepairService {
    /// Field rules plus the price range check
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        validate_price_range(self.price_min, self.price_max)
    }
}

#[derive(Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "services"]
#[changeset_options(treat_none_as_null = "true")]
pub struct ReplaceRepairService {
    pub category_id: i32,
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
    #[validate(length(max = "100"))]
    pub duration: Option<String>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_min: Option<i32>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_max: Option<i32>,
    #[validate(length(max = "100"))]
    pub price_display: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: i32,
    pub is_active: bool,
}

impl ReplaceRepairService {
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        validate_price_range(self.price_min, self.price_max)
    }
}

#[derive(Default, Serialize, Deserialize, AsChangeset, Validate, Clone, Debug)]
#[table_name = "services"]
pub struct UpdateRepairService {
    pub category_id: Option<i32>,
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
    #[validate(length(max = "100"))]
    pub duration: Option<String>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_min: Option<i32>,
    #[validate(range(min = "0", max = "100000"))]
    pub price_max: Option<i32>,
    #[validate(length(max = "100"))]
    pub price_display: Option<String>,
    #[validate(range(min = "0", max = "10000"))]
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateRepairService {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.slug.is_none()
            && self.name_de.is_none()
            && self.name_en.is_none()
            && self.description_de.is_none()
            && self.description_en.is_none()
            && self.icon.is_none()
            && self.duration.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.price_display.is_none()
            && self.display_order.is_none()
            && self.is_active.is_none()
    }

    /// Price bounds are checked against the stored ones for the fields the patch leaves alone
    pub fn validate_against(&self, current: &RepairService) -> Result<(), ValidationErrors> {
        self.validate()?;
        validate_price_range(self.price_min.or(current.price_min), self.price_max.or(current.price_max))
    }
}

#[derive(Default, Clone, Debug)]
pub struct RepairServicesSearchTerms {
    pub category_id: Option<i32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
pub mod tests {
    use chrono::NaiveDate;

    use super::*;
    use models::validation_rules::tests::error_fields;

    pub fn create_repair_service(id: i32, category_id: i32, slug: &str, price_min: Option<i32>, price_max: Option<i32>) -> RepairService {
        let timestamp = NaiveDate::from_ymd(2024, 3, 1).and_hms(10, 0, 0);
        RepairService {
            id,
            category_id,
            slug: slug.to_string(),
            name_de: slug.to_string(),
            name_en: slug.to_string(),
            description_de: None,
            description_en: None,
            icon: None,
            duration: Some("1-2 Tage".to_string()),
            price_min,
            price_max,
            price_display: None,
            display_order: id,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn create_new_repair_service(category_id: i32, slug: &str) -> NewRepairService {
        NewRepairService {
            category_id,
            slug: slug.to_string(),
            name_de: "RAM Erweiterung".to_string(),
            name_en: "RAM upgrade".to_string(),
            description_de: None,
            description_en: None,
            icon: None,
            duration: None,
            price_min: Some(59),
            price_max: Some(249),
            price_display: None,
            display_order: 0,
            is_active: true,
        }
    }

    #[test]
    fn test_inverted_price_range_is_rejected() {
        let mut service = create_new_repair_service(2, "ram-erweiterung");
        assert!(service.validate_all().is_ok());

        service.price_min = Some(300);
        let fields = error_fields(&service.validate_all().unwrap_err());
        assert_eq!(fields, vec!["price_max".to_string()]);
    }

    #[test]
    fn test_patch_is_checked_against_stored_prices() {
        let current = create_repair_service(1, 2, "akku", Some(49), Some(99));
        let too_high = UpdateRepairService {
            price_min: Some(120),
            ..Default::default()
        };
        assert!(too_high.validate_against(&current).is_err());

        let fine = UpdateRepairService {
            price_min: Some(79),
            ..Default::default()
        };
        assert!(fine.validate_against(&current).is_ok());
    }

    #[test]
    fn test_public_service_carries_label() {
        let service: PublicRepairService = create_repair_service(7, 2, "ram-erweiterung", Some(59), Some(249)).into();
        assert_eq!(service.price_label, Some("€59-249".to_string()));
    }
}
