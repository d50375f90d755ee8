//! Price labels and the aggregate estimate over selected repair services.
//!
//! Prices are whole euros. A service without a lower bound counts as zero,
//! a service without an upper bound costs exactly its lower bound.

use models::{Language, RepairService};

pub const CURRENCY_SIGN: &str = "€";

/// `€59-249` for a range, `€59` for a fixed price, the free text label when no price is set.
pub fn price_label(price_min: Option<i32>, price_max: Option<i32>, price_display: Option<&str>) -> Option<String> {
    match (price_min, price_max) {
        (Some(min), Some(max)) if min != max => Some(format!("{}{}-{}", CURRENCY_SIGN, min, max)),
        (Some(min), _) => Some(format!("{}{}", CURRENCY_SIGN, min)),
        (None, _) => price_display.map(|display| display.to_string()),
    }
}

/// Body of `POST /public/calculator/estimate`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub service_ids: Vec<i32>,
    #[serde(default)]
    pub lang: Language,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimateLine {
    pub service_id: i32,
    pub name: String,
    pub price_min: i32,
    pub price_max: i32,
    pub midpoint: f64,
    pub price_label: Option<String>,
}

impl EstimateLine {
    pub fn for_service(service: &RepairService, lang: Language) -> Self {
        let price_min = service.price_min.unwrap_or(0);
        let price_max = service.price_max.unwrap_or(price_min);
        Self {
            service_id: service.id,
            name: lang.pick(&service.name_de, &service.name_en).to_string(),
            price_min,
            price_max,
            midpoint: f64::from(price_min + price_max) / 2.0,
            price_label: service.price_label(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub lines: Vec<EstimateLine>,
    pub total_min: i64,
    pub total_max: i64,
    pub average: i64,
}

impl Estimate {
    pub fn from_lines(lines: Vec<EstimateLine>) -> Self {
        let total_min: i64 = lines.iter().map(|line| i64::from(line.price_min)).sum();
        let total_max: i64 = lines.iter().map(|line| i64::from(line.price_max)).sum();
        Self {
            lines,
            total_min,
            total_max,
            average: round_half_up(total_min + total_max),
        }
    }

    pub fn for_services(services: &[RepairService], lang: Language) -> Self {
        Estimate::from_lines(services.iter().map(|service| EstimateLine::for_service(service, lang)).collect())
    }
}

/// `round(sum / 2)` with halves rounded up
fn round_half_up(sum: i64) -> i64 {
    (sum as f64 / 2.0).round() as i64
}
