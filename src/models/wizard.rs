//! Price calculator wizard. The whole state travels with every request,
//! the server only validates selections and renders the options of the current step.
use validator::ValidationErrors;

use models::{Estimate, Language};

pub const EMPTY_OPTIONS_MESSAGE: &str = "no items available";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Category,
    Brand,
    Model,
    Service,
    Results,
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Category
    }
}

impl WizardStep {
    pub fn previous(self) -> Self {
        match self {
            WizardStep::Category | WizardStep::Brand => WizardStep::Category,
            WizardStep::Model => WizardStep::Brand,
            WizardStep::Service => WizardStep::Model,
            WizardStep::Results => WizardStep::Service,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct WizardState {
    pub step: WizardStep,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub brand_id: Option<i32>,
    pub brand_name: Option<String>,
    pub model_id: Option<i32>,
    pub model_name: Option<String>,
    pub service_ids: Vec<i32>,
    pub search: Option<String>,
}

impl WizardState {
    /// Brand, model and the selected services all depend on the category, they are dropped
    pub fn select_category(self, id: i32, name: String) -> Self {
        WizardState {
            step: WizardStep::Brand,
            category_id: Some(id),
            category_name: Some(name),
            ..WizardState::default()
        }
    }

    pub fn select_brand(self, id: i32, name: String) -> Self {
        WizardState {
            step: WizardStep::Model,
            brand_id: Some(id),
            brand_name: Some(name),
            model_id: None,
            model_name: None,
            search: None,
            ..self
        }
    }

    pub fn select_model(self, id: i32, name: String) -> Self {
        WizardState {
            step: WizardStep::Service,
            model_id: Some(id),
            model_name: Some(name),
            ..self
        }
    }

    pub fn toggle_service(mut self, id: i32) -> Self {
        if self.service_ids.contains(&id) {
            self.service_ids.retain(|selected| *selected != id);
        } else {
            self.service_ids.push(id);
        }
        self
    }

    pub fn search(self, term: &str) -> Self {
        let term = term.trim();
        WizardState {
            search: if term.is_empty() { None } else { Some(term.to_string()) },
            ..self
        }
    }

    pub fn show_results(self) -> Result<Self, ValidationErrors> {
        if self.service_ids.is_empty() {
            Err(validation_errors!({"service_ids": ["required" => "Select at least one service"]}))
        } else {
            Ok(WizardState {
                step: WizardStep::Results,
                ..self
            })
        }
    }

    /// Goes one step back and keeps every selection
    pub fn back(self) -> Self {
        WizardState {
            step: self.step.previous(),
            ..self
        }
    }

    pub fn reset(self) -> Self {
        WizardState::default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    SelectCategory { id: i32 },
    SelectBrand { id: i32 },
    SelectModel { id: i32 },
    ToggleService { id: i32 },
    Search { term: String },
    ShowResults,
    Back,
    Reset,
    Refresh,
}

/// Body of `POST /public/wizard`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WizardRequest {
    #[serde(default)]
    pub state: WizardState,
    pub event: WizardEvent,
    #[serde(default)]
    pub lang: Language,
}

/// One selectable entry of the current step
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WizardOption {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_label: Option<String>,
    pub selected: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WizardView {
    pub state: WizardState,
    pub options: Vec<WizardOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<Estimate>,
}

impl WizardView {
    pub fn new(state: WizardState, options: Vec<WizardOption>, estimate: Option<Estimate>) -> Self {
        let empty_message = if options.is_empty() && state.step != WizardStep::Results {
            Some(EMPTY_OPTIONS_MESSAGE.to_string())
        } else {
            None
        };
        Self {
            state,
            options,
            empty_message,
            estimate,
        }
    }
}
