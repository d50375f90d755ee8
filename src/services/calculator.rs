//! Calculator Services: the step-by-step price wizard and the bare estimate endpoint.
//!
//! The wizard state is owned by the client. Every request carries it together with
//! one event; the service checks the event against the catalogue and answers with the
//! next state plus the options of the step the visitor lands on.
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use models::*;
use repos::*;
use services::{validation_error, Service};

pub trait CalculatorService {
    /// Applies a wizard event and renders the resulting step
    fn handle_wizard_event(&self, request: WizardRequest) -> ServiceFuture<WizardView>;
    /// Returns the estimate over active services, unknown ids are skipped
    fn estimate(&self, request: EstimateRequest) -> ServiceFuture<Estimate>;
}

struct CatalogueRepos<'a> {
    categories: Box<CategoriesRepo + 'a>,
    brands: Box<BrandsRepo + 'a>,
    models: Box<DeviceModelsRepo + 'a>,
    services: Box<RepairServicesRepo + 'a>,
}

fn invalid_selection(field: &'static str, message: &'static str) -> FailureError {
    validation_error(validation_errors!({field: ["invalid_selection" => message]}))
}

fn expect_step(state: &WizardState, step: WizardStep) -> Result<(), FailureError> {
    if state.step == step {
        Ok(())
    } else {
        Err(invalid_selection("step", "Event does not belong to the current step"))
    }
}

/// Required selections per step, as `(category, brand, model, services)`
fn required_selections(step: WizardStep) -> (bool, bool, bool, bool) {
    match step {
        WizardStep::Category => (false, false, false, false),
        WizardStep::Brand => (true, false, false, false),
        WizardStep::Model => (true, true, false, false),
        WizardStep::Service => (true, true, true, false),
        WizardStep::Results => (true, true, true, true),
    }
}

/// Checks the submitted state against the catalogue, every selection must
/// still exist, be active and belong to the selection one step above it.
fn check_state(state: &WizardState, repos: &CatalogueRepos) -> Result<(), FailureError> {
    let (needs_category, needs_brand, needs_model, needs_services) = required_selections(state.step);
    if (needs_category && state.category_id.is_none())
        || (needs_brand && state.brand_id.is_none())
        || (needs_model && state.model_id.is_none())
        || (needs_services && state.service_ids.is_empty())
    {
        return Err(invalid_selection("step", "Step is missing a selection"));
    }

    if let Some(category_id) = state.category_id {
        match repos.categories.find(category_id)? {
            Some(ref category) if category.is_active => (),
            _ => return Err(invalid_selection("category_id", "Unknown category")),
        }
    }
    if let Some(brand_id) = state.brand_id {
        match repos.brands.find(brand_id)? {
            Some(ref brand) if brand.is_active && Some(brand.category_id) == state.category_id => (),
            _ => return Err(invalid_selection("brand_id", "Unknown brand for this category")),
        }
    }
    if let Some(model_id) = state.model_id {
        match repos.models.find(model_id)? {
            Some(ref model) if model.is_active && Some(model.brand_id) == state.brand_id => (),
            _ => return Err(invalid_selection("model_id", "Unknown model for this brand")),
        }
    }
    if !state.service_ids.is_empty() {
        let services = repos.services.find_many(state.service_ids.clone())?;
        let all_valid = state.service_ids.iter().all(|id| {
            services
                .iter()
                .any(|service| service.id == *id && service.is_active && Some(service.category_id) == state.category_id)
        });
        if !all_valid {
            return Err(invalid_selection("service_ids", "Unknown service for this category"));
        }
    }
    Ok(())
}

fn apply_event(state: WizardState, event: WizardEvent, lang: Language, repos: &CatalogueRepos) -> Result<WizardState, FailureError> {
    match event {
        WizardEvent::SelectCategory { id } => {
            expect_step(&state, WizardStep::Category)?;
            match repos.categories.find(id)? {
                Some(ref category) if category.is_active => {
                    let name = lang.pick(&category.name_de, &category.name_en).to_string();
                    Ok(state.select_category(id, name))
                }
                _ => Err(invalid_selection("category_id", "Unknown category")),
            }
        }
        WizardEvent::SelectBrand { id } => {
            expect_step(&state, WizardStep::Brand)?;
            match repos.brands.find(id)? {
                Some(ref brand) if brand.is_active && Some(brand.category_id) == state.category_id => {
                    let name = brand.name.clone();
                    Ok(state.select_brand(id, name))
                }
                _ => Err(invalid_selection("brand_id", "Unknown brand for this category")),
            }
        }
        WizardEvent::SelectModel { id } => {
            expect_step(&state, WizardStep::Model)?;
            match repos.models.find(id)? {
                Some(ref model) if model.is_active && Some(model.brand_id) == state.brand_id => {
                    let name = model.name.clone();
                    Ok(state.select_model(id, name))
                }
                _ => Err(invalid_selection("model_id", "Unknown model for this brand")),
            }
        }
        WizardEvent::ToggleService { id } => {
            expect_step(&state, WizardStep::Service)?;
            // deselecting never needs the catalogue
            if state.service_ids.contains(&id) {
                return Ok(state.toggle_service(id));
            }
            match repos.services.find(id)? {
                Some(ref service) if service.is_active && Some(service.category_id) == state.category_id => Ok(state.toggle_service(id)),
                _ => Err(invalid_selection("service_id", "Unknown service for this category")),
            }
        }
        WizardEvent::Search { term } => {
            expect_step(&state, WizardStep::Model)?;
            Ok(state.search(&term))
        }
        WizardEvent::ShowResults => {
            expect_step(&state, WizardStep::Service)?;
            state.show_results().map_err(validation_error)
        }
        WizardEvent::Back => Ok(state.back()),
        WizardEvent::Reset => Ok(state.reset()),
        WizardEvent::Refresh => Ok(state),
    }
}

fn load_options(state: &WizardState, lang: Language, repos: &CatalogueRepos) -> Result<Vec<WizardOption>, FailureError> {
    match state.step {
        WizardStep::Category => {
            let terms = CategoriesSearchTerms {
                is_active: Some(true),
                ..Default::default()
            };
            Ok(repos
                .categories
                .list(terms)?
                .into_iter()
                .map(|category| WizardOption {
                    id: category.id,
                    name: lang.pick(&category.name_de, &category.name_en).to_string(),
                    description: match lang {
                        Language::De => category.description_de.clone(),
                        Language::En => category.description_en.clone(),
                    },
                    icon: category.icon.clone(),
                    price_label: None,
                    selected: state.category_id == Some(category.id),
                }).collect())
        }
        WizardStep::Brand => {
            let category_id = match state.category_id {
                Some(category_id) => category_id,
                None => return Ok(vec![]),
            };
            let terms = BrandsSearchTerms {
                category_id: Some(category_id),
                is_active: Some(true),
                ..Default::default()
            };
            Ok(repos
                .brands
                .list(terms)?
                .into_iter()
                .map(|brand| WizardOption {
                    id: brand.id,
                    selected: state.brand_id == Some(brand.id),
                    name: brand.name,
                    description: None,
                    icon: brand.logo,
                    price_label: None,
                }).collect())
        }
        WizardStep::Model => {
            let brand_id = match state.brand_id {
                Some(brand_id) => brand_id,
                None => return Ok(vec![]),
            };
            let terms = DeviceModelsSearchTerms {
                brand_id: Some(brand_id),
                search: state.search.clone(),
                is_active: Some(true),
            };
            Ok(repos
                .models
                .list(terms)?
                .into_iter()
                .map(|model| WizardOption {
                    id: model.id,
                    selected: state.model_id == Some(model.id),
                    name: model.name,
                    description: None,
                    icon: None,
                    price_label: None,
                }).collect())
        }
        WizardStep::Service => {
            let category_id = match state.category_id {
                Some(category_id) => category_id,
                None => return Ok(vec![]),
            };
            let terms = RepairServicesSearchTerms {
                category_id: Some(category_id),
                is_active: Some(true),
                ..Default::default()
            };
            Ok(repos
                .services
                .list(terms)?
                .into_iter()
                .map(|service| WizardOption {
                    id: service.id,
                    name: lang.pick(&service.name_de, &service.name_en).to_string(),
                    description: match lang {
                        Language::De => service.description_de.clone(),
                        Language::En => service.description_en.clone(),
                    },
                    icon: service.icon.clone(),
                    price_label: service.price_label(),
                    selected: state.service_ids.contains(&service.id),
                }).collect())
        }
        WizardStep::Results => Ok(vec![]),
    }
}

/// Estimate over the active services among `service_ids`, restricted to
/// `category_id` when one is given.
fn estimate_for(
    services_repo: &RepairServicesRepo,
    service_ids: Vec<i32>,
    category_id: Option<i32>,
    lang: Language,
) -> Result<Estimate, FailureError> {
    let services = services_repo
        .find_many(service_ids)?
        .into_iter()
        .filter(|service| service.is_active)
        .filter(|service| category_id.map(|id| service.category_id == id).unwrap_or(true))
        .collect::<Vec<RepairService>>();
    Ok(Estimate::for_services(&services, lang))
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CalculatorService for Service<T, M, F>
{
    fn handle_wizard_event(&self, request: WizardRequest) -> ServiceFuture<WizardView> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let repos = CatalogueRepos {
                categories: repo_factory.create_categories_repo(&*conn, user_id),
                brands: repo_factory.create_brands_repo(&*conn, user_id),
                models: repo_factory.create_device_models_repo(&*conn, user_id),
                services: repo_factory.create_repair_services_repo(&*conn, user_id),
            };
            let WizardRequest { state, event, lang } = request;
            debug!("Wizard event {:?} on step {:?}.", event, state.step);

            let checked = if event == WizardEvent::Reset {
                Ok(())
            } else {
                check_state(&state, &repos)
            };

            checked
                .and_then(|_| apply_event(state, event, lang, &repos))
                .and_then(|state| {
                    let options = load_options(&state, lang, &repos).unwrap_or_else(|e| {
                        error!("Wizard options for step {:?} could not be loaded: {}", state.step, e);
                        vec![]
                    });
                    let estimate = if state.step == WizardStep::Results {
                        Some(estimate_for(&*repos.services, state.service_ids.clone(), state.category_id, lang)?)
                    } else {
                        None
                    };
                    Ok(WizardView::new(state, options, estimate))
                }).map_err(|e: FailureError| e.context("Service Calculator, handle_wizard_event endpoint error occurred.").into())
        })
    }

    fn estimate(&self, request: EstimateRequest) -> ServiceFuture<Estimate> {
        let user_id = self.dynamic_context.user_id;
        let repo_factory = self.static_context.repo_factory.clone();

        self.spawn_on_pool(move |conn| {
            let services_repo = repo_factory.create_repair_services_repo(&*conn, user_id);
            estimate_for(&*services_repo, request.service_ids, None, request.lang)
                .map_err(|e: FailureError| e.context("Service Calculator, estimate endpoint error occurred.").into())
        })
    }
}
