//! Config validation
//!
//! Rules:
//! - deadline_ms > 0
//! - category names unique and non-empty
//! - backend names globally unique and non-empty
//! - every category has at least one backend
//! - latency_ms.min <= latency_ms.max
//! - failure_rate within [0, 1]

use std::collections::HashSet;

use contracts::{ContractError, SearchBlueprint};

/// Validate a SearchBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SearchBlueprint) -> Result<(), ContractError> {
    validate_deadline(blueprint)?;
    validate_category_names(blueprint)?;
    validate_backend_names(blueprint)?;
    validate_backend_settings(blueprint)?;
    Ok(())
}

fn validate_deadline(blueprint: &SearchBlueprint) -> Result<(), ContractError> {
    if blueprint.dispatch.deadline_ms == 0 {
        return Err(ContractError::config_validation(
            "dispatch.deadline_ms",
            "deadline_ms must be > 0",
        ));
    }
    Ok(())
}

/// Category names: unique, non-empty, at least one backend each
fn validate_category_names(blueprint: &SearchBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, category) in blueprint.categories.iter().enumerate() {
        if category.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("categories[{idx}].name"),
                "category name cannot be empty",
            ));
        }
        if !seen.insert(&category.name) {
            return Err(ContractError::config_validation(
                format!("categories[name={}]", category.name),
                "duplicate category name",
            ));
        }
        if category.backends.is_empty() {
            return Err(ContractError::config_validation(
                format!("categories[{}].backends", category.name),
                "category must have at least one backend",
            ));
        }
    }
    Ok(())
}

/// Backend names are unique across all categories
fn validate_backend_names(blueprint: &SearchBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for category in &blueprint.categories {
        for (idx, backend) in category.backends.iter().enumerate() {
            if backend.name.is_empty() {
                return Err(ContractError::config_validation(
                    format!("categories[{}].backends[{idx}].name", category.name),
                    "backend name cannot be empty",
                ));
            }
            if !seen.insert(&backend.name) {
                return Err(ContractError::config_validation(
                    format!("categories[{}].backends[name={}]", category.name, backend.name),
                    "duplicate backend name",
                ));
            }
        }
    }
    Ok(())
}

fn validate_backend_settings(blueprint: &SearchBlueprint) -> Result<(), ContractError> {
    for category in &blueprint.categories {
        for backend in &category.backends {
            let latency = backend.latency_ms;
            if latency.min > latency.max {
                return Err(ContractError::config_validation(
                    format!(
                        "categories[{}].backends[{}].latency_ms",
                        category.name, backend.name
                    ),
                    format!(
                        "latency_ms.min ({}) must be <= latency_ms.max ({})",
                        latency.min, latency.max
                    ),
                ));
            }
            if !(0.0..=1.0).contains(&backend.failure_rate) {
                return Err(ContractError::config_validation(
                    format!(
                        "categories[{}].backends[{}].failure_rate",
                        category.name, backend.name
                    ),
                    format!(
                        "failure_rate must be within [0, 1], got {}",
                        backend.failure_rate
                    ),
                ));
            }
        }
    }
    Ok(())
}
