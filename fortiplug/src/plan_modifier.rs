use crate::schema::Field;
use crate::types::{values_equal, AttributePath, Diagnostic, Dynamic};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: AttributePath,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Adjusts the planned value of a single attribute.
///
/// Plan modifiers can:
/// - Modify the planned value
/// - Mark an attribute as requiring replacement
/// - Add warnings or errors to the plan
pub trait PlanModifier: Send + Sync {
    fn description(&self) -> String;

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks an attribute as requiring replacement when it changes
pub struct RequiresReplaceIfChanged;

impl PlanModifier for RequiresReplaceIfChanged {
    fn description(&self) -> String {
        "requires replacement when changed".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let requires_replace = !matches!(
            (&request.state, &request.plan),
            (Dynamic::Null, Dynamic::Null) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(&request.state, &request.plan);

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: Vec::new(),
        }
    }
}

/// Keeps the prior state value when the planned value is unknown
///
/// Computed attributes keep what the device reported instead of showing
/// as "known after apply" on every plan.
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "uses prior state for unknown values".to_string()
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plan_value = match &request.plan {
            Dynamic::Unknown | Dynamic::Null if !request.state.is_null() => request.state.clone(),
            _ => request.plan,
        };

        PlanModifyResponse {
            plan_value,
            requires_replace: false,
            diagnostics: Vec::new(),
        }
    }
}

/// Result of planning a resource change
#[derive(Debug, Clone, Default)]
pub struct PlannedChange {
    pub planned_state: HashMap<String, Dynamic>,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Computes the planned top-level state from the configuration and the prior
/// state. Computed fields the user left unset become unknown and are then
/// resolved by the field's plan modifiers. Replacement is only reported for
/// existing resources.
pub fn plan_resource_change(
    fields: &[Field],
    prior: Option<&HashMap<String, Dynamic>>,
    config: &HashMap<String, Dynamic>,
) -> PlannedChange {
    let mut change = PlannedChange::default();

    for field in fields {
        let config_value = config.get(&field.name).cloned().unwrap_or(Dynamic::Null);
        let state_value = prior
            .and_then(|p| p.get(&field.name))
            .cloned()
            .unwrap_or(Dynamic::Null);

        let mut plan_value = if config_value.is_null() && field.computed {
            Dynamic::Unknown
        } else {
            config_value.clone()
        };

        let path = AttributePath::new(&field.name);
        for modifier in &field.plan_modifiers {
            let response = modifier.modify_plan(PlanModifyRequest {
                state: state_value.clone(),
                plan: plan_value,
                config: config_value.clone(),
                attribute_path: path.clone(),
            });
            plan_value = response.plan_value;
            change.diagnostics.extend(response.diagnostics);
            if response.requires_replace && prior.is_some() {
                change.requires_replace.push(path.clone());
            }
        }

        if !plan_value.is_null() {
            change.planned_state.insert(field.name.clone(), plan_value);
        }
    }

    change
}
