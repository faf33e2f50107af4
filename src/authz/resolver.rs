use anyhow::{bail, Result};

use super::controller::ControllerClass;
use super::ModelClass;

/// Determines the model a controller primarily works on.
pub trait ModelResolver: Send + Sync {
    fn current_model_class(&self, controller: &ControllerClass) -> Result<ModelClass>;
}

/// Uses the controller's explicit model binding when there is one, else
/// derives the model from the controller name: `Admin::ProductsController`
/// governs `Product`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConventionResolver;

impl ConventionResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ModelResolver for ConventionResolver {
    fn current_model_class(&self, controller: &ControllerClass) -> Result<ModelClass> {
        if let Some(model) = controller.model() {
            return Ok(model.clone());
        }
        model_name_of(controller.name()).map(ModelClass::new)
    }
}

pub fn model_name_of(controller: &str) -> Result<String> {
    let last = controller.rsplit("::").next().unwrap_or(controller);
    let resources = last.strip_suffix("Controller").unwrap_or(last);
    if resources.is_empty() {
        bail!("cannot derive model name from controller '{controller}'");
    }
    Ok(singularize(resources))
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("sses") {
        return format!("{stem}ss");
    }
    if word.ends_with("ss") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::authz::controller::ControllerTree;

    use super::*;

    #[test]
    fn test_model_name_of() {
        let cases = [
            ("Admin::ProductsController", "Product"),
            ("CategoriesController", "Category"),
            ("Admin::AddressesController", "Address"),
            ("Admin::Billing::InvoicesController", "Invoice"),
            ("AccessController", "Access"),
            ("Admin::Product", "Product"),
        ];
        for (controller, expect) in cases {
            assert_eq!(model_name_of(controller).unwrap(), expect, "{controller}");
        }

        assert!(model_name_of("Admin::Controller").is_err());
    }

    #[test]
    fn test_explicit_binding_wins() {
        let mut tree = ControllerTree::new();
        tree.declare("Admin::ApplicationController", None).unwrap();
        tree.declare(
            "Admin::GoodsController",
            Some("Admin::ApplicationController"),
        )
        .unwrap();
        tree.declare("Admin::OrdersController", None).unwrap();
        tree.set_model("Admin::GoodsController", ModelClass::new("Product"))
            .unwrap();
        let set = tree.freeze().unwrap();

        let resolver = ConventionResolver::new();
        let goods = set.get("Admin::GoodsController").unwrap();
        assert_eq!(resolver.current_model_class(&goods).unwrap().name(), "Product");

        let orders = set.get("Admin::OrdersController").unwrap();
        assert_eq!(resolver.current_model_class(&orders).unwrap().name(), "Order");
    }
}
