use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::class::{inheritance_check, AuthorizerClassRef};
use super::{AuthzError, ModelClass};

/// The configurable authorizer slots of a controller type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Explicit authorizer for the controller's own model, bypassing the
    /// registry. Not inherited by child controllers.
    ModelAuthorizer,
    /// Base class every model authorizer of the controller must descend
    /// from. Inherited from the nearest ancestor that sets it.
    ApplicationAuthorizer,
}

#[derive(Debug)]
struct ControllerNode {
    name: String,
    parent: Option<usize>,
    model: Option<ModelClass>,
    model_authorizer: Option<AuthorizerClassRef>,
    application_authorizer: Option<AuthorizerClassRef>,
}

/// Controller types in their configure phase.
///
/// Parents are declared before their children, the same order class
/// definitions load in. Every setter validates the authorizer inheritance
/// immediately and leaves the previous value untouched on failure. Call
/// [`ControllerTree::freeze`] once configuration is done to get the
/// immutable [`ControllerSet`] used while serving.
#[derive(Debug, Default)]
pub struct ControllerTree {
    nodes: Vec<ControllerNode>,
    index: HashMap<String, usize>,
}

impl ControllerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, parent: Option<&str>) -> Result<(), AuthzError> {
        if self.index.contains_key(name) {
            return Err(AuthzError::DuplicateController(name.to_string()));
        }
        let parent = match parent {
            Some(parent) => Some(self.position(parent)?),
            None => None,
        };

        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(ControllerNode {
            name: name.to_string(),
            parent,
            model: None,
            model_authorizer: None,
            application_authorizer: None,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Binds the controller to an explicit model class.
    pub fn set_model(&mut self, name: &str, model: ModelClass) -> Result<(), AuthzError> {
        let idx = self.position(name)?;
        self.nodes[idx].model = Some(model);
        Ok(())
    }

    pub fn set_model_authorizer(
        &mut self,
        name: &str,
        klass: AuthorizerClassRef,
    ) -> Result<(), AuthzError> {
        let idx = self.position(name)?;
        let application_authorizer = self.resolve_application_authorizer(idx);
        inheritance_check(Some(&klass), application_authorizer.as_ref())?;

        debug!("Set model authorizer of {name} to {klass}");
        self.nodes[idx].model_authorizer = Some(klass);
        Ok(())
    }

    pub fn model_authorizer(&self, name: &str) -> Result<Option<AuthorizerClassRef>, AuthzError> {
        let idx = self.position(name)?;
        Ok(self.nodes[idx].model_authorizer.clone())
    }

    pub fn set_application_authorizer(
        &mut self,
        name: &str,
        klass: AuthorizerClassRef,
    ) -> Result<(), AuthzError> {
        let idx = self.position(name)?;
        inheritance_check(self.nodes[idx].model_authorizer.as_ref(), Some(&klass))?;

        debug!("Set application authorizer of {name} to {klass}");
        self.nodes[idx].application_authorizer = Some(klass);
        Ok(())
    }

    /// The controller's own application authorizer, else the nearest
    /// ancestor's, else `None`.
    pub fn application_authorizer(
        &self,
        name: &str,
    ) -> Result<Option<AuthorizerClassRef>, AuthzError> {
        let idx = self.position(name)?;
        Ok(self.resolve_application_authorizer(idx))
    }

    pub fn get(&self, name: &str, slot: Slot) -> Result<Option<AuthorizerClassRef>, AuthzError> {
        match slot {
            Slot::ModelAuthorizer => self.model_authorizer(name),
            Slot::ApplicationAuthorizer => self.application_authorizer(name),
        }
    }

    /// Resolves inherited values once and checks the inheritance invariant
    /// of every controller again, so an ancestor reconfigured after its
    /// descendants is still caught before serving.
    pub fn freeze(self) -> Result<ControllerSet, AuthzError> {
        let mut frozen: Vec<Arc<ControllerClass>> = Vec::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            let application_authorizer = self.resolve_application_authorizer(idx);
            inheritance_check(
                node.model_authorizer.as_ref(),
                application_authorizer.as_ref(),
            )?;

            // Parents are always declared first, so they are frozen already.
            let parent = node.parent.map(|p| frozen[p].clone());
            let model = node
                .model
                .clone()
                .or_else(|| parent.as_ref().and_then(|p| p.model.clone()));

            frozen.push(Arc::new(ControllerClass {
                name: node.name.clone(),
                parent,
                model,
                model_authorizer: node.model_authorizer.clone(),
                application_authorizer,
            }));
        }

        let classes = frozen
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
        Ok(ControllerSet { classes })
    }

    fn position(&self, name: &str) -> Result<usize, AuthzError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| AuthzError::UnknownController(name.to_string()))
    }

    fn resolve_application_authorizer(&self, idx: usize) -> Option<AuthorizerClassRef> {
        let mut current = Some(idx);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if let Some(klass) = node.application_authorizer.as_ref() {
                return Some(klass.clone());
            }
            current = node.parent;
        }
        None
    }
}

/// A frozen controller type.
#[derive(Debug)]
pub struct ControllerClass {
    name: String,
    parent: Option<Arc<ControllerClass>>,
    model: Option<ModelClass>,
    model_authorizer: Option<AuthorizerClassRef>,
    application_authorizer: Option<AuthorizerClassRef>,
}

impl ControllerClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ControllerClass>> {
        self.parent.as_ref()
    }

    /// Explicit model binding, own or inherited.
    pub fn model(&self) -> Option<&ModelClass> {
        self.model.as_ref()
    }

    pub fn model_authorizer(&self) -> Option<&AuthorizerClassRef> {
        self.model_authorizer.as_ref()
    }

    pub fn application_authorizer(&self) -> Option<&AuthorizerClassRef> {
        self.application_authorizer.as_ref()
    }

    pub fn get(&self, slot: Slot) -> Option<&AuthorizerClassRef> {
        match slot {
            Slot::ModelAuthorizer => self.model_authorizer(),
            Slot::ApplicationAuthorizer => self.application_authorizer(),
        }
    }

    pub fn summary(&self) -> ControllerSummary {
        ControllerSummary {
            name: self.name.clone(),
            parent: self.parent.as_ref().map(|p| p.name.clone()),
            model: self.model.as_ref().map(|m| m.to_string()),
            model_authorizer: self.model_authorizer.as_ref().map(|c| c.name().to_string()),
            application_authorizer: self
                .application_authorizer
                .as_ref()
                .map(|c| c.name().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerSummary {
    pub name: String,
    pub parent: Option<String>,
    pub model: Option<String>,
    pub model_authorizer: Option<String>,
    pub application_authorizer: Option<String>,
}

/// All frozen controller types by name.
#[derive(Debug, Default)]
pub struct ControllerSet {
    classes: HashMap<String, Arc<ControllerClass>>,
}

impl ControllerSet {
    pub fn get(&self, name: &str) -> Result<Arc<ControllerClass>, AuthzError> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| AuthzError::UnknownController(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn summaries(&self) -> Vec<ControllerSummary> {
        let mut summaries: Vec<_> = self.classes.values().map(|c| c.summary()).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}
