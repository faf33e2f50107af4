use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use log::debug;

use super::class::AuthorizerClassRef;
use super::ModelClass;

/// Maps a model to the authorizer class that governs it.
pub trait AuthorizerRegistry: Send + Sync {
    /// Returns an authorizer class for `model`. When `base` is given the
    /// returned class is `base` or one of its descendants.
    fn lookup(
        &self,
        model: &ModelClass,
        base: Option<&AuthorizerClassRef>,
    ) -> Result<AuthorizerClassRef>;
}

/// Default registry over a known set of authorizer classes.
///
/// Among the descendants of the base class (the generic root class when no
/// base is given), the one bound to the model wins. A class without an
/// explicit binding is bound to the model its name implies, explicit
/// bindings take precedence. Without such a class, the base itself
/// governs the model.
pub struct AuthorizerMap {
    generic: AuthorizerClassRef,
    classes: Vec<AuthorizerClassRef>,

    /// Keyed by base class address, the base is kept alive in the value so
    /// the address cannot be reused.
    cache: Mutex<HashMap<(usize, ModelClass), (AuthorizerClassRef, AuthorizerClassRef)>>,
}

impl AuthorizerMap {
    pub fn new(generic: AuthorizerClassRef) -> Self {
        Self {
            generic,
            classes: vec![],
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&mut self, class: AuthorizerClassRef) {
        self.classes.push(class);
        self.cache.get_mut().unwrap().clear();
    }

    pub fn generic(&self) -> &AuthorizerClassRef {
        &self.generic
    }

    pub fn classes(&self) -> &[AuthorizerClassRef] {
        &self.classes
    }

    /// Finds a registered class (or the generic one) by name.
    pub fn find(&self, name: &str) -> Option<&AuthorizerClassRef> {
        std::iter::once(&self.generic)
            .chain(self.classes.iter())
            .find(|class| class.name() == name)
    }

    fn resolve(
        &self,
        model: &ModelClass,
        base: &AuthorizerClassRef,
    ) -> Result<AuthorizerClassRef> {
        let descendants: Vec<_> = self
            .classes
            .iter()
            .filter(|class| class.is_subclass_of(base))
            .collect();

        let mut candidates: Vec<_> = descendants
            .iter()
            .filter(|class| class.model() == Some(model))
            .collect();
        if candidates.is_empty() {
            candidates = descendants
                .iter()
                .filter(|class| {
                    class.model().is_none() && class.implied_model().as_ref() == Some(model)
                })
                .collect();
        }

        match candidates.as_slice() {
            [] => Ok(base.clone()),
            [found] => Ok(Arc::clone(found)),
            [found, other, ..] => bail!(
                "ambiguous authorizer for model {model} under {base}: \
                 both {found} and {other} are bound to it"
            ),
        }
    }
}

impl AuthorizerRegistry for AuthorizerMap {
    fn lookup(
        &self,
        model: &ModelClass,
        base: Option<&AuthorizerClassRef>,
    ) -> Result<AuthorizerClassRef> {
        let base = base.unwrap_or(&self.generic);
        let key = (Arc::as_ptr(base) as usize, model.clone());

        if let Some((_, class)) = self.cache.lock().unwrap().get(&key) {
            return Ok(class.clone());
        }

        let class = self.resolve(model, base)?;
        debug!("Resolved authorizer {class} for model {model} under {base}");
        self.cache
            .lock()
            .unwrap()
            .insert(key, (base.clone(), class.clone()));
        Ok(class)
    }
}
