use std::fmt;
use std::sync::Arc;

use super::context::AuthzContext;
use super::{Authorizer, AuthzError, ModelClass};

pub type AuthorizerClassRef = Arc<AuthorizerClass>;

pub type Constructor =
    dyn Fn(&AuthorizerClass, &AuthzContext, &ModelClass) -> Box<dyn Authorizer> + Send + Sync;

/// An authorizer type: its name, its place in the inheritance tree, the
/// model it governs (if any) and how to build instances of it.
///
/// Class identity is pointer identity of the shared [`AuthorizerClassRef`],
/// two classes with the same name are still different classes.
pub struct AuthorizerClass {
    name: String,
    parent: Option<AuthorizerClassRef>,
    model: Option<ModelClass>,
    constructor: Option<Arc<Constructor>>,
}

impl AuthorizerClass {
    /// Creates a root class.
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&AuthorizerClass, &AuthzContext, &ModelClass) -> Box<dyn Authorizer>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            parent: None,
            model: None,
            constructor: Some(Arc::new(constructor)),
        }
    }

    /// Creates a subclass of `parent`. Instances are built by the nearest
    /// ancestor constructor unless [`AuthorizerClass::with_constructor`] is
    /// used.
    pub fn inherit(name: impl Into<String>, parent: &AuthorizerClassRef) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.clone()),
            model: None,
            constructor: None,
        }
    }

    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&AuthorizerClass, &AuthzContext, &ModelClass) -> Box<dyn Authorizer>
            + Send
            + Sync
            + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// Binds this class to the model it governs, used by registry lookup.
    /// Without a binding the model is implied by the class name, see
    /// [`AuthorizerClass::implied_model`].
    pub fn with_model(mut self, model: impl Into<ModelClass>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn into_ref(self) -> AuthorizerClassRef {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&AuthorizerClassRef> {
        self.parent.as_ref()
    }

    pub fn model(&self) -> Option<&ModelClass> {
        self.model.as_ref()
    }

    /// Iterates over the strict ancestors, nearest first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent.as_deref(),
        }
    }

    /// True when `other` is a strict ancestor of this class.
    pub fn is_subclass_of(&self, other: &AuthorizerClass) -> bool {
        self.ancestors().any(|ancestor| std::ptr::eq(ancestor, other))
    }

    /// Model named by the class: `Admin::ProductAuthorizer` governs
    /// `Product`. `None` when the name does not end in `Authorizer` or
    /// nothing precedes the suffix.
    pub fn implied_model(&self) -> Option<ModelClass> {
        let last = self.name.rsplit("::").next().unwrap_or(&self.name);
        match last.strip_suffix("Authorizer") {
            Some(model) if !model.is_empty() => Some(ModelClass::new(model)),
            _ => None,
        }
    }

    /// Builds an authorizer instance for `model` within `ctx`.
    pub fn instantiate(&self, ctx: &AuthzContext, model: &ModelClass) -> Box<dyn Authorizer> {
        // A root class always carries a constructor, so the walk ends there.
        let constructor = std::iter::once(self)
            .chain(self.ancestors())
            .find_map(|class| class.constructor.as_ref());
        match constructor {
            Some(constructor) => constructor(self, ctx, model),
            None => unreachable!("root authorizer class without constructor"),
        }
    }
}

impl fmt::Debug for AuthorizerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizerClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("model", &self.model)
            .finish()
    }
}

impl fmt::Display for AuthorizerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a AuthorizerClass>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a AuthorizerClass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Checks that `klass` strictly inherits from `parent`. Passes when either
/// is missing, there is nothing to validate yet.
pub fn inheritance_check(
    klass: Option<&AuthorizerClassRef>,
    parent: Option<&AuthorizerClassRef>,
) -> Result<(), AuthzError> {
    let (Some(klass), Some(parent)) = (klass, parent) else {
        return Ok(());
    };
    if klass.is_subclass_of(parent) {
        return Ok(());
    }

    Err(AuthzError::Configuration {
        klass: klass.name().to_string(),
        parent: parent.name().to_string(),
    })
}
