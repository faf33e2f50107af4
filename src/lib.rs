//! Authorizer resolution for admin-style CRUD controllers, plus the typed
//! field cells their index and show pages render with.
//!
//! A [`authz::ControllerTree`] is configured once (which authorizer class
//! governs a controller's model, which base class every model authorizer
//! must descend from), frozen, and then every request gets an
//! [`authz::AuthzContext`] to ask whether an action is permitted.

pub mod authz;
pub mod cells;
pub mod config;
pub mod display;
pub mod i18n;
pub mod logs;
