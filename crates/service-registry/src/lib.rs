//! Service registration and bookkeeping for a service container.
//!
//! This crate accumulates factory declarations and provider registrations
//! during process bootstrap. It enforces the override rules (one factory
//! per nominal type, one provider per concrete type) and renders a sorted
//! inventory for diagnostics. Instantiation is out of scope: a finished
//! [`Services`] value is handed to an external resolver, which reads the
//! declarations and invokes their construction capabilities.

/// Factory declarations describing how services are produced.
pub mod factory;
/// Providers: self-contained units of registration logic.
pub mod provider;
/// The registry accumulating factories and providers.
pub mod services;

pub use factory::{DefaultConstructor, ServiceConstructor, ServiceFactory};
pub use provider::{Provider, RegisteredProvider};
pub use services::Services;
