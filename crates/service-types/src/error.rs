//! Error types for the service container system.
//!
//! A single error enum covers both sides of the contract: registration
//! failures raised by providers, and construction failures that only
//! surface once a resolver invokes a factory.

use thiserror::Error;

/// Errors that can occur during service registration and resolution.
#[derive(Debug, Error)]
pub enum RegistryError {
	/// Error raised by a provider's registration callback.
	#[error("Provider error: {0}")]
	Provider(String),
	/// Error raised by a construction closure while building a service.
	///
	/// Never observed during registration; the registry stores the closure
	/// without invoking it.
	#[error("Construction error: {0}")]
	Construction(String),
	/// Error raised by a resolver when no factory declares the requested type.
	#[error("No service registered for type '{0}'")]
	ServiceNotFound(String),
}
