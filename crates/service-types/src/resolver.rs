//! Contracts between the registry and the external resolver.
//!
//! The registry never constructs anything itself. Construction closures
//! receive a [`Resolver`] handle so they can request further services while
//! building one, and types that want to be registrable by type alone
//! implement [`ServiceType`].

use crate::error::RegistryError;
use crate::id::ServiceId;
use std::any::Any;
use std::sync::Arc;

/// A constructed service instance, type-erased for storage and caching.
///
/// Shared ownership lets pre-built instances be handed out on every request
/// and lets resolvers cache singletons without copying.
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// Handle a resolver passes into construction code.
///
/// Constructors use it to request the services they depend on. Implemented
/// by the container that consumes a finished registry, not by this crate.
pub trait Resolver {
	/// Produces an instance of the requested service type.
	///
	/// A tag narrows the lookup to the factory registered under that tag.
	fn resolve(&self, id: ServiceId, tag: Option<&str>) -> Result<ServiceInstance, RegistryError>;
}

/// Conventional zero-configuration constructor for a service type.
///
/// Implementing this trait lets a type be registered by type alone; the
/// resolver defers to `make_service` when the service is first requested.
pub trait ServiceType: Sized + Send + Sync + 'static {
	/// Constructs the service, resolving any dependencies it needs.
	fn make_service(resolver: &dyn Resolver) -> Result<Self, RegistryError>;
}
