//! Factory declarations for service construction.
//!
//! A [`ServiceFactory`] describes how one service is produced: its nominal
//! type, the interfaces it can be requested as, an optional disambiguating
//! tag, and whether the resolver should cache a single instance. The
//! registry only stores these declarations; their construction capability
//! is invoked by the resolver at request time.

use service_types::{RegistryError, Resolver, ServiceId, ServiceInstance, ServiceType};
use std::fmt;
use std::sync::Arc;

/// Type alias for boxed construction closures.
///
/// A constructor receives the resolver so it can request the services it
/// depends on, and returns the built instance or an error.
pub type ServiceConstructor =
	Box<dyn Fn(&dyn Resolver) -> Result<ServiceInstance, RegistryError> + Send + Sync>;

/// Type alias for the convention-based constructors captured by
/// type-default declarations.
pub type DefaultConstructor = fn(&dyn Resolver) -> Result<ServiceInstance, RegistryError>;

/// How a factory produces its service.
enum FactoryKind {
	/// Defer to the service type's own conventional constructor.
	TypeDefault(DefaultConstructor),
	/// Run a caller-supplied construction closure.
	Closure(ServiceConstructor),
}

/// Declares how one service is produced and under which interfaces it can
/// be requested.
///
/// Within one registry at most one declaration exists per nominal type;
/// registering another for the same type replaces it in place.
pub struct ServiceFactory {
	service_type: ServiceId,
	supports: Vec<ServiceId>,
	tag: Option<String>,
	is_singleton: bool,
	kind: FactoryKind,
}

impl ServiceFactory {
	/// Creates a declaration that defers to `S`'s conventional constructor.
	pub fn type_default<S: ServiceType>() -> Self {
		Self {
			service_type: ServiceId::of::<S>(),
			supports: Vec::new(),
			tag: None,
			is_singleton: false,
			kind: FactoryKind::TypeDefault(construct_default::<S>),
		}
	}

	/// Creates a declaration wrapping a construction closure.
	///
	/// The closure's output type is the declaration's nominal type,
	/// independent of the interfaces listed in `supports`.
	pub fn closure<S, F>(
		supports: Vec<ServiceId>,
		tag: Option<&str>,
		is_singleton: bool,
		construct: F,
	) -> Self
	where
		S: Send + Sync + 'static,
		F: Fn(&dyn Resolver) -> Result<S, RegistryError> + Send + Sync + 'static,
	{
		Self {
			service_type: ServiceId::of::<S>(),
			supports,
			tag: tag.map(str::to_owned),
			is_singleton,
			kind: FactoryKind::Closure(Box::new(move |resolver| {
				construct(resolver).map(|service| Arc::new(service) as ServiceInstance)
			})),
		}
	}

	/// Creates a declaration for an already-built instance.
	///
	/// The instance is stored once and handed out on every construction;
	/// this is the closure variant specialized to a constant.
	pub fn instance<S>(
		supports: Vec<ServiceId>,
		tag: Option<&str>,
		is_singleton: bool,
		instance: S,
	) -> Self
	where
		S: Send + Sync + 'static,
	{
		let shared = Arc::new(instance);
		Self {
			service_type: ServiceId::of::<S>(),
			supports,
			tag: tag.map(str::to_owned),
			is_singleton,
			kind: FactoryKind::Closure(Box::new(move |_resolver| {
				Ok(Arc::clone(&shared) as ServiceInstance)
			})),
		}
	}

	/// The nominal type this factory produces; the registry's override key.
	pub fn service_type(&self) -> ServiceId {
		self.service_type
	}

	/// Interfaces this service can be requested as, beside its own type.
	pub fn supports(&self) -> &[ServiceId] {
		&self.supports
	}

	/// Optional tag distinguishing factories under the same type/interface.
	pub fn tag(&self) -> Option<&str> {
		self.tag.as_deref()
	}

	/// Whether the resolver should cache and reuse one instance.
	pub fn is_singleton(&self) -> bool {
		self.is_singleton
	}

	/// Whether this factory satisfies a request for `id`, either as the
	/// nominal type or as one of the supported interfaces.
	pub fn provides(&self, id: ServiceId) -> bool {
		self.service_type == id || self.supports.contains(&id)
	}

	/// One human-readable line describing this declaration.
	pub fn describe(&self) -> String {
		if self.supports.is_empty() {
			self.service_type.name().to_string()
		} else {
			let supports = self
				.supports
				.iter()
				.map(|id| id.name())
				.collect::<Vec<_>>()
				.join(", ");
			format!("{} (Supports: {})", self.service_type.name(), supports)
		}
	}

	/// Invokes the construction capability.
	///
	/// Called by the resolver at request time; the registry itself never
	/// calls this, so construction failures are only observed there.
	pub fn make(&self, resolver: &dyn Resolver) -> Result<ServiceInstance, RegistryError> {
		match &self.kind {
			FactoryKind::TypeDefault(construct) => construct(resolver),
			FactoryKind::Closure(construct) => construct(resolver),
		}
	}
}

impl fmt::Debug for ServiceFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let kind = match &self.kind {
			FactoryKind::TypeDefault(_) => "TypeDefault",
			FactoryKind::Closure(_) => "Closure",
		};
		f.debug_struct("ServiceFactory")
			.field("service_type", &self.service_type)
			.field("supports", &self.supports)
			.field("tag", &self.tag)
			.field("is_singleton", &self.is_singleton)
			.field("kind", &kind)
			.finish()
	}
}

fn construct_default<S: ServiceType>(
	resolver: &dyn Resolver,
) -> Result<ServiceInstance, RegistryError> {
	S::make_service(resolver).map(|service| Arc::new(service) as ServiceInstance)
}
