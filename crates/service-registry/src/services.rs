//! The service registry.
//!
//! [`Services`] accumulates factory declarations and applied providers
//! during process bootstrap. Registration is sequential and synchronous;
//! once bootstrap completes, the registry is handed to a resolver and is by
//! convention no longer mutated.

use crate::factory::ServiceFactory;
use crate::provider::{Provider, RegisteredProvider};
use service_types::{RegistryError, Resolver, ServiceId, ServiceType};
use std::fmt;

/// Registry of service factory declarations and applied providers.
///
/// Factories are keyed by nominal type: a later registration for the same
/// type replaces the earlier one in place, so a provider can ship a default
/// implementation and later bootstrap code can substitute it without any
/// removal primitive. Providers are applied at most once per concrete type.
///
/// Registration never invokes construction; the stored declarations are
/// consumed by an external resolver once bootstrap finishes.
#[derive(Debug, Default)]
pub struct Services {
	factories: Vec<ServiceFactory>,
	providers: Vec<RegisteredProvider>,
}

impl Services {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a service type using its conventional constructor.
	pub fn register_type<S: ServiceType>(&mut self) {
		self.register_factory(ServiceFactory::type_default::<S>());
	}

	/// Registers an already-built instance under its own type only.
	pub fn register_instance<S: Send + Sync + 'static>(&mut self, instance: S) {
		self.register_instance_with(Vec::new(), None, false, instance);
	}

	/// Registers an already-built instance requestable as one interface.
	pub fn register_instance_as<S: Send + Sync + 'static>(
		&mut self,
		interface: ServiceId,
		instance: S,
	) {
		self.register_instance_with(vec![interface], None, false, instance);
	}

	/// Registers an already-built instance with the full descriptor.
	///
	/// The instance's own concrete type is the declaration's nominal type,
	/// independent of the interfaces listed in `supports`.
	pub fn register_instance_with<S: Send + Sync + 'static>(
		&mut self,
		supports: Vec<ServiceId>,
		tag: Option<&str>,
		is_singleton: bool,
		instance: S,
	) {
		self.register_factory(ServiceFactory::instance(supports, tag, is_singleton, instance));
	}

	/// Registers a construction closure requestable as one interface.
	pub fn register_closure<S, F>(&mut self, interface: ServiceId, construct: F)
	where
		S: Send + Sync + 'static,
		F: Fn(&dyn Resolver) -> Result<S, RegistryError> + Send + Sync + 'static,
	{
		self.register_closure_with(vec![interface], None, false, construct);
	}

	/// Registers a construction closure with the full descriptor.
	///
	/// The closure is stored without being invoked; its failures surface
	/// only at resolution time.
	pub fn register_closure_with<S, F>(
		&mut self,
		supports: Vec<ServiceId>,
		tag: Option<&str>,
		is_singleton: bool,
		construct: F,
	) where
		S: Send + Sync + 'static,
		F: Fn(&dyn Resolver) -> Result<S, RegistryError> + Send + Sync + 'static,
	{
		self.register_factory(ServiceFactory::closure(supports, tag, is_singleton, construct));
	}

	/// Registers a fully-formed factory declaration.
	///
	/// If a declaration for the same nominal type already exists it is
	/// replaced in place, keeping its ordinal position; otherwise the new
	/// declaration is appended.
	pub fn register_factory(&mut self, factory: ServiceFactory) {
		let service_type = factory.service_type();
		match self
			.factories
			.iter()
			.position(|existing| existing.service_type() == service_type)
		{
			Some(index) => {
				tracing::debug!(service = %service_type, "Replaced factory declaration");
				self.factories[index] = factory;
			}
			None => {
				tracing::debug!(service = %service_type, "Registered factory declaration");
				self.factories.push(factory);
			}
		}
	}

	/// Applies a provider, letting it register factories and nested
	/// providers, then records it.
	///
	/// A provider whose concrete type has already been applied is skipped
	/// without invoking its callback. If the callback fails, the error is
	/// propagated, the provider is not recorded, and registrations it made
	/// before failing are kept; registering the same provider type again
	/// re-runs the callback from scratch.
	pub fn register_provider<P: Provider>(&mut self, provider: P) -> Result<(), RegistryError> {
		let id = ServiceId::of::<P>();
		if self.providers.iter().any(|applied| applied.id() == id) {
			tracing::debug!(provider = %id, "Provider already applied, skipping");
			return Ok(());
		}
		provider.register(self)?;
		tracing::info!(provider = %id, "Applied provider");
		self.providers
			.push(RegisteredProvider::new(id, Box::new(provider)));
		Ok(())
	}

	/// All factory declarations, in registration order.
	pub fn factories(&self) -> &[ServiceFactory] {
		&self.factories
	}

	/// All applied providers, in application order.
	pub fn providers(&self) -> &[RegisteredProvider] {
		&self.providers
	}

	/// Finds the factory satisfying a request for `id`.
	///
	/// With a tag, only a factory carrying that exact tag matches; without
	/// one, the first factory providing `id` wins.
	pub fn factory_for(&self, id: ServiceId, tag: Option<&str>) -> Option<&ServiceFactory> {
		self.factories.iter().find(|factory| {
			factory.provides(id) && tag.map_or(true, |requested| factory.tag() == Some(requested))
		})
	}
}

impl fmt::Display for Services {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Providers:")?;
		let mut providers: Vec<&str> = self.providers.iter().map(|p| p.id().name()).collect();
		providers.sort_unstable();
		for name in providers {
			writeln!(f, "- {}", name)?;
		}
		writeln!(f, "Services:")?;
		let mut services: Vec<String> = self.factories.iter().map(ServiceFactory::describe).collect();
		services.sort_unstable();
		for line in services {
			writeln!(f, "- {}", line)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use service_types::ServiceInstance;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	struct NullResolver;

	impl Resolver for NullResolver {
		fn resolve(
			&self,
			id: ServiceId,
			_tag: Option<&str>,
		) -> Result<ServiceInstance, RegistryError> {
			Err(RegistryError::ServiceNotFound(id.name().to_string()))
		}
	}

	#[derive(Debug)]
	struct Logger {
		level: &'static str,
	}

	impl ServiceType for Logger {
		fn make_service(_resolver: &dyn Resolver) -> Result<Self, RegistryError> {
			Ok(Self { level: "info" })
		}
	}

	trait LoggerProtocol: Send + Sync {}

	impl LoggerProtocol for Logger {}

	trait Flushable: Send + Sync {}

	struct JsonLogger;

	impl LoggerProtocol for JsonLogger {}

	struct Database {
		url: String,
	}

	struct Collector;

	struct MetricsProvider {
		applied: Arc<AtomicUsize>,
	}

	impl Provider for MetricsProvider {
		fn register(&self, services: &mut Services) -> Result<(), RegistryError> {
			self.applied.fetch_add(1, Ordering::SeqCst);
			services.register_instance(Collector);
			Ok(())
		}
	}

	struct InnerProvider;

	impl Provider for InnerProvider {
		fn register(&self, services: &mut Services) -> Result<(), RegistryError> {
			services.register_instance(Collector);
			Ok(())
		}
	}

	struct OuterProvider;

	impl Provider for OuterProvider {
		fn register(&self, services: &mut Services) -> Result<(), RegistryError> {
			services.register_provider(InnerProvider)?;
			services.register_instance(Logger { level: "info" });
			Ok(())
		}
	}

	struct BrokenProvider;

	impl Provider for BrokenProvider {
		fn register(&self, services: &mut Services) -> Result<(), RegistryError> {
			services.register_instance(Collector);
			Err(RegistryError::Provider("missing credentials".to_string()))
		}
	}

	#[test]
	fn test_register_type_adds_default_factory() {
		let mut services = Services::new();
		services.register_type::<Logger>();

		assert_eq!(services.factories().len(), 1);
		let factory = &services.factories()[0];
		assert_eq!(factory.service_type(), ServiceId::of::<Logger>());
		assert!(factory.supports().is_empty());
		assert!(factory.tag().is_none());
		assert!(!factory.is_singleton());
	}

	#[test]
	fn test_override_replaces_in_place() {
		let mut services = Services::new();
		services.register_instance(Logger { level: "debug" });
		services.register_instance(Database {
			url: "sqlite::memory:".to_string(),
		});

		// Re-registering the first type must keep its ordinal position
		services.register_instance_with(
			vec![ServiceId::of::<dyn LoggerProtocol>()],
			None,
			true,
			Logger { level: "warn" },
		);

		assert_eq!(services.factories().len(), 2);
		let replaced = &services.factories()[0];
		assert_eq!(replaced.service_type(), ServiceId::of::<Logger>());
		assert_eq!(
			replaced.supports(),
			[ServiceId::of::<dyn LoggerProtocol>()].as_slice()
		);
		assert!(replaced.is_singleton());
		assert_eq!(
			services.factories()[1].service_type(),
			ServiceId::of::<Database>()
		);

		let untouched = services.factories()[1].make(&NullResolver).unwrap();
		let database = untouched.downcast::<Database>().unwrap();
		assert_eq!(database.url, "sqlite::memory:");
	}

	#[test]
	fn test_later_registration_wins() {
		let mut services = Services::new();
		services.register_type::<Logger>();
		services.register_closure_with(
			vec![ServiceId::of::<dyn LoggerProtocol>()],
			None,
			true,
			|_resolver: &dyn Resolver| Ok(Logger { level: "info" }),
		);

		assert_eq!(services.factories().len(), 1);
		let factory = &services.factories()[0];
		assert_eq!(factory.service_type(), ServiceId::of::<Logger>());
		assert_eq!(
			factory.supports(),
			[ServiceId::of::<dyn LoggerProtocol>()].as_slice()
		);
		assert!(factory.is_singleton());
	}

	#[test]
	fn test_instance_keeps_supports_order() {
		let mut services = Services::new();
		services.register_instance_with(
			vec![
				ServiceId::of::<dyn LoggerProtocol>(),
				ServiceId::of::<dyn Flushable>(),
			],
			None,
			false,
			Logger { level: "info" },
		);

		let factory = &services.factories()[0];
		assert_eq!(factory.service_type(), ServiceId::of::<Logger>());
		assert_eq!(
			factory.supports(),
			[
				ServiceId::of::<dyn LoggerProtocol>(),
				ServiceId::of::<dyn Flushable>(),
			]
			.as_slice()
		);
	}

	#[test]
	fn test_provider_applied_once() {
		let mut services = Services::new();
		let applied = Arc::new(AtomicUsize::new(0));

		services
			.register_provider(MetricsProvider {
				applied: applied.clone(),
			})
			.unwrap();
		services
			.register_provider(MetricsProvider {
				applied: applied.clone(),
			})
			.unwrap();

		assert_eq!(services.providers().len(), 1);
		assert_eq!(applied.load(Ordering::SeqCst), 1);
		// The no-op second registration must not duplicate the factory
		assert_eq!(services.factories().len(), 1);
		assert_eq!(
			services.factories()[0].service_type(),
			ServiceId::of::<Collector>()
		);
	}

	#[test]
	fn test_nested_provider_applied_before_outer() {
		let mut services = Services::new();
		services.register_provider(OuterProvider).unwrap();

		assert_eq!(services.providers().len(), 2);
		assert_eq!(services.providers()[0].id(), ServiceId::of::<InnerProvider>());
		assert_eq!(services.providers()[1].id(), ServiceId::of::<OuterProvider>());
		assert_eq!(services.factories().len(), 2);
	}

	#[test]
	fn test_failing_provider_not_recorded() {
		let mut services = Services::new();

		let result = services.register_provider(BrokenProvider);
		assert!(matches!(result, Err(RegistryError::Provider(_))));
		assert!(services.providers().is_empty());
		// Partial registrations made before the failure are kept
		assert_eq!(services.factories().len(), 1);

		// A retry re-runs the callback from scratch, overriding in place
		let result = services.register_provider(BrokenProvider);
		assert!(result.is_err());
		assert!(services.providers().is_empty());
		assert_eq!(services.factories().len(), 1);
	}

	#[test]
	fn test_reapplied_sequence_is_idempotent() {
		fn apply(services: &mut Services) {
			services.register_type::<Logger>();
			services.register_instance(Database {
				url: "postgres://localhost".to_string(),
			});
			services.register_instance_as(ServiceId::of::<dyn LoggerProtocol>(), JsonLogger);
		}

		let mut once = Services::new();
		apply(&mut once);
		let mut twice = Services::new();
		apply(&mut twice);
		apply(&mut twice);

		assert_eq!(once.factories().len(), twice.factories().len());
		assert_eq!(once.to_string(), twice.to_string());
	}

	#[test]
	fn test_factory_for_honors_type_interface_and_tag() {
		let mut services = Services::new();
		services.register_instance_as(
			ServiceId::of::<dyn LoggerProtocol>(),
			Logger { level: "info" },
		);
		services.register_instance_with(
			vec![ServiceId::of::<dyn LoggerProtocol>()],
			Some("json"),
			false,
			JsonLogger,
		);

		let interface = ServiceId::of::<dyn LoggerProtocol>();
		let untagged = services.factory_for(interface, None).unwrap();
		assert_eq!(untagged.service_type(), ServiceId::of::<Logger>());

		let tagged = services.factory_for(interface, Some("json")).unwrap();
		assert_eq!(tagged.service_type(), ServiceId::of::<JsonLogger>());

		assert!(services.factory_for(interface, Some("xml")).is_none());
		assert!(services.factory_for(ServiceId::of::<Logger>(), None).is_some());
		assert!(services.factory_for(ServiceId::of::<Database>(), None).is_none());
	}

	#[test]
	fn test_display_is_sorted_and_deterministic() {
		let applied = Arc::new(AtomicUsize::new(0));
		let mut a = Services::new();
		a.register_instance_as(ServiceId::of::<dyn LoggerProtocol>(), Logger { level: "info" });
		a.register_provider(MetricsProvider {
			applied: applied.clone(),
		})
		.unwrap();

		let mut b = Services::new();
		b.register_provider(MetricsProvider {
			applied: applied.clone(),
		})
		.unwrap();
		b.register_instance_as(ServiceId::of::<dyn LoggerProtocol>(), Logger { level: "info" });

		assert_eq!(a.to_string(), b.to_string());
		assert_eq!(
			a.to_string(),
			"Providers:\n\
			 - MetricsProvider\n\
			 Services:\n\
			 - Collector\n\
			 - Logger (Supports: LoggerProtocol)\n"
		);
	}

	#[test]
	fn test_registered_closure_builds_at_resolution() {
		let mut services = Services::new();
		services.register_closure(
			ServiceId::of::<dyn LoggerProtocol>(),
			|_resolver: &dyn Resolver| Ok(Logger { level: "debug" }),
		);

		let factory = services
			.factory_for(ServiceId::of::<dyn LoggerProtocol>(), None)
			.unwrap();
		let instance = factory.make(&NullResolver).unwrap();
		let logger = instance.downcast::<Logger>().unwrap();
		assert_eq!(logger.level, "debug");
	}
}
