//! Providers: self-contained units of registration logic.
//!
//! A provider groups related registrations so bootstrap code can apply them
//! as one unit without knowing what they contain. The registry applies at
//! most one provider per concrete type.

use crate::services::Services;
use service_types::{RegistryError, ServiceId};
use std::fmt;

/// A self-contained unit of registration logic.
///
/// When applied, a provider is given one chance to register factories and
/// nested providers against the registry. The mutable reference is only
/// valid for the duration of the call and cannot be retained.
pub trait Provider: Send + Sync + 'static {
	/// Contributes this provider's registrations to the registry.
	fn register(&self, services: &mut Services) -> Result<(), RegistryError>;
}

/// A provider that has been applied, paired with the identity of its
/// concrete type.
///
/// The identity is what makes repeat registrations of the same provider
/// type detectable, and what the diagnostic rendering lists.
pub struct RegisteredProvider {
	id: ServiceId,
	provider: Box<dyn Provider>,
}

impl RegisteredProvider {
	pub(crate) fn new(id: ServiceId, provider: Box<dyn Provider>) -> Self {
		Self { id, provider }
	}

	/// Identity of the provider's concrete type.
	pub fn id(&self) -> ServiceId {
		self.id
	}

	/// The applied provider.
	pub fn provider(&self) -> &dyn Provider {
		self.provider.as_ref()
	}
}

impl fmt::Debug for RegisteredProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisteredProvider")
			.field("id", &self.id)
			.finish()
	}
}
