//! Type identity for services and interfaces.
//!
//! Registrations are keyed by nominal type. [`ServiceId`] is the opaque
//! handle used for that: it compares by `TypeId` and orders by type name,
//! so sorted diagnostic listings are stable across runs.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque identity of a service or interface type.
///
/// Built with [`ServiceId::of`], which accepts concrete types and
/// `dyn Trait` object types alike. Two handles are equal exactly when they
/// identify the same type.
#[derive(Debug, Clone, Copy)]
pub struct ServiceId {
	type_id: TypeId,
	type_name: &'static str,
}

impl ServiceId {
	/// Creates the identity handle for `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
		}
	}

	/// The type name with its module path trimmed, for display.
	///
	/// Generic type names are returned untrimmed since their parameters
	/// carry paths of their own.
	pub fn name(&self) -> &'static str {
		if self.type_name.contains('<') {
			return self.type_name;
		}
		self.type_name.rsplit("::").next().unwrap_or(self.type_name)
	}

	/// The full type name, including the module path.
	pub fn full_name(&self) -> &'static str {
		self.type_name
	}
}

impl PartialEq for ServiceId {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

impl PartialOrd for ServiceId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ServiceId {
	fn cmp(&self, other: &Self) -> Ordering {
		self.type_name
			.cmp(other.type_name)
			.then_with(|| self.type_id.cmp(&other.type_id))
	}
}

impl fmt::Display for ServiceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
