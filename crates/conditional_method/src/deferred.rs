//! Placeholder for a name group without a winner.
//!
//! # Role
//!
//! A [`Deferred`] stands where a callable would be when no candidate of its group has
//! had a true condition yet. It does nothing until forced; forcing it (calling it,
//! binding it as a class attribute, or asking it for a callable) yields
//! [`CmError::Unresolved`] listing every qualified name that contributed.
//!
//! # State Machine
//!
//! `Unresolved` → `Raised` on the first force. Forcing wipes the winners of the registry
//! that created the deferred and drops its memo slot, so the next false candidate of the
//! group starts from a fresh deferred. A raised deferred keeps failing when forced again.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexSet;
use parking_lot::Mutex;

use crate::error::CmError;
use crate::name::QualName;
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
	/// Accumulating contributing names.
	Unresolved,
	/// Forced at least once.
	Raised,
}

struct Inner {
	qualname: QualName,
	names: Mutex<IndexSet<QualName>>,
	raised: AtomicBool,
	registry: Weak<Registry>,
}

/// Shared handle to an unresolved name group.
#[derive(Clone)]
pub struct Deferred {
	inner: Arc<Inner>,
}

impl Deferred {
	pub(crate) fn new(qualname: QualName, registry: Weak<Registry>) -> Self {
		Self {
			inner: Arc::new(Inner {
				qualname,
				names: Mutex::new(IndexSet::new()),
				raised: AtomicBool::new(false),
				registry,
			}),
		}
	}

	/// Qualified name of the group this deferred was created for.
	pub fn qualname(&self) -> &QualName {
		&self.inner.qualname
	}

	/// Contributing qualified names, in the order they were recorded.
	pub fn names(&self) -> Vec<QualName> {
		self.inner.names.lock().iter().cloned().collect()
	}

	pub fn state(&self) -> DeferredState {
		if self.inner.raised.load(Ordering::Acquire) {
			DeferredState::Raised
		} else {
			DeferredState::Unresolved
		}
	}

	/// Returns true if both handles point to the same deferred.
	pub fn ptr_eq(&self, other: &Deferred) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}

	pub(crate) fn record(&self, qualname: QualName) {
		self.inner.names.lock().insert(qualname);
	}

	/// Merges the contributing names of `other` into this deferred.
	pub fn absorb(&self, other: &Deferred) {
		if self.ptr_eq(other) {
			return;
		}
		let theirs = other.names();
		self.inner.names.lock().extend(theirs);
	}

	/// Forces resolution and returns the resulting error.
	pub fn force(&self) -> CmError {
		let repeated = self.inner.raised.swap(true, Ordering::AcqRel);
		if let Some(registry) = self.inner.registry.upgrade() {
			registry.fail(self);
		}
		let mut names = self.names();
		if names.is_empty() {
			names.push(self.inner.qualname.clone());
		}
		diag!(debug, ?names, repeated, "unresolved name group forced");
		CmError::Unresolved { names }
	}

	/// Calling a deferred always fails.
	pub fn call<A, R>(&self, _args: A) -> Result<R, CmError> {
		Err(self.force())
	}

	/// Binding hook: run when the deferred is bound as attribute `attr` of `owner`.
	pub fn bind(&self, owner: &str, attr: &str) -> CmError {
		diag!(debug, owner, attr, "binding unresolved attribute");
		self.force()
	}
}

impl fmt::Debug for Deferred {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Deferred")
			.field("qualname", &self.inner.qualname)
			.field("names", &self.names())
			.field("state", &self.state())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn orphan(name: &str) -> Deferred {
		Deferred::new(QualName::from(name), Weak::new())
	}

	#[test]
	fn force_reports_recorded_names() {
		let d = orphan("app.env");
		d.record(QualName::from("app.env"));
		d.record(QualName::from("app.env"));
		assert_eq!(d.state(), DeferredState::Unresolved);

		let err = d.force();
		assert_eq!(err.to_string(), "None of the conditions is true for `app.env`");
		assert_eq!(d.state(), DeferredState::Raised);
	}

	#[test]
	fn force_without_names_uses_group_name() {
		let err = orphan("app.lonely").force();
		assert!(err.to_string().contains("app.lonely"));
	}

	#[test]
	fn absorb_merges_names_in_order() {
		let a = orphan("m.A.work");
		a.record(QualName::from("m.A.work"));
		let b = orphan("m.B.work");
		b.record(QualName::from("m.B.work"));

		a.absorb(&b);
		a.absorb(&a.clone());
		let err = a.force();
		assert_eq!(err.to_string(), "None of the conditions is true for `m.A.work, m.B.work`");
	}

	#[test]
	fn call_and_bind_both_fail() {
		let d = orphan("m.f");
		assert!(matches!(d.call::<(), ()>(()), Err(CmError::Unresolved { .. })));
		assert!(matches!(d.bind("m.C", "f"), CmError::Unresolved { .. }));
	}
}
