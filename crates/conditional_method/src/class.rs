//! Class construction with an explicit binding step.
//!
//! # Role
//!
//! [`ClassBuilder`] plays the part of a class body: attributes are defined in order,
//! redefining a name replaces its value in place, and [`ClassBuilder::finish`] binds
//! every attribute. Binding a [`Deferred`](crate::Deferred) forces it, so a method
//! whose candidates were all false aborts class construction instead of failing at
//! first call.
//!
//! # Invariants
//!
//! - A finished [`Class`] holds only winners.
//!   - Enforced in: [`ClassBuilder::finish`].
//! - Redefining an unresolved attribute with another unresolved value keeps the names
//!   of both on the surviving deferred.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::callable::{Callable, MethodKind};
use crate::error::CmError;
use crate::name::{Identity, QualName, Str};
use crate::selector::{Decorate, Resolved};

/// Collects attributes of one class before binding.
pub struct ClassBuilder<F> {
	module: Str,
	name: Str,
	attrs: IndexMap<String, Resolved<F>>,
}

impl<F> ClassBuilder<F> {
	pub fn new(module: impl Into<Str>, name: impl Into<Str>) -> Self {
		Self {
			module: module.into(),
			name: name.into(),
			attrs: IndexMap::new(),
		}
	}

	/// Qualified name of the class itself.
	pub fn qualname(&self) -> QualName {
		QualName::from(format!("{}.{}", self.module, self.name))
	}

	/// Identity of attribute `attr` declared in this class body.
	pub fn identity(&self, attr: &str) -> Identity {
		Identity::new(self.module.clone(), format!("{}.{attr}", self.name)).with_name(attr.to_owned())
	}

	/// Creates a candidate for attribute `attr`.
	pub fn candidate(&self, kind: MethodKind, attr: &str, body: F) -> Callable<F> {
		Callable::new(kind, self.identity(attr), body)
	}

	/// Defines (or redefines) `attr`.
	pub fn insert(&mut self, attr: impl Into<String>, value: impl Into<Resolved<F>>) -> &mut Self {
		let value = value.into();
		match self.attrs.entry(attr.into()) {
			Entry::Vacant(slot) => {
				slot.insert(value);
			}
			Entry::Occupied(mut slot) => {
				if let (Resolved::Deferred(old), Resolved::Deferred(new)) = (slot.get(), &value) {
					new.absorb(old);
				}
				slot.insert(value);
			}
		}
		self
	}

	/// Declares a candidate for `attr` and runs it through `decorator`.
	pub fn def<D>(&mut self, decorator: &D, kind: MethodKind, attr: &str, body: F) -> Result<&mut Self, CmError>
	where
		D: Decorate<F>,
	{
		let candidate = self.candidate(kind, attr, body);
		let resolved = decorator.decorate(candidate)?;
		Ok(self.insert(attr, resolved))
	}

	/// Binds every attribute, failing on the first unresolved one.
	pub fn finish(self) -> Result<Class<F>, CmError> {
		let qualname = self.qualname();
		let mut attrs = IndexMap::with_capacity(self.attrs.len());
		for (attr, value) in self.attrs {
			match value {
				Resolved::Winner(callable) => {
					attrs.insert(attr, callable);
				}
				Resolved::Deferred(deferred) => return Err(deferred.bind(qualname.as_str(), &attr)),
			}
		}
		diag!(debug, class = %qualname, attrs = attrs.len(), "class bound");
		Ok(Class { qualname, attrs })
	}
}

/// A bound class: every attribute resolved to its winner.
pub struct Class<F> {
	qualname: QualName,
	attrs: IndexMap<String, Callable<F>>,
}

impl<F> Class<F> {
	pub fn qualname(&self) -> &QualName {
		&self.qualname
	}

	pub fn get(&self, attr: &str) -> Option<&Callable<F>> {
		self.attrs.get(attr)
	}

	/// Like [`get`](Self::get), but a missing attribute is an error.
	pub fn attr(&self, attr: &str) -> Result<&Callable<F>, CmError> {
		self.attrs.get(attr).ok_or_else(|| CmError::UnknownAttribute {
			class: self.qualname.clone(),
			attr: attr.to_owned(),
		})
	}

	/// Invokes attribute `attr` with `args`.
	pub fn call<A, R>(&self, attr: &str, args: A) -> Result<R, CmError>
	where
		F: Fn(A) -> R,
	{
		self.attr(attr).map(|c| c.call(args))
	}

	/// Like [`call`](Self::call), for bodies behind a pointer.
	pub fn invoke<A, R>(&self, attr: &str, args: A) -> Result<R, CmError>
	where
		F: std::ops::Deref,
		F::Target: Fn(A) -> R,
	{
		self.attr(attr).map(|c| c.invoke(args))
	}

	/// Attributes in declaration order.
	pub fn attrs(&self) -> impl Iterator<Item = (&str, &Callable<F>)> {
		self.attrs.iter().map(|(name, c)| (name.as_str(), c))
	}

	pub fn len(&self) -> usize {
		self.attrs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.attrs.is_empty()
	}
}

impl<F> std::fmt::Debug for Class<F> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Class")
			.field("qualname", &self.qualname)
			.field("attrs", &self.attrs.keys().collect::<Vec<_>>())
			.finish()
	}
}
