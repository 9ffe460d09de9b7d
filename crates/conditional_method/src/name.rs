//! Name resolution for candidates.
//!
//! # Role
//!
//! Produces the canonical [`QualName`] of a callable so that unrelated functions never
//! collide and re-declarations of the same function always land in the same name group.
//!
//! # Invariants
//!
//! - Resolution is a pure function of the [`Identity`].
//! - The first layer carrying a qualified or plain name wins; outer layers without a
//!   name are unwrapped one at a time.
//! - A module, when present, prefixes the local name so that same-named functions in
//!   different modules form distinct groups.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::sync::Arc;

use crate::error::CmError;

/// Owned or static string used in identities.
pub type Str = Cow<'static, str>;

/// Kind of indirection between an outer callable and the one it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
	/// A transform wrapped the original callable.
	Wrapped,
	/// A class or static method binding of an underlying function.
	Bound,
	/// A property getter or setter.
	Accessor,
}

/// Naming metadata of a callable, possibly wrapping an inner identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
	/// Defining module path.
	pub module: Option<Str>,
	/// Name qualified by the enclosing scope (`Class.method`).
	pub qualname: Option<Str>,
	/// Bare name.
	pub name: Option<Str>,
	/// Identity of the callable this one stands for.
	pub inner: Option<(Layer, Box<Identity>)>,
}

impl Identity {
	/// Creates an identity with a module and a qualified name.
	pub fn new(module: impl Into<Str>, qualname: impl Into<Str>) -> Self {
		Self {
			module: Some(module.into()),
			qualname: Some(qualname.into()),
			..Self::default()
		}
	}

	/// Creates an identity carrying only a bare name.
	pub fn named(name: impl Into<Str>) -> Self {
		Self {
			name: Some(name.into()),
			..Self::default()
		}
	}

	/// Creates a nameless identity that stands for `inner`.
	pub fn layered(layer: Layer, inner: Identity) -> Self {
		Self {
			inner: Some((layer, Box::new(inner))),
			..Self::default()
		}
	}

	/// Sets the defining module.
	pub fn in_module(mut self, module: impl Into<Str>) -> Self {
		self.module = Some(module.into());
		self
	}

	/// Sets the bare name.
	pub fn with_name(mut self, name: impl Into<Str>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Returns the wrapped identity, if any.
	pub fn unwrap_once(&self) -> Option<(Layer, &Identity)> {
		self.inner.as_ref().map(|(layer, inner)| (*layer, inner.as_ref()))
	}

	/// Returns the local name of this layer, preferring the qualified one.
	fn local(&self) -> Option<&str> {
		[&self.qualname, &self.name]
			.into_iter()
			.filter_map(|s| s.as_deref())
			.find(|s| !s.is_empty())
	}

	/// Returns the first bare name found along the unwrap chain.
	pub fn bare_name(&self) -> Option<&str> {
		let mut current = self;
		loop {
			if let Some(name) = current.name.as_deref().filter(|s| !s.is_empty()) {
				return Some(name);
			}
			if let Some(qual) = current.qualname.as_deref().filter(|s| !s.is_empty()) {
				return qual.rsplit('.').next();
			}
			current = current.unwrap_once()?.1;
		}
	}
}

/// Fully-qualified name identifying a name group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualName(Arc<str>);

impl QualName {
	/// Returns the name as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for QualName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for QualName {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for QualName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for QualName {
	fn from(s: &str) -> Self {
		Self(Arc::from(s))
	}
}

impl From<String> for QualName {
	fn from(s: String) -> Self {
		Self(Arc::from(s))
	}
}

/// Resolves the qualified name of `identity`.
///
/// Inspects the qualified name, then the bare name, and otherwise unwraps one layer
/// and retries. Fails with [`CmError::NameResolution`] once the chain is exhausted.
pub fn resolve(identity: &Identity) -> Result<QualName, CmError> {
	let mut current = identity;
	let mut layers = 0;
	loop {
		if let Some(local) = current.local() {
			let qualname = match current.module.as_deref() {
				Some(module) if !module.is_empty() => QualName::from(format!("{module}.{local}")),
				_ => QualName::from(local),
			};
			diag!(trace, %qualname, layers, "resolved qualified name");
			return Ok(qualname);
		}
		match current.unwrap_once() {
			Some((layer, inner)) => {
				diag!(trace, ?layer, "unwrapping nameless layer");
				layers += 1;
				current = inner;
			}
			None => {
				diag!(debug, ?identity, "no name found on callable");
				return Err(CmError::NameResolution { layers });
			}
		}
	}
}
