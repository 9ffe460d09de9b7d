//! Candidate callables.
//!
//! A [`Callable`] pairs a body with its [`MethodKind`] and [`Identity`]. Constructors
//! add the identity layer each kind implies, so name resolution walks a tagged chain
//! instead of probing attributes.

use std::fmt;
use std::ops::Deref;

use crate::error::CmError;
use crate::name::{self, Identity, Layer, QualName};

/// Shape of a candidate within its defining scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MethodKind {
	/// Free function or instance method.
	Function,
	/// Method receiving the owning class.
	ClassMethod,
	/// Method receiving neither instance nor class.
	StaticMethod,
	/// Read accessor of a property.
	PropertyGetter,
	/// Write accessor of a property.
	PropertySetter,
}

/// Marker trait for bodies that can be cached in a [`Registry`](crate::Registry).
pub trait Body: Clone + Send + Sync + 'static {}
impl<T> Body for T where T: Clone + Send + Sync + 'static {}

/// A candidate body with its naming metadata.
#[derive(Clone)]
pub struct Callable<F> {
	kind: MethodKind,
	identity: Identity,
	body: F,
}

impl<F> Callable<F> {
	/// Creates a callable of `kind`, adding the identity layer the kind implies.
	pub fn new(kind: MethodKind, identity: Identity, body: F) -> Self {
		let identity = match kind {
			MethodKind::Function => identity,
			MethodKind::ClassMethod | MethodKind::StaticMethod => Identity::layered(Layer::Bound, identity),
			MethodKind::PropertyGetter | MethodKind::PropertySetter => {
				Identity::layered(Layer::Accessor, identity)
			}
		};
		Self { kind, identity, body }
	}

	pub fn function(identity: Identity, body: F) -> Self {
		Self::new(MethodKind::Function, identity, body)
	}

	pub fn class_method(identity: Identity, body: F) -> Self {
		Self::new(MethodKind::ClassMethod, identity, body)
	}

	pub fn static_method(identity: Identity, body: F) -> Self {
		Self::new(MethodKind::StaticMethod, identity, body)
	}

	pub fn property_getter(identity: Identity, body: F) -> Self {
		Self::new(MethodKind::PropertyGetter, identity, body)
	}

	pub fn property_setter(identity: Identity, body: F) -> Self {
		Self::new(MethodKind::PropertySetter, identity, body)
	}

	pub fn kind(&self) -> MethodKind {
		self.kind
	}

	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	pub fn body(&self) -> &F {
		&self.body
	}

	pub fn into_body(self) -> F {
		self.body
	}

	/// Resolves this callable's qualified name.
	pub fn qualname(&self) -> Result<QualName, CmError> {
		name::resolve(&self.identity)
	}

	/// Replaces the body and keeps the identity untouched.
	pub fn map<G>(self, f: impl FnOnce(F) -> G) -> Callable<G> {
		Callable {
			kind: self.kind,
			identity: self.identity,
			body: f(self.body),
		}
	}

	/// Replaces the body and pushes a [`Layer::Wrapped`] layer over the identity.
	pub fn wrap<G>(self, f: impl FnOnce(F) -> G) -> Callable<G> {
		Callable {
			kind: self.kind,
			identity: Identity::layered(Layer::Wrapped, self.identity),
			body: f(self.body),
		}
	}

	/// Invokes the body, forwarding `args` unchanged.
	#[inline]
	pub fn call<A, R>(&self, args: A) -> R
	where
		F: Fn(A) -> R,
	{
		(self.body)(args)
	}

	/// Invokes a body held behind a pointer such as `Arc<dyn Fn(A) -> R>`.
	#[inline]
	pub fn invoke<A, R>(&self, args: A) -> R
	where
		F: Deref,
		F::Target: Fn(A) -> R,
	{
		(*self.body)(args)
	}
}

impl<F> fmt::Debug for Callable<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callable")
			.field("kind", &self.kind)
			.field("identity", &self.identity)
			.field("body", &std::any::type_name::<F>())
			.finish()
	}
}
