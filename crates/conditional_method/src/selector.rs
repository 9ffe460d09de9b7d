//! The conditional selector (`cm`).
//!
//! # Role
//!
//! Applied once per candidate, in declaration order. Each application resolves the
//! candidate's name, evaluates its condition and consults the [`Registry`]:
//!
//! 1. True: the candidate is stored (per [`OverwritePolicy`]) and returned.
//! 2. False with a cached winner: the winner is returned.
//! 3. False without a winner: the group's [`Deferred`] is returned.
//!
//! The selector never wraps the winner; calling it has the winner's own semantics.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::callable::{Body, Callable};
use crate::condition::{Condition, Subject};
use crate::config::Settings;
use crate::context::Context;
use crate::deferred::Deferred;
use crate::error::{CmError, Mechanism};
use crate::name::QualName;
use crate::registry::{Outcome, OverwritePolicy, Registry};

/// Result of one decoration.
#[derive(Clone)]
pub enum Resolved<F> {
	/// The candidate itself or the cached winner of its group.
	Winner(Callable<F>),
	/// No winner yet; fails when forced.
	Deferred(Deferred),
}

impl<F> Resolved<F> {
	pub fn is_winner(&self) -> bool {
		matches!(self, Self::Winner(_))
	}

	pub fn winner(&self) -> Option<&Callable<F>> {
		match self {
			Self::Winner(c) => Some(c),
			Self::Deferred(_) => None,
		}
	}

	pub fn deferred(&self) -> Option<&Deferred> {
		match self {
			Self::Winner(_) => None,
			Self::Deferred(d) => Some(d),
		}
	}

	/// Returns the winning callable, forcing a deferred failure.
	pub fn force(&self) -> Result<&Callable<F>, CmError> {
		match self {
			Self::Winner(c) => Ok(c),
			Self::Deferred(d) => Err(d.force()),
		}
	}

	pub fn into_callable(self) -> Result<Callable<F>, CmError> {
		match self {
			Self::Winner(c) => Ok(c),
			Self::Deferred(d) => Err(d.force()),
		}
	}

	/// Invokes the winner with `args`, or fails if the group is unresolved.
	pub fn call<A, R>(&self, args: A) -> Result<R, CmError>
	where
		F: Fn(A) -> R,
	{
		self.force().map(|c| c.call(args))
	}

	/// Like [`call`](Self::call), for bodies behind a pointer.
	pub fn invoke<A, R>(&self, args: A) -> Result<R, CmError>
	where
		F: Deref,
		F::Target: Fn(A) -> R,
	{
		self.force().map(|c| c.invoke(args))
	}

	/// Binding hook for attribute `attr` of `owner`. Winners bind silently.
	pub fn bind(&self, owner: &str, attr: &str) -> Result<(), CmError> {
		match self {
			Self::Winner(_) => Ok(()),
			Self::Deferred(d) => Err(d.bind(owner, attr)),
		}
	}
}

impl<F> From<Callable<F>> for Resolved<F> {
	fn from(c: Callable<F>) -> Self {
		Self::Winner(c)
	}
}

impl<F> fmt::Debug for Resolved<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Winner(c) => f.debug_tuple("Winner").field(c).finish(),
			Self::Deferred(d) => f.debug_tuple("Deferred").field(d).finish(),
		}
	}
}

/// Anything that turns a candidate into a [`Resolved`] value.
pub trait Decorate<F> {
	fn decorate(&self, candidate: Callable<F>) -> Result<Resolved<F>, CmError>;
}

/// Resolves the candidate's name and evaluates `condition` against it.
pub(crate) fn judge<F>(candidate: &Callable<F>, condition: &Condition) -> Result<(QualName, bool), CmError> {
	let qualname = candidate.qualname()?;
	let subject = Subject {
		qualname: &qualname,
		identity: candidate.identity(),
		kind: candidate.kind(),
	};
	let holds = condition.evaluate(&subject)?;
	Ok((qualname, holds))
}

/// The `cm` mechanism: selects one winner per name group.
#[derive(Debug)]
pub struct Selector {
	registry: Arc<Registry>,
}

impl Default for Selector {
	fn default() -> Self {
		Self::new()
	}
}

impl Selector {
	pub fn new() -> Self {
		Self::with_policy(OverwritePolicy::default())
	}

	pub fn with_policy(policy: OverwritePolicy) -> Self {
		Self {
			registry: Registry::with_policy("cm", policy),
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::with_policy(settings.policy)
	}

	/// Process-wide selector of the [global context](Context::global).
	pub fn global() -> &'static Selector {
		Context::global().selector()
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	/// Clears all cached winners and pending deferreds.
	pub fn reset(&self) {
		self.registry.reset();
	}

	/// Returns a reusable decorator, or fails if `condition` is missing.
	pub fn decorator(&self, condition: Option<Condition>) -> Result<Decorator<'_>, CmError> {
		let condition = condition.ok_or(CmError::MissingCondition {
			mechanism: Mechanism::Cm,
		})?;
		Ok(Decorator {
			selector: self,
			condition,
		})
	}

	/// Returns a reusable decorator for `condition`.
	pub fn when(&self, condition: impl Into<Condition>) -> Decorator<'_> {
		Decorator {
			selector: self,
			condition: condition.into(),
		}
	}

	/// Decorates `candidate` under `condition`.
	pub fn select<F: Body>(&self, candidate: Callable<F>, condition: &Condition) -> Result<Resolved<F>, CmError> {
		self.decide(candidate, condition).map(|(_, resolved)| resolved)
	}

	/// Like [`select`](Self::select), also reporting what happened to the registry.
	pub fn decide<F: Body>(
		&self,
		candidate: Callable<F>,
		condition: &Condition,
	) -> Result<(Outcome, Resolved<F>), CmError> {
		let (qualname, holds) = judge(&candidate, condition)?;
		let (outcome, resolved) = if holds {
			let (outcome, winner) = self.registry.store(qualname.clone(), candidate)?;
			(outcome, Resolved::Winner(winner))
		} else {
			self.registry.inherit_or_defer(qualname.clone())?
		};
		diag!(debug, %qualname, holds, ?outcome, "cm");
		Ok((outcome, resolved))
	}
}

/// A selector bound to one condition; apply it to each candidate.
#[derive(Clone)]
pub struct Decorator<'s> {
	selector: &'s Selector,
	condition: Condition,
}

impl Decorator<'_> {
	pub fn condition(&self) -> &Condition {
		&self.condition
	}

	pub fn apply<F: Body>(&self, candidate: Callable<F>) -> Result<Resolved<F>, CmError> {
		self.selector.select(candidate, &self.condition)
	}
}

impl<F: Body> Decorate<F> for Decorator<'_> {
	fn decorate(&self, candidate: Callable<F>) -> Result<Resolved<F>, CmError> {
		self.apply(candidate)
	}
}

impl fmt::Debug for Decorator<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Decorator")
			.field("registry", &self.selector.registry.label())
			.field("condition", &self.condition)
			.finish()
	}
}

/// Decorator for `condition` on the [global](Selector::global) selector.
pub fn cm(condition: impl Into<Condition>) -> Decorator<'static> {
	Selector::global().when(condition)
}

/// Alias of [`cm`].
#[inline]
pub fn conditional_method(condition: impl Into<Condition>) -> Decorator<'static> {
	cm(condition)
}

/// Alias of [`cm`].
#[inline]
pub fn if_(condition: impl Into<Condition>) -> Decorator<'static> {
	cm(condition)
}

/// Alias of [`cm`].
#[inline]
pub fn cfg(condition: impl Into<Condition>) -> Decorator<'static> {
	cm(condition)
}
