//! The conditional attribute decorator (`cfg_attr`).
//!
//! # Role
//!
//! Wraps a single callable in a chain of [`Transform`]s when its condition holds,
//! instead of choosing between alternative bodies. Transforms run left to right, so
//! the first one is innermost: `[d1, d2]` yields `d2(d1(f))`.
//!
//! A false condition returns the cached result of an earlier true application under
//! the same qualified name. Without one, [`Fallback`] decides between returning the
//! callable untouched and returning a [`Deferred`](crate::Deferred).
//!
//! The cache is a [`Registry`] of its own, never shared with the [`Selector`](crate::Selector).
//! Within a [`Context`] the two registries are linked, so forcing a failure of either
//! mechanism clears both.

use std::fmt;
use std::sync::Arc;

use crate::callable::{Body, Callable};
use crate::condition::Condition;
use crate::config::Settings;
use crate::context::Context;
use crate::error::{CmError, Mechanism};
use crate::registry::{Outcome, Registry};
use crate::selector::{Decorate, Resolved, judge};

/// A single wrapping step applied by [`CfgAttr`].
pub type Transform<F> = Arc<dyn Fn(Callable<F>) -> Callable<F> + Send + Sync>;

/// Creates a [`Transform`] from a closure.
pub fn transform<F, T>(f: T) -> Transform<F>
where
	T: Fn(Callable<F>) -> Callable<F> + Send + Sync + 'static,
{
	Arc::new(f)
}

/// Result of a false condition with nothing cached.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Fallback {
	/// Return the callable unchanged.
	#[default]
	Passthrough,
	/// Return the group's deferred failure.
	Defer,
}

/// The `cfg_attr` mechanism.
#[derive(Debug)]
pub struct CfgAttr {
	registry: Arc<Registry>,
	fallback: Fallback,
}

impl Default for CfgAttr {
	fn default() -> Self {
		Self::new()
	}
}

impl CfgAttr {
	pub fn new() -> Self {
		Self::with_fallback(Fallback::default())
	}

	pub fn with_fallback(fallback: Fallback) -> Self {
		Self {
			registry: Registry::new("cfg_attr"),
			fallback,
		}
	}

	pub fn from_settings(settings: &Settings) -> Self {
		Self::with_fallback(settings.fallback)
	}

	/// Process-wide instance of the [global context](Context::global).
	pub fn global() -> &'static CfgAttr {
		Context::global().attrs()
	}

	pub fn registry(&self) -> &Arc<Registry> {
		&self.registry
	}

	pub fn fallback(&self) -> Fallback {
		self.fallback
	}

	pub fn reset(&self) {
		self.registry.reset();
	}

	/// Returns a reusable decorator, or fails if `condition` is missing.
	pub fn decorator<F>(
		&self,
		condition: Option<Condition>,
		transforms: impl IntoIterator<Item = Transform<F>>,
	) -> Result<AttrDecorator<'_, F>, CmError> {
		let condition = condition.ok_or(CmError::MissingCondition {
			mechanism: Mechanism::CfgAttr,
		})?;
		Ok(AttrDecorator {
			owner: self,
			condition,
			transforms: transforms.into_iter().collect(),
		})
	}

	/// Returns a decorator for `condition` with no transforms yet.
	pub fn when<F>(&self, condition: impl Into<Condition>) -> AttrDecorator<'_, F> {
		AttrDecorator {
			owner: self,
			condition: condition.into(),
			transforms: Vec::new(),
		}
	}

	/// Applies `transforms` to `target` if `condition` holds.
	pub fn apply<F: Body>(
		&self,
		target: Callable<F>,
		condition: &Condition,
		transforms: &[Transform<F>],
	) -> Result<Resolved<F>, CmError> {
		self.decide(target, condition, transforms).map(|(_, resolved)| resolved)
	}

	/// Like [`apply`](Self::apply), also reporting what happened to the cache.
	pub fn decide<F: Body>(
		&self,
		target: Callable<F>,
		condition: &Condition,
		transforms: &[Transform<F>],
	) -> Result<(Outcome, Resolved<F>), CmError> {
		let (qualname, holds) = judge(&target, condition)?;
		if holds {
			let wrapped = transforms.iter().fold(target, |acc, t| t(acc));
			let (outcome, winner) = self.registry.store(qualname.clone(), wrapped)?;
			diag!(debug, %qualname, transforms = transforms.len(), ?outcome, "cfg_attr applied");
			return Ok((outcome, Resolved::Winner(winner)));
		}
		let (outcome, resolved) = match self.fallback {
			Fallback::Defer => self.registry.inherit_or_defer(qualname.clone())?,
			Fallback::Passthrough => match self.registry.get::<F>(qualname.as_str())? {
				Some(cached) => (Outcome::Inherited, Resolved::Winner(cached)),
				None => (Outcome::Untouched, Resolved::Winner(target)),
			},
		};
		diag!(debug, %qualname, ?outcome, fallback = %self.fallback, "cfg_attr skipped");
		Ok((outcome, resolved))
	}
}

/// A `cfg_attr` application bound to one condition and transform chain.
pub struct AttrDecorator<'s, F> {
	owner: &'s CfgAttr,
	condition: Condition,
	transforms: Vec<Transform<F>>,
}

impl<F> AttrDecorator<'_, F> {
	/// Appends a transform; it wraps everything added before it.
	pub fn with<T>(mut self, t: T) -> Self
	where
		T: Fn(Callable<F>) -> Callable<F> + Send + Sync + 'static,
	{
		self.transforms.push(Arc::new(t));
		self
	}

	pub fn condition(&self) -> &Condition {
		&self.condition
	}

	pub fn transforms(&self) -> &[Transform<F>] {
		&self.transforms
	}
}

impl<F: Body> AttrDecorator<'_, F> {
	pub fn apply(&self, target: Callable<F>) -> Result<Resolved<F>, CmError> {
		self.owner.apply(target, &self.condition, &self.transforms)
	}
}

impl<F: Body> Decorate<F> for AttrDecorator<'_, F> {
	fn decorate(&self, candidate: Callable<F>) -> Result<Resolved<F>, CmError> {
		self.apply(candidate)
	}
}

impl<F> Clone for AttrDecorator<'_, F> {
	fn clone(&self) -> Self {
		Self {
			owner: self.owner,
			condition: self.condition.clone(),
			transforms: self.transforms.clone(),
		}
	}
}

impl<F> fmt::Debug for AttrDecorator<'_, F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttrDecorator")
			.field("condition", &self.condition)
			.field("transforms", &self.transforms.len())
			.field("fallback", &self.owner.fallback)
			.finish()
	}
}

/// Decorator for `condition` and `transforms` on the [global](CfgAttr::global) instance.
pub fn cfg_attr<F>(
	condition: impl Into<Condition>,
	transforms: impl IntoIterator<Item = Transform<F>>,
) -> AttrDecorator<'static, F> {
	let mut decorator = CfgAttr::global().when(condition);
	decorator.transforms.extend(transforms);
	decorator
}

#[cfg(test)]
mod tests;
