//! Conditions attached to candidates.

use std::fmt;
use std::sync::Arc;

use crate::callable::MethodKind;
use crate::error::CmError;
use crate::name::{Identity, QualName};

/// Boxed error returned by fallible predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared predicate signature.
pub type Predicate = dyn Fn(&Subject<'_>) -> Result<bool, BoxError> + Send + Sync;

fn shared<P>(predicate: P) -> Arc<Predicate>
where
	P: Fn(&Subject<'_>) -> Result<bool, BoxError> + Send + Sync + 'static,
{
	Arc::new(predicate)
}

/// View of the candidate handed to a predicate.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
	pub qualname: &'a QualName,
	pub identity: &'a Identity,
	pub kind: MethodKind,
}

impl Subject<'_> {
	/// Returns the candidate's bare name, if one exists along its identity chain.
	pub fn name(&self) -> Option<&str> {
		self.identity.bare_name()
	}
}

/// Decides whether a candidate wins. Evaluated once per candidate, at declaration.
#[derive(Clone)]
pub enum Condition {
	Flag(bool),
	Predicate(Arc<Predicate>),
}

impl Condition {
	/// Creates a condition from an infallible predicate.
	pub fn when<P>(predicate: P) -> Self
	where
		P: Fn(&Subject<'_>) -> bool + Send + Sync + 'static,
	{
		Self::Predicate(shared(move |subject| Ok(predicate(subject))))
	}

	/// Creates a condition from a fallible predicate. Errors surface as
	/// [`CmError::Condition`] naming the candidate.
	pub fn try_when<P, E>(predicate: P) -> Self
	where
		P: Fn(&Subject<'_>) -> Result<bool, E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		Self::Predicate(shared(move |subject| predicate(subject).map_err(Into::into)))
	}

	/// True when environment variable `key` equals `value` at evaluation time.
	pub fn env_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();
		Self::when(move |_| std::env::var(&key).is_ok_and(|v| v == value))
	}

	pub(crate) fn evaluate(&self, subject: &Subject<'_>) -> Result<bool, CmError> {
		match self {
			Self::Flag(flag) => Ok(*flag),
			Self::Predicate(predicate) => predicate(subject).map_err(|source| {
				diag!(debug, qualname = %subject.qualname, error = %source, "condition failed");
				CmError::Condition {
					qualname: subject.qualname.clone(),
					source,
				}
			}),
		}
	}
}

impl From<bool> for Condition {
	fn from(flag: bool) -> Self {
		Self::Flag(flag)
	}
}

impl fmt::Debug for Condition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
			Self::Predicate(_) => f.write_str("Predicate(..)"),
		}
	}
}
