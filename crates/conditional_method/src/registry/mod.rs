//! Winner cache for one decorator mechanism.
//!
//! # Role
//!
//! Maps each [`QualName`] to the callable that currently wins its name group, and
//! memoizes the [`Deferred`] failure handed out while a group has no winner.
//!
//! # Invariants
//!
//! - At most one winner per qualified name.
//!   - Enforced in: [`Registry::store`] (single locked read-modify-write).
//! - A false candidate never replaces a winner; it inherits it.
//!   - Enforced in: [`Registry::inherit_or_defer`].
//! - Repeated false candidates of an unresolved group share one [`Deferred`] until
//!   it is forced.
//!   - Enforced in: [`Registry::inherit_or_defer`], [`Registry::fail`].
//! - Forcing a [`Deferred`] wipes every winner of the registry that created it and of
//!   every registry linked to it. There is no per-key eviction.
//!   - Enforced in: [`Registry::fail`].
//!
//! # Concurrency
//!
//! All state sits behind one `parking_lot::Mutex`. Conditions are evaluated by the
//! callers before the lock is taken, so predicates may freely decorate other callables.
//! Linked registries are cleared one at a time; no two registry locks are ever held
//! together.

use std::any::{Any, type_name};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::callable::{Body, Callable};
use crate::deferred::Deferred;
use crate::error::CmError;
use crate::name::QualName;
use crate::selector::Resolved;

/// How a true candidate treats an existing winner of its group.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum OverwritePolicy {
	/// Overwrite with the last true candidate seen.
	#[default]
	LastWins,
	/// Keep the first true candidate; later true candidates receive it.
	FirstWins,
}

/// What a single decoration did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// Group had no winner; candidate inserted.
	Inserted,
	/// Group had a winner; replaced by the candidate.
	Replaced,
	/// Group had a winner; policy kept it.
	KeptExisting,
	/// False candidate received the cached winner.
	Inherited,
	/// False candidate with no winner received a [`Deferred`].
	Deferred,
	/// False candidate with no winner was handed back unchanged.
	Untouched,
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct State {
	winners: FxHashMap<QualName, Entry>,
	pending: FxHashMap<QualName, Deferred>,
}

/// Lock-guarded cache of winners keyed by qualified name.
pub struct Registry {
	label: &'static str,
	policy: OverwritePolicy,
	state: Mutex<State>,
	peers: Mutex<Vec<Weak<Registry>>>,
}

impl Registry {
	/// Creates an empty registry with the default policy.
	pub fn new(label: &'static str) -> Arc<Self> {
		Self::with_policy(label, OverwritePolicy::default())
	}

	/// Creates an empty registry with the given overwrite policy.
	pub fn with_policy(label: &'static str, policy: OverwritePolicy) -> Arc<Self> {
		Arc::new(Self {
			label,
			policy,
			state: Mutex::new(State::default()),
			peers: Mutex::new(Vec::new()),
		})
	}

	/// Links two registries so that forcing a [`Deferred`] of either one also wipes
	/// the winners of the other.
	pub fn link(a: &Arc<Registry>, b: &Arc<Registry>) {
		if Arc::ptr_eq(a, b) {
			return;
		}
		a.peers.lock().push(Arc::downgrade(b));
		b.peers.lock().push(Arc::downgrade(a));
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	pub fn policy(&self) -> OverwritePolicy {
		self.policy
	}

	/// Returns the number of cached winners.
	pub fn len(&self) -> usize {
		self.state.lock().winners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.lock().winners.is_empty()
	}

	pub fn contains(&self, qualname: &str) -> bool {
		self.state.lock().winners.contains_key(qualname)
	}

	/// Returns the qualified names of all cached winners, sorted.
	pub fn names(&self) -> Vec<QualName> {
		let mut names: Vec<_> = self.state.lock().winners.keys().cloned().collect();
		names.sort();
		names
	}

	/// Returns the cached winner for `qualname`.
	///
	/// Fails with [`CmError::ShapeMismatch`] if the winner has a different body type.
	pub fn get<F: Body>(&self, qualname: &str) -> Result<Option<Callable<F>>, CmError> {
		let state = self.state.lock();
		match state.winners.get_key_value(qualname) {
			Some((key, entry)) => downcast(key, entry).map(Some),
			None => Ok(None),
		}
	}

	/// Returns the memoized [`Deferred`] of an unresolved group, if any.
	pub fn pending(&self, qualname: &str) -> Option<Deferred> {
		self.state.lock().pending.get(qualname).cloned()
	}

	/// Stores a true candidate according to the overwrite policy.
	///
	/// Returns the outcome and the callable that now wins the group.
	pub(crate) fn store<F: Body>(
		&self,
		qualname: QualName,
		candidate: Callable<F>,
	) -> Result<(Outcome, Callable<F>), CmError> {
		let mut state = self.state.lock();
		let existing = state.winners.get(&qualname);
		let outcome = match (existing, self.policy) {
			(None, _) => Outcome::Inserted,
			(Some(_), OverwritePolicy::LastWins) => Outcome::Replaced,
			(Some(entry), OverwritePolicy::FirstWins) => {
				let kept = downcast(&qualname, entry)?;
				state.pending.remove(&qualname);
				return Ok((Outcome::KeptExisting, kept));
			}
		};
		state.pending.remove(&qualname);
		state.winners.insert(qualname, Arc::new(candidate.clone()));
		Ok((outcome, candidate))
	}

	/// Resolves a false candidate: the cached winner if one exists, otherwise the
	/// group's memoized [`Deferred`] with `qualname` recorded on it.
	pub(crate) fn inherit_or_defer<F: Body>(
		self: &Arc<Self>,
		qualname: QualName,
	) -> Result<(Outcome, Resolved<F>), CmError> {
		let mut state = self.state.lock();
		if let Some(entry) = state.winners.get(&qualname) {
			let winner = downcast(&qualname, entry)?;
			return Ok((Outcome::Inherited, Resolved::Winner(winner)));
		}
		let deferred = state
			.pending
			.entry(qualname.clone())
			.or_insert_with(|| Deferred::new(qualname.clone(), Arc::downgrade(self)))
			.clone();
		deferred.record(qualname);
		Ok((Outcome::Deferred, Resolved::Deferred(deferred)))
	}

	/// Clears every winner and memoized deferred.
	pub fn reset(&self) {
		let mut state = self.state.lock();
		diag!(debug, registry = self.label, winners = state.winners.len(), "registry reset");
		state.winners.clear();
		state.pending.clear();
	}

	/// Called when `deferred` is forced: wipes the winners of this registry and of
	/// every linked one, and drops the deferred's own memo slot.
	pub(crate) fn fail(&self, deferred: &Deferred) {
		{
			let mut state = self.state.lock();
			diag!(
				debug,
				registry = self.label,
				qualname = %deferred.qualname(),
				"unresolved group forced; clearing winners"
			);
			state.winners.clear();
			if state
				.pending
				.get(deferred.qualname())
				.is_some_and(|memo| memo.ptr_eq(deferred))
			{
				state.pending.remove(deferred.qualname());
			}
		}
		let peers: Vec<_> = self.peers.lock().iter().filter_map(Weak::upgrade).collect();
		for peer in peers {
			peer.clear_winners();
		}
	}

	fn clear_winners(&self) {
		let mut state = self.state.lock();
		diag!(debug, registry = self.label, winners = state.winners.len(), "linked registry cleared");
		state.winners.clear();
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.state.lock();
		f.debug_struct("Registry")
			.field("label", &self.label)
			.field("policy", &self.policy)
			.field("winners", &state.winners.len())
			.field("pending", &state.pending.len())
			.finish()
	}
}

fn downcast<F: Body>(qualname: &QualName, entry: &Entry) -> Result<Callable<F>, CmError> {
	entry
		.downcast_ref::<Callable<F>>()
		.cloned()
		.ok_or_else(|| CmError::ShapeMismatch {
			qualname: qualname.clone(),
			expected: type_name::<F>(),
		})
}
