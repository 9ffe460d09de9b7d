//! The pair of mechanisms that share one failure domain.
//!
//! # Role
//!
//! A [`Context`] owns one [`Selector`] and one [`CfgAttr`] whose registries are
//! linked: forcing a [`Deferred`](crate::Deferred) produced by either mechanism wipes
//! the winners of both. The process-wide instances behind [`cm`](crate::cm) and
//! [`cfg_attr`](crate::cfg_attr) live in [`Context::global`].
//!
//! # Invariants
//!
//! - Both registries of a context are linked for its whole lifetime.
//!   - Enforced in: [`Context::from_settings`].

use std::sync::LazyLock;

use crate::attr::CfgAttr;
use crate::config::Settings;
use crate::registry::Registry;
use crate::selector::Selector;

#[derive(Debug)]
pub struct Context {
	selector: Selector,
	attrs: CfgAttr,
}

impl Default for Context {
	fn default() -> Self {
		Self::new()
	}
}

impl Context {
	pub fn new() -> Self {
		Self::from_settings(&Settings::default())
	}

	pub fn from_settings(settings: &Settings) -> Self {
		let selector = Selector::from_settings(settings);
		let attrs = CfgAttr::from_settings(settings);
		Registry::link(selector.registry(), attrs.registry());
		Self { selector, attrs }
	}

	/// Process-wide context, configured from the environment on first use.
	pub fn global() -> &'static Context {
		static GLOBAL: LazyLock<Context> = LazyLock::new(|| Context::from_settings(&Settings::from_env()));
		&GLOBAL
	}

	/// The `cm` mechanism of this context.
	pub fn selector(&self) -> &Selector {
		&self.selector
	}

	/// The `cfg_attr` mechanism of this context.
	pub fn attrs(&self) -> &CfgAttr {
		&self.attrs
	}

	/// Clears both registries.
	pub fn reset(&self) {
		self.selector.reset();
		self.attrs.reset();
	}
}
