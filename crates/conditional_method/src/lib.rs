//! Definition-time selection between same-named implementations.
//!
//! Several candidate implementations share one logical name; each is submitted
//! together with a [`Condition`] that is evaluated exactly once, when the
//! candidate is declared. At most one candidate wins and every later
//! declaration under the same name resolves to that winner.
//!
//! # Mental Model
//!
//! 1. **Naming:** every candidate carries an [`Identity`]. The
//!    [name resolver](name::resolve) turns it into a [`QualName`] that groups
//!    all candidates meant to be "the same function".
//! 2. **Selection:** [`Selector`] (`cm`) evaluates the condition. True
//!    candidates are stored in its [`Registry`] and returned; false ones
//!    inherit the cached winner or receive a [`Deferred`] failure.
//! 3. **Wrapping:** [`CfgAttr`] (`cfg_attr`) does not pick between bodies. It
//!    applies a chain of [`Transform`]s to one callable when its condition holds.
//! 4. **Binding:** [`ClassBuilder::finish`] binds every collected attribute and
//!    forces any [`Deferred`] left behind, so a fully-false group fails while
//!    the class is being built rather than at first use.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Callable`] | Tagged callable (function, class/static method, property accessor). |
//! | [`Condition`] | Flag or predicate deciding whether a candidate wins. |
//! | [`Registry`] | Lock-guarded cache of winners per qualified name. |
//! | [`Resolved`] | Outcome of one decoration: a winner or a [`Deferred`] failure. |
//! | [`Deferred`] | Placeholder for an unresolved name group; fails when forced. |
//! | [`ClassBuilder`] | Collects attributes and runs the binding step. |
//! | [`Context`] | Linked `cm` and `cfg_attr` pair sharing one failure domain. |
//!
//! # Example
//!
//! ```
//! use conditional_method::{Callable, Identity, Selector};
//!
//! let selector = Selector::new();
//! let env = "production";
//! let work = |tag: &'static str| Callable::function(Identity::new("app", "work"), move |()| tag);
//!
//! let first = selector.when(env == "production").apply(work("production")).unwrap();
//! let second = selector.when(env == "staging").apply(work("staging")).unwrap();
//!
//! assert_eq!(first.call(()).unwrap(), "production");
//! assert_eq!(second.call(()).unwrap(), "production");
//! ```

#[macro_use]
pub mod diagnostics;

pub mod attr;
pub mod callable;
pub mod class;
pub mod condition;
pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod name;
pub mod registry;
pub mod selector;

pub use attr::{AttrDecorator, CfgAttr, Fallback, Transform, cfg_attr, transform};
pub use callable::{Body, Callable, MethodKind};
pub use class::{Class, ClassBuilder};
pub use condition::{BoxError, Condition, Subject};
pub use config::Settings;
pub use context::Context;
pub use deferred::{Deferred, DeferredState};
pub use error::{CmError, Mechanism};
pub use name::{Identity, Layer, QualName};
pub use registry::{Outcome, OverwritePolicy, Registry};
pub use selector::{Decorate, Decorator, Resolved, Selector, cfg, cm, conditional_method, if_};
