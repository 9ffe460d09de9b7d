//! Settings for the process-wide decorator instances.

use std::str::FromStr;

use crate::attr::Fallback;
use crate::registry::OverwritePolicy;

/// Environment variable selecting the [`OverwritePolicy`] of the global selector.
pub const POLICY_ENV_KEY: &str = "CONDITIONAL_METHOD_POLICY";

/// Environment variable selecting the [`Fallback`] of the global `cfg_attr`.
pub const FALLBACK_ENV_KEY: &str = "CONDITIONAL_METHOD_FALLBACK";

/// Behaviour knobs of [`Selector`](crate::Selector) and [`CfgAttr`](crate::CfgAttr).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
	pub policy: OverwritePolicy,
	pub fallback: Fallback,
}

impl Settings {
	/// Reads settings from the process environment.
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads settings through `lookup`. Unset keys keep their defaults; unparsable
	/// values are ignored and reported through the diagnostic channel.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
		Self {
			policy: parse_or_default(POLICY_ENV_KEY, lookup(POLICY_ENV_KEY)),
			fallback: parse_or_default(FALLBACK_ENV_KEY, lookup(FALLBACK_ENV_KEY)),
		}
	}
}

fn parse_or_default<T: FromStr + Default>(key: &str, value: Option<String>) -> T {
	let Some(raw) = value else {
		return T::default();
	};
	match raw.trim().parse() {
		Ok(parsed) => parsed,
		Err(_) => {
			diag!(warn, key, value = %raw, "ignoring invalid setting");
			T::default()
		}
	}
}
