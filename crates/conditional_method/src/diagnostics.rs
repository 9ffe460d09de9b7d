//! Process-wide diagnostic toggle.
//!
//! Internal events are `tracing` events under [`TARGET`]. They are only emitted when
//! [`DEBUG_ENV_KEY`] is set to anything but `false`; the variable is read once, on
//! first use.
//! [`init`] installs a formatting subscriber for programs that have none of their own.

use std::sync::LazyLock;

/// Environment variable enabling diagnostics.
pub const DEBUG_ENV_KEY: &str = "CONDITIONAL_METHOD_DEBUG";

/// Target of every diagnostic event.
pub const TARGET: &str = "conditional_method";

static ENABLED: LazyLock<bool> =
	LazyLock::new(|| parse_toggle(std::env::var(DEBUG_ENV_KEY).ok().as_deref()));

/// Returns whether diagnostics are on for this process.
#[inline]
pub fn enabled() -> bool {
	*ENABLED
}

/// Interprets a toggle value. Unset means `false`; only `false` (any case) disables.
pub fn parse_toggle(value: Option<&str>) -> bool {
	!value.unwrap_or("false").eq_ignore_ascii_case("false")
}

/// Installs a `tracing-subscriber` formatter when diagnostics are enabled.
///
/// The filter honours `RUST_LOG` and defaults to `conditional_method=debug`. Returns
/// `true` if this call installed the global subscriber.
pub fn init() -> bool {
	use tracing_subscriber::EnvFilter;

	if !enabled() {
		return false;
	}
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{TARGET}=debug")));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init()
		.is_ok()
}

/// Emits a `tracing` event under [`TARGET`] when diagnostics are enabled.
macro_rules! diag {
	($level:ident, $($arg:tt)+) => {
		if $crate::diagnostics::enabled() {
			::tracing::$level!(target: $crate::diagnostics::TARGET, $($arg)+);
		}
	};
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::parse_toggle;

	#[rstest]
	#[case(None, false)]
	#[case(Some("false"), false)]
	#[case(Some("FALSE"), false)]
	#[case(Some("False"), false)]
	#[case(Some(""), true)]
	#[case(Some("0"), true)]
	#[case(Some("true"), true)]
	#[case(Some("1"), true)]
	#[case(Some("verbose"), true)]
	fn toggle_values(#[case] value: Option<&str>, #[case] expected: bool) {
		assert_eq!(parse_toggle(value), expected);
	}
}
