use crate::condition::BoxError;
use crate::name::QualName;

/// Which decorator mechanism produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Mechanism {
	/// The conditional selector (`cm` and its aliases).
	#[strum(serialize = "cm")]
	Cm,
	/// The conditional attribute decorator.
	#[strum(serialize = "cfg_attr")]
	CfgAttr,
}

/// Errors raised while declaring, selecting or forcing candidates.
#[derive(Debug, thiserror::Error)]
pub enum CmError {
	/// Decorator used without a condition.
	#[error(
		"`{mechanism}` requires a `condition`: a bool or a predicate that takes the decorated callable and returns a bool"
	)]
	MissingCondition { mechanism: Mechanism },

	/// A predicate condition failed while being evaluated.
	#[error("Error calling `condition` for `{qualname}`: {source}")]
	Condition {
		qualname: QualName,
		#[source]
		source: BoxError,
	},

	/// No name could be found on the callable, even after unwrapping.
	#[error("cannot get fully qualified function name (unwrapped {layers} layer(s))")]
	NameResolution { layers: usize },

	/// No candidate in the name group had a true condition.
	#[error("None of the conditions is true for `{}`", join_names(.names))]
	Unresolved { names: Vec<QualName> },

	/// The cached winner was registered with a different callable type.
	#[error("cached winner for `{qualname}` is not a `{expected}`")]
	ShapeMismatch {
		qualname: QualName,
		expected: &'static str,
	},

	/// Lookup of an attribute the class never defined.
	#[error("class `{class}` has no attribute `{attr}`")]
	UnknownAttribute { class: QualName, attr: String },
}

impl CmError {
	/// Returns the qualified names this error refers to.
	pub fn names(&self) -> Vec<&QualName> {
		match self {
			Self::Condition { qualname, .. } | Self::ShapeMismatch { qualname, .. } => vec![qualname],
			Self::Unresolved { names } => names.iter().collect(),
			Self::UnknownAttribute { class, .. } => vec![class],
			Self::MissingCondition { .. } | Self::NameResolution { .. } => Vec::new(),
		}
	}
}

fn join_names(names: &[QualName]) -> String {
	names
		.iter()
		.map(QualName::as_str)
		.collect::<Vec<_>>()
		.join(", ")
}
