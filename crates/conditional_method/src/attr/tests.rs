use std::sync::Arc;

use super::{CfgAttr, Fallback, Transform, transform};
use crate::callable::Callable;
use crate::condition::Condition;
use crate::error::{CmError, Mechanism};
use crate::name::Identity;
use crate::registry::Outcome;
use crate::selector::Selector;

type Text = Arc<dyn Fn(()) -> String + Send + Sync>;

fn text(f: impl Fn(()) -> String + Send + Sync + 'static) -> Text {
	Arc::new(f)
}

fn target() -> Callable<Text> {
	Callable::function(Identity::new("app", "greet"), text(|()| "f".to_owned()))
}

fn label(tag: &'static str) -> Transform<Text> {
	transform(move |c: Callable<Text>| c.wrap(|inner| text(move |()| format!("{tag}({})", inner(())))))
}

#[test]
fn transforms_apply_first_innermost() {
	let attrs = CfgAttr::new();
	let resolved = attrs.apply(target(), &Condition::from(true), &[label("d1"), label("d2")]).unwrap();
	assert_eq!(resolved.invoke(()).unwrap(), "d2(d1(f))");
}

#[test]
fn builder_appends_outer_transforms() {
	let attrs = CfgAttr::new();
	let decorator = attrs
		.when(true)
		.with(|c: Callable<Text>| c.map(|inner| text(move |()| format!("[{}]", inner(())))))
		.with(|c: Callable<Text>| c.map(|inner| text(move |()| inner(()).to_uppercase())));
	assert_eq!(decorator.transforms().len(), 2);
	assert_eq!(decorator.apply(target()).unwrap().invoke(()).unwrap(), "[F]");
}

#[test]
fn false_without_cache_passes_target_through() {
	let attrs = CfgAttr::new();
	let original = target();
	let resolved = attrs.apply(original.clone(), &Condition::from(false), &[label("d1")]).unwrap();

	let returned = resolved.winner().unwrap();
	assert!(Arc::ptr_eq(returned.body(), original.body()));
	assert_eq!(returned.invoke(()), "f");
	assert!(attrs.registry().is_empty());
}

#[test]
fn false_after_true_returns_cached_wrapping() {
	let attrs = CfgAttr::new();
	attrs.apply(target(), &Condition::from(true), &[label("d1")]).unwrap();
	let again = attrs.apply(target(), &Condition::from(false), &[label("d2")]).unwrap();
	assert_eq!(again.invoke(()).unwrap(), "d1(f)");
}

#[test]
fn defer_fallback_returns_failure() {
	let attrs = CfgAttr::with_fallback(Fallback::Defer);
	let resolved = attrs.apply(target(), &Condition::from(false), &[label("d1")]).unwrap();
	let err = resolved.invoke(()).unwrap_err();
	assert_eq!(err.to_string(), "None of the conditions is true for `app.greet`");
}

#[test]
fn missing_condition_is_rejected() {
	let err = CfgAttr::new().decorator::<Text>(None, []).unwrap_err();
	assert!(matches!(err, CmError::MissingCondition { mechanism: Mechanism::CfgAttr }));
	assert!(err.to_string().starts_with("`cfg_attr` requires"));
}

#[test]
fn predicate_error_names_target() {
	let attrs = CfgAttr::new();
	let broken = Condition::try_when(|_| Err::<bool, _>("bad flag"));
	let err = attrs.apply(target(), &broken, &[]).unwrap_err();
	assert_eq!(err.to_string(), "Error calling `condition` for `app.greet`: bad flag");
}

#[test]
fn cache_is_separate_from_selector() {
	let selector = Selector::new();
	let attrs = CfgAttr::with_fallback(Fallback::Defer);
	selector.when(true).apply(target()).unwrap();

	let resolved = attrs.apply(target(), &Condition::from(false), &[]).unwrap();
	assert!(resolved.deferred().is_some());
	assert!(attrs.registry().pending("app.greet").is_some());
}

#[test]
fn fallback_parses_from_strings() {
	assert_eq!("DEFER".parse::<Fallback>().unwrap(), Fallback::Defer);
	assert_eq!(Fallback::Passthrough.to_string(), "passthrough");
}

#[test]
fn passthrough_hit_reports_inherited_winner() {
	let attrs = CfgAttr::new();
	let (first, stored) = attrs.decide(target(), &Condition::from(true), &[label("d1")]).unwrap();
	let (second, inherited) = attrs.decide(target(), &Condition::from(false), &[label("d2")]).unwrap();

	assert_eq!(first, Outcome::Inserted);
	assert_eq!(second, Outcome::Inherited);
	assert!(Arc::ptr_eq(inherited.winner().unwrap().body(), stored.winner().unwrap().body()));
	assert_eq!(inherited.invoke(()).unwrap(), "d1(f)");
}

#[test]
fn passthrough_miss_reports_untouched_target() {
	let attrs = CfgAttr::new();
	let (outcome, resolved) = attrs.decide(target(), &Condition::from(false), &[label("d1")]).unwrap();
	assert_eq!(outcome, Outcome::Untouched);
	assert_eq!(resolved.invoke(()).unwrap(), "f");
}

#[test]
fn defer_miss_reports_deferred() {
	let attrs = CfgAttr::with_fallback(Fallback::Defer);
	let (outcome, resolved) = attrs.decide(target(), &Condition::from(false), &[]).unwrap();
	assert_eq!(outcome, Outcome::Deferred);
	assert!(resolved.deferred().is_some());
}
