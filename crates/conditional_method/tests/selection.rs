use conditional_method::{Callable, CmError, Condition, Identity, Resolved, Selector};
use proptest::prelude::*;

type Op = fn((i64, i64)) -> Result<i64, String>;

fn add((a, b): (i64, i64)) -> Result<i64, String> {
	a.checked_add(b).ok_or_else(|| "overflow".to_owned())
}

fn sub((a, b): (i64, i64)) -> Result<i64, String> {
	a.checked_sub(b).ok_or_else(|| "underflow".to_owned())
}

fn op(body: Op) -> Callable<Op> {
	Callable::function(Identity::new("calc", "op"), body)
}

fn declare(selector: &Selector, flags: &[bool]) -> Vec<Resolved<Op>> {
	flags
		.iter()
		.enumerate()
		.map(|(i, &flag)| {
			let body: Op = if i % 2 == 0 { add } else { sub };
			selector.when(flag).apply(op(body)).unwrap()
		})
		.collect()
}

#[test]
fn true_declaration_wins_over_earlier_false_one() {
	let selector = Selector::new();
	let f1 = |tag: &'static str| Callable::function(Identity::new("tests", "f1"), move |()| tag);

	let _first = selector.when(false).apply(f1("first")).unwrap();
	let second = selector.when(true).apply(f1("second")).unwrap();
	let third = selector.when(false).apply(f1("third")).unwrap();

	assert_eq!(second.call(()).unwrap(), "second");
	assert_eq!(third.call(()).unwrap(), "second");
}

#[test]
fn three_false_candidates_fail_with_their_name() {
	let selector = Selector::new();
	let last = declare(&selector, &[false, false, false]).pop().unwrap();

	let err = last.call((1, 2)).unwrap_err();
	let CmError::Unresolved { names } = &err else {
		panic!("unexpected error: {err}");
	};
	assert_eq!(names.iter().map(|n| n.as_str()).collect::<Vec<_>>(), ["calc.op"]);
	assert!(err.to_string().contains("calc.op"));
}

#[test]
fn raising_predicate_fails_before_registration() {
	let selector = Selector::new();
	let cond = Condition::try_when(|_| "maybe".parse::<bool>());
	let err = selector.when(cond).apply(op(add)).unwrap_err();

	assert!(matches!(err, CmError::Condition { .. }));
	let source = std::error::Error::source(&err).unwrap();
	assert!(source.is::<std::str::ParseBoolError>());
	assert!(!selector.registry().contains("calc.op"));
}

#[test]
fn same_name_in_different_modules_forms_distinct_groups() {
	let selector = Selector::new();
	let env = |module: &'static str, tag: &'static str| {
		Callable::function(Identity::named("env").in_module(module), move |()| tag)
	};

	let one = selector.when(true).apply(env("imports_fn", "one")).unwrap();
	let two = selector.when(false).apply(env("imports_fn_two", "two")).unwrap();

	assert_eq!(one.call(()).unwrap(), "one");
	assert!(two.deferred().is_some());
	assert_eq!(two.call(()).unwrap_err().to_string(), "None of the conditions is true for `imports_fn_two.env`");
}

#[test]
fn forced_group_starts_over() {
	let selector = Selector::new();
	let failed = declare(&selector, &[false]).pop().unwrap();
	assert!(failed.call((0, 0)).is_err());

	let retried = declare(&selector, &[true]).pop().unwrap();
	assert_eq!(retried.call((4, 5)).unwrap(), Ok(9));
}

#[test]
fn forcing_one_group_wipes_other_winners() {
	let selector = Selector::new();
	selector.when(true).apply(op(add)).unwrap();
	let other = Callable::function(Identity::new("calc", "other"), add as Op);
	let pending = selector.when(false).apply(other).unwrap();

	assert!(selector.registry().contains("calc.op"));
	let _ = pending.call((0, 0));
	assert!(selector.registry().is_empty());
}

proptest! {
	#[test]
	fn single_true_candidate_is_returned_to_later_declarations(
		before in 0usize..6,
		after in 0usize..6,
	) {
		let selector = Selector::new();
		let mut flags = vec![false; before];
		flags.push(true);
		flags.extend(std::iter::repeat_n(false, after));

		let resolved = declare(&selector, &flags);
		let winner_body: Op = if before % 2 == 0 { add } else { sub };
		for later in &resolved[before..] {
			prop_assert_eq!(later.call((7, 3)).unwrap(), winner_body((7, 3)));
		}
		for earlier in &resolved[..before] {
			prop_assert!(earlier.deferred().is_some());
		}
	}

	#[test]
	fn all_false_groups_always_fail(count in 1usize..8) {
		let selector = Selector::new();
		let resolved = declare(&selector, &vec![false; count]);
		for r in &resolved {
			prop_assert!(r.deferred().unwrap().ptr_eq(resolved[0].deferred().unwrap()));
		}
		let err = resolved[count - 1].call((1, 1)).unwrap_err();
		prop_assert!(err.to_string().contains("calc.op"));
	}

	#[test]
	fn winner_forwards_arguments_and_errors_unchanged(a in any::<i64>(), b in any::<i64>()) {
		let selector = Selector::new();
		let winner = selector.when(true).apply(op(add)).unwrap();
		let inherited = selector.when(false).apply(op(sub)).unwrap();

		prop_assert_eq!(winner.call((a, b)).unwrap(), add((a, b)));
		prop_assert_eq!(inherited.call((a, b)).unwrap(), add((a, b)));
	}
}
