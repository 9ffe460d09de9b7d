//! Applies logging and caching wrappers only in development.

use std::collections::HashMap;
use std::sync::Arc;

use conditional_method::{CfgAttr, Callable, CmError, Condition, Identity, Selector, diagnostics, transform};
use parking_lot::Mutex;

type Query = Arc<dyn Fn(u64) -> String + Send + Sync>;

fn query(f: impl Fn(u64) -> String + Send + Sync + 'static) -> Query {
	Arc::new(f)
}

fn log_calls(c: Callable<Query>) -> Callable<Query> {
	let name = c.qualname().map(|q| q.to_string()).unwrap_or_default();
	c.wrap(|inner| {
		query(move |id| {
			println!("calling `{name}` with {id}");
			let result = inner(id);
			println!("`{name}` returned `{result}`");
			result
		})
	})
}

fn cache_result(c: Callable<Query>) -> Callable<Query> {
	let cache: Arc<Mutex<HashMap<u64, String>>> = Arc::default();
	c.wrap(|inner| {
		query(move |id| {
			if let Some(hit) = cache.lock().get(&id) {
				println!("cache hit for {id}");
				return hit.clone();
			}
			let result = inner(id);
			cache.lock().insert(id, result.clone());
			result
		})
	})
}

fn main() -> Result<(), CmError> {
	diagnostics::init();
	let env = std::env::var("ENV").unwrap_or_else(|_| "development".to_owned());
	let development = env == "development";

	let selector = Selector::new();
	let connect = |tag: &'static str| {
		Callable::function(
			Identity::named("connect_to_database").in_module("cfg_attrs"),
			query(move |_| format!("{tag}_connection")),
		)
	};
	selector.when(env == "production").apply(connect("production"))?;
	let connect = selector.when(development).apply(connect("development"))?;
	println!("{}", connect.invoke(0)?);

	let attrs = CfgAttr::new();
	let fetch_user = Callable::function(
		Identity::named("fetch_user").in_module("cfg_attrs"),
		query(|id| format!("user-{id}")),
	);
	let fetch_user = attrs.apply(
		fetch_user,
		&Condition::from(development),
		&[transform(cache_result), transform(log_calls)],
	)?;
	for id in [1, 2, 1] {
		println!("{}", fetch_user.invoke(id)?);
	}

	let flagged = Condition::when(|s| s.name().is_some_and(|n| n.starts_with("beta_")));
	let beta = attrs
		.when(flagged)
		.with(log_calls)
		.apply(Callable::function(
			Identity::named("beta_search").in_module("cfg_attrs"),
			query(|q| format!("results for {q}")),
		))?;
	println!("{}", beta.invoke(42)?);
	Ok(())
}
