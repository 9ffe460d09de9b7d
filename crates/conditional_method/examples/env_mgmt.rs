//! Picks one `Worker::work` implementation per deployment environment.
//!
//! Run with `ENVIRONMENT_KEY=staging` to switch the winner, or with an unknown value to
//! see class construction fail. Set `CONDITIONAL_METHOD_DEBUG=1` for selection traces.

use std::sync::Arc;

use conditional_method::{Class, ClassBuilder, CmError, MethodKind, Selector, diagnostics};

const ENVIRONMENT_KEY: &str = "ENVIRONMENT_KEY";

type Work = Arc<dyn Fn(Vec<&'static str>) -> String + Send + Sync>;

fn work(class: &'static str, env: &'static str) -> Work {
	Arc::new(move |args: Vec<&'static str>| {
		println!("{class}: working in {env}, args: {args:?}");
		env.to_owned()
	})
}

fn worker(selector: &Selector, class: &'static str, environment: &str) -> Result<Class<Work>, CmError> {
	let mut builder = ClassBuilder::new("env_mgmt", class);
	for env in ["production", "development", "staging"] {
		builder.def(&selector.when(environment == env), MethodKind::Function, "work", work(class, env))?;
	}
	builder.finish()
}

fn main() -> Result<(), CmError> {
	diagnostics::init();
	let environment = std::env::var(ENVIRONMENT_KEY).unwrap_or_else(|_| "production".to_owned());
	let selector = Selector::global();

	for class in ["Worker", "WorkerTwo"] {
		let worker = worker(selector, class, &environment)?;
		let result = worker.invoke("work", vec!["a", "b"])?;
		println!("{}.work -> {result}", worker.qualname());
	}
	Ok(())
}
