use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use conditional_method::{Callable, Identity, Selector};

type Fetch = fn(u32) -> Pin<Box<dyn Future<Output = String> + Send>>;

fn cached(id: u32) -> Pin<Box<dyn Future<Output = String> + Send>> {
	Box::pin(async move { format!("cached:{id}") })
}

fn remote(id: u32) -> Pin<Box<dyn Future<Output = String> + Send>> {
	Box::pin(async move {
		tokio::time::sleep(Duration::from_millis(5)).await;
		format!("remote:{id}")
	})
}

fn fetch(body: Fetch) -> Callable<Fetch> {
	Callable::function(Identity::new("svc", "Client.fetch"), body)
}

#[tokio::test]
async fn async_winner_keeps_its_own_semantics() {
	let selector = Selector::new();
	selector.when(false).apply(fetch(cached)).unwrap();
	selector.when(true).apply(fetch(remote)).unwrap();
	let resolved = selector.when(false).apply(fetch(cached)).unwrap();

	let future = resolved.call(7).unwrap();
	assert_eq!(future.await, "remote:7");
}

#[tokio::test]
async fn winner_can_be_awaited_from_many_tasks() {
	let selector = Selector::new();
	let winner = selector.when(true).apply(fetch(remote)).unwrap().into_callable().unwrap();

	let handles: Vec<_> = (0..4)
		.map(|id| {
			let winner = winner.clone();
			tokio::spawn(async move { winner.call(id).await })
		})
		.collect();
	let mut results = Vec::new();
	for handle in handles {
		results.push(handle.await.unwrap());
	}
	assert_eq!(results, ["remote:0", "remote:1", "remote:2", "remote:3"]);
}

#[tokio::test]
async fn unresolved_async_group_fails_before_any_future_exists() {
	let selector = Selector::new();
	let resolved = selector.when(false).apply(fetch(cached)).unwrap();
	assert!(resolved.call(1).is_err());
}
