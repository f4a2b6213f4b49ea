use std::future::Future;
use std::sync::OnceLock;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::TaskClass;

/// Runtime used when the caller is not inside one, e.g. plain unit tests or
/// synchronous hosts.
static FALLBACK_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}
	FALLBACK_RT
		.get_or_init(|| {
			tokio::runtime::Builder::new_multi_thread()
				.enable_all()
				.worker_threads(2)
				.thread_name("tagline-worker")
				.build()
				.expect("failed to build tagline-worker fallback runtime")
		})
		.handle()
		.clone()
}

fn task_span(class: TaskClass) -> tracing::Span {
	tracing::debug_span!("worker.task", class = class.as_str())
}

/// Spawns `fut` on the ambient runtime inside a span tagged with `class`.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	runtime_handle().spawn(fut.instrument(task_span(class)))
}

/// Runs `f` on the blocking pool inside a span tagged with `class`.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let span = task_span(class);
	runtime_handle().spawn_blocking(move || span.in_scope(f))
}
