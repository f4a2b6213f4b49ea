//! Background fill scheduling.
//!
//! At most one [`BackgroundRequest`] is alive per tagger. Its worker sleeps
//! through the optional coalescing delay, then walks the target line range in
//! chunks on a blocking thread, posting one [`WorkerMsg::Progress`] per chunk
//! and a final [`WorkerMsg::Completed`] back to the owning context.

mod planner;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tagline_primitives::{CharIdx, LineRange, Snapshot, SnapshotSpan, Span};
use tagline_worker::{GenerationToken, LatestSlot, TaskClass, join_error_panic_message, panic_message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) use self::planner::ChunkPlanner;
use crate::error::SourceError;
use crate::source::{TagSource, TagSpan};

/// Returns true if a tag starting at `pos` belongs to `chunk`.
///
/// Tags belong to the chunk holding their start. A tag starting at the very
/// end of the document belongs to the chunk ending there.
pub(crate) fn chunk_owns(chunk: &Span, pos: CharIdx, doc_len: usize) -> bool {
	chunk.contains_pos(pos) || (pos == chunk.end && chunk.end == doc_len)
}

/// Lines of `snapshot` lying entirely inside `span`.
pub(crate) fn lines_within(snapshot: &Snapshot, span: Span) -> Option<LineRange> {
	let first = snapshot.line_of(span.start);
	let start = if snapshot.line_start(first) == span.start { first } else { first + 1 };
	let end = if span.end >= snapshot.len_chars() {
		snapshot.len_lines()
	} else {
		snapshot.line_of(span.end)
	};
	(start < end).then(|| LineRange::new(start, end))
}

/// Message posted from a worker to the owning context.
#[derive(Debug)]
pub(crate) enum WorkerMsg<T> {
	Progress {
		generation: u64,
		snapshot: Snapshot,
		/// The chunk handed to the source.
		chunk: Span,
		/// The chunk widened to cover every tag it owns. Announced as changed.
		span: Span,
		tags: Vec<TagSpan<T>>,
		failed: bool,
	},
	Completed {
		generation: u64,
		/// True if every line of the target was processed.
		exhausted: bool,
	},
}

/// Everything a worker needs to fill one target range.
pub(crate) struct FillSpec<S: TagSource> {
	pub(crate) source: Arc<S>,
	pub(crate) data: S::Data,
	pub(crate) snapshot: Snapshot,
	pub(crate) target: LineRange,
	/// Lines already computed for `snapshot` by an earlier request.
	pub(crate) done: Vec<LineRange>,
	pub(crate) chunk_lines: usize,
	pub(crate) delay: Option<Duration>,
	pub(crate) token: GenerationToken,
	pub(crate) priority: LatestSlot<LineRange>,
	pub(crate) tx: mpsc::UnboundedSender<WorkerMsg<S::Tag>>,
}

/// The in-flight background computation record.
#[derive(Debug)]
pub(crate) struct BackgroundRequest {
	token: GenerationToken,
	snapshot: Snapshot,
	target: LineRange,
	priority: LatestSlot<LineRange>,
	task: JoinHandle<()>,
}

impl BackgroundRequest {
	pub(crate) fn generation(&self) -> u64 {
		self.token.generation()
	}

	pub(crate) fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub(crate) fn target(&self) -> LineRange {
		self.target
	}

	/// Returns true if this request already fills `lines` on `snapshot`.
	pub(crate) fn covers(&self, snapshot: &Snapshot, lines: &LineRange) -> bool {
		&self.snapshot == snapshot && self.target.contains(lines)
	}

	/// Queues `lines` ahead of the sequential cursor.
	///
	/// Returns false if the lines fall outside the target.
	pub(crate) fn prioritize(&self, lines: LineRange) -> bool {
		match lines.intersect(&self.target) {
			Some(lines) => {
				self.priority.put(lines);
				true
			}
			None => false,
		}
	}

	pub(crate) fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Signals the worker to stop at its next chunk boundary.
	pub(crate) fn cancel(self) {
		self.token.cancel();
	}
}

/// Starts filling `spec.target` in the background.
pub(crate) fn start<S: TagSource>(spec: FillSpec<S>) -> BackgroundRequest {
	let token = spec.token.clone();
	let snapshot = spec.snapshot.clone();
	let target = spec.target;
	let priority = spec.priority.clone();
	let task = tagline_worker::spawn(TaskClass::Background, run(spec));
	BackgroundRequest {
		token,
		snapshot,
		target,
		priority,
		task,
	}
}

/// Posts completion when dropped, so the owner always learns the request ended.
struct CompletionGuard<T> {
	tx: mpsc::UnboundedSender<WorkerMsg<T>>,
	generation: u64,
	exhausted: bool,
}

impl<T> Drop for CompletionGuard<T> {
	fn drop(&mut self) {
		let _ = self.tx.send(WorkerMsg::Completed {
			generation: self.generation,
			exhausted: self.exhausted,
		});
	}
}

async fn run<S: TagSource>(spec: FillSpec<S>) {
	let generation = spec.token.generation();
	let guard = CompletionGuard {
		tx: spec.tx.clone(),
		generation,
		exhausted: false,
	};

	if let Some(delay) = spec.delay {
		let token = spec.token.clone();
		tokio::select! {
			_ = token.cancelled() => {
				tracing::trace!(generation, "tagger.fill.cancelled_in_delay");
				return;
			}
			_ = tokio::time::sleep(delay) => {}
		}
	}

	let handle = tagline_worker::spawn_blocking(TaskClass::CpuBlocking, move || fill(spec, guard));
	if let Err(err) = handle.await {
		match join_error_panic_message(err) {
			Some(msg) => tracing::warn!(generation, panic = %msg, "tagger.fill.panicked"),
			None => tracing::warn!(generation, "tagger.fill.aborted"),
		}
	}
}

fn fill<S: TagSource>(spec: FillSpec<S>, mut guard: CompletionGuard<S::Tag>) {
	let generation = spec.token.generation();
	let doc_len = spec.snapshot.len_chars();
	let mut planner = ChunkPlanner::new(spec.target, spec.chunk_lines, spec.done.iter().copied());

	while let Some(lines) = planner.next_chunk(&spec.priority) {
		if spec.token.is_cancelled() {
			tracing::trace!(generation, "tagger.fill.cancelled");
			return;
		}

		let chunk = spec.snapshot.line_span(lines);
		let request = SnapshotSpan::new(spec.snapshot.clone(), chunk);
		tracing::trace!(generation, start = lines.start, end = lines.end, "tagger.fill.chunk");

		let outcome = panic::catch_unwind(AssertUnwindSafe(|| spec.source.tags_in_background(&spec.data, &request, &spec.token)));
		let (tags, failed) = match outcome {
			Ok(Ok(tags)) => (tags, false),
			Ok(Err(SourceError::Cancelled)) => {
				tracing::trace!(generation, "tagger.fill.source_cancelled");
				return;
			}
			Ok(Err(err)) => {
				tracing::warn!(generation, start = lines.start, end = lines.end, error = %err, "tagger.fill.chunk_failed");
				(Vec::new(), true)
			}
			Err(payload) => {
				let msg = panic_message(&*payload);
				tracing::warn!(generation, start = lines.start, end = lines.end, panic = %msg, "tagger.fill.chunk_panicked");
				(Vec::new(), true)
			}
		};
		planner.mark_visited(lines);

		let tags: Vec<_> = tags.into_iter().filter(|t| chunk_owns(&chunk, t.span.start, doc_len)).collect();
		let span = tags.iter().fold(chunk, |acc, t| acc.cover(&t.span));
		let msg = WorkerMsg::Progress {
			generation,
			snapshot: spec.snapshot.clone(),
			chunk,
			span,
			tags,
			failed,
		};
		if spec.tx.send(msg).is_err() {
			return;
		}
	}

	guard.exhausted = true;
}
