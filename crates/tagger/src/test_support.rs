//! Test doubles for tagger tests.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tagline_primitives::{LineRange, SnapshotSpan, Span, Version};
use tagline_worker::GenerationToken;
use tokio::time::{sleep, timeout};

use crate::error::SourceError;
use crate::source::{TagSource, TagSpan};
use crate::tagger::BackgroundTagger;

/// One recorded `tags_in_background` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Call {
	pub(crate) span: Span,
	pub(crate) lines: LineRange,
	pub(crate) version: Version,
}

#[derive(Default)]
struct GateState {
	closed: bool,
	permits: usize,
}

/// Blocks background calls until released.
#[derive(Default)]
struct Gate {
	state: Mutex<GateState>,
	cond: Condvar,
}

impl Gate {
	/// Waits for the gate to open or a permit, giving up once `cancel` fires.
	fn pass(&self, cancel: &GenerationToken) -> bool {
		let mut state = self.state.lock();
		loop {
			if !state.closed {
				return true;
			}
			if state.permits > 0 {
				state.permits -= 1;
				return true;
			}
			if cancel.is_cancelled() {
				return false;
			}
			self.cond.wait_for(&mut state, Duration::from_millis(5));
		}
	}
}

/// Tag source that tags every occurrence of a fixed set of words.
///
/// Background calls can be held behind a gate, made to fail or panic on
/// chosen lines, and are all recorded.
#[derive(Default)]
pub(crate) struct MockSource {
	words: Vec<(&'static str, &'static str)>,
	calls: Mutex<Vec<Call>>,
	data_calls: Mutex<usize>,
	gate: Gate,
	fail_lines: Mutex<Vec<usize>>,
	panic_lines: Mutex<Vec<usize>>,
	prompt: Mutex<Option<Vec<TagSpan<&'static str>>>>,
	fixed: Mutex<Vec<(usize, TagSpan<&'static str>)>>,
}

impl MockSource {
	pub(crate) fn new(words: &[(&'static str, &'static str)]) -> Arc<Self> {
		Arc::new(Self {
			words: words.to_vec(),
			..Self::default()
		})
	}

	pub(crate) fn close_gate(&self) {
		self.gate.state.lock().closed = true;
	}

	pub(crate) fn open_gate(&self) {
		self.gate.state.lock().closed = false;
		self.gate.cond.notify_all();
	}

	/// Lets `n` gated calls through.
	pub(crate) fn release(&self, n: usize) {
		self.gate.state.lock().permits += n;
		self.gate.cond.notify_all();
	}

	pub(crate) fn fail_on_line(&self, line: usize) {
		self.fail_lines.lock().push(line);
	}

	pub(crate) fn panic_on_line(&self, line: usize) {
		self.panic_lines.lock().push(line);
	}

	/// Reports `tag` whenever a chunk includes `line`, wherever the tag ends.
	pub(crate) fn tag_on_line(&self, line: usize, tag: TagSpan<&'static str>) {
		self.fixed.lock().push((line, tag));
	}

	pub(crate) fn set_prompt(&self, tags: Option<Vec<TagSpan<&'static str>>>) {
		*self.prompt.lock() = tags;
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub(crate) fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	pub(crate) fn data_calls(&self) -> usize {
		*self.data_calls.lock()
	}

	fn find_words(&self, span: &SnapshotSpan) -> Vec<TagSpan<&'static str>> {
		let text = span.text().to_string();
		let mut tags = Vec::new();
		for (word, tag) in &self.words {
			for (byte, _) in text.match_indices(word) {
				let start = span.start() + text[..byte].chars().count();
				tags.push(TagSpan::new(start..start + word.chars().count(), *tag));
			}
		}
		tags.sort_by_key(|t| t.span);
		tags
	}
}

impl TagSource for MockSource {
	type Tag = &'static str;
	type Data = Version;

	fn try_get_prompt(&self, _span: &SnapshotSpan) -> Option<Vec<TagSpan<&'static str>>> {
		self.prompt.lock().clone()
	}

	fn data_for_span(&self, span: &SnapshotSpan) -> Version {
		*self.data_calls.lock() += 1;
		span.version()
	}

	fn tags_in_background(&self, data: &Version, span: &SnapshotSpan, cancel: &GenerationToken) -> Result<Vec<TagSpan<&'static str>>, SourceError> {
		let lines = span.line_range();
		self.calls.lock().push(Call {
			span: span.span,
			lines,
			version: *data,
		});

		if !self.gate.pass(cancel) {
			return Err(SourceError::Cancelled);
		}
		if self.panic_lines.lock().iter().any(|l| lines.contains_line(*l)) {
			panic!("mock source panicked on {lines:?}");
		}
		if self.fail_lines.lock().iter().any(|l| lines.contains_line(*l)) {
			return Err(SourceError::failed(format!("bad lines {lines:?}")));
		}
		let mut tags = self.find_words(span);
		tags.extend(self.fixed.lock().iter().filter(|(l, _)| lines.contains_line(*l)).map(|(_, t)| t.clone()));
		Ok(tags)
	}
}

/// Opens the gate on drop so a failing test never leaves workers parked.
pub(crate) struct GateGuard(pub(crate) Arc<MockSource>);

impl Drop for GateGuard {
	fn drop(&mut self) {
		self.0.open_gate();
	}
}

/// Routes tracing output through the test harness. Safe to call repeatedly.
pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// Pumps until no request is in flight, up to five seconds.
pub(crate) async fn settle<S: TagSource>(tagger: &mut BackgroundTagger<S>) {
	timeout(Duration::from_secs(5), async {
		while tagger.has_pending() {
			tagger.wait_pumped().await;
		}
	})
	.await
	.expect("background work did not settle");
	tagger.pump();
}

/// Spins until the source has recorded `n` background calls.
pub(crate) async fn wait_for_calls(source: &MockSource, n: usize) {
	timeout(Duration::from_secs(5), async {
		while source.call_count() < n {
			sleep(Duration::from_millis(1)).await;
		}
	})
	.await
	.expect("source was not called in time");
}
