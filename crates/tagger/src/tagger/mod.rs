//! The owning-context half of the tagger.
//!
//! [`BackgroundTagger`] owns the cache and the in-flight request record.
//! Worker results and external signals arrive over channels and only touch
//! the cache when the owner calls [`BackgroundTagger::pump`] or
//! [`BackgroundTagger::wait_pumped`].

use std::sync::Arc;

use tagline_primitives::{LineRange, Snapshot, SnapshotSpan, Span, TrackingSpan};
use tagline_worker::{GenerationClock, LatestSlot};
use tokio::sync::mpsc;

use crate::cache::{Lookup, LookupKind, TagCache};
use crate::config::TaggerCfg;
use crate::handle::{Signal, TaggerHandle};
use crate::scheduler::{self, BackgroundRequest, FillSpec, WorkerMsg};
use crate::source::{TagSource, TagSpan};
use crate::stats::TaggerStats;

/// Tags for `span` may have changed since they were last returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsChanged {
	pub span: SnapshotSpan,
}

/// Incremental tag cache with a background fill scheduler.
///
/// Queries never block: they answer from the prompt path or the cache and
/// schedule background work for whatever the cache cannot answer exactly.
pub struct BackgroundTagger<S: TagSource> {
	source: Arc<S>,
	cfg: TaggerCfg,
	cache: TagCache<S::Tag>,
	request: Option<BackgroundRequest>,
	clock: GenerationClock,
	worker_tx: mpsc::UnboundedSender<WorkerMsg<S::Tag>>,
	worker_rx: mpsc::UnboundedReceiver<WorkerMsg<S::Tag>>,
	signal_tx: mpsc::UnboundedSender<Signal>,
	signal_rx: Option<mpsc::UnboundedReceiver<Signal>>,
	last_requested: Option<SnapshotSpan>,
	visible: Option<TrackingSpan>,
	changes: Vec<TagsChanged>,
	stats: TaggerStats,
	disposed: bool,
}

impl<S: TagSource> BackgroundTagger<S> {
	pub fn new(source: Arc<S>, cfg: TaggerCfg) -> Self {
		let (worker_tx, worker_rx) = mpsc::unbounded_channel();
		let (signal_tx, signal_rx) = mpsc::unbounded_channel();
		Self {
			source,
			cfg,
			cache: TagCache::default(),
			request: None,
			clock: GenerationClock::new(),
			worker_tx,
			worker_rx,
			signal_tx,
			signal_rx: Some(signal_rx),
			last_requested: None,
			visible: None,
			changes: Vec::new(),
			stats: TaggerStats::default(),
			disposed: false,
		}
	}

	/// Returns a sender for source `Changed` and layout events.
	pub fn handle(&self) -> TaggerHandle {
		TaggerHandle::new(self.signal_tx.clone())
	}

	pub fn source(&self) -> &Arc<S> {
		&self.source
	}

	pub fn cfg(&self) -> &TaggerCfg {
		&self.cfg
	}

	pub fn cache(&self) -> &TagCache<S::Tag> {
		&self.cache
	}

	pub fn stats(&self) -> TaggerStats {
		self.stats
	}

	/// Returns true while a background request is in flight.
	pub fn has_pending(&self) -> bool {
		self.request.is_some()
	}

	/// Line range targeted by the in-flight request, if any.
	pub fn pending_target(&self) -> Option<LineRange> {
		self.request.as_ref().map(|r| r.target())
	}

	pub fn last_requested(&self) -> Option<&SnapshotSpan> {
		self.last_requested.as_ref()
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// Returns tags intersecting any of `requested`.
	///
	/// All spans are expected on one snapshot; the first span's snapshot wins
	/// and spans on other snapshots are ignored.
	pub fn tags(&mut self, requested: &[SnapshotSpan]) -> Vec<TagSpan<S::Tag>> {
		let Some(first) = requested.first() else {
			return Vec::new();
		};
		let snapshot = first.snapshot.clone();
		let spans: Vec<Span> = requested.iter().filter(|r| r.snapshot == snapshot).map(|r| r.span).collect();
		let Some(cover) = Span::cover_all(&spans) else {
			return Vec::new();
		};
		let overall = SnapshotSpan { snapshot, span: cover };
		self.record_requested(&overall);

		let tags = match self.source.try_get_prompt(&overall) {
			Some(tags) => tags,
			None => {
				let lookup = self.cache.lookup(&overall);
				tracing::trace!(kind = ?lookup.kind, tags = lookup.tags.len(), version = %overall.version(), "tagger.lookup");
				if lookup.kind != LookupKind::Complete {
					self.ensure_coverage(&overall);
				}
				lookup.tags
			}
		};

		tags.into_iter()
			.filter(|t| spans.iter().any(|s| s.intersects(&t.span)))
			.collect()
	}

	/// Classifies `span` against the cache without scheduling anything.
	pub fn lookup(&mut self, span: &SnapshotSpan) -> Lookup<S::Tag> {
		self.cache.lookup(span)
	}

	fn record_requested(&mut self, span: &SnapshotSpan) {
		self.last_requested = Some(match self.last_requested.take() {
			Some(prev) if prev.snapshot.same_buffer(&span.snapshot) && prev.version() > span.version() => prev,
			Some(prev) if prev.snapshot == span.snapshot => SnapshotSpan {
				snapshot: prev.snapshot,
				span: prev.span.cover(&span.span),
			},
			_ => span.clone(),
		});
	}

	/// Makes sure background work covers `span`, expanded to whole lines.
	///
	/// A no-op if the in-flight request already targets those lines on the
	/// same snapshot, or if work already exists for a newer snapshot.
	/// Otherwise the in-flight request is cancelled and a new one starts.
	/// Disposed taggers never start work.
	pub fn ensure_coverage(&mut self, span: &SnapshotSpan) {
		if self.disposed {
			return;
		}
		let snapshot = &span.snapshot;
		if self.is_outdated(snapshot) {
			tracing::trace!(version = %snapshot.version(), "tagger.coverage_outdated");
			return;
		}
		let lines = span.line_range();
		if let Some(req) = &self.request
			&& req.covers(snapshot, &lines)
		{
			tracing::trace!(generation = req.generation(), "tagger.coverage_in_flight");
			return;
		}

		if let Some(old) = self.request.take() {
			tracing::debug!(generation = old.generation(), finished = old.is_finished(), "tagger.request_superseded");
			old.cancel();
			self.stats.requests_superseded += 1;
		}

		let priority = LatestSlot::new();
		if let Some(visible) = self.visible.as_ref().and_then(|v| v.resolve(snapshot))
			&& let Some(seed) = snapshot.line_range_of(visible).intersect(&lines)
		{
			priority.put(seed);
		}

		let done = match self.cache.exact() {
			Some(exact) if exact.snapshot() == snapshot => exact
				.coverage()
				.iter()
				.filter_map(|c| scheduler::lines_within(snapshot, *c))
				.collect(),
			_ => Vec::new(),
		};

		let target = SnapshotSpan {
			snapshot: snapshot.clone(),
			span: snapshot.line_span(lines),
		};
		let token = self.clock.token();
		tracing::debug!(
			generation = token.generation(),
			version = %snapshot.version(),
			start = lines.start,
			end = lines.end,
			"tagger.request_started"
		);
		let request = scheduler::start(FillSpec {
			data: self.source.data_for_span(&target),
			source: Arc::clone(&self.source),
			snapshot: snapshot.clone(),
			target: lines,
			done,
			chunk_lines: self.cfg.chunk_lines(),
			delay: self.cfg.delay(),
			token,
			priority,
			tx: self.worker_tx.clone(),
		});
		self.request = Some(request);
		self.stats.requests_started += 1;
	}

	/// Records the consumer's visible region.
	///
	/// A live request on the same snapshot whose target overlaps the region
	/// computes it next. Nothing new is started.
	pub fn set_visible_range(&mut self, span: SnapshotSpan) {
		self.visible = Some(TrackingSpan::exclusive(&span.snapshot, span.span));
		let Some(req) = &self.request else {
			return;
		};
		if req.snapshot() != &span.snapshot {
			return;
		}
		if req.prioritize(span.line_range()) {
			self.stats.reprioritizations += 1;
			tracing::trace!(generation = req.generation(), "tagger.reprioritized");
		}
	}

	/// Drops every cached tag after the source reported its data stale.
	///
	/// Cancels the in-flight request and, if the consumer ever requested a
	/// span, reports that whole span as changed.
	pub fn invalidate(&mut self) {
		self.cache.clear();
		if let Some(req) = self.request.take() {
			req.cancel();
		}
		self.stats.invalidations += 1;
		tracing::debug!(has_requested = self.last_requested.is_some(), "tagger.invalidated");
		if let Some(span) = self.last_requested.clone() {
			self.emit(span);
		}
	}

	/// Applies every queued worker message and external signal. Never blocks.
	///
	/// Returns the number of worker messages applied.
	pub fn pump(&mut self) -> usize {
		self.drain_signals();
		let mut applied = 0;
		while let Ok(msg) = self.worker_rx.try_recv() {
			self.apply(msg);
			applied += 1;
		}
		applied
	}

	/// Waits for at least one worker message while a request is in flight,
	/// then drains like [`Self::pump`].
	pub async fn wait_pumped(&mut self) -> usize {
		if self.request.is_none() {
			return self.pump();
		}
		match self.worker_rx.recv().await {
			Some(msg) => {
				self.apply(msg);
				1 + self.pump()
			}
			None => self.pump(),
		}
	}

	/// Takes the queued change notifications.
	pub fn take_changes(&mut self) -> Vec<TagsChanged> {
		std::mem::take(&mut self.changes)
	}

	/// Cancels background work and stops listening for signals.
	///
	/// The cache stays readable; queries after disposal never start work.
	pub fn dispose(&mut self) {
		if self.disposed {
			return;
		}
		self.disposed = true;
		if let Some(req) = self.request.take() {
			req.cancel();
		}
		self.signal_rx = None;
		tracing::debug!("tagger.disposed");
	}

	fn drain_signals(&mut self) {
		let mut signals = Vec::new();
		if let Some(rx) = self.signal_rx.as_mut() {
			while let Ok(signal) = rx.try_recv() {
				signals.push(signal);
			}
		}
		for signal in signals {
			match signal {
				Signal::Changed => self.invalidate(),
				Signal::Visible(span) => self.set_visible_range(span),
			}
		}
	}

	/// Returns true if the in-flight request or the exact cache entry belongs
	/// to a newer snapshot of the same buffer.
	fn is_outdated(&self, snapshot: &Snapshot) -> bool {
		let newer = |other: &Snapshot| other.same_buffer(snapshot) && other.version() > snapshot.version();
		self.request.as_ref().is_some_and(|r| newer(r.snapshot())) || self.cache.exact().is_some_and(|e| newer(e.snapshot()))
	}

	fn is_current(&self, generation: u64) -> bool {
		self.request.as_ref().is_some_and(|r| r.generation() == generation)
	}

	fn apply(&mut self, msg: WorkerMsg<S::Tag>) {
		match msg {
			WorkerMsg::Progress {
				generation,
				snapshot,
				chunk,
				span,
				tags,
				failed,
			} => {
				if !self.is_current(generation) {
					self.stats.stale_messages += 1;
					tracing::trace!(generation, "tagger.progress_stale");
					return;
				}
				if failed {
					self.stats.chunk_failures += 1;
				}

				self.cache.reconcile(&snapshot);
				let predicted = self.cache.tracked_prediction(&snapshot, &chunk);
				let unchanged = same_tags(&tags, &predicted);
				if !self.cache.apply_progress(&snapshot, chunk, tags) {
					self.stats.stale_messages += 1;
					return;
				}
				self.stats.chunks_processed += 1;

				if unchanged {
					self.stats.notifications_suppressed += 1;
					tracing::trace!(generation, start = span.start, end = span.end, "tagger.notify_suppressed");
				} else {
					self.emit(SnapshotSpan { snapshot, span });
				}
			}
			WorkerMsg::Completed { generation, exhausted } => {
				if !self.is_current(generation) {
					self.stats.stale_messages += 1;
					return;
				}
				self.request = None;
				if exhausted {
					self.cache.collapse_to_exact();
				}
				tracing::debug!(generation, exhausted, state = self.cache.state_name(), "tagger.request_completed");
			}
		}
	}

	fn emit(&mut self, span: SnapshotSpan) {
		self.stats.notifications_sent += 1;
		self.changes.push(TagsChanged { span });
	}
}

impl<S: TagSource> Drop for BackgroundTagger<S> {
	fn drop(&mut self) {
		self.dispose();
	}
}

/// Multiset equality over tag lists.
fn same_tags<T: PartialEq>(a: &[TagSpan<T>], b: &[TagSpan<T>]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut used = vec![false; b.len()];
	a.iter().all(|x| match b.iter().enumerate().position(|(i, y)| !used[i] && x == y) {
		Some(i) => {
			used[i] = true;
			true
		}
		None => false,
	})
}
