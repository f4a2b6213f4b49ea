/// Where a task runs. Recorded on the task's tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Async coordination that may sleep or be superseded.
	Background,
	/// Source calls and other CPU-bound work on the blocking pool.
	CpuBlocking,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::CpuBlocking => "cpu_blocking",
		}
	}
}
