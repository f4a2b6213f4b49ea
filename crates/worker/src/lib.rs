//! Shared worker runtime primitives for background tag computation.

mod class;
mod panic;
mod slot;
mod spawn;
mod token;

pub use class::TaskClass;
pub use panic::{join_error_panic_message, panic_message};
pub use slot::LatestSlot;
pub use spawn::{spawn, spawn_blocking};
pub use token::{GenerationClock, GenerationToken};
pub use tokio_util::sync::CancellationToken;
