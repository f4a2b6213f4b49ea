//! Change sets: the recorded difference between two consecutive snapshots.

mod changeset;
mod types;

pub use changeset::ChangeSet;
pub use types::{Bias, Edit, Insertion, Operation};

#[cfg(test)]
mod tests;
