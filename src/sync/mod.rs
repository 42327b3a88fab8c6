//! Local-first synchronization with the hosted store.
//!
//! Every write lands in SQLite first with `synced = false`. A sync cycle
//! pushes the signed-in user's pending records table by table, marks the
//! acknowledged revisions synced, then pulls the most recent remote rows
//! and inserts the ones not yet known locally.
//!
//! The [`SyncScheduler`] runs cycles in the background and the
//! [`OwnershipMigrator`] attributes records created while signed out to
//! the first identity that signs in.

mod auto_sync;
mod engine;
mod error;
#[cfg(test)]
mod memory;
mod migrator;
mod remote;
mod scheduler;
pub mod wire;

pub use auto_sync::try_auto_sync;
pub use engine::{CycleOutcome, CycleReport, Phase, SyncEngine, TableFailure};
pub use error::{RemoteError, SyncError};
#[cfg(test)]
pub use memory::MemoryRemote;
pub use migrator::{MigrationReport, OwnershipMigrator};
pub use remote::{build_select_url, RemoteStore, RestRemote};
pub use scheduler::{SchedulerHandle, SyncScheduler};
