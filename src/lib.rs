//! Local-first fitness tracking with background sync to a hosted store.

pub mod config;
pub mod db;
pub mod identity;
pub mod models;
pub mod session;
pub mod sync;
