//! # Diary Viewer
//!
//! Detail screen lifecycle for a persisted entry.
//!
//! ```text
//! mount ─→ Loading ──(fetch + floor)──→ Ready { entry, is_author }
//!                   └────────────────→ Failed { reason }
//! ```
//!
//! [`EntryView`] publishes its state on a `watch` channel and stops writing
//! the moment it is torn down. [`DeletionCoordinator`] removes an entry and
//! its stored images.

mod delete;
mod view;

pub use delete::{DeletionCoordinator, DeletionReport};
pub use view::{EntryView, ViewState, DEFAULT_LOADING_FLOOR};
