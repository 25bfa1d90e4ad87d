//! Domain events and the project activity feed.

pub mod activity;
pub mod event;

pub use activity::ActivityRecord;
pub use event::Event;
