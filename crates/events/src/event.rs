use chrono::{DateTime, Utc};

/// A fact recorded by a marketplace document transition.
///
/// Activity records carry [`Event::event_type`] as their `kind`, so type
/// strings are part of the stored format and must not be renamed.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted type identifier, e.g. `"project.cruise.submitted"`.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
