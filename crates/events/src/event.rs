use chrono::{DateTime, Utc};

/// Something that happened to a product row or an order.
///
/// Stock events are consumed inside the unit of work that produced them.
/// Order events leave the process only after commit, wrapped in an
/// [`EventEnvelope`](crate::EventEnvelope).
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted routing name, `<context>.<aggregate>.<change>`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version; bumped on breaking field changes.
    fn version(&self) -> u32;

    /// Business time of the change, not publication time.
    fn occurred_at(&self) -> DateTime<Utc>;
}
