//! The contract the engine needs from a resource's attribute model.

use std::fmt::Debug;

/// An attribute bag describing one resource.
///
/// The engine only reads and writes the primary identifier; every other
/// attribute is owned by the resource family's translators.
pub trait ResourceModel: Clone + Debug + Send + Sync + 'static {
    /// Returns the primary identifier, if assigned.
    fn primary_identifier(&self) -> Option<&str>;

    /// Assigns the primary identifier.
    fn set_primary_identifier(&mut self, identifier: String);

    /// Merges freshly read backend attributes into this model.
    ///
    /// Values present in `fresh` win; attributes `fresh` leaves unset keep
    /// their local value.
    #[must_use]
    fn merge(self, fresh: Self) -> Self;
}
