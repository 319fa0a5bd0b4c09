use thiserror::Error;

/// Errors that can occur when operating on an event channel.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Every handler ID the channel can hand out is already in use by a registered handler.
    ///
    /// Unsubscribing any handler makes room for a new subscription.
    #[error("all {capacity} handler IDs of the event channel are in use")]
    IdSpaceExhausted {
        /// How many distinct handler IDs the channel can hand out.
        capacity: u32,
    },
}

/// A specialized `Result` type for event channel operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
