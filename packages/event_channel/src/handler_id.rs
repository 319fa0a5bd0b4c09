use std::fmt::{self, Display, Formatter};
use std::num::NonZeroU32;

/// Identifies a handler registered with an [`EventChannel`][crate::EventChannel].
///
/// Returned by the subscribe methods and accepted by
/// [`unsubscribe()`][crate::EventChannel::unsubscribe]. The value is never zero and is
/// unique among the handlers currently registered with the same channel. It is not unique
/// across channels, and a value may be handed out again after the handler it identified
/// has been removed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HandlerId(NonZeroU32);

impl HandlerId {
    #[must_use]
    pub(crate) const fn new(value: NonZeroU32) -> Self {
        Self(value)
    }

    /// The numeric value of the ID, for diagnostic purposes.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for HandlerId {
    #[cfg_attr(test, mutants::skip)] // No API contract for the display format.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
