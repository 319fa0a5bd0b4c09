use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::num::NonZeroU32;

use crate::{EventChannel, IdAllocator, Locking, SyncPolicy};

/// Creates instances of [`EventChannel`].
///
/// All parameters are optional. Use `EventChannel::builder()` to create a new instance of
/// this builder, or [`EventChannel::new()`] if the defaults are fine.
///
/// # Example
///
/// ```
/// use event_channel::EventChannel;
///
/// let order_placed = EventChannel::<(u64, String)>::builder()
///     .name("order_placed")
///     .build();
///
/// assert_eq!(order_placed.name(), "order_placed");
/// ```
pub struct EventChannelBuilder<A, P = Locking>
where
    P: SyncPolicy,
{
    name: Cow<'static, str>,

    /// Seed for the handler ID generator. If `None`, seeded from the thread-local RNG.
    id_seed: Option<u64>,

    /// Handler IDs are drawn from `1..=id_space`.
    id_space: NonZeroU32,

    _channel: PhantomData<fn(A) -> P>,
}

impl<A, P> EventChannelBuilder<A, P>
where
    P: SyncPolicy,
{
    pub(crate) fn new() -> Self {
        Self {
            name: Cow::Borrowed(""),
            id_seed: None,
            id_space: NonZeroU32::MAX,
            _channel: PhantomData,
        }
    }

    /// Sets the name of the channel, which is attached to its log events.
    ///
    /// The default is an empty name.
    #[must_use]
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Seeds the generator of handler IDs, making the sequence of IDs returned by the
    /// channel reproducible.
    ///
    /// By default the generator is seeded from the thread-local random number generator.
    ///
    /// # Example
    ///
    /// ```
    /// use event_channel::EventChannel;
    ///
    /// let first = EventChannel::<()>::builder().id_seed(42).build();
    /// let second = EventChannel::<()>::builder().id_seed(42).build();
    ///
    /// assert_eq!(first.subscribe(|()| {}), second.subscribe(|()| {}));
    /// ```
    #[must_use]
    pub fn id_seed(self, seed: u64) -> Self {
        Self {
            id_seed: Some(seed),
            ..self
        }
    }

    /// Limits handler IDs to the range `1..=id_space`.
    ///
    /// This also limits how many handlers can be registered at the same time. Once all IDs
    /// are in use, [`try_subscribe()`][EventChannel::try_subscribe] returns
    /// [`Error::IdSpaceExhausted`][crate::Error::IdSpaceExhausted]. The default is
    /// `u32::MAX`, which is not a practical limit.
    ///
    /// # Example
    ///
    /// ```
    /// use std::num::NonZeroU32;
    ///
    /// use event_channel::{EventChannel, SubscriptionKind};
    ///
    /// let channel = EventChannel::<()>::builder()
    ///     .id_space(NonZeroU32::new(1).unwrap())
    ///     .build();
    ///
    /// let id = channel.subscribe(|()| {});
    /// assert_eq!(id.get(), 1);
    ///
    /// assert!(channel.try_subscribe(|()| {}, SubscriptionKind::Persistent).is_err());
    /// ```
    #[must_use]
    pub fn id_space(self, id_space: NonZeroU32) -> Self {
        Self { id_space, ..self }
    }

    /// Creates the channel.
    #[must_use]
    pub fn build(self) -> EventChannel<A, P> {
        EventChannel::from_parts(self.name, IdAllocator::new(self.id_seed, self.id_space))
    }
}

impl<A, P> Debug for EventChannelBuilder<A, P>
where
    P: SyncPolicy,
{
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannelBuilder")
            .field("name", &self.name)
            .field("id_seed", &self.id_seed)
            .field("id_space", &self.id_space)
            .field("policy", &P::NAME)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::NonLocking;

    #[test]
    fn defaults() {
        let channel = EventChannelBuilder::<i32, Locking>::new().build();

        assert_eq!(channel.name(), "");
        assert_eq!(channel.handler_count(), 0);
    }

    #[test]
    fn name_accepts_owned_and_borrowed() {
        let borrowed = EventChannel::<i32>::builder().name("static").build();
        let owned = EventChannel::<i32, NonLocking>::builder()
            .name(format!("channel_{}", 7))
            .build();

        assert_eq!(borrowed.name(), "static");
        assert_eq!(owned.name(), "channel_7");
    }

    #[test]
    fn same_seed_gives_same_ids() {
        let first = EventChannel::<u8, NonLocking>::builder().id_seed(3).build();
        let second = EventChannel::<u8, NonLocking>::builder().id_seed(3).build();

        for _ in 0..5 {
            assert_eq!(first.subscribe(|_: &u8| {}), second.subscribe(|_: &u8| {}));
        }
    }

    #[test]
    fn id_space_bounds_ids() {
        let channel = EventChannel::<u8>::builder()
            .id_space(NonZeroU32::new(3).unwrap())
            .build();

        let mut ids: Vec<u32> = (0..3).map(|_| channel.subscribe(|_: &u8| {}).get()).collect();
        ids.sort_unstable();

        assert_eq!(ids, [1, 2, 3]);
    }

    #[test]
    fn debug_output_names_policy() {
        let builder = EventChannel::<u8, NonLocking>::builder().name("x");

        assert!(format!("{builder:?}").contains("non-locking"));
    }
}
