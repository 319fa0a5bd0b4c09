use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};

use tracing::{debug, trace};

use crate::{
    Error, EventChannelBuilder, HandlerId, HandlerRegistry, IdAllocator, Locking, NonLocking,
    SyncPolicy,
};

/// Whether a handler stays registered after it has been invoked.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SubscriptionKind {
    /// The handler is invoked on every rise until it is unsubscribed.
    Persistent,

    /// The handler is invoked on the next rise only and then removed automatically.
    OneShot,
}

/// A typed event that invokes the registered handlers whenever it is raised.
///
/// `A` is the argument type of the event. Handlers receive a shared reference to the
/// arguments. Use a tuple for events with multiple arguments and `()` for events without
/// arguments.
///
/// `P` is the [`SyncPolicy`] of the channel. The default [`Locking`] policy makes the channel
/// safe to share between threads. For single-threaded use, see [`LocalEventChannel`].
///
/// # Dispatch order
///
/// [`rise()`][Self::rise] invokes handlers in the order they were subscribed. Subscribing the
/// same callable twice registers it twice, under two different IDs.
///
/// # Reentrancy
///
/// A handler must not call any method of the channel that is invoking it. With the
/// [`Locking`] policy this deadlocks or panics; with the [`NonLocking`] policy it panics.
/// Use [`subscribe_once()`][Self::subscribe_once] for handlers that should only run once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::thread;
///
/// use event_channel::EventChannel;
///
/// let bytes_received = Arc::new(EventChannel::<u32>::new());
/// let total = Arc::new(AtomicU32::new(0));
///
/// bytes_received.subscribe({
///     let total = Arc::clone(&total);
///     move |bytes: &u32| {
///         total.fetch_add(*bytes, Ordering::Relaxed);
///     }
/// });
///
/// thread::spawn({
///     let bytes_received = Arc::clone(&bytes_received);
///     move || bytes_received.rise(100)
/// })
/// .join()
/// .unwrap();
///
/// bytes_received.rise(20);
///
/// assert_eq!(total.load(Ordering::Relaxed), 120);
/// ```
pub struct EventChannel<A, P = Locking>
where
    P: SyncPolicy,
{
    state: P::Guarded<ChannelState<P::Handler<A>>>,

    /// Only used to tell channels apart in log output.
    name: Cow<'static, str>,
}

/// An [`EventChannel`] without synchronization, for use within a single thread.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use event_channel::LocalEventChannel;
///
/// let key_pressed = LocalEventChannel::<(char, bool)>::new();
/// let typed = Rc::new(RefCell::new(String::new()));
///
/// key_pressed.subscribe({
///     let typed = Rc::clone(&typed);
///     move |(key, shift): &(char, bool)| {
///         let key = if *shift { key.to_ascii_uppercase() } else { *key };
///         typed.borrow_mut().push(key);
///     }
/// });
///
/// key_pressed.rise(('h', true));
/// key_pressed.rise(('i', false));
///
/// assert_eq!(*typed.borrow(), "Hi");
/// ```
pub type LocalEventChannel<A> = EventChannel<A, NonLocking>;

/// The part of the channel that is guarded by the synchronization policy.
struct ChannelState<H> {
    registry: HandlerRegistry<H>,
    id_allocator: IdAllocator,
}

impl<A, P> EventChannel<A, P>
where
    P: SyncPolicy,
{
    /// Creates a channel with the default configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use event_channel::{EventChannel, NonLocking};
    ///
    /// let thread_safe = EventChannel::<String>::new();
    /// let single_threaded = EventChannel::<String, NonLocking>::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for customizing the channel before creating it.
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Gets replaced with itself by different name, bad mutation.
    pub fn builder() -> EventChannelBuilder<A, P> {
        EventChannelBuilder::new()
    }

    pub(crate) fn from_parts(name: Cow<'static, str>, id_allocator: IdAllocator) -> Self {
        Self {
            state: P::guarded(ChannelState {
                registry: HandlerRegistry::new(),
                id_allocator,
            }),
            name,
        }
    }

    /// The name given to the channel via the builder. Empty if no name was given.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of handlers currently registered.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        P::with_acquired(&self.state, |state| state.registry.len())
    }

    /// Removes the handler with the given ID, so it is not invoked by later rises.
    ///
    /// Does nothing if no handler with this ID is registered, for example because it was
    /// already unsubscribed or was a one-shot handler that has already fired.
    pub fn unsubscribe(&self, handler_id: HandlerId) {
        P::with_acquired(&self.state, |state| {
            if state.registry.remove(handler_id) {
                trace!(
                    channel = %self.name,
                    %handler_id,
                    handler_count = state.registry.len(),
                    "unsubscribed handler"
                );
            } else {
                debug!(
                    channel = %self.name,
                    %handler_id,
                    "ignoring unsubscribe of handler that is not registered"
                );
            }
        });
    }

    /// Invokes every registered handler with the given arguments, in subscription order.
    ///
    /// All handlers have returned by the time this method returns. Afterwards, the one-shot
    /// handlers are removed from the channel.
    ///
    /// # Panics
    ///
    /// If a handler panics, the panic propagates to the caller and the handlers after it are
    /// not invoked. One-shot handlers that were invoked before the panic (and the panicking
    /// handler itself, if one-shot) are still removed and the channel remains usable.
    ///
    /// Panics if called from inside a handler of the same [`NonLocking`] channel.
    pub fn rise(&self, args: A) {
        P::with_acquired(&self.state, |state| {
            trace!(
                channel = %self.name,
                handler_count = state.registry.len(),
                "rising event"
            );

            state
                .registry
                .dispatch(|handler| P::invoke(handler, &args));

            trace!(
                channel = %self.name,
                handler_count = state.registry.len(),
                "event handlers completed"
            );
        });
    }

    fn register(&self, handler: P::Handler<A>, kind: SubscriptionKind) -> Result<HandlerId, Error> {
        P::with_acquired(&self.state, |state| {
            let ChannelState {
                registry,
                id_allocator,
            } = state;

            let handler_id = id_allocator.allocate(registry.len(), |id| registry.contains(id))?;

            let one_shot = kind == SubscriptionKind::OneShot;
            registry.insert(handler_id, handler, one_shot);

            trace!(
                channel = %self.name,
                %handler_id,
                one_shot,
                handler_count = registry.len(),
                "subscribed handler"
            );

            Ok(handler_id)
        })
    }

    fn register_or_panic(&self, handler: P::Handler<A>, kind: SubscriptionKind) -> HandlerId {
        self.register(handler, kind)
            .unwrap_or_else(|error| panic!("cannot subscribe to event channel: {error}"))
    }
}

impl<A> EventChannel<A, Locking> {
    /// Registers a handler that is invoked on every rise until it is unsubscribed.
    ///
    /// Returns the ID to pass to [`unsubscribe()`][Self::unsubscribe].
    ///
    /// # Panics
    ///
    /// Panics if every handler ID of the channel is in use. With the default ID space this
    /// requires more than four billion registered handlers.
    pub fn subscribe<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&A) + Send + 'static,
    {
        self.register_or_panic(Box::new(handler), SubscriptionKind::Persistent)
    }

    /// Registers a handler that is invoked on the next rise only.
    ///
    /// The handler is removed automatically once that rise completes. It can still be
    /// removed earlier via [`unsubscribe()`][Self::unsubscribe].
    ///
    /// # Panics
    ///
    /// Panics if every handler ID of the channel is in use.
    pub fn subscribe_once<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&A) + Send + 'static,
    {
        self.register_or_panic(Box::new(handler), SubscriptionKind::OneShot)
    }

    /// Registers a handler, returning an error instead of panicking if every handler ID of
    /// the channel is in use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdSpaceExhausted`] if no handler ID is available.
    pub fn try_subscribe<F>(&self, handler: F, kind: SubscriptionKind) -> Result<HandlerId, Error>
    where
        F: FnMut(&A) + Send + 'static,
    {
        self.register(Box::new(handler), kind)
    }
}

impl<A> EventChannel<A, NonLocking> {
    /// Registers a handler that is invoked on every rise until it is unsubscribed.
    ///
    /// Returns the ID to pass to [`unsubscribe()`][Self::unsubscribe].
    ///
    /// # Panics
    ///
    /// Panics if every handler ID of the channel is in use.
    ///
    /// Panics if called from inside a handler of the same channel.
    pub fn subscribe<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&A) + 'static,
    {
        self.register_or_panic(Box::new(handler), SubscriptionKind::Persistent)
    }

    /// Registers a handler that is invoked on the next rise only.
    ///
    /// # Panics
    ///
    /// Panics if every handler ID of the channel is in use.
    ///
    /// Panics if called from inside a handler of the same channel.
    pub fn subscribe_once<F>(&self, handler: F) -> HandlerId
    where
        F: FnMut(&A) + 'static,
    {
        self.register_or_panic(Box::new(handler), SubscriptionKind::OneShot)
    }

    /// Registers a handler, returning an error instead of panicking if every handler ID of
    /// the channel is in use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdSpaceExhausted`] if no handler ID is available.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a handler of the same channel.
    pub fn try_subscribe<F>(&self, handler: F, kind: SubscriptionKind) -> Result<HandlerId, Error>
    where
        F: FnMut(&A) + 'static,
    {
        self.register(Box::new(handler), kind)
    }
}

impl<A, P> Default for EventChannel<A, P>
where
    P: SyncPolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, P> Debug for EventChannel<A, P>
where
    P: SyncPolicy,
{
    #[cfg_attr(test, mutants::skip)] // No API contract for debug output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // We do not acquire the guard here, as that could deadlock if called from a handler.
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("policy", &P::NAME)
            .finish_non_exhaustive()
    }
}
