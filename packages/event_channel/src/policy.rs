use std::cell::RefCell;
use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use crate::Sealed;

/// Determines whether the operations of an [`EventChannel`][crate::EventChannel] are
/// mutually exclusive across threads.
///
/// The policy is a type parameter of the channel, so it is fixed when the channel is created
/// and cannot be swapped afterwards. This trait is sealed; the available policies are
/// [`Locking`] and [`NonLocking`].
pub trait SyncPolicy: Sealed + Debug + 'static {
    /// The container that guards the channel state under this policy.
    #[doc(hidden)]
    type Guarded<T>;

    /// The owned form in which handlers for events with arguments `A` are stored.
    #[doc(hidden)]
    type Handler<A>;

    /// Human-readable name of the policy, used in diagnostics.
    const NAME: &'static str;

    #[doc(hidden)]
    fn guarded<T>(value: T) -> Self::Guarded<T>;

    /// Acquires the guard, runs `f` with exclusive access to the state and releases the
    /// guard again when `f` returns or unwinds.
    #[doc(hidden)]
    fn with_acquired<T, R>(guarded: &Self::Guarded<T>, f: impl FnOnce(&mut T) -> R) -> R;

    #[doc(hidden)]
    fn invoke<A>(handler: &mut Self::Handler<A>, args: &A);
}

/// Operations of the channel hold a mutex for their full duration.
///
/// Channels using this policy are `Send` and `Sync` and can be shared between threads,
/// for example via `Arc`. Handlers must be `Send`.
///
/// The mutex is not reentrant: a handler must never call back into the channel that is
/// invoking it, as that would deadlock or panic.
#[derive(Debug)]
#[non_exhaustive]
pub struct Locking;

impl Sealed for Locking {}

impl SyncPolicy for Locking {
    type Guarded<T> = Mutex<T>;
    type Handler<A> = Box<dyn FnMut(&A) + Send>;

    const NAME: &'static str = "locking";

    fn guarded<T>(value: T) -> Self::Guarded<T> {
        Mutex::new(value)
    }

    fn with_acquired<T, R>(guarded: &Self::Guarded<T>, f: impl FnOnce(&mut T) -> R) -> R {
        // A handler that panicked during dispatch poisons the mutex. The channel state is
        // kept consistent even in that case, so the poison flag carries no information.
        let mut state = guarded.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn invoke<A>(handler: &mut Self::Handler<A>, args: &A) {
        handler(args);
    }
}

/// Operations of the channel are not synchronized.
///
/// Channels using this policy are neither `Send` nor `Sync`, so the compiler guarantees that
/// the producer and all consumers use the channel from the same thread. Handlers may capture
/// single-threaded types such as `Rc`.
///
/// A handler calling back into the channel that is invoking it causes a panic.
#[derive(Debug)]
#[non_exhaustive]
pub struct NonLocking;

impl Sealed for NonLocking {}

impl SyncPolicy for NonLocking {
    type Guarded<T> = RefCell<T>;
    type Handler<A> = Box<dyn FnMut(&A)>;

    const NAME: &'static str = "non-locking";

    fn guarded<T>(value: T) -> Self::Guarded<T> {
        RefCell::new(value)
    }

    fn with_acquired<T, R>(guarded: &Self::Guarded<T>, f: impl FnOnce(&mut T) -> R) -> R {
        let mut state = guarded.try_borrow_mut().expect(
            "event channel accessed from inside one of its own handlers - \
            use a one-shot subscription if a handler needs to unsubscribe itself",
        );

        f(&mut state)
    }

    fn invoke<A>(handler: &mut Self::Handler<A>, args: &A) {
        handler(args);
    }
}
