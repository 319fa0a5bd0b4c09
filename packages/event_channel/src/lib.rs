#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Typed in-process event channels with synchronous, ordered dispatch.
//!
//! An [`EventChannel<A>`] decouples the code that raises an event (the producer) from the
//! code that reacts to it (the consumers). The only thing both sides share is the argument
//! type `A` of the event. Use a tuple for events with several arguments and `()` for events
//! without arguments.
//!
//! Consumers register handlers via [`subscribe()`][EventChannel::subscribe] and receive a
//! [`HandlerId`] they can later pass to [`unsubscribe()`][EventChannel::unsubscribe].
//! Producers call [`rise()`][EventChannel::rise] to invoke every registered handler, in
//! subscription order, before `rise()` returns.
//!
//! # Synchronization policies
//!
//! Each channel is parameterized by a [`SyncPolicy`] chosen when the channel type is named:
//!
//! * [`Locking`] (the default) - every operation holds a mutex for its full duration, so
//!   the channel can be shared between threads. Handlers must be `Send`.
//! * [`NonLocking`] - no synchronization at all. The channel is not `Sync`, so the compiler
//!   ensures it is only used from one thread at a time. Handlers may capture `Rc` and other
//!   single-threaded types. [`LocalEventChannel<A>`] is a shorthand for this variant.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use event_channel::EventChannel;
//!
//! let temperature_changed = EventChannel::<i32>::new();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let handler_id = temperature_changed.subscribe({
//!     let seen = Arc::clone(&seen);
//!     move |celsius: &i32| seen.lock().unwrap().push(*celsius)
//! });
//!
//! temperature_changed.rise(21);
//! temperature_changed.unsubscribe(handler_id);
//! temperature_changed.rise(22);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![21]);
//! ```
//!
//! # One-shot handlers
//!
//! A handler registered via [`subscribe_once()`][EventChannel::subscribe_once] is removed
//! automatically after the first `rise()` that invokes it. This is also the only supported
//! way for a handler to "unsubscribe itself": calling back into the same channel from inside
//! a handler is not allowed (it deadlocks or panics, depending on the policy).
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use event_channel::LocalEventChannel;
//!
//! let connected = LocalEventChannel::<()>::new();
//!
//! let calls = Rc::new(Cell::new(0));
//!
//! connected.subscribe_once({
//!     let calls = Rc::clone(&calls);
//!     move |()| calls.set(calls.get() + 1)
//! });
//!
//! connected.rise(());
//! connected.rise(());
//!
//! assert_eq!(calls.get(), 1);
//! assert_eq!(connected.handler_count(), 0);
//! ```
//!
//! # Handler panics
//!
//! If a handler panics, the panic propagates out of `rise()` and the remaining handlers of
//! that dispatch pass are not invoked. The channel remains usable afterwards: one-shot
//! handlers that were already invoked in the interrupted pass are still removed.
//!
//! # Logging
//!
//! The channel emits `tracing` events at trace and debug level. Give a channel a name via
//! [`EventChannel::builder()`] to tell channels apart in the output.

mod builder;
mod channel;
mod error;
mod handler_id;
mod id_allocator;
mod policy;
mod registry;
mod sealed;

pub use builder::*;
pub use channel::*;
pub use error::*;
pub use handler_id::*;
pub(crate) use id_allocator::*;
pub use policy::*;
pub(crate) use registry::*;
pub(crate) use sealed::*;
