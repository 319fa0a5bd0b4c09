//! Integration tests for event channels shared between threads.
//!
//! Every test runs under a watchdog, since a locking bug shows up as a hang.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use event_channel::{EventChannel, HandlerId};
use testing::{CallLog, with_watchdog};

#[cfg_attr(miri, ignore)]
#[test]
fn subscribe_waits_for_rise_in_progress() {
    with_watchdog(|| {
        let channel = Arc::new(EventChannel::<u32>::new());
        let log = CallLog::new();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        channel.subscribe({
            let log = log.clone();
            move |_: &u32| {
                entered_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                log.record("rise finished");
            }
        });

        let riser = thread::spawn({
            let channel = Arc::clone(&channel);
            move || channel.rise(1)
        });

        entered_rx.recv().unwrap();

        let (subscribed_tx, subscribed_rx) = mpsc::channel();
        let subscriber = thread::spawn({
            let channel = Arc::clone(&channel);
            let log = log.clone();
            move || {
                let id = channel.subscribe(|_: &u32| {});
                log.record("subscribed");
                subscribed_tx.send(id).unwrap();
            }
        });

        // The subscriber must still be blocked because the rise holds the lock.
        thread::sleep(Duration::from_millis(50));
        assert!(subscribed_rx.try_recv().is_err());

        release_tx.send(()).unwrap();

        riser.join().unwrap();
        subscriber.join().unwrap();

        let id: HandlerId = subscribed_rx.recv().unwrap();
        assert_ne!(id.get(), 0);
        assert_eq!(log.entries(), ["rise finished", "subscribed"]);
        assert_eq!(channel.handler_count(), 2);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn concurrent_subscribers_get_distinct_ids() {
    with_watchdog(|| {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 100;

        let channel = Arc::new(EventChannel::<()>::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let channel = Arc::clone(&channel);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..PER_THREAD)
                        .map(|_| channel.subscribe(|()| {}))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<HandlerId> = workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect();

        let total = ids.len();
        ids.sort_unstable_by_key(|id| id.get());
        ids.dedup();

        assert_eq!(ids.len(), total);
        assert_eq!(channel.handler_count(), THREADS * PER_THREAD);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn concurrent_rises_deliver_every_event_once_per_handler() {
    with_watchdog(|| {
        const THREADS: usize = 4;
        const RISES_PER_THREAD: usize = 250;

        let channel = Arc::new(EventChannel::<usize>::new());
        let first_sum = Arc::new(AtomicUsize::new(0));
        let second_sum = Arc::new(AtomicUsize::new(0));

        for sum in [&first_sum, &second_sum] {
            let sum = Arc::clone(sum);
            channel.subscribe(move |value: &usize| {
                sum.fetch_add(*value, Ordering::Relaxed);
            });
        }

        thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..RISES_PER_THREAD {
                        channel.rise(1);
                    }
                });
            }
        });

        let expected = THREADS * RISES_PER_THREAD;
        assert_eq!(first_sum.load(Ordering::Relaxed), expected);
        assert_eq!(second_sum.load(Ordering::Relaxed), expected);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn one_shot_fires_once_under_concurrent_rises() {
    with_watchdog(|| {
        const THREADS: usize = 4;

        let channel = Arc::new(EventChannel::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Barrier::new(THREADS);

        channel.subscribe_once({
            let calls = Arc::clone(&calls);
            move |()| {
                calls.fetch_add(1, Ordering::Relaxed);
            }
        });

        thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    barrier.wait();
                    channel.rise(());
                });
            }
        });

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(channel.handler_count(), 0);
    });
}

#[cfg_attr(miri, ignore)]
#[test]
fn unsubscribe_from_other_thread_stops_delivery() {
    with_watchdog(|| {
        let channel = Arc::new(EventChannel::<u8>::new());
        let log = CallLog::new();

        let id = channel.subscribe({
            let log = log.clone();
            move |value: &u8| log.record(*value)
        });

        channel.rise(1);

        thread::spawn({
            let channel = Arc::clone(&channel);
            move || channel.unsubscribe(id)
        })
        .join()
        .unwrap();

        channel.rise(2);

        assert_eq!(log.entries(), [1]);
    });
}
