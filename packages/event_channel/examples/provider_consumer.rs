//! A provider exposing several typed events and two consumers reacting to them.
//!
//! Consumers only know the argument types of the events they subscribe to. One consumer
//! unsubscribes from an event half way through, after which only the other one reacts.
//!
//! The channels' own trace-level log events are printed alongside the consumer output.

use std::rc::Rc;

use event_channel::{EventChannel, HandlerId, LocalEventChannel};
use tracing::Level;

/// Owns the events. Each event is a channel with its own argument type.
struct Provider {
    int_changed: LocalEventChannel<i32>,
    text_changed: LocalEventChannel<String>,
    flag_changed: LocalEventChannel<bool>,
    int_and_text: LocalEventChannel<(i32, String)>,

    /// Thread-safe so it could be raised from any thread.
    tick: EventChannel<()>,
}

impl Provider {
    fn new() -> Self {
        Self {
            int_changed: LocalEventChannel::builder().name("int_changed").build(),
            text_changed: LocalEventChannel::builder().name("text_changed").build(),
            flag_changed: LocalEventChannel::builder().name("flag_changed").build(),
            int_and_text: LocalEventChannel::builder().name("int_and_text").build(),
            tick: EventChannel::builder().name("tick").build(),
        }
    }
}

struct Consumer {
    provider: Rc<Provider>,
    int_handler: HandlerId,
}

impl Consumer {
    fn new(name: &'static str, provider: Rc<Provider>) -> Self {
        let int_handler = provider
            .int_changed
            .subscribe(move |value: &i32| println!("{name}: int = {value}"));

        provider
            .text_changed
            .subscribe(move |value: &String| println!("{name}: string = {value}"));

        provider
            .flag_changed
            .subscribe(move |value: &bool| println!("{name}: bool = {value}"));

        provider
            .int_and_text
            .subscribe(move |(number, text): &(i32, String)| {
                println!("{name}: int = {number}, string = {text}");
            });

        provider.tick.subscribe(move |()| println!("{name}: tick"));

        Self {
            provider,
            int_handler,
        }
    }

    fn unsubscribe_from_int(&self) {
        self.provider.int_changed.unsubscribe(self.int_handler);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .init();

    let provider = Rc::new(Provider::new());

    let first = Consumer::new("consumer 1", Rc::clone(&provider));
    let _second = Consumer::new("consumer 2", Rc::clone(&provider));

    provider.int_changed.rise(1);
    first.unsubscribe_from_int();
    provider.int_changed.rise(2);
    provider.int_changed.rise(3);

    provider.text_changed.rise("string test".to_string());
    provider.flag_changed.rise(false);
    provider
        .int_and_text
        .rise((777, "int and string test".to_string()));
    provider.tick.rise(());

    provider.tick.subscribe_once(|()| println!("one-shot: first tick only"));
    provider.tick.rise(());
    provider.tick.rise(());
}
