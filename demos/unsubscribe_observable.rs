//! This `Observable` emits values in a separate OS thread and returns a
//! `Subscription` that can be unsubscribed from, which stops the background
//! emission without waiting for the whole range to be produced.
//!
//! To run this demo, execute `cargo run --example unsubscribe_observable`.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use brook::subscribe::{
    Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable,
};
use brook::{Observable, ObservableExt, Observer, Subscribeable};

const UNSUBSCRIBE_SIGNAL: bool = true;

fn main() {
    // Create a custom observable that emits values in a separate thread.
    let observable = Observable::new(|mut o: Subscriber<_>| {
        let done = Arc::new(Mutex::new(false));
        let done_c = Arc::clone(&done);
        let (tx, rx) = std::sync::mpsc::channel();

        // Spawn a new thread to await a signal sent from the unsubscribe logic.
        std::thread::spawn(move || {
            // Attempt to receive a signal sent from the unsubscribe logic.
            if let Ok(UNSUBSCRIBE_SIGNAL) = rx.recv() {
                // Update the `done_c` mutex with the received signal.
                *done_c.lock().unwrap() = UNSUBSCRIBE_SIGNAL;
            }
        });

        // Launch a new thread for the Observable's processing and store its handle.
        let join_handle = std::thread::spawn(move || {
            for i in 0..=10000 {
                // If an unsubscribe signal is received, exit the loop and stop
                // emissions.
                if *done.lock().unwrap() == UNSUBSCRIBE_SIGNAL {
                    break;
                }
                // Emit the value to the subscriber.
                o.next(i);
                std::thread::sleep(Duration::from_millis(1));
            }
            // Signal completion to the subscriber. Ignored if the subscription
            // was cancelled in the meantime.
            o.complete();
        });

        // Return a new `Subscription` with custom unsubscribe logic.
        Ok(Subscription::new(
            // The provided closure defines the behavior of the subscription when
            // it is unsubscribed. In this case, it sends a signal to the emitting
            // thread to stop.
            UnsubscribeLogic::Logic(Box::new(move || {
                if tx.send(UNSUBSCRIBE_SIGNAL).is_err() {
                    println!("Receiver dropped.");
                }
            })),
            // Store the `JoinHandle` for awaiting completion using the
            // `Subscription`.
            SubscriptionHandle::JoinThread(join_handle),
        ))
    });

    // Create the `Subscriber` with a mandatory `next` function, and optional
    // `complete` function. No need for `error` function in this simple example.
    let mut observer = Subscriber::on_next(|v: String| println!("Emitted {}", v));
    observer.on_complete(|| println!("Completed"));

    // This observable uses OS threads so it will not block the current thread.
    // Observables are cold so if you comment out the statement below nothing
    // will be emitted.
    let subscription = observable.map(|v| format!("Mapped {}", v)).subscribe(observer);

    // Do something else here.
    println!("Do something while Observable is emitting.");

    // Unsubscribe from the observable to stop emissions.
    subscription.unsubscribe();

    // Allow some time for the main thread to confirm that the observable indeed
    // isn't emitting.
    std::thread::sleep(Duration::from_millis(2000));
    println!("`main` function done")
}
