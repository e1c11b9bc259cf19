mod generate_observable;
mod recording;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use generate_observable::generate_u32_observable;
use recording::recording_subscriber;

use brook::{
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable},
    Observable, ObservableFactory, Observer, Subscribeable,
};

#[test]
fn unchained_observable() {
    let value = 100;
    let o = Subscriber::new(
        move |v| {
            assert_eq!(
                v, value,
                "expected integer value {} but {} is emitted",
                value, v
            );
        },
        |_observable_error| {},
        move || {},
    );

    let mut s = Observable::new(move |mut o: Subscriber<_>| {
        o.next(value);
        Ok(Subscription::new(
            UnsubscribeLogic::Nil,
            SubscriptionHandle::Nil,
        ))
    });

    s.subscribe(o);
}

#[test]
fn emits_given_values_in_order_then_completes() {
    let mut observable = Observable::of(["asdf", "qwer", "zxcv"]);

    let (subscriber, log) = recording_subscriber();
    observable.subscribe(subscriber);

    assert_eq!(
        log.nexts(),
        vec!["asdf", "qwer", "zxcv"],
        "values should arrive in argument order"
    );
    assert_eq!(log.completes(), 1, "stream should complete exactly once");
    assert_eq!(log.errors(), 0, "stream should not error");
}

#[test]
fn completes_immediately_with_no_values() {
    let mut observable: Observable<i32> = Observable::of([]);

    let (subscriber, log) = recording_subscriber();
    observable.subscribe(subscriber);

    assert!(
        log.nexts().is_empty(),
        "no values should be emitted, got {:?}",
        log.nexts()
    );
    assert_eq!(log.completes(), 1, "empty stream should still complete");
}

#[test]
fn replays_values_for_each_subscription() {
    let mut observable = Observable::of([7, 8, 9]);

    let (first, first_log) = recording_subscriber();
    observable.subscribe(first);

    let (second, second_log) = recording_subscriber();
    observable.subscribe(second);

    assert_eq!(first_log.nexts(), vec![7, 8, 9]);
    assert_eq!(second_log.nexts(), vec![7, 8, 9]);
    assert_eq!(
        first_log.completes() + second_log.completes(),
        2,
        "each subscription is an independent execution and completes on its own"
    );
}

#[test]
fn awaits_threaded_observable_completion() {
    let end = 20;
    let mut observable = generate_u32_observable(end, move |last_emit_value| {
        assert_eq!(
            last_emit_value, end,
            "uninterrupted observable should emit all values, stopped at {}",
            last_emit_value
        );
    });

    let (subscriber, log) = recording_subscriber();
    let subscription = observable.subscribe(subscriber);

    // Await the thread started in the observable; propagate its panics.
    if let Err(e) = subscription.join() {
        std::panic::resume_unwind(e);
    }

    assert_eq!(
        log.nexts().len(),
        (end + 1) as usize,
        "all emitted values should be delivered"
    );
    assert_eq!(log.completes(), 1, "observable should complete after join");
}

#[test]
fn unsubscribe_stops_emissions_and_delivery() {
    let last_emit: Arc<Mutex<Option<u32>>> = Arc::new(Mutex::new(None));
    let last_emit_c = Arc::clone(&last_emit);

    let mut observable = generate_u32_observable(10_000, move |last_emit_value| {
        *last_emit_c.lock().unwrap() = Some(last_emit_value);
    });

    let (subscriber, log) = recording_subscriber();
    let subscription = observable.subscribe(subscriber);

    std::thread::sleep(Duration::from_millis(30));
    subscription.unsubscribe();

    // Give the emitting thread time to observe the signal and wind down.
    let mut last = None;
    for _ in 0..200 {
        last = *last_emit.lock().unwrap();
        if last.is_some() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let last = last.expect("emitting thread did not stop after unsubscribe");
    assert!(
        last < 10_000,
        "unsubscribe did not stop the producer, it emitted all {} values",
        last
    );

    let delivered = log.nexts().len();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(
        log.nexts().len(),
        delivered,
        "values should not be delivered after unsubscribe"
    );
    assert_eq!(
        log.completes(),
        0,
        "complete should not be delivered after unsubscribe"
    );
}
