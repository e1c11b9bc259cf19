//! Defines a wrapper observable kind with its own factory and shows that
//! `of`, `map` and `concat` all stay within that kind instead of falling back
//! to the base `Observable`.
//!
//! To run this demo, execute `cargo run --example derived_observable`.

use brook::subscribe::{Subscriber, Subscription};
use brook::{Observable, ObservableError, ObservableExt, ObservableFactory, Subscribeable};

/// An observable kind that announces every subscription before delegating to
/// the wrapped stream.
struct Announced<T> {
    inner: Observable<T>,
    name: &'static str,
}

impl<T: 'static> Subscribeable for Announced<T> {
    type ObsType = T;

    fn subscribe(&mut self, s: Subscriber<T>) -> Subscription {
        println!("[{}] subscribed", self.name);
        self.inner.subscribe(s)
    }
}

impl<T: 'static> ObservableFactory<T> for Announced<T> {
    type Kind<U: 'static> = Announced<U>;

    fn create<U: 'static>(
        sf: impl FnMut(Subscriber<U>) -> Result<Subscription, ObservableError> + Send + Sync + 'static,
    ) -> Announced<U> {
        Announced {
            inner: Observable::new(sf),
            name: "announced",
        }
    }
}

fn main() {
    // Every step of this chain is an `Announced` observable, because the
    // operators construct their results through the receiver's factory.
    let mut observable: Announced<String> = Announced::of([1, 2])
        .map(|v| v * 10)
        .concat(Announced::of([30, 40]))
        .map(|v| format!("value {}", v));

    let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
    observer.on_complete(|| println!("Completed"));

    observable.subscribe(observer);
}
