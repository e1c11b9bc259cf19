//! `brook` is a library of composable, push-based observable streams.
//!
//! An [`Observable`] is a lazy description of a value producer: nothing runs
//! until a [`Subscriber`] is attached with `subscribe`, and every
//! subscription is an independent execution of the stream. Producers may
//! emit synchronously on the subscribing thread, from an OS thread, or from
//! a `Tokio` task; the returned [`Subscription`] is used to cancel the
//! execution and to await asynchronous producers.
//!
//! Operators compose by wrapping: [`map`] and [`concat`] subscribe to their
//! source with a forwarding subscriber and never mutate it. Results are
//! constructed through [`ObservableFactory`], so an operator applied to a
//! wrapper kind yields a value of that same kind rather than the base
//! [`Observable`].
//!
//! # Example
//!
//! ```no_run
//! use brook::subscribe::Subscriber;
//! use brook::{Observable, ObservableExt, ObservableFactory, Subscribeable};
//!
//! let mut doubled = Observable::of([1, 2, 3]).map(|n| n * 2);
//!
//! let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
//! observer.on_complete(|| println!("Completed"));
//!
//! doubled.subscribe(observer); // Prints 2, 4, 6, then "Completed".
//! ```
//!
//! [`Observable`]: struct.Observable.html
//! [`Subscriber`]: subscribe/struct.Subscriber.html
//! [`Subscription`]: subscribe/struct.Subscription.html
//! [`map`]: trait.ObservableExt.html#method.map
//! [`concat`]: trait.ObservableExt.html#method.concat
//! [`ObservableFactory`]: trait.ObservableFactory.html

pub mod observable;
pub mod observer;
pub mod subscription;

pub use observable::{Observable, ObservableExt, ObservableFactory};
pub use observer::{ObservableError, Observer};
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};

/// Convenience re-export of the subscription building blocks.
pub mod subscribe {
    pub use crate::subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
        Unsubscribeable,
    };
}
