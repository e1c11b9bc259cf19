//! The `observable` module provides the building blocks for creating,
//! transforming, and subscribing to observables.

use std::sync::{Arc, Mutex};

use crate::observer::{ObservableError, Observer};
use crate::subscription::subscribe::{
    Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable,
};

type SubscribeFn<T> =
    Box<dyn FnMut(Subscriber<T>) -> Result<Subscription, ObservableError> + Send + Sync>;

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// An `Observable` is a lazy description of a producer: it holds a subscribe
/// function and performs no work until [`subscribe`] is called. Every call to
/// `subscribe` runs the subscribe function once, starting an independent
/// execution of the stream.
///
/// # Example: basic synchronous `Observable`
///
/// This simple `Observable` emits values and completes. It returns an empty
/// `Subscription`, making it unable to be unsubscribed from. Because it does
/// not use async or threads, it blocks the current thread until it completes
/// emission.
///
/// ```no_run
/// use brook::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use brook::{Observable, Observer, Subscribeable};
///
/// // Create a custom observable that emits values from 1 to 10.
/// let mut emit_10_observable = Observable::new(|mut subscriber| {
///     let mut i = 1;
///
///     while i <= 10 {
///         // Emit the value to the subscriber.
///         subscriber.next(i);
///         i += 1;
///     }
///     // Signal completion to the subscriber.
///     subscriber.complete();
///
///     // Return the empty subscription.
///     Ok(Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil))
/// });
///
/// // Create the Subscriber with a mandatory `next` function, and optional
/// // `complete` function.
/// let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
/// observer.on_complete(|| println!("Completed"));
///
/// // Observables are cold: if you comment out the line below, no emissions
/// // will occur.
/// emit_10_observable.subscribe(observer);
///
/// println!("Custom Observable finished emitting")
/// ```
///
/// # Example: asynchronous `Observable` with `unsubscribe`
///
/// Emits values in a separate OS thread and returns a `Subscription` that can
/// be unsubscribed from, which stops the background emission.
///
/// ```no_run
/// use std::{
///     sync::{Arc, Mutex},
///     time::Duration,
/// };
///
/// use brook::subscribe::{
///     Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable,
/// };
/// use brook::{Observable, ObservableExt, Observer, Subscribeable};
///
/// const UNSUBSCRIBE_SIGNAL: bool = true;
///
/// let observable = Observable::new(|mut o: Subscriber<_>| {
///     let done = Arc::new(Mutex::new(false));
///     let done_c = Arc::clone(&done);
///     let (tx, rx) = std::sync::mpsc::channel();
///
///     // Spawn a new thread to await a signal sent from the unsubscribe logic.
///     std::thread::spawn(move || {
///         if let Ok(UNSUBSCRIBE_SIGNAL) = rx.recv() {
///             *done_c.lock().unwrap() = UNSUBSCRIBE_SIGNAL;
///         }
///     });
///
///     // Launch a new thread for the Observable's processing and store its handle.
///     let join_handle = std::thread::spawn(move || {
///         for i in 0..=10000 {
///             // If an unsubscribe signal is received, exit the loop and stop emissions.
///             if *done.lock().unwrap() == UNSUBSCRIBE_SIGNAL {
///                 break;
///             }
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///         o.complete();
///     });
///
///     Ok(Subscription::new(
///         // The closure runs when the subscription is unsubscribed; here it
///         // signals the emitting thread to stop.
///         UnsubscribeLogic::Logic(Box::new(move || {
///             if tx.send(UNSUBSCRIBE_SIGNAL).is_err() {
///                 println!("Receiver dropped.");
///             }
///         })),
///         // Store the `JoinHandle` for awaiting completion using the `Subscription`.
///         SubscriptionHandle::JoinThread(join_handle),
///     ))
/// });
///
/// let mut observer = Subscriber::on_next(|v: i32| println!("Emitted {}", v));
/// observer.on_complete(|| println!("Completed"));
///
/// let subscription = observable.map(|v| v * 2).subscribe(observer);
///
/// // Do something else here.
/// println!("Do something while Observable is emitting.");
///
/// // Unsubscribe from the observable to stop emissions.
/// subscription.unsubscribe();
/// ```
///
/// # Example: `Observable` with error handling
///
/// The subscribe function returns a `Result`; returning `Err` during setup
/// routes the failure to the attached observer's `error` handler instead of
/// propagating it to the caller of `subscribe`. Mid-stream failures are
/// signaled by calling `error` on the subscriber. Either way, errors are
/// wrapped in an `Arc` before being handed to the observer.
///
/// ```no_run
/// use std::{io, sync::Arc};
///
/// use brook::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use brook::{Observable, Observer, Subscribeable};
///
/// // Emits the number of bytes read from stdin, or signals failure.
/// pub fn line_length() -> Observable<usize> {
///     Observable::new(|mut observer| {
///         let mut input = String::new();
///
///         if let Err(e) = io::stdin().read_line(&mut input) {
///             // Route the input failure to the observer.
///             return Err(Arc::new(e));
///         }
///
///         observer.next(input.trim().len());
///         observer.complete();
///
///         Ok(Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil))
///     })
/// }
///
/// let observer = Subscriber::new(
///     |n| println!("Read {} bytes", n),
///     |e| eprintln!("{}", e),
///     || println!("Input handled"),
/// );
///
/// line_length().subscribe(observer);
/// ```
///
/// [`subscribe`]: trait.Subscribeable.html#tymethod.subscribe
pub struct Observable<T> {
    subscribe_fn: SubscribeFn<T>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// The closure `sf` defines the behavior of the `Observable` when
    /// subscribed: it receives the subscriber, arranges for values to be
    /// pushed, and returns a `Subscription` carrying the teardown logic and
    /// an optional join handle. Returning `Err` signals a setup failure,
    /// which the kernel delivers to the observer's `error` handler.
    ///
    /// `sf` is stored without being invoked; it runs once per `subscribe`
    /// call and must not assume it runs only once.
    pub fn new(
        sf: impl FnMut(Subscriber<T>) -> Result<Subscription, ObservableError> + Send + Sync + 'static,
    ) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }
}

// Forwards events into the shared subscriber, which holds the terminal and
// unsubscribe guards. The producer only ever sees this wrapper, so the kernel
// keeps a handle on the real subscriber for routing setup failures.
fn guarded_forwarder<T: 'static>(
    shared: &Arc<Mutex<Subscriber<T>>>,
    unsubscribed: Arc<Mutex<bool>>,
) -> Subscriber<T> {
    let shared_e = Arc::clone(shared);
    let shared_c = Arc::clone(shared);
    let shared = Arc::clone(shared);

    let mut guarded = Subscriber::new(
        move |v| shared.lock().unwrap().next(v),
        move |observable_error| shared_e.lock().unwrap().error(observable_error),
        move || shared_c.lock().unwrap().complete(),
    );
    guarded.set_unsubscribe_flag(unsubscribed);
    guarded
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, mut s: Subscriber<Self::ObsType>) -> Subscription {
        let unsubscribed = Arc::new(Mutex::new(false));
        s.set_unsubscribe_flag(Arc::clone(&unsubscribed));

        let shared = Arc::new(Mutex::new(s));
        let guarded = guarded_forwarder(&shared, Arc::clone(&unsubscribed));

        match (self.subscribe_fn)(guarded) {
            Err(e) => {
                // Setup failed before a subscription existed. The guard drops
                // the error if the execution already reached a terminal state.
                shared.lock().unwrap().error(e);
                Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
            }
            Ok(mut producer) => {
                let handle = producer.subscription_future;
                producer.subscription_future = SubscriptionHandle::Nil;

                if shared.lock().unwrap().is_closed() {
                    // The producer finished during setup; release its teardown
                    // now but keep the join handle for the caller.
                    producer.unsubscribe();
                    return Subscription::new(UnsubscribeLogic::Nil, handle);
                }

                Subscription::new(
                    UnsubscribeLogic::Logic(Box::new(move || {
                        *unsubscribed.lock().unwrap() = true;
                        producer.unsubscribe();
                    })),
                    handle,
                )
            }
        }
    }
}

/// Supplies the constructor that operators use to build derived observables.
///
/// Operators such as [`map`] and [`concat`] never name a concrete constructor;
/// they call [`create`] on the receiver's own kind, so applying an operator to
/// a wrapper kind yields that same kind rather than the base [`Observable`].
/// The same mechanism powers the [`of`] factory: invoked through a concrete
/// kind, it constructs that kind.
///
/// Wrapper kinds whose fields are a plain observable implement this trait by
/// delegating to `Observable::new` and filling in their own state:
///
/// ```no_run
/// use brook::subscribe::{Subscriber, Subscription};
/// use brook::{Observable, ObservableError, ObservableExt, ObservableFactory, Subscribeable};
///
/// struct Labeled<T> {
///     inner: Observable<T>,
///     label: &'static str,
/// }
///
/// impl<T: 'static> Subscribeable for Labeled<T> {
///     type ObsType = T;
///
///     fn subscribe(&mut self, s: Subscriber<T>) -> Subscription {
///         self.inner.subscribe(s)
///     }
/// }
///
/// impl<T: 'static> ObservableFactory<T> for Labeled<T> {
///     type Kind<U: 'static> = Labeled<U>;
///
///     fn create<U: 'static>(
///         sf: impl FnMut(Subscriber<U>) -> Result<Subscription, ObservableError>
///             + Send
///             + Sync
///             + 'static,
///     ) -> Labeled<U> {
///         Labeled {
///             inner: Observable::new(sf),
///             label: "labeled",
///         }
///     }
/// }
///
/// // `of`, `map` and `concat` all produce `Labeled` values now.
/// let doubled: Labeled<i32> = Labeled::of([1, 2, 3]).map(|n| n * 2);
/// ```
///
/// Kinds whose constructor requires data that cannot be defaulted this way
/// implement `create` to supply that data themselves; this is the supported
/// escape hatch rather than a hidden requirement.
///
/// [`map`]: trait.ObservableExt.html#method.map
/// [`concat`]: trait.ObservableExt.html#method.concat
/// [`create`]: trait.ObservableFactory.html#tymethod.create
/// [`of`]: trait.ObservableFactory.html#method.of
pub trait ObservableFactory<T: 'static> {
    /// The concrete observable kind this factory produces for an element type
    /// `U`.
    type Kind<U: 'static>: Subscribeable<ObsType = U>;

    /// Builds a new observable of this kind from a subscribe function.
    fn create<U: 'static>(
        sf: impl FnMut(Subscriber<U>) -> Result<Subscription, ObservableError> + Send + Sync + 'static,
    ) -> Self::Kind<U>;

    /// Creates an observable that emits the given values in order and then
    /// completes.
    ///
    /// Emission happens synchronously during `subscribe`. The values are
    /// cloned for every subscription, so the resulting observable can be
    /// subscribed to any number of times. Passing no values is legal and
    /// yields an observable that completes immediately without emitting.
    ///
    /// ```no_run
    /// use brook::subscribe::Subscriber;
    /// use brook::{Observable, ObservableFactory, Observer, Subscribeable};
    ///
    /// let mut observable = Observable::of([1, 2, 3]);
    ///
    /// observable.subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));
    /// ```
    fn of(values: impl IntoIterator<Item = T>) -> Self::Kind<T>
    where
        T: Clone + Send + Sync,
    {
        let values: Vec<T> = values.into_iter().collect();

        Self::create(move |mut o: Subscriber<T>| {
            for v in values.iter().cloned() {
                // An unsubscribe can land between emissions even in a
                // synchronous loop; stop pushing as soon as it does.
                if o.is_closed() {
                    break;
                }
                o.next(v);
            }
            o.complete();
            Ok(Subscription::new(
                UnsubscribeLogic::Nil,
                SubscriptionHandle::Nil,
            ))
        })
    }
}

impl<T: 'static> ObservableFactory<T> for Observable<T> {
    type Kind<U: 'static> = Observable<U>;

    fn create<U: 'static>(
        sf: impl FnMut(Subscriber<U>) -> Result<Subscription, ObservableError> + Send + Sync + 'static,
    ) -> Observable<U> {
        Observable::new(sf)
    }
}

/// The `ObservableExt` trait provides the operators that can be applied to
/// observables to transform and combine their emissions.
///
/// Every operator constructs its result through [`ObservableFactory`], so the
/// result is always the receiver's own kind.
///
/// [`ObservableFactory`]: trait.ObservableFactory.html
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> + ObservableFactory<T> {
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    ///
    /// The transformation function `f` is applied to each item emitted by the
    /// observable, and the resulting value is emitted by the resulting
    /// observable. Errors and completion are forwarded unchanged, and
    /// unsubscribing the resulting observable unsubscribes the source.
    fn map<U, F>(mut self, f: F) -> Self::Kind<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: (FnOnce(T) -> U) + Copy + Sync + Send + 'static,
        U: 'static,
    {
        Self::create(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    let t = f(v);
                    o_shared.lock().unwrap().next(t);
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            Ok(self.subscribe(u))
        })
    }

    /// Transforms the items emitted by the observable using a fallible
    /// transformation function.
    ///
    /// Behaves like [`map`] while `f` keeps returning `Ok`. The first `Err`
    /// is delivered to the resulting observable's `error` handler and the
    /// source subscription is torn down, so a failed transform stops the
    /// upstream producer instead of letting it keep emitting into a dead
    /// subscription.
    ///
    /// [`map`]: trait.ObservableExt.html#method.map
    fn try_map<U, F>(mut self, f: F) -> Self::Kind<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: (FnMut(T) -> Result<U, ObservableError>) + Sync + Send + 'static,
        U: 'static,
    {
        let f = Arc::new(Mutex::new(f));

        Self::create(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let f = Arc::clone(&f);

            // Filled in below once the source subscription exists; the next
            // handler empties it when the transform fails.
            let source_subscription: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let source_cloned = Arc::clone(&source_subscription);

            let u = Subscriber::new(
                move |v| {
                    let t = f.lock().unwrap()(v);
                    match t {
                        Ok(t) => o_shared.lock().unwrap().next(t),
                        Err(e) => {
                            o_shared.lock().unwrap().error(e);
                            if let Some(s) = source_cloned.lock().unwrap().take() {
                                s.unsubscribe();
                            }
                        }
                    }
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );

            let mut s = self.subscribe(u);
            let handle = s.subscription_future;
            s.subscription_future = SubscriptionHandle::Nil;
            *source_subscription.lock().unwrap() = Some(s);

            let source = Arc::clone(&source_subscription);
            Ok(Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    if let Some(s) = source.lock().unwrap().take() {
                        s.unsubscribe();
                    }
                })),
                handle,
            ))
        })
    }

    /// Emits all values from this observable, then all values from `other`.
    ///
    /// `other` is subscribed only after this observable completes; if this
    /// observable errors, the error is forwarded and `other` is never
    /// subscribed. Only one of the two sources is active at any moment, and
    /// unsubscribing mid-sequence tears down whichever source is currently
    /// active without starting the next one.
    fn concat<O>(mut self, other: O) -> Self::Kind<T>
    where
        Self: Sized + Send + Sync + 'static,
        O: Subscribeable<ObsType = T> + Send + Sync + 'static,
    {
        // Shared so the resulting observable stays re-subscribable.
        let other = Arc::new(Mutex::new(other));

        Self::create(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let other = Arc::clone(&other);

            // Subscription of whichever source is currently emitting.
            let active: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let active_on_switch = Arc::clone(&active);
            let switched = Arc::new(Mutex::new(false));
            let switched_c = Arc::clone(&switched);

            let first = Subscriber::new(
                move |v| {
                    o_shared.lock().unwrap().next(v);
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    // The first source is done; hand delivery over to the
                    // second. An unsubscribe before this point suppresses the
                    // complete call itself, so a cancelled sequence never
                    // reaches the second source.
                    *switched_c.lock().unwrap() = true;

                    let oc = Arc::clone(&o_cloned_c);
                    let oc_e = Arc::clone(&o_cloned_c);
                    let oc_c = Arc::clone(&o_cloned_c);

                    let second = Subscriber::new(
                        move |v| {
                            oc.lock().unwrap().next(v);
                        },
                        move |observable_error| {
                            oc_e.lock().unwrap().error(observable_error);
                        },
                        move || {
                            oc_c.lock().unwrap().complete();
                        },
                    );
                    let s = other.lock().unwrap().subscribe(second);
                    *active_on_switch.lock().unwrap() = Some(s);
                },
            );

            let mut s = self.subscribe(first);
            let handle = s.subscription_future;
            s.subscription_future = SubscriptionHandle::Nil;

            // When the first source completed during subscribe, the active
            // slot already belongs to the second source.
            if !*switched.lock().unwrap() {
                *active.lock().unwrap() = Some(s);
            }

            let active_cloned = Arc::clone(&active);
            Ok(Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    if let Some(s) = active_cloned.lock().unwrap().take() {
                        s.unsubscribe();
                    }
                })),
                handle,
            ))
        })
    }
}

impl<O, T: 'static> ObservableExt<T> for O where
    O: Subscribeable<ObsType = T> + ObservableFactory<T>
{
}
