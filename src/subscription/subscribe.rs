use std::{
    any::Any,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    thread::JoinHandle as ThreadJoinHandle,
};

use tokio::runtime;
use tokio::task::JoinHandle;

use crate::observer::{ObservableError, Observer};

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle emitted
    /// values.
    ///
    /// The `Subscriber` parameter defines the behavior for processing values
    /// emitted by the observable stream. The implementation of this method should
    /// establish one independent execution of the stream and manage the delivery
    /// of values to the subscriber.
    ///
    /// The returned `Subscription` allows the caller to cancel that execution
    /// before it finishes naturally, and to await asynchronous producers.
    ///
    /// Producer-side failures never propagate out of `subscribe`; they are
    /// delivered to the subscriber's `error` handler. A panicking handler, on
    /// the other hand, is not caught: it unwinds into whatever context the
    /// producer emits from.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of
/// resources associated with a subscription.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription and releases associated resources.
    ///
    /// Unsubscribing synchronously stops delivery to the observer, even when a
    /// producer is in the middle of a synchronous emission loop, and then runs
    /// the teardown logic the producer registered. The `Subscription` instance
    /// is consumed, so teardown cannot run more than once.
    fn unsubscribe(self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send + Sync>;
type ErrorFn = Box<dyn FnMut(ObservableError) + Send + Sync>;

/// A type that acts as an observer, allowing users to handle emitted values,
/// errors, and completion when subscribing to an `Observable`.
///
/// Users can create a `Subscriber` instance with the `new` method and provide
/// custom functions for the `next`, `error`, and `complete` events, or start
/// from [`on_next`] and attach the optional handlers afterwards. Handlers that
/// are never supplied default to doing nothing.
///
/// A `Subscriber` also enforces the delivery contract: after it observes a
/// terminal event, or after its subscription is unsubscribed, every further
/// event is silently dropped. At most one terminal event ever reaches the
/// user's handlers.
///
/// [`on_next`]: struct.Subscriber.html#method.on_next
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    completed: bool,
    errored: bool,
    unsubscribed: Option<Arc<Mutex<bool>>>,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for
    /// emitted values, errors, and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(ObservableError) + 'static + Send + Sync,
        complete_fn: impl FnMut() + 'static + Send + Sync,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            completed: false,
            errored: false,
            unsubscribed: None,
        }
    }

    /// Create a new `Subscriber` with the provided `next` function only.
    ///
    /// The `error` and `complete` handlers default to no-ops until they are
    /// supplied with [`on_error`] and [`on_complete`].
    ///
    /// [`on_error`]: struct.Subscriber.html#method.on_error
    /// [`on_complete`]: struct.Subscriber.html#method.on_complete
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            completed: false,
            errored: false,
            unsubscribed: None,
        }
    }

    /// Set the completion function for the `Subscriber`.
    ///
    /// The provided closure will be called when the observable completes its
    /// emission sequence.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send + Sync) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the `Subscriber`.
    ///
    /// The provided closure will be called when the observable signals a failure
    /// during its emission sequence.
    pub fn on_error(&mut self, error_fn: impl FnMut(ObservableError) + 'static + Send + Sync) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// True once this execution reached a terminal state or was unsubscribed.
    ///
    /// Producers that emit in a loop can poll this to stop emitting early:
    ///
    /// ```text
    /// Observable::new(|mut subscriber| {
    ///     // ...
    ///     if subscriber.is_closed() { ... };
    ///     // ...
    /// });
    /// ```
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.completed || self.errored || self.is_unsubscribed()
    }

    fn is_unsubscribed(&self) -> bool {
        self.unsubscribed
            .as_ref()
            .map_or(false, |flag| *flag.lock().unwrap())
    }

    // Wired in once per subscription so that unsubscribing cuts off delivery
    // immediately, before the producer's teardown has a chance to run.
    pub(crate) fn set_unsubscribe_flag(&mut self, flag: Arc<Mutex<bool>>) {
        self.unsubscribed = Some(flag);
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.is_closed() {
            return;
        }
        (self.next_fn)(v);
    }

    fn complete(&mut self) {
        if self.is_closed() {
            return;
        }
        self.completed = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)();
        }
    }

    fn error(&mut self, observable_error: ObservableError) {
        if self.is_closed() {
            return;
        }
        self.errored = true;
        if let Some(efn) = &mut self.error_fn {
            (efn)(observable_error);
        }
    }
}

/// Enumeration representing different types of handles used by `Subscription`
/// to await asynchronous producers.
pub enum SubscriptionHandle {
    /// No specific handle for task or thread awaiting.
    Nil,

    /// Holds a join handle for awaiting an asynchronous observable using a
    /// `Tokio` task.
    JoinTask(JoinHandle<()>),

    /// Holds a join handle for awaiting an asynchronous observable using an OS
    /// thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Represents one active execution of an observable against one observer,
/// allowing control over the subscription.
///
/// When an observable is subscribed to, it returns a `Subscription` instance.
/// This subscription can be used to cancel the execution before it finishes
/// naturally, and to await asynchronous observables that use `Tokio` tasks or
/// OS threads.
pub struct Subscription {
    pub(crate) unsubscribe_logic: UnsubscribeLogic,
    pub(crate) subscription_future: SubscriptionHandle,
    pub(crate) runtime_handle: Result<runtime::Handle, runtime::TryCurrentError>,
}

impl Subscription {
    /// Creates a new `Subscription` instance with the specified unsubscribe
    /// logic and subscription handle.
    ///
    /// The `unsubscribe_logic` parameter defines the teardown to execute upon
    /// unsubscribing from the observable. See [`UnsubscribeLogic`] for the
    /// available strategies.
    ///
    /// The `subscription_future` parameter holds a handle for awaiting
    /// asynchronous tasks or threads associated with the subscription. See
    /// [`SubscriptionHandle`] for the types of handles.
    ///
    /// [`UnsubscribeLogic`]: enum.UnsubscribeLogic.html
    /// [`SubscriptionHandle`]: enum.SubscriptionHandle.html
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        let runtime_handle = tokio::runtime::Handle::try_current();
        Subscription {
            unsubscribe_logic,
            subscription_future,
            runtime_handle,
        }
    }

    /// Awaits the completion of the asynchronous task or thread associated with
    /// this subscription.
    ///
    /// If the observable uses asynchronous `Tokio` tasks, this method will await
    /// the completion of the task. If the observable uses OS threads, it will
    /// await the completion of the thread.
    ///
    /// # Errors
    ///
    /// Returns an error if joining a thread or awaiting a task used by the
    /// observable fails.
    pub async fn join_concurrent(self) -> Result<(), Box<dyn Any + Send>> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => {
                let r = task_handle.await;
                r.map_err(|e| Box::new(e) as Box<dyn Any + Send>)
            }
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Awaits the completion of the asynchronous OS thread associated with this
    /// subscription, blocking the current thread.
    ///
    /// This method is useful when using the crate without `Tokio` in a project,
    /// as it allows for awaiting completion without relying on asynchronous
    /// constructs.
    ///
    /// # Errors
    ///
    /// Returns an error if joining a thread used by the observable fails.
    ///
    /// # Panics
    ///
    /// If this method is used to await a `Tokio` task, it will panic. To await
    /// `Tokio` tasks, use the `join_concurrent().await` method instead.
    pub fn join(self) -> Result<(), Box<dyn Any + Send>> {
        match self.subscription_future {
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
            SubscriptionHandle::JoinTask(_) => {
                panic!("Handle should be OS thread handle but it is Tokio task handle instead. When working with Tokio, use `join_concurrent().await` to await the completion of observables.")
            }
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.unsubscribe_logic.unsubscribe(self.runtime_handle);
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. Wrapped subscription's
    /// unsubscribe will be called upon unsubscribing.
    Wrapped(Box<Subscription>),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),

    /// Asynchronous unsubscribe logic represented by a future. Use if you need
    /// to spawn `Tokio` tasks or `.await` as a part of the unsubscribe logic.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl UnsubscribeLogic {
    fn unsubscribe(
        mut self,
        runtime_handle: Result<runtime::Handle, runtime::TryCurrentError>,
    ) -> Self {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => {
                fnc();
                self = Self::Nil;
            }
            UnsubscribeLogic::Wrapped(subscription) => {
                subscription.unsubscribe();
                self = Self::Nil;
            }
            UnsubscribeLogic::Future(future) => {
                match runtime_handle {
                    Ok(handle) => {
                        handle.spawn(async {
                            future.await;
                        });
                    }
                    e @ Err(_) => {
                        e.expect(
                            "Observable that uses Tokio tasks is called outside of Tokio runtime",
                        );
                    }
                }
                self = Self::Nil;
            }
        }
        self
    }
}
