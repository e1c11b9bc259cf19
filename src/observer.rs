use std::{error::Error, sync::Arc};

/// Error payload delivered to an observer's `error` callback.
///
/// Producers wrap whatever failed in an `Arc` so the error can be passed
/// through forwarding layers without cloning the underlying error value.
pub type ObservableError = Arc<dyn Error + Send + Sync>;

/// The `Observer` trait defines how to handle the three kinds of events an
/// observable stream can deliver: a value, a failure, or completion.
///
/// Per subscription, at most one of `error` or `complete` is delivered and
/// no `next` follows either of them.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: ObservableError);
}
