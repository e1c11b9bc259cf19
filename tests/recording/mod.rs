use std::sync::{Arc, Mutex};

use brook::subscribe::Subscriber;

/// Counters shared with a recording subscriber, so tests can inspect what a
/// subscription delivered after the fact.
pub struct EmissionLog<T> {
    pub nexts: Arc<Mutex<Vec<T>>>,
    pub completes: Arc<Mutex<u32>>,
    pub errors: Arc<Mutex<u32>>,
}

impl<T: Clone> EmissionLog<T> {
    pub fn nexts(&self) -> Vec<T> {
        self.nexts.lock().unwrap().clone()
    }

    pub fn completes(&self) -> u32 {
        *self.completes.lock().unwrap()
    }

    pub fn errors(&self) -> u32 {
        *self.errors.lock().unwrap()
    }
}

/// Builds a subscriber that records every `next`, `complete` and `error` call
/// it receives, along with the log it records into.
pub fn recording_subscriber<T: Send + 'static>() -> (Subscriber<T>, EmissionLog<T>) {
    let log = EmissionLog {
        nexts: Arc::new(Mutex::new(Vec::new())),
        completes: Arc::new(Mutex::new(0)),
        errors: Arc::new(Mutex::new(0)),
    };

    let nexts = Arc::clone(&log.nexts);
    let completes = Arc::clone(&log.completes);
    let errors = Arc::clone(&log.errors);

    let subscriber = Subscriber::new(
        move |v| {
            nexts.lock().unwrap().push(v);
        },
        move |_| {
            *errors.lock().unwrap() += 1;
        },
        move || {
            *completes.lock().unwrap() += 1;
        },
    );
    (subscriber, log)
}
