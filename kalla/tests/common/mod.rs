#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test Event Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
    pub seq: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pong;

// ============================================================================
// Test Handler Types
// ============================================================================

/// A handler with one method per supported shape, appending a tag per
/// invocation to a shared log.
pub struct Audit {
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Audit {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn on_ping(&self, event: &Ping) {
        self.log.lock().unwrap().push(format!("sync:{}", event.seq));
    }

    pub fn first(&self, event: &Ping) {
        self.log.lock().unwrap().push(format!("first:{}", event.seq));
    }

    pub fn second(&self, event: &Ping) {
        self.log.lock().unwrap().push(format!("second:{}", event.seq));
    }

    pub fn third(&self, event: &Ping) {
        self.log.lock().unwrap().push(format!("third:{}", event.seq));
    }

    pub async fn on_ping_async(self: Arc<Self>, event: Arc<Ping>) {
        self.log.lock().unwrap().push(format!("async:{}", event.seq));
    }

    pub async fn on_ping_cancellable(
        self: Arc<Self>,
        event: Arc<Ping>,
        token: CancellationToken,
    ) {
        self.log
            .lock()
            .unwrap()
            .push(format!("cancellable:{}:{}", event.seq, token.is_cancelled()));
    }
}

impl Default for Audit {
    fn default() -> Self {
        Self::new()
    }
}

/// A handler whose methods fail or panic, for failure-normalization tests.
pub struct Flaky;

impl Flaky {
    pub fn fail(&self, _event: &Ping) -> Result<(), std::io::Error> {
        Err(std::io::Error::other("declined"))
    }

    pub fn explode(&self, _event: &Ping) {
        panic!("kaboom");
    }

    pub async fn explode_async(self: Arc<Self>, _event: Arc<Ping>) {
        panic!("async kaboom");
    }
}
