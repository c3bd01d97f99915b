// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use reportline_app::{
    ReportAction, ReportCollection, SessionIdentity, decode_session, lenient_report,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

pub mod keys {
    pub const SESSION: &str = "session";
    pub const COLLECTION_REPORT: &str = "report_";
    pub const COLLECTION_REPORT_ACTIONS: &str = "reportActions_";

    pub fn report(report_id: &str) -> String {
        format!("{COLLECTION_REPORT}{report_id}")
    }

    pub fn report_actions(report_id: &str) -> String {
        format!("{COLLECTION_REPORT_ACTIONS}{report_id}")
    }
}

type Callback = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Subscriber {
    id: ConnectionId,
    key: String,
    callback: Callback,
}

#[derive(Default)]
struct State {
    values: Map<String, Value>,
    subscribers: Vec<Subscriber>,
    next_connection: u64,
}

/// In-memory key/value store with per-key change subscriptions.
///
/// Writes are serialized, and callbacks for a write finish before the next
/// write starts, so every subscriber sees changes in write order. Callbacks run
/// on the writing thread without the state lock held and may read the store.
/// They must not write to it or call [`Store::connect`]: both take the delivery
/// lock, which is not reentrant, and would deadlock.
#[derive(Default)]
pub struct Store {
    state: Mutex<State>,
    delivery: Mutex<()>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.state().values.get(key).cloned()
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .with_context(|| format!("decode stored value for key {key:?}"))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state().values.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.state().values.keys().cloned().collect()
    }

    /// Replaces the value under `key`. Storing `null` removes the key.
    pub fn set(&self, key: &str, value: Value) {
        if value.is_null() {
            self.remove(key);
            return;
        }
        let _delivery = self.delivery();
        self.state().values.insert(key.to_owned(), value.clone());
        debug!(key, "store value set");
        self.notify(key, Some(&value));
    }

    pub fn set_serialized<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("encode value for key {key:?}"))?;
        self.set(key, value);
        Ok(())
    }

    /// Shallow merge: top-level fields of an object patch overwrite the stored
    /// object's fields. Any other patch replaces the value.
    pub fn merge(&self, key: &str, patch: Value) {
        let _delivery = self.delivery();
        let merged = {
            let mut state = self.state();
            let merged = match (state.values.get(key), patch) {
                (Some(Value::Object(current)), Value::Object(fields)) => {
                    let mut next = current.clone();
                    for (field, value) in fields {
                        next.insert(field, value);
                    }
                    Value::Object(next)
                }
                (_, patch) => patch,
            };
            if merged.is_null() {
                state.values.shift_remove(key);
                None
            } else {
                state.values.insert(key.to_owned(), merged.clone());
                Some(merged)
            }
        };
        debug!(key, removed = merged.is_none(), "store value merged");
        self.notify(key, merged.as_ref());
    }

    pub fn remove(&self, key: &str) -> bool {
        let _delivery = self.delivery();
        let removed = self.state().values.shift_remove(key).is_some();
        if removed {
            debug!(key, "store value removed");
            self.notify(key, None);
        }
        removed
    }

    /// Values whose key starts with `prefix`, in insertion order.
    pub fn collection(&self, prefix: &str) -> Vec<(String, Value)> {
        self.state()
            .values
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Subscribes to changes of `key`. A value already present is delivered
    /// before this returns.
    pub fn connect<F>(&self, key: &str, callback: F) -> ConnectionId
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let _delivery = self.delivery();
        let callback: Callback = Arc::new(callback);
        let (id, current) = {
            let mut state = self.state();
            state.next_connection += 1;
            let id = ConnectionId(state.next_connection);
            state.subscribers.push(Subscriber {
                id,
                key: key.to_owned(),
                callback: Arc::clone(&callback),
            });
            (id, state.values.get(key).cloned())
        };
        debug!(key, connection = id.get(), "store subscriber connected");
        if let Some(value) = current {
            callback(Some(&value));
        }
        id
    }

    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|subscriber| subscriber.id != id);
        let removed = state.subscribers.len() != before;
        if removed {
            debug!(connection = id.get(), "store subscriber disconnected");
        }
        removed
    }

    /// Keeps `identity` in step with the value stored under the session key.
    pub fn connect_session(&self, identity: &SessionIdentity) -> ConnectionId {
        let identity = identity.clone();
        self.connect(keys::SESSION, move |value| {
            match decode_session(value) {
                Ok(session) => identity.apply(session.as_ref()),
                Err(error) => {
                    let message = format!("{error:#}");
                    warn!(error = %message, "ignoring malformed session; signing out");
                    identity.clear();
                }
            }
        })
    }

    /// Every stored report, keyed by its store key. Values that do not decode
    /// as a report are logged and kept as `null` entries.
    pub fn reports(&self) -> ReportCollection {
        ReportCollection::Keyed(
            self.collection(keys::COLLECTION_REPORT)
                .into_iter()
                .map(|(key, value)| {
                    let report = lenient_report(&key, value);
                    (key, report)
                })
                .collect(),
        )
    }

    pub fn report_actions(&self, report_id: &str) -> Result<Vec<ReportAction>> {
        let key = keys::report_actions(report_id);
        let Some(value) = self.get(&key) else {
            return Ok(Vec::new());
        };
        decode_actions(value).with_context(|| format!("decode report actions stored under {key:?}"))
    }

    fn notify(&self, key: &str, value: Option<&Value>) {
        let callbacks: Vec<Callback> = self
            .state()
            .subscribers
            .iter()
            .filter(|subscriber| subscriber.key == key)
            .map(|subscriber| Arc::clone(&subscriber.callback))
            .collect();
        trace!(key, subscribers = callbacks.len(), "delivering store change");
        for callback in callbacks {
            callback(value);
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn delivery(&self) -> MutexGuard<'_, ()> {
        match self.delivery.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Actions are stored either as a list or as an object keyed by action id.
fn decode_actions(value: Value) -> Result<Vec<ReportAction>> {
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .filter(|(_, action)| !action.is_null())
            .map(|(_, action)| serde_json::from_value(action).map_err(anyhow::Error::from))
            .collect(),
        other => Ok(serde_json::from_value(other)?),
    }
}
