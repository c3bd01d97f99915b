// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::{ReportAction, Session, can_edit_report_action};

/// Email of the signed-in user, shared by every clone of the handle.
///
/// Unset until a session value is applied. Each `apply` replaces the previous
/// value outright, so readers always see the latest delivered session.
#[derive(Debug, Clone, Default)]
pub struct SessionIdentity {
    email: Arc<RwLock<Option<String>>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Arc::new(RwLock::new(Some(email.into()))),
        }
    }

    pub fn email(&self) -> Option<String> {
        self.read().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.read().is_some()
    }

    pub fn apply(&self, session: Option<&Session>) {
        let next = session.and_then(|session| session.email.clone());
        let mut current = self.write();
        if *current != next {
            debug!(signed_in = next.is_some(), "session identity changed");
        }
        *current = next;
    }

    pub fn clear(&self) {
        self.apply(None);
    }

    pub fn can_edit(&self, action: &ReportAction) -> bool {
        can_edit_report_action(action, self.read().as_deref())
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<String>> {
        match self.email.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<String>> {
        match self.email.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Decodes a stored session value. `null` means signed out.
pub fn decode_session(value: Option<&Value>) -> Result<Option<Session>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Session::deserialize(value)
            .map(Some)
            .context("decode session value; expected an object with `email`"),
    }
}
