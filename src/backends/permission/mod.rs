// SPDX-License-Identifier: GPL-3.0-only

//! Camera permission gate
//!
//! Session setup only proceeds once camera use is authorized. The gate asks
//! the [`PermissionAuthority`] for the current status and, if the user has not
//! decided yet, hands back the request future so the application can run it
//! off the UI thread and receive the answer as a message.

pub mod portal;

pub use portal::PortalAuthority;

use crate::errors::CaptureError;
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Camera authorization state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet
    NotDetermined,
    /// Access is blocked by policy; the user cannot grant it
    Restricted,
    /// The user refused access
    Denied,
    Authorized,
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationStatus::NotDetermined => write!(f, "not determined"),
            AuthorizationStatus::Restricted => write!(f, "restricted"),
            AuthorizationStatus::Denied => write!(f, "denied"),
            AuthorizationStatus::Authorized => write!(f, "authorized"),
        }
    }
}

/// Source of camera authorization
pub trait PermissionAuthority: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for access; resolves exactly once with the answer
    fn request_access(&self) -> BoxFuture<'static, bool>;
}

/// What the application should do next
pub enum GateDecision {
    /// Start the session now
    Granted,
    /// Run this request; start the session if it resolves to `true`
    Pending(BoxFuture<'static, bool>),
    /// Stop here
    Refused(AuthorizationStatus),
}

impl fmt::Debug for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Granted => write!(f, "Granted"),
            GateDecision::Pending(_) => write!(f, "Pending(..)"),
            GateDecision::Refused(status) => write!(f, "Refused({:?})", status),
        }
    }
}

/// Setup error for a refused status
pub fn refusal_error(status: AuthorizationStatus) -> CaptureError {
    match status {
        AuthorizationStatus::Restricted => CaptureError::PermissionRestricted,
        _ => CaptureError::PermissionDenied,
    }
}

/// Gate in front of session setup
#[derive(Debug, Default)]
pub struct PermissionGate<A> {
    authority: A,
}

impl<A: PermissionAuthority> PermissionGate<A> {
    pub fn new(authority: A) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Check the current status and request access if undecided
    ///
    /// Denied and restricted are final; there is no re-prompt.
    pub fn check_and_request_permission(&self) -> GateDecision {
        let status = self.authority.authorization_status();
        debug!(%status, "Camera authorization status");

        match status {
            AuthorizationStatus::Authorized => GateDecision::Granted,
            AuthorizationStatus::NotDetermined => {
                info!("Requesting camera access");
                GateDecision::Pending(self.authority.request_access())
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                info!(%status, "Camera access refused");
                GateDecision::Refused(status)
            }
        }
    }
}
