// SPDX-License-Identifier: GPL-3.0-only

//! Camera authorization on a Linux desktop
//!
//! Inside a Flatpak sandbox access goes through the XDG camera portal
//! (`org.freedesktop.portal.Camera.AccessCamera`), which shows the prompt and
//! answers with a `Request::Response` signal. Natively, access is decided by
//! file permissions on the `/dev/video*` nodes.

use super::{AuthorizationStatus, PermissionAuthority};
use crate::backends::camera::registry;
use crate::constants::app_info;
use futures::FutureExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Portal response code for a granted request
const RESPONSE_SUCCESS: u32 = 0;

/// Authorization backed by the camera portal or device node permissions
#[derive(Debug, Clone)]
pub struct PortalAuthority {
    sandboxed: bool,
    /// Portal answer, once there is one
    cached: Arc<Mutex<Option<AuthorizationStatus>>>,
}

impl Default for PortalAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalAuthority {
    pub fn new() -> Self {
        Self::with_sandbox(app_info::is_flatpak())
    }

    pub fn with_sandbox(sandboxed: bool) -> Self {
        Self {
            sandboxed,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_sandboxed(&self) -> bool {
        self.sandboxed
    }

    fn cached(&self) -> Option<AuthorizationStatus> {
        *self.cached.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PermissionAuthority for PortalAuthority {
    fn authorization_status(&self) -> AuthorizationStatus {
        if let Some(status) = self.cached() {
            return status;
        }
        if self.sandboxed {
            AuthorizationStatus::NotDetermined
        } else {
            device_node_status(&registry::video_nodes())
        }
    }

    fn request_access(&self) -> BoxFuture<'static, bool> {
        if !self.sandboxed {
            let granted = self.authorization_status() == AuthorizationStatus::Authorized;
            return futures::future::ready(granted).boxed();
        }

        let cached = Arc::clone(&self.cached);
        async move {
            let status = match access_camera().await {
                Ok(RESPONSE_SUCCESS) => AuthorizationStatus::Authorized,
                Ok(response) => {
                    info!(response, "Camera portal refused access");
                    AuthorizationStatus::Denied
                }
                Err(e) => {
                    warn!(error = %e, "Camera portal unavailable");
                    AuthorizationStatus::Restricted
                }
            };
            *cached.lock().unwrap_or_else(|e| e.into_inner()) = Some(status);
            status == AuthorizationStatus::Authorized
        }
        .boxed()
    }
}

/// Status from device node permissions
///
/// No nodes at all is not a permission problem; setup reports the missing
/// device instead.
pub fn device_node_status(nodes: &[impl AsRef<Path>]) -> AuthorizationStatus {
    if nodes.is_empty() || nodes.iter().any(|node| is_accessible(node.as_ref())) {
        AuthorizationStatus::Authorized
    } else {
        AuthorizationStatus::Denied
    }
}

/// Whether the process may open `path` for reading and writing
fn is_accessible(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    let accessible = unsafe { libc::access(c_path.as_ptr(), libc::R_OK | libc::W_OK) == 0 };
    if !accessible {
        debug!(path = %path.display(), "Video node not accessible");
    }
    accessible
}

/// Call `AccessCamera` and wait for the request's response code
async fn access_camera() -> zbus::Result<u32> {
    let connection = zbus::Connection::session().await?;

    let sender = connection
        .unique_name()
        .map(|name| name.as_str().trim_start_matches(':').replace('.', "_"))
        .ok_or_else(|| zbus::Error::Failure("connection has no unique name".to_string()))?;
    let token = format!("viewfinder_{}", uuid::Uuid::new_v4().simple());
    let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);

    // Subscribe before calling so a fast response is not missed
    let request = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        request_path.as_str(),
        REQUEST_INTERFACE,
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let camera = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        PORTAL_PATH,
        CAMERA_INTERFACE,
    )
    .await?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;
    debug!(handle = %handle, "Camera access requested");

    let message = responses
        .next()
        .await
        .ok_or_else(|| zbus::Error::Failure("portal request closed".to_string()))?;
    let body = message.body();
    let (response, _results): (u32, HashMap<String, OwnedValue>) = body.deserialize()?;

    Ok(response)
}
