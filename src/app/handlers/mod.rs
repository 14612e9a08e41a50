// SPDX-License-Identifier: GPL-3.0-only

//! Message handler modules
//!
//! This module organizes message handlers by functional domain,
//! keeping related functionality together for easier maintenance.

pub mod capture;
pub mod gestures;
pub mod session;
pub mod ui;

use crate::app::state::Message;
use cosmic::Task;

/// Create a delayed task that sends a message after the specified milliseconds
pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
    Task::perform(
        async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
            message
        },
        cosmic::Action::App,
    )
}
