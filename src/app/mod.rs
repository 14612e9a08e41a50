// SPDX-License-Identifier: GPL-3.0-only

//! Viewfinder application
//!
//! The application model is the orchestrator: it runs the permission gate,
//! starts the capture session, routes gestures to the zoom and focus
//! controllers, and hands shutter presses to the capture coordinator.
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, ContextPage)
//! - `gestures`: Pinch/tap recognition over raw pointer events
//! - `gesture_area`: Widget feeding pointer events to the recognizer
//! - `focus_ring`: Focus ring animation and overlay
//! - `controls`: Shutter button
//! - `settings`: Settings drawer UI
//! - `view`: Main view rendering
//! - `update`: Message handling

mod controls;
pub mod focus_ring;
mod gesture_area;
pub mod gestures;
mod handlers;
mod settings;
mod state;
mod update;
mod view;

use crate::backends::camera::{CaptureSessionManager, FocusController, V4l2Backend, ZoomController};
use crate::backends::permission::{PermissionGate, PortalAuthority};
use crate::config::Config;
use crate::constants::app_info;
use crate::fl;
use crate::pipelines::photo::PhotoCaptureCoordinator;
use cosmic::app::context_drawer;
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Message, SetupState};
use tracing::{error, info};

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = app_info::APP_ID;

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .version(app_info::version())
            .links([(fl!("repository"), app_info::REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        let (config_handler, config) = Config::load_with_handler();

        // GStreamer must be initialised before any element is created
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        let zoom = ZoomController::new(config.zoom_limit());

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            theme_options: vec![fl!("match-desktop"), fl!("dark"), fl!("light")],
            permission: PermissionGate::new(PortalAuthority::new()),
            setup: SetupState::default(),
            session: CaptureSessionManager::new(V4l2Backend::new()),
            preview: Default::default(),
            preview_gravity: Default::default(),
            preview_handle: None,
            zoom,
            focus: FocusController::new(),
            focus_ring: None,
            next_focus_ring_id: 0,
            capture: PhotoCaptureCoordinator::new(),
            still: None,
            status: None,
        };

        info!(
            version = app_info::version(),
            runtime = app_info::runtime_environment(),
            "Starting viewfinder"
        );
        let setup_task = app.check_permission();

        (app, setup_task)
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                .on_press(Message::ToggleContextPage(ContextPage::Settings))
                .into(),
        ]
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        let generation = self.preview.generation;
        let channel = self.preview.clone();
        let preview_sub = Subscription::run_with_id(
            ("preview", generation),
            cosmic::iced::stream::channel(4, move |mut output| async move {
                let Some(mut frames) = channel.take() else {
                    return;
                };
                info!(generation, "Preview subscription started");

                while let Some(frame) = frames.next().await {
                    if output
                        .send(Message::PreviewFrame(std::sync::Arc::new(frame)))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }

                info!(generation, "Preview stream closed");
                let _ = output.send(Message::PreviewEnded(generation)).await;
            }),
        );

        Subscription::batch([config_sub, preview_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
