// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture session
//!
//! ```text
//! [device input bin] → tee ─┬→ queue → preview appsink → FrameReceiver
//!   v4l2src ! decodebin     └→ queue → photo appsink   → pending captures
//!   ! videoconvert (RGBA)
//! ```
//!
//! The input and photo branches are attached on demand, mirroring the
//! `can_add_*`/`add_*` discipline of the session trait. Digital zoom is applied
//! while frames are copied out of the appsinks, using the zoom factor stored on
//! the input device.

use super::types::*;
use super::{CaptureDevice, CaptureSession, PhotoOutput};
use crate::constants::pipeline;
use crate::errors::PhotoError;
use crate::pipelines::photo::encoding;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Session input reading from a V4L2 device
pub struct GstDeviceInput {
    device: Arc<dyn CaptureDevice>,
    bin: gstreamer::Bin,
}

impl GstDeviceInput {
    /// Build the source bin for `device`
    ///
    /// The node is opened up front so a missing device or revoked access fails
    /// here rather than as an asynchronous bus error after PLAYING.
    pub fn new(device: Arc<dyn CaptureDevice>) -> BackendResult<Self> {
        gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;

        v4l::Device::with_path(device.path()).map_err(BackendError::from)?;

        let description = format!(
            "v4l2src device=\"{}\" ! decodebin ! videoconvert ! video/x-raw,format=RGBA",
            device.path()
        );
        let bin = gstreamer::parse::bin_from_description(&description, true)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        debug!(device = %device.name(), %description, "Device input created");
        Ok(Self { device, bin })
    }

    pub fn device(&self) -> &Arc<dyn CaptureDevice> {
        &self.device
    }
}

type PendingCapture = (
    PhotoSettings,
    oneshot::Sender<Result<EncodedPhoto, PhotoError>>,
);

struct PhotoOutputInner {
    sink: AppSink,
    attached: AtomicBool,
    pending: Mutex<Vec<PendingCapture>>,
}

/// Still capture branch
///
/// Cloning shares the same sink and request queue.
#[derive(Clone)]
pub struct GstPhotoOutput {
    inner: Arc<PhotoOutputInner>,
}

impl GstPhotoOutput {
    pub fn new() -> BackendResult<Self> {
        gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;
        let sink = make_appsink("photo_sink", 1)?;

        Ok(Self {
            inner: Arc::new(PhotoOutputInner {
                sink,
                attached: AtomicBool::new(false),
                pending: Mutex::new(Vec::new()),
            }),
        })
    }

    fn sink(&self) -> &AppSink {
        &self.inner.sink
    }

    fn pending(&self) -> MutexGuard<'_, Vec<PendingCapture>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn has_pending(&self) -> bool {
        !self.pending().is_empty()
    }

    fn same_as(&self, other: &GstPhotoOutput) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn attach(&self) {
        self.inner.attached.store(true, Ordering::Release);
    }

    /// Mark detached and fail every outstanding request
    fn detach(&self) {
        let pending = {
            let mut pending = self.pending();
            self.inner.attached.store(false, Ordering::Release);
            std::mem::take(&mut *pending)
        };
        for (_, sender) in pending {
            let _ = sender.send(Err(PhotoError::NotRunning));
        }
    }

    /// Encode `frame` once per requested quality and complete the requests
    fn fulfil(&self, frame: &CameraFrame) {
        let pending = std::mem::take(&mut *self.pending());
        for (settings, sender) in pending {
            let result = encoding::encode_jpeg(frame, settings.jpeg_quality);
            if let Err(e) = &result {
                error!(error = %e, "Photo encoding failed");
            }
            if sender.send(result).is_err() {
                debug!("Photo request was abandoned before completion");
            }
        }
    }
}

impl PhotoOutput for GstPhotoOutput {
    fn capture_photo(
        &self,
        settings: PhotoSettings,
    ) -> oneshot::Receiver<Result<EncodedPhoto, PhotoError>> {
        let (sender, receiver) = oneshot::channel();

        // Checked under the queue lock so a concurrent detach cannot strand the request
        let mut pending = self.pending();
        if self.is_attached() {
            pending.push((settings, sender));
            debug!(queued = pending.len(), "Photo capture requested");
        } else {
            drop(pending);
            let _ = sender.send(Err(PhotoError::NotRunning));
        }

        receiver
    }

    fn is_attached(&self) -> bool {
        self.inner.attached.load(Ordering::Acquire)
    }
}

/// RGBA appsink that drops stale buffers instead of blocking the tee
fn make_appsink(name: &str, max_buffers: u32) -> BackendResult<AppSink> {
    let appsink = gstreamer::ElementFactory::make("appsink")
        .name(name)
        .build()
        .map_err(|e| BackendError::NotAvailable(format!("Failed to create appsink: {}", e)))?
        .dynamic_cast::<AppSink>()
        .map_err(|_| BackendError::NotAvailable("Failed to cast to AppSink".to_string()))?;

    let caps = gstreamer::Caps::builder("video/x-raw")
        .field("format", "RGBA")
        .build();
    appsink.set_caps(Some(&caps));
    appsink.set_property("emit-signals", false);
    appsink.set_property("sync", false);
    appsink.set_property("max-buffers", max_buffers);
    appsink.set_property("drop", true);
    appsink.set_property("enable-last-sample", false);

    Ok(appsink)
}

/// Copy an RGBA sample out of an appsink
fn frame_from_sample(sample: &gstreamer::Sample) -> Result<CameraFrame, String> {
    let caps = sample.caps().ok_or("No caps in sample")?;
    let video_info = VideoInfo::from_caps(caps).map_err(|e| e.to_string())?;
    let buffer = sample.buffer_owned().ok_or("No buffer in sample")?;

    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
        return Err("Buffer marked as corrupted".to_string());
    }

    let map = buffer
        .into_mapped_buffer_readable()
        .map_err(|_| "Failed to map buffer".to_string())?;

    Ok(CameraFrame {
        width: video_info.width(),
        height: video_info.height(),
        data: FrameData::from_mapped_buffer(map),
        stride: video_info.stride()[0] as u32,
        captured_at: Instant::now(),
    })
}

/// Centre-crop the frame when the device zooms digitally
fn apply_digital_zoom(frame: CameraFrame, device: &dyn CaptureDevice) -> CameraFrame {
    if device.zoom_mode() != ZoomMode::Digital {
        return frame;
    }
    let factor = device.zoom_factor();
    if factor > 1.0 {
        frame.crop_center(factor)
    } else {
        frame
    }
}

/// GStreamer-backed [`CaptureSession`]
pub struct GstCaptureSession {
    pipeline: gstreamer::Pipeline,
    tee: gstreamer::Element,
    preview_sink: AppSink,
    preview_sender: FrameSender,
    preview_receiver: Option<FrameReceiver>,
    input: Option<GstDeviceInput>,
    output: Option<GstPhotoOutput>,
    running: bool,
}

impl GstCaptureSession {
    /// Build an empty session with only the preview branch
    pub fn new() -> BackendResult<Self> {
        gstreamer::init().map_err(|e| BackendError::NotAvailable(e.to_string()))?;

        let pipeline = gstreamer::Pipeline::with_name("viewfinder");

        let tee = gstreamer::ElementFactory::make("tee")
            .name("split")
            .property("allow-not-linked", true)
            .build()
            .map_err(|e| BackendError::NotAvailable(format!("tee: {}", e)))?;
        let queue = gstreamer::ElementFactory::make("queue")
            .name("preview_queue")
            .property_from_str("leaky", "downstream")
            .build()
            .map_err(|e| BackendError::NotAvailable(format!("queue: {}", e)))?;

        let preview_sink = make_appsink("preview_sink", pipeline::MAX_BUFFERS)?;

        let elements = [&tee, &queue, preview_sink.upcast_ref::<gstreamer::Element>()];
        pipeline
            .add_many(elements)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;
        gstreamer::Element::link_many(elements)
            .map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        let (preview_sender, preview_receiver) =
            futures::channel::mpsc::channel(pipeline::PREVIEW_CHANNEL_CAPACITY);

        Ok(Self {
            pipeline,
            tee,
            preview_sink,
            preview_sender,
            preview_receiver: Some(preview_receiver),
            input: None,
            output: None,
            running: false,
        })
    }

    fn install_callbacks(&self, device: Arc<dyn CaptureDevice>) {
        let mut sender = self.preview_sender.clone();
        let preview_device = Arc::clone(&device);

        self.preview_sink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                    let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;

                    let frame = match frame_from_sample(&sample) {
                        Ok(frame) => frame,
                        Err(e) => {
                            if frame_num % 30 == 0 {
                                warn!(frame = frame_num, error = %e, "Skipping preview frame");
                            }
                            return Ok(gstreamer::FlowSuccess::Ok);
                        }
                    };
                    let frame = apply_digital_zoom(frame, preview_device.as_ref());

                    if frame_num % pipeline::FRAME_LOG_INTERVAL == 0 {
                        debug!(
                            frame = frame_num,
                            width = frame.width,
                            height = frame.height,
                            "Preview frame"
                        );
                    }

                    // Non-blocking; a slow UI drops frames instead of stalling the pipeline
                    if let Err(e) = sender.try_send(frame)
                        && frame_num % 30 == 0
                    {
                        debug!(frame = frame_num, error = ?e, "Preview frame dropped");
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        if let Some(output) = &self.output {
            let photo_output = output.clone();
            output.sink().set_callbacks(
                gstreamer_app::AppSinkCallbacks::builder()
                    .new_sample(move |appsink| {
                        let sample = appsink.pull_sample().map_err(|_| gstreamer::FlowError::Eos)?;
                        if !photo_output.has_pending() {
                            return Ok(gstreamer::FlowSuccess::Ok);
                        }

                        match frame_from_sample(&sample) {
                            Ok(frame) => {
                                let frame = apply_digital_zoom(frame, device.as_ref());
                                info!(
                                    width = frame.width,
                                    height = frame.height,
                                    "Photo frame captured"
                                );
                                photo_output.fulfil(&frame);
                            }
                            // Leave the requests queued for the next frame
                            Err(e) => warn!(error = %e, "Unusable photo frame"),
                        }

                        Ok(gstreamer::FlowSuccess::Ok)
                    })
                    .build(),
            );
        }
    }

    fn clear_callbacks(&self) {
        self.preview_sink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        if let Some(output) = &self.output {
            output
                .sink()
                .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        }
    }
}

impl CaptureSession for GstCaptureSession {
    type Input = GstDeviceInput;
    type Output = GstPhotoOutput;

    fn can_add_input(&self, input: &GstDeviceInput) -> bool {
        self.input.is_none() && input.bin.parent().is_none()
    }

    fn add_input(&mut self, input: GstDeviceInput) -> BackendResult<()> {
        self.pipeline
            .add(&input.bin)
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        input
            .bin
            .link(&self.tee)
            .map_err(|e| BackendError::Rejected(e.to_string()))?;

        info!(device = %input.device.name(), "Input added to session");
        self.input = Some(input);
        Ok(())
    }

    fn can_add_output(&self, output: &GstPhotoOutput) -> bool {
        self.output.is_none() && !output.is_attached() && output.sink().parent().is_none()
    }

    fn add_output(&mut self, output: GstPhotoOutput) -> BackendResult<()> {
        let queue = gstreamer::ElementFactory::make("queue")
            .property_from_str("leaky", "downstream")
            .build()
            .map_err(|e| BackendError::NotAvailable(format!("queue: {}", e)))?;

        let sink = output.sink().upcast_ref::<gstreamer::Element>();
        self.pipeline
            .add_many([&queue, sink])
            .map_err(|e| BackendError::Rejected(e.to_string()))?;
        gstreamer::Element::link_many([&self.tee, &queue, sink])
            .map_err(|e| BackendError::Rejected(e.to_string()))?;

        if self.running {
            let _ = queue.sync_state_with_parent();
            let _ = sink.sync_state_with_parent();
        }

        output.attach();
        info!("Photo output added to session");
        self.output = Some(output);
        Ok(())
    }

    fn remove_output(&mut self, output: &GstPhotoOutput) {
        if self.output.as_ref().is_some_and(|o| o.same_as(output)) {
            output
                .sink()
                .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
            self.output = None;
        }
        output.detach();
        debug!("Photo output detached");
    }

    fn take_preview_frames(&mut self) -> Option<FrameReceiver> {
        self.preview_receiver.take()
    }

    fn start_running(&mut self) -> BackendResult<()> {
        if self.running {
            return Ok(());
        }
        let device = self
            .input
            .as_ref()
            .map(|input| Arc::clone(&input.device))
            .ok_or_else(|| BackendError::Rejected("Session has no input".to_string()))?;

        self.install_callbacks(Arc::clone(&device));

        debug!("Setting pipeline to PLAYING state");
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Playing) {
            self.clear_callbacks();
            let _ = self.pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(format!(
                "Failed to start pipeline: {}",
                e
            )));
        }

        let (result, state, pending) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            pipeline::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if let Err(e) = result {
            self.clear_callbacks();
            let _ = self.pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(format!(
                "Pipeline failed to reach PLAYING: {}",
                e
            )));
        }
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        self.running = true;
        info!(device = %device.name(), "Capture session running");
        Ok(())
    }

    fn stop_running(&mut self) {
        if !self.running {
            return;
        }
        info!("Stopping capture session");

        self.clear_callbacks();
        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to set pipeline to NULL");
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            pipeline::STOP_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, "Pipeline stopped");

        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

impl Drop for GstCaptureSession {
    fn drop(&mut self) {
        self.clear_callbacks();
        // Release the device immediately
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        if let Some(output) = self.output.take() {
            output.detach();
        }
    }
}
