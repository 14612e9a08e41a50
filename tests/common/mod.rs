// SPDX-License-Identifier: GPL-3.0-only

//! In-memory camera backend shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use viewfinder::backends::camera::types::{
    BackendError, BackendResult, CameraFrame, EncodedPhoto, ExposureMode, FocusMode,
    FrameReceiver, NormalizedPoint, PhotoSettings, ZoomMode,
};
use viewfinder::backends::camera::{
    CameraBackend, CaptureDevice, CaptureSession, DeviceConfiguration, PhotoOutput,
};
use viewfinder::errors::{LockError, PhotoError};
use viewfinder::pipelines::photo::encode_jpeg;

/// What a [`FakeDevice`] has been told
#[derive(Debug, Default, Clone)]
pub struct DeviceLog {
    pub zoom_factor: f64,
    pub focus_point: Option<NormalizedPoint>,
    pub focus_mode: Option<FocusMode>,
    pub exposure_point: Option<NormalizedPoint>,
    pub exposure_mode: Option<ExposureMode>,
    pub lock_count: usize,
}

#[derive(Debug)]
pub struct FakeDevice {
    pub max_zoom: f64,
    pub focus_poi: bool,
    pub exposure_poi: bool,
    /// Another client holds the configuration lock
    pub lock_busy: AtomicBool,
    /// A configuration guard from this device is alive
    pub lock_held: AtomicBool,
    pub reject_zoom: AtomicBool,
    pub log: Mutex<DeviceLog>,
}

impl FakeDevice {
    pub fn new(max_zoom: f64) -> Self {
        Self {
            max_zoom,
            focus_poi: true,
            exposure_poi: true,
            lock_busy: AtomicBool::new(false),
            lock_held: AtomicBool::new(false),
            reject_zoom: AtomicBool::new(false),
            log: Mutex::new(DeviceLog {
                zoom_factor: 1.0,
                ..Default::default()
            }),
        }
    }

    pub fn without_point_of_interest(mut self) -> Self {
        self.focus_poi = false;
        self.exposure_poi = false;
        self
    }

    /// Start from a zoom factor applied by someone else
    pub fn with_zoom(self, factor: f64) -> Self {
        self.log.lock().unwrap().zoom_factor = factor;
        self
    }

    pub fn is_locked(&self) -> bool {
        self.lock_held.load(Ordering::SeqCst)
    }

    pub fn set_busy(&self, busy: bool) {
        self.lock_busy.store(busy, Ordering::SeqCst);
    }

    pub fn log(&self) -> DeviceLog {
        self.log.lock().unwrap().clone()
    }
}

impl CaptureDevice for FakeDevice {
    fn name(&self) -> &str {
        "Fake Camera"
    }

    fn path(&self) -> &str {
        "/dev/video-fake"
    }

    fn max_zoom_factor(&self) -> f64 {
        self.max_zoom
    }

    fn zoom_factor(&self) -> f64 {
        self.log.lock().unwrap().zoom_factor
    }

    fn zoom_mode(&self) -> ZoomMode {
        ZoomMode::Digital
    }

    fn is_focus_point_of_interest_supported(&self) -> bool {
        self.focus_poi
    }

    fn is_exposure_point_of_interest_supported(&self) -> bool {
        self.exposure_poi
    }

    fn is_auto_focus_range_restriction_supported(&self) -> bool {
        false
    }

    fn lock_for_configuration(&self) -> Result<Box<dyn DeviceConfiguration + '_>, LockError> {
        if self.lock_busy.load(Ordering::SeqCst) || self.lock_held.swap(true, Ordering::SeqCst) {
            return Err(LockError::Busy);
        }
        self.log.lock().unwrap().lock_count += 1;
        Ok(Box::new(FakeConfiguration { device: self }))
    }
}

struct FakeConfiguration<'a> {
    device: &'a FakeDevice,
}

impl Drop for FakeConfiguration<'_> {
    fn drop(&mut self) {
        self.device.lock_held.store(false, Ordering::SeqCst);
    }
}

impl DeviceConfiguration for FakeConfiguration<'_> {
    fn set_zoom_factor(&mut self, factor: f64) -> BackendResult<()> {
        if self.device.reject_zoom.load(Ordering::SeqCst) {
            return Err(BackendError::ControlFailed("zoom rejected".into()));
        }
        self.device.log.lock().unwrap().zoom_factor = factor;
        Ok(())
    }

    fn set_focus_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()> {
        self.device.log.lock().unwrap().focus_point = Some(point);
        Ok(())
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> BackendResult<()> {
        self.device.log.lock().unwrap().focus_mode = Some(mode);
        Ok(())
    }

    fn set_exposure_point_of_interest(&mut self, point: NormalizedPoint) -> BackendResult<()> {
        self.device.log.lock().unwrap().exposure_point = Some(point);
        Ok(())
    }

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> BackendResult<()> {
        self.device.log.lock().unwrap().exposure_mode = Some(mode);
        Ok(())
    }
}

/// What the photo output answers with
#[derive(Debug, Clone)]
pub enum CannedPhoto {
    /// A 4x2 JPEG
    Jpeg,
    Error(PhotoError),
    /// Drop the sender without answering
    Abandon,
}

#[derive(Debug, Clone)]
pub struct FakeOutput {
    pub attached: Arc<AtomicBool>,
    pub answer: Arc<Mutex<CannedPhoto>>,
    pub requests: Arc<AtomicUsize>,
}

impl FakeOutput {
    pub fn new(answer: CannedPhoto) -> Self {
        Self {
            attached: Arc::new(AtomicBool::new(false)),
            answer: Arc::new(Mutex::new(answer)),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn attached(answer: CannedPhoto) -> Self {
        let output = Self::new(answer);
        output.attached.store(true, Ordering::SeqCst);
        output
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub fn sample_jpeg() -> EncodedPhoto {
    let frame = CameraFrame::from_rgba(4, 2, vec![200; 4 * 2 * 4]);
    encode_jpeg(&frame, 90).unwrap()
}

impl PhotoOutput for FakeOutput {
    fn capture_photo(
        &self,
        _settings: PhotoSettings,
    ) -> oneshot::Receiver<Result<EncodedPhoto, PhotoError>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        match self.answer.lock().unwrap().clone() {
            CannedPhoto::Jpeg => {
                let _ = sender.send(Ok(sample_jpeg()));
            }
            CannedPhoto::Error(e) => {
                let _ = sender.send(Err(e));
            }
            CannedPhoto::Abandon => drop(sender),
        }
        receiver
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

/// Shared record of what sessions built by a [`FakeBackend`] went through
#[derive(Debug, Default)]
pub struct SessionLog {
    pub inputs: AtomicUsize,
    pub outputs: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

pub struct FakeSession {
    refuse_input: bool,
    refuse_output: bool,
    fail_start: bool,
    running: bool,
    frames: Option<FrameReceiver>,
    outputs: Vec<FakeOutput>,
    log: Arc<SessionLog>,
}

impl CaptureSession for FakeSession {
    type Input = ();
    type Output = FakeOutput;

    fn can_add_input(&self, _input: &()) -> bool {
        !self.refuse_input
    }

    fn add_input(&mut self, _input: ()) -> BackendResult<()> {
        self.log.inputs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn can_add_output(&self, _output: &FakeOutput) -> bool {
        !self.refuse_output
    }

    fn add_output(&mut self, output: FakeOutput) -> BackendResult<()> {
        output.attached.store(true, Ordering::SeqCst);
        self.outputs.push(output);
        self.log.outputs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_output(&mut self, output: &FakeOutput) {
        output.attached.store(false, Ordering::SeqCst);
        self.outputs
            .retain(|candidate| !Arc::ptr_eq(&candidate.attached, &output.attached));
    }

    fn take_preview_frames(&mut self) -> Option<FrameReceiver> {
        self.frames.take()
    }

    fn start_running(&mut self) -> BackendResult<()> {
        if self.fail_start {
            return Err(BackendError::InitializationFailed("pipeline refused".into()));
        }
        self.running = true;
        self.log.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_running(&mut self) {
        if self.running {
            self.log.stops.fetch_add(1, Ordering::SeqCst);
        }
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Backend handing out one [`FakeDevice`]
pub struct FakeBackend {
    pub device: Option<Arc<FakeDevice>>,
    pub fail_input: bool,
    pub fail_session: bool,
    pub fail_start: bool,
    pub refuse_input: bool,
    pub refuse_output: bool,
    pub answer: CannedPhoto,
    pub log: Arc<SessionLog>,
    /// Feeds the preview stream of the most recent session
    pub frame_sender: Mutex<Option<futures::channel::mpsc::Sender<CameraFrame>>>,
}

impl FakeBackend {
    pub fn with_device(device: Arc<FakeDevice>) -> Self {
        Self {
            device: Some(device),
            fail_input: false,
            fail_session: false,
            fail_start: false,
            refuse_input: false,
            refuse_output: false,
            answer: CannedPhoto::Jpeg,
            log: Arc::new(SessionLog::default()),
            frame_sender: Mutex::new(None),
        }
    }

    pub fn without_device() -> Self {
        Self {
            device: None,
            ..Self::with_device(Arc::new(FakeDevice::new(1.0)))
        }
    }
}

impl CameraBackend for FakeBackend {
    type Session = FakeSession;

    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.device
            .as_ref()
            .map(|device| Arc::clone(device) as Arc<dyn CaptureDevice>)
    }

    fn device_input(&self, _device: &Arc<dyn CaptureDevice>) -> BackendResult<()> {
        if self.fail_input {
            return Err(BackendError::DeviceNotFound("/dev/video-fake".into()));
        }
        Ok(())
    }

    fn new_session(&self) -> BackendResult<FakeSession> {
        if self.fail_session {
            return Err(BackendError::NotAvailable("no pipeline".into()));
        }
        let (sender, receiver) = futures::channel::mpsc::channel(4);
        *self.frame_sender.lock().unwrap() = Some(sender);
        Ok(FakeSession {
            refuse_input: self.refuse_input,
            refuse_output: self.refuse_output,
            fail_start: self.fail_start,
            running: false,
            frames: Some(receiver),
            outputs: Vec::new(),
            log: Arc::clone(&self.log),
        })
    }

    fn photo_output(&self) -> BackendResult<FakeOutput> {
        Ok(FakeOutput::new(self.answer.clone()))
    }
}
