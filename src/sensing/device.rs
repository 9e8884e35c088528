use anyhow::Result;

use super::boundary::{CaptureDevice, VideoFrame};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Exclusive owner of the capture device. Releases at most once per acquisition,
/// and on drop if still held.
pub struct DeviceHandle<D: CaptureDevice> {
    device: D,
    surface: Option<String>,
}

impl<D: CaptureDevice> DeviceHandle<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            surface: None,
        }
    }

    pub fn acquire(&mut self, surface: &str) -> Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }
        self.device.acquire(surface)?;
        self.surface = Some(surface.to_string());
        log_info!("capture device acquired on {surface}");
        Ok(())
    }

    pub fn grab(&mut self) -> Option<VideoFrame> {
        if self.surface.is_none() {
            return None;
        }
        self.device.grab()
    }

    pub fn release(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.device.release();
            log_info!("capture device released from {surface}");
        }
    }

    pub fn is_acquired(&self) -> bool {
        self.surface.is_some()
    }
}

impl<D: CaptureDevice> Drop for DeviceHandle<D> {
    fn drop(&mut self) {
        self.release();
    }
}
