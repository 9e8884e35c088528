pub mod boundary;
pub mod controller;
pub mod device;
pub mod loop_worker;
pub mod observer;

pub use boundary::{CaptureDevice, Detection, ExpressionClassifier, VideoFrame};
pub use controller::DetectionController;
pub use device::DeviceHandle;
pub use observer::{AffectEvent, AffectObserver, ChannelObserver, NoopObserver};
