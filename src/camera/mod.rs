mod builder;
mod interface;
mod mock;
mod still;
#[cfg(all(target_os = "linux", feature = "camera"))]
mod v4l2;

pub use builder::CameraSourceBuilder;
pub use interface::{CameraSource, StreamRequest, VideoStream};
pub use mock::{MockCamera, MockCameraHandle};
pub use still::StillImageCamera;
#[cfg(all(target_os = "linux", feature = "camera"))]
pub use v4l2::V4l2Camera;
