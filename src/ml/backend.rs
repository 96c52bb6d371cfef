use burn::prelude::*;

/// Backend used for inference and validation.
#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

/// Backend used for inference and validation.
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

/// Autodiff wrapper used while training.
pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

/// Device shared by both backends.
pub type InferDevice = <InferBackend as Backend>::Device;

pub fn default_device() -> InferDevice {
    let device = InferDevice::default();
    tracing::debug!("Using device: {:?}", device);
    device
}
