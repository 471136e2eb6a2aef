// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// CPU (ndarray) by default; `--features wgpu` trains and infers
// on the GPU instead. Training wraps the backend in Autodiff,
// inference uses the inner backend so no gradients are tracked.

use burn::prelude::Backend;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub type Device = <InferBackend as Backend>::Device;

pub fn default_device() -> Device {
    Device::default()
}
