mod common;
pub mod mesh;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub use common::{CameraParams, LightingParams, PointLightParams, MAX_POINT_LIGHTS};
pub use mesh::Mesh;
#[cfg(not(target_arch = "wasm32"))]
pub use native::Renderer;
