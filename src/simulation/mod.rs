mod texel;
pub mod gerstner;
pub mod lookup;
pub mod spectrum;
pub mod synthesis;

pub use texel::{FrequencyTexel, GpuWave};
pub use gerstner::WaveSet;
pub use lookup::ButterflyLookup;
pub use spectrum::Spectrum;
pub use synthesis::{Axis, FrameOptions, SurfaceField};
