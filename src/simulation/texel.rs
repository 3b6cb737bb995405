/// One bin of the frequency-domain field.
///
/// Layout: 16 bytes, matches `FrequencyTexel` in evolve.wgsl.
/// - h0: [f32; 2] = 8 bytes - Complex amplitude h0(k) (real, imaginary)
/// - omega: f32 = 4 bytes - Dispersion frequency ω(k) in rad/s
/// - _padding: f32 = 4 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrequencyTexel {
    /// Two independent Gaussian components, each scaled by sqrt(P(k)/2)
    pub h0: [f32; 2],

    /// Deep-water dispersion frequency sqrt(g·|k|)
    pub omega: f32,

    pub _padding: f32,
}

impl FrequencyTexel {
    /// The zero bin: no energy, no motion
    pub const ZERO: Self = Self {
        h0: [0.0, 0.0],
        omega: 0.0,
        _padding: 0.0,
    };

    pub fn new(real: f32, imaginary: f32, omega: f32) -> Self {
        Self {
            h0: [real, imaginary],
            omega,
            _padding: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.h0 == [0.0, 0.0]
    }
}

/// One trochoidal wave of the Gerstner surface.
///
/// Layout: 32 bytes, matches `Wave` in gerstner.wgsl.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuWave {
    /// Unit propagation direction in the XZ plane
    pub direction: [f32; 2],

    /// Wavenumber k in rad/m
    pub wavenumber: f32,

    /// Crest height in meters
    pub amplitude: f32,

    /// Angular frequency ω in rad/s
    pub omega: f32,

    /// Phase offset in radians, [0, 2π)
    pub phase: f32,

    pub _padding: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_texel_size() {
        assert_eq!(std::mem::size_of::<FrequencyTexel>(), 16);
    }

    #[test]
    fn test_wave_size() {
        assert_eq!(std::mem::size_of::<GpuWave>(), 32);
    }

    #[test]
    fn test_zero_texel() {
        assert!(FrequencyTexel::ZERO.is_zero());
        assert!(!FrequencyTexel::new(0.5, 0.0, 1.0).is_zero());
    }
}
