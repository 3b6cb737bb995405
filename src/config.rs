/// Gravitational acceleration used by both wave models (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Compute shader workgroup size (16x16 = 256 invocations, the wgpu default limit)
pub const WORKGROUP_SIZE: u32 = 16;

// ============================================
// Spectral (FFT) Surface
// ============================================

/// Smallest supported grid size power (2^6 = 64)
pub const MIN_GRID_SIZE_POWER: u32 = 6;

/// Largest supported grid size power (2^11 = 2048)
pub const MAX_GRID_SIZE_POWER: u32 = 11;

/// Side length of the simulated ocean patch in meters
pub const PATCH_SIZE_M: f32 = 100.0;

/// Spatial frequency unit: one bin step in wavevector space (rad/m)
pub const K_COORD_MULT: f32 = std::f32::consts::TAU / PATCH_SIZE_M;

/// Wavevectors shorter than this are treated as the undefined zero bin
pub const MIN_WAVENUMBER: f32 = 1e-8;

// ============================================
// Gerstner Surface
// ============================================

/// Capacity of the Gerstner wave table
pub const MAX_WAVE_COUNT: usize = 100;

/// Output texture resolution bounds for the Gerstner surface
pub const MIN_TEXTURE_RESOLUTION: u32 = 32;
pub const MAX_TEXTURE_RESOLUTION: u32 = 2048;

/// Side length of the area covered by the Gerstner textures in meters
pub const GERSTNER_PATCH_SIZE_M: f32 = 10.0;

/// Depths at or beyond this value use the deep-water dispersion relation
pub const DEPTH_INFINITE: f32 = 100.0;

/// Surface tension at or below this value disables the capillary term
pub const SURFACE_TENSION_NONE: f32 = 0.0;

// ============================================
// Harness
// ============================================

/// View pan step per key press, in patch widths at zoom 1
pub const VIEW_PAN_SPEED: f32 = 0.05;

/// View zoom factor per key press
pub const VIEW_ZOOM_SPEED: f32 = 1.1;

/// Which normal extraction strategy the spectral surface uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalMode {
    /// Normals from the slope field carried through the IFFT
    Analytic,
    /// Normals from a 3x3 Sobel filter over the height field
    Sobel,
}

impl NormalMode {
    pub fn toggled(self) -> Self {
        match self {
            NormalMode::Analytic => NormalMode::Sobel,
            NormalMode::Sobel => NormalMode::Analytic,
        }
    }
}

/// Tunable parameters of the spectral surface
#[derive(Clone, Debug, PartialEq)]
pub struct FourierParams {
    /// Phillips spectrum amplitude scale (A)
    pub amplitude: f32,
    /// Wind speed in m/s (sets the largest wave scale L = V²/g)
    pub wind_speed: f32,
    /// Wind direction in degrees, [0, 360)
    pub wind_angle_deg: f32,
    /// Waves shorter than this (meters) are suppressed
    pub small_wave_cutoff: f32,
    /// log2 of the grid size
    pub grid_size_power: u32,
    /// Horizontal displacement multiplier applied to the choppy field
    pub choppiness: f32,
    pub normal_mode: NormalMode,
}

impl Default for FourierParams {
    fn default() -> Self {
        Self {
            amplitude: 500.0,
            wind_speed: 100.0,
            wind_angle_deg: 135.0,
            small_wave_cutoff: 0.01,
            grid_size_power: 9,
            choppiness: 1.0,
            normal_mode: NormalMode::Sobel,
        }
    }
}

impl FourierParams {
    /// Grid side length for these parameters
    pub fn grid_size(&self) -> u32 {
        1 << self.grid_size_power
    }

    /// Clamp every field into its supported range
    pub fn clamped(&self) -> Self {
        let grid_size_power = self
            .grid_size_power
            .clamp(MIN_GRID_SIZE_POWER, MAX_GRID_SIZE_POWER);
        if grid_size_power != self.grid_size_power {
            log::warn!(
                "Grid size power {} out of range, clamped to {}",
                self.grid_size_power,
                grid_size_power
            );
        }

        Self {
            amplitude: self.amplitude.max(0.0),
            wind_speed: self.wind_speed.max(0.0),
            wind_angle_deg: self.wind_angle_deg.rem_euclid(360.0),
            small_wave_cutoff: self.small_wave_cutoff.max(0.0),
            grid_size_power,
            choppiness: self.choppiness.max(0.0),
            normal_mode: self.normal_mode,
        }
    }
}

/// Tunable parameters of the Gerstner surface
///
/// Min/max pairs may arrive inverted from the UI; see
/// [`crate::simulation::gerstner::SampleRanges`] for how they are normalized.
#[derive(Clone, Debug, PartialEq)]
pub struct GerstnerParams {
    pub wave_count: usize,
    pub texture_resolution: u32,
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
    pub min_amplitude: f32,
    pub max_amplitude: f32,
    pub min_wavenumber: f32,
    pub max_wavenumber: f32,
    /// Water depth in meters; `DEPTH_INFINITE` or more means deep water
    pub depth: f32,
    /// Capillary length; `SURFACE_TENSION_NONE` disables the capillary term
    pub surface_tension: f32,
    /// When set, frequencies are snapped so the animation repeats with this period (s)
    pub loop_period_s: Option<f32>,
}

impl Default for GerstnerParams {
    fn default() -> Self {
        Self {
            wave_count: 20,
            texture_resolution: 512,
            min_angle_deg: 110.0,
            max_angle_deg: 120.0,
            min_amplitude: 0.001,
            max_amplitude: 0.004,
            min_wavenumber: 1.0,
            max_wavenumber: 30.0,
            depth: 10.0,
            surface_tension: SURFACE_TENSION_NONE,
            loop_period_s: Some(1.0),
        }
    }
}

impl GerstnerParams {
    /// Clamp counts, resolution and physical quantities into their supported ranges
    pub fn clamped(&self) -> Self {
        let wave_count = self.wave_count.min(MAX_WAVE_COUNT);
        if wave_count != self.wave_count {
            log::warn!(
                "Wave count {} exceeds capacity, clamped to {}",
                self.wave_count,
                wave_count
            );
        }

        let texture_resolution = self
            .texture_resolution
            .clamp(MIN_TEXTURE_RESOLUTION, MAX_TEXTURE_RESOLUTION);
        if texture_resolution != self.texture_resolution {
            log::warn!(
                "Texture resolution {} out of range, clamped to {}",
                self.texture_resolution,
                texture_resolution
            );
        }

        Self {
            wave_count,
            texture_resolution,
            min_amplitude: self.min_amplitude.max(0.0),
            max_amplitude: self.max_amplitude.max(0.0),
            min_wavenumber: self.min_wavenumber.max(MIN_WAVENUMBER),
            max_wavenumber: self.max_wavenumber.max(MIN_WAVENUMBER),
            depth: self.depth.max(0.0),
            surface_tension: self.surface_tension.max(SURFACE_TENSION_NONE),
            loop_period_s: self.loop_period_s.filter(|period| *period > 0.0),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_power_clamped() {
        let params = FourierParams {
            grid_size_power: 14,
            ..Default::default()
        };
        assert_eq!(params.clamped().grid_size_power, MAX_GRID_SIZE_POWER);

        let params = FourierParams {
            grid_size_power: 2,
            ..Default::default()
        };
        assert_eq!(params.clamped().grid_size(), 1 << MIN_GRID_SIZE_POWER);
    }

    #[test]
    fn test_wind_angle_wrapped() {
        let params = FourierParams {
            wind_angle_deg: -45.0,
            ..Default::default()
        };
        assert!((params.clamped().wind_angle_deg - 315.0).abs() < 1e-4);
    }

    #[test]
    fn test_wave_count_and_resolution_clamped() {
        let params = GerstnerParams {
            wave_count: 250,
            texture_resolution: 5000,
            ..Default::default()
        };
        let clamped = params.clamped();
        assert_eq!(clamped.wave_count, MAX_WAVE_COUNT);
        assert_eq!(clamped.texture_resolution, MAX_TEXTURE_RESOLUTION);

        let params = GerstnerParams {
            texture_resolution: 300,
            ..Default::default()
        };
        assert_eq!(params.clamped().texture_resolution, 300);

        let params = GerstnerParams {
            texture_resolution: 8,
            ..Default::default()
        };
        assert_eq!(params.clamped().texture_resolution, MIN_TEXTURE_RESOLUTION);
    }

    #[test]
    fn test_clamping_keeps_inverted_ranges() {
        // Range normalization happens at sampling time, not here
        let params = GerstnerParams {
            min_angle_deg: 350.0,
            max_angle_deg: 10.0,
            ..Default::default()
        };
        let clamped = params.clamped();
        assert_eq!(clamped.min_angle_deg, 350.0);
        assert_eq!(clamped.max_angle_deg, 10.0);
    }

    #[test]
    fn test_default_loop_period() {
        assert_eq!(GerstnerParams::default().loop_period_s, Some(1.0));
        let params = GerstnerParams {
            loop_period_s: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(params.clamped().loop_period_s, None);
    }

    #[test]
    fn test_normal_mode_toggle() {
        assert_eq!(NormalMode::Sobel.toggled(), NormalMode::Analytic);
        assert_eq!(NormalMode::Analytic.toggled(), NormalMode::Sobel);
    }
}
