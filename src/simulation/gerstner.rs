use glam::{Vec2, Vec3};
use rand::Rng;

use crate::config::{
    GerstnerParams, DEPTH_INFINITE, GERSTNER_PATCH_SIZE_M, MAX_WAVE_COUNT, SURFACE_TENSION_NONE,
};
use crate::simulation::texel::GpuWave;

/// Sampling ranges after inverted bounds have been normalized.
///
/// Policy: an inverted angle range wraps through 360° (350°..10° becomes
/// 350°..370°); inverted amplitude and wavenumber ranges are swapped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRanges {
    pub angle_deg: (f32, f32),
    pub amplitude: (f32, f32),
    pub wavenumber: (f32, f32),
}

impl SampleRanges {
    pub fn from_params(params: &GerstnerParams) -> Self {
        let mut angle_deg = (params.min_angle_deg, params.max_angle_deg);
        if angle_deg.0 > angle_deg.1 {
            angle_deg.1 += 360.0;
        }

        Self {
            angle_deg,
            amplitude: ordered(params.min_amplitude, params.max_amplitude),
            wavenumber: ordered(params.min_wavenumber, params.max_wavenumber),
        }
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Uniform sample from [low, high], tolerating an empty range
fn sample_range<R: Rng>(rng: &mut R, (low, high): (f32, f32)) -> f32 {
    low + (high - low) * rng.gen::<f32>()
}

/// Finite-depth, capillary-corrected dispersion relation
///
/// `ω² = g·k·tanh(k·depth)·(1 + k²·tension²)`; the tanh term is dropped at
/// `DEPTH_INFINITE` or deeper and the capillary term at `SURFACE_TENSION_NONE`.
pub fn dispersion(wavenumber: f32, gravity: f32, depth: f32, surface_tension: f32) -> f32 {
    let mut omega_sq = gravity * wavenumber;
    if depth < DEPTH_INFINITE {
        omega_sq *= (wavenumber * depth).tanh();
    }
    if surface_tension > SURFACE_TENSION_NONE {
        omega_sq *= 1.0 + wavenumber * wavenumber * surface_tension * surface_tension;
    }
    omega_sq.sqrt()
}

/// Snap `omega` to a whole number of cycles per `period_s`, never below one
pub fn quantize_omega(omega: f32, period_s: f32) -> f32 {
    let base = std::f32::consts::TAU / period_s;
    (omega / base).round().max(1.0) * base
}

/// World position in meters of output texel (x, z)
pub fn texel_position(x: u32, z: u32, resolution: u32) -> Vec2 {
    Vec2::new(x as f32, z as f32) * (GERSTNER_PATCH_SIZE_M / resolution as f32)
}

/// Fixed-capacity table of trochoidal waves
#[derive(Clone, Debug, PartialEq)]
pub struct WaveSet {
    /// Always `MAX_WAVE_COUNT` entries; only the first `count` are active
    pub waves: Vec<GpuWave>,
    pub count: usize,
}

impl WaveSet {
    /// Draw a fresh wave table; the whole table is replaced
    pub fn generate<R: Rng>(params: &GerstnerParams, gravity: f32, rng: &mut R) -> Self {
        let params = params.clamped();
        let ranges = SampleRanges::from_params(&params);
        let mut waves = vec![GpuWave::default(); MAX_WAVE_COUNT];

        for wave in waves.iter_mut().take(params.wave_count) {
            let angle = sample_range(rng, ranges.angle_deg).to_radians();
            let wavenumber = sample_range(rng, ranges.wavenumber);
            let amplitude = sample_range(rng, ranges.amplitude);
            let phase = std::f32::consts::TAU * rng.gen::<f32>();

            let mut omega = dispersion(wavenumber, gravity, params.depth, params.surface_tension);
            if let Some(period) = params.loop_period_s {
                omega = quantize_omega(omega, period);
            }

            *wave = GpuWave {
                direction: [angle.cos(), angle.sin()],
                wavenumber,
                amplitude,
                omega,
                phase,
                _padding: [0.0; 2],
            };
        }

        Self {
            waves,
            count: params.wave_count,
        }
    }

    pub fn active(&self) -> &[GpuWave] {
        &self.waves[..self.count]
    }

    /// Displacement and unit normal at world position `p` (meters, XZ)
    pub fn sample(&self, p: Vec2, time_s: f32, use_displacement: bool) -> (Vec3, Vec3) {
        let mut displacement = Vec3::ZERO;
        let mut normal = Vec3::Y;

        for wave in self.active() {
            let dir = Vec2::from(wave.direction);
            let theta = wave.wavenumber * dir.dot(p) - wave.omega * time_s + wave.phase;
            let (sin, cos) = theta.sin_cos();
            let ka = wave.wavenumber * wave.amplitude;

            displacement.y += wave.amplitude * cos;
            normal.x += dir.x * ka * sin;
            normal.z += dir.y * ka * sin;
            if use_displacement {
                displacement.x -= dir.x * wave.amplitude * sin;
                displacement.z -= dir.y * wave.amplitude * sin;
                normal.y -= ka * cos;
            }
        }

        (displacement, normal.normalize())
    }
}
