use glam::Vec2;
use rand::Rng;

use crate::config::{FourierParams, K_COORD_MULT, MIN_WAVENUMBER};
use crate::simulation::texel::FrequencyTexel;

/// Frequency-domain field of the spectral surface, N×N bins in row-major order
#[derive(Clone, Debug)]
pub struct Spectrum {
    pub grid_size_power: u32,
    pub texels: Vec<FrequencyTexel>,
}

impl Spectrum {
    /// Sample a Phillips spectrum for the given parameters
    ///
    /// Consumes `2·N²` uniforms from `rng` at most; the generator is stateful so
    /// the same seed reproduces the same field.
    pub fn generate<R: Rng>(params: &FourierParams, gravity: f32, rng: &mut R) -> Self {
        let n = params.grid_size();
        let wind_rad = params.wind_angle_deg.to_radians();
        let wind_dir = Vec2::new(wind_rad.cos(), wind_rad.sin());

        let mut texels = Vec::with_capacity((n * n) as usize);
        for j in 0..n {
            for i in 0..n {
                let k = wavevector(i, j, n);
                let length = k.length();
                if length <= MIN_WAVENUMBER {
                    texels.push(FrequencyTexel::ZERO);
                    continue;
                }

                // Kept even for empty bins so the conjugate partner evolves at the same rate
                let omega = (gravity * length).sqrt();

                let alignment = (k / length).dot(wind_dir);
                if alignment < 0.0 {
                    // Waves travelling against the wind carry no energy
                    texels.push(FrequencyTexel::new(0.0, 0.0, omega));
                    continue;
                }

                let scale = (phillips(k, wind_dir, params, gravity) / 2.0).sqrt();
                let (xi_r, xi_i) = standard_normal_pair(rng);
                texels.push(FrequencyTexel::new(xi_r * scale, xi_i * scale, omega));
            }
        }

        Self {
            grid_size_power: params.grid_size_power,
            texels,
        }
    }

    /// A field with energy in exactly one bin, used as an IFFT oracle
    ///
    /// The conjugate partner bin gets the same `omega` and no energy.
    pub fn single_bin(grid_size_power: u32, i: u32, j: u32, h0: [f32; 2], omega: f32) -> Self {
        let n = 1u32 << grid_size_power;
        let mut texels = vec![FrequencyTexel::ZERO; (n * n) as usize];
        texels[(((n - j) % n) * n + (n - i) % n) as usize] = FrequencyTexel::new(0.0, 0.0, omega);
        texels[(j * n + i) as usize] = FrequencyTexel::new(h0[0], h0[1], omega);
        Self {
            grid_size_power,
            texels,
        }
    }

    pub fn grid_size(&self) -> u32 {
        1 << self.grid_size_power
    }

    pub fn texel(&self, i: u32, j: u32) -> &FrequencyTexel {
        &self.texels[(j * self.grid_size() + i) as usize]
    }
}

/// Wavevector of bin (i, j); bin (N/2, N/2) is the zero frequency
pub fn wavevector(i: u32, j: u32, grid_size: u32) -> Vec2 {
    let half = (grid_size / 2) as i32;
    Vec2::new(
        (i as i32 - half) as f32 * K_COORD_MULT,
        (j as i32 - half) as f32 * K_COORD_MULT,
    )
}

/// Phillips spectral density for wavevector `k`
///
/// `P(k) = A · exp(−1/(k²L²)) · exp(−k²l²) · (k̂·ŵ)² / k⁴` with `L = V²/g`.
/// Returns 0 for the zero wavevector, where the density is undefined.
pub fn phillips(k: Vec2, wind_dir: Vec2, params: &FourierParams, gravity: f32) -> f32 {
    let k_sq = k.length_squared();
    if k_sq <= MIN_WAVENUMBER * MIN_WAVENUMBER {
        return 0.0;
    }

    let largest_wave = params.wind_speed * params.wind_speed / gravity;
    let alignment = k.normalize().dot(wind_dir);
    let cutoff = params.small_wave_cutoff;

    params.amplitude
        * (-1.0 / (k_sq * largest_wave * largest_wave)).exp()
        * (-k_sq * cutoff * cutoff).exp()
        * alignment
        * alignment
        / (k_sq * k_sq)
}

/// Two independent standard normal samples (Box-Muller transform)
pub fn standard_normal_pair<R: Rng>(rng: &mut R) -> (f32, f32) {
    // 1 - [0, 1) keeps the logarithm finite
    let u1 = 1.0 - rng.gen::<f32>();
    let u2 = rng.gen::<f32>();
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = std::f32::consts::TAU * u2;
    (radius * theta.cos(), radius * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GRAVITY;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_params() -> FourierParams {
        FourierParams {
            grid_size_power: 6,
            ..Default::default()
        }
    }

    #[test]
    fn test_spectrum_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let spectrum = Spectrum::generate(&small_params(), GRAVITY, &mut rng);
        assert_eq!(spectrum.texels.len(), 64 * 64);
        assert_eq!(spectrum.grid_size(), 64);
    }

    #[test]
    fn test_zero_bin_is_empty() {
        let mut rng = StdRng::seed_from_u64(2);
        let spectrum = Spectrum::generate(&small_params(), GRAVITY, &mut rng);
        let center = spectrum.texel(32, 32);
        assert!(center.is_zero(), "Zero wavevector must carry no energy");
        assert_eq!(center.omega, 0.0);
    }

    #[test]
    fn test_against_wind_bins_are_empty() {
        let params = FourierParams {
            wind_angle_deg: 0.0,
            ..small_params()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let spectrum = Spectrum::generate(&params, GRAVITY, &mut rng);
        let n = spectrum.grid_size();
        for j in 0..n {
            for i in 0..n {
                let k = wavevector(i, j, n);
                if k.x < -1e-6 {
                    assert!(
                        spectrum.texel(i, j).is_zero(),
                        "Bin ({}, {}) travels against the wind but has energy",
                        i,
                        j
                    );
                }
            }
        }
    }

    #[test]
    fn test_dispersion_is_deep_water() {
        let mut rng = StdRng::seed_from_u64(4);
        let spectrum = Spectrum::generate(&small_params(), GRAVITY, &mut rng);
        let n = spectrum.grid_size();
        for j in 0..n {
            for i in 0..n {
                let k = wavevector(i, j, n).length();
                if k > MIN_WAVENUMBER {
                    let omega = spectrum.texel(i, j).omega;
                    assert!((omega - (GRAVITY * k).sqrt()).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_spectrum() {
        let params = small_params();
        let a = Spectrum::generate(&params, GRAVITY, &mut StdRng::seed_from_u64(9));
        let b = Spectrum::generate(&params, GRAVITY, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.texels, b.texels);
    }

    #[test]
    fn test_phillips_zero_and_crosswind() {
        let params = FourierParams::default();
        let wind = Vec2::X;
        assert_eq!(phillips(Vec2::ZERO, wind, &params, GRAVITY), 0.0);
        // Perpendicular to the wind the directional factor vanishes
        assert!(phillips(Vec2::new(0.0, 0.5), wind, &params, GRAVITY).abs() < 1e-12);
        assert!(phillips(Vec2::new(0.5, 0.0), wind, &params, GRAVITY) > 0.0);
    }

    #[test]
    fn test_phillips_scales_with_amplitude() {
        let k = Vec2::new(0.3, 0.1);
        let low = FourierParams {
            amplitude: 100.0,
            ..Default::default()
        };
        let high = FourierParams {
            amplitude: 400.0,
            ..Default::default()
        };
        let ratio = phillips(k, Vec2::X, &high, GRAVITY) / phillips(k, Vec2::X, &low, GRAVITY);
        assert!((ratio - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = StdRng::seed_from_u64(5);
        let samples: Vec<f32> = (0..20_000)
            .flat_map(|_| {
                let (a, b) = standard_normal_pair(&mut rng);
                [a, b]
            })
            .collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let variance =
            samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.03, "Mean should be ~0, got {}", mean);
        assert!((variance - 1.0).abs() < 0.05, "Variance should be ~1, got {}", variance);
        assert!(samples.iter().all(|s| s.is_finite()));
    }
}
