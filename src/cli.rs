use clap::{Parser, ValueEnum};

use ocean_surface::config::{FourierParams, GerstnerParams, NormalMode};

/// Wave model shown at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SurfaceKind {
    Fourier,
    Gerstner,
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ocean")]
#[command(about = "GPU-animated ocean surface", long_about = None)]
pub struct Args {
    /// Wave model to start with
    #[arg(long, value_enum, default_value = "fourier")]
    pub surface: SurfaceKind,

    /// log2 of the spectral grid size (6..=11)
    #[arg(long, value_name = "POWER", default_value_t = 9)]
    pub grid_power: u32,

    /// Seed for spectrum and wave generation
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of Gerstner waves (at most 100)
    #[arg(long, value_name = "COUNT", default_value_t = 20)]
    pub waves: usize,

    /// Take spectral normals from the slope field instead of a Sobel filter
    #[arg(long)]
    pub analytic_normals: bool,

    /// Disable horizontal displacement
    #[arg(long)]
    pub no_displacement: bool,

    // ---- Spectral surface ----
    /// Phillips spectrum amplitude scale
    #[arg(long)]
    pub amplitude: Option<f32>,

    /// Wind speed in m/s
    #[arg(long, value_name = "M/S")]
    pub wind_speed: Option<f32>,

    /// Wind direction in degrees
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub wind_angle: Option<f32>,

    /// Suppress waves shorter than this many meters
    #[arg(long, value_name = "METERS")]
    pub cutoff: Option<f32>,

    /// Horizontal displacement multiplier
    #[arg(long, allow_negative_numbers = true)]
    pub choppiness: Option<f32>,

    // ---- Gerstner surface ----
    /// Gerstner texture resolution (32..=2048)
    #[arg(long, value_name = "TEXELS")]
    pub resolution: Option<u32>,

    /// Wave direction range in degrees; min > max wraps through 0
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub min_angle: Option<f32>,

    /// Upper end of the wave direction range
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub max_angle: Option<f32>,

    /// Wave amplitude range in meters
    #[arg(long)]
    pub min_amplitude: Option<f32>,

    /// Upper end of the amplitude range
    #[arg(long)]
    pub max_amplitude: Option<f32>,

    /// Wavenumber range in rad/m
    #[arg(long)]
    pub min_wavenumber: Option<f32>,

    /// Upper end of the wavenumber range
    #[arg(long)]
    pub max_wavenumber: Option<f32>,

    /// Water depth in meters (100 or more is deep water)
    #[arg(long, value_name = "METERS")]
    pub depth: Option<f32>,

    /// Capillary length (0 disables the capillary term)
    #[arg(long)]
    pub surface_tension: Option<f32>,

    /// Animation loop period in seconds; 0 leaves frequencies unquantized
    #[arg(long, value_name = "SECONDS")]
    pub loop_period: Option<f32>,
}

impl Args {
    pub fn fourier_params(&self) -> FourierParams {
        let defaults = FourierParams::default();
        FourierParams {
            amplitude: self.amplitude.unwrap_or(defaults.amplitude),
            wind_speed: self.wind_speed.unwrap_or(defaults.wind_speed),
            wind_angle_deg: self.wind_angle.unwrap_or(defaults.wind_angle_deg),
            small_wave_cutoff: self.cutoff.unwrap_or(defaults.small_wave_cutoff),
            grid_size_power: self.grid_power,
            choppiness: self.choppiness.unwrap_or(defaults.choppiness),
            normal_mode: if self.analytic_normals {
                NormalMode::Analytic
            } else {
                NormalMode::Sobel
            },
        }
        .clamped()
    }

    pub fn gerstner_params(&self) -> GerstnerParams {
        let defaults = GerstnerParams::default();
        GerstnerParams {
            wave_count: self.waves,
            texture_resolution: self.resolution.unwrap_or(defaults.texture_resolution),
            min_angle_deg: self.min_angle.unwrap_or(defaults.min_angle_deg),
            max_angle_deg: self.max_angle.unwrap_or(defaults.max_angle_deg),
            min_amplitude: self.min_amplitude.unwrap_or(defaults.min_amplitude),
            max_amplitude: self.max_amplitude.unwrap_or(defaults.max_amplitude),
            min_wavenumber: self.min_wavenumber.unwrap_or(defaults.min_wavenumber),
            max_wavenumber: self.max_wavenumber.unwrap_or(defaults.max_wavenumber),
            depth: self.depth.unwrap_or(defaults.depth),
            surface_tension: self.surface_tension.unwrap_or(defaults.surface_tension),
            loop_period_s: self.loop_period.or(defaults.loop_period_s),
        }
        .clamped()
    }
}
