use std::ops::{Add, Mul, Sub};

use glam::{Vec2, Vec3, Vec4};

use crate::config::{NormalMode, MIN_WAVENUMBER, PATCH_SIZE_M};
use crate::simulation::lookup::ButterflyLookup;
use crate::simulation::spectrum::{wavevector, Spectrum};

/// Multiply two complex numbers stored as (re, im)
pub fn complex_mul(a: Vec2, b: Vec2) -> Vec2 {
    Vec2::new(a.x * b.x - a.y * b.y, a.x * b.y + a.y * b.x)
}

pub fn complex_conj(a: Vec2) -> Vec2 {
    Vec2::new(a.x, -a.y)
}

/// e^(iθ)
pub fn complex_exp(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// The three co-evolving complex fields at one grid point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldSample {
    pub height: Vec2,
    pub choppy_x: Vec2,
    pub choppy_z: Vec2,
    pub slope_x: Vec2,
    pub slope_z: Vec2,
}

impl Add for FieldSample {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            height: self.height + rhs.height,
            choppy_x: self.choppy_x + rhs.choppy_x,
            choppy_z: self.choppy_z + rhs.choppy_z,
            slope_x: self.slope_x + rhs.slope_x,
            slope_z: self.slope_z + rhs.slope_z,
        }
    }
}

impl Sub for FieldSample {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            height: self.height - rhs.height,
            choppy_x: self.choppy_x - rhs.choppy_x,
            choppy_z: self.choppy_z - rhs.choppy_z,
            slope_x: self.slope_x - rhs.slope_x,
            slope_z: self.slope_z - rhs.slope_z,
        }
    }
}

/// Rotate every field by a complex twiddle factor
impl Mul<Vec2> for FieldSample {
    type Output = Self;
    fn mul(self, twiddle: Vec2) -> Self {
        Self {
            height: complex_mul(self.height, twiddle),
            choppy_x: complex_mul(self.choppy_x, twiddle),
            choppy_z: complex_mul(self.choppy_z, twiddle),
            slope_x: complex_mul(self.slope_x, twiddle),
            slope_z: complex_mul(self.slope_z, twiddle),
        }
    }
}

/// Transform axis of one IFFT pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Along x inside each row
    Row,
    /// Along z inside each column
    Column,
}

impl Axis {
    /// Flat index of element `index` on line `line`
    fn position(self, line: u32, index: u32, n: u32) -> usize {
        match self {
            Axis::Row => (line * n + index) as usize,
            Axis::Column => (index * n + line) as usize,
        }
    }
}

/// Spatial-domain output, laid out like the GPU textures
#[derive(Clone, Debug)]
pub struct SurfaceField {
    pub grid_size: u32,
    /// (horizontal x, height, horizontal z, 0)
    pub displacement: Vec<Vec4>,
    /// (dh/dx, dh/dz, 0, 0)
    pub slope: Vec<Vec4>,
    /// Unit normal in xyz, w = 0
    pub normal: Vec<Vec4>,
}

impl SurfaceField {
    pub fn heights(&self) -> impl Iterator<Item = f32> + '_ {
        self.displacement.iter().map(|d| d.y)
    }

    pub fn height(&self, x: u32, z: u32) -> f32 {
        self.displacement[(z * self.grid_size + x) as usize].y
    }

    pub fn mean_height(&self) -> f32 {
        self.heights().map(f64::from).sum::<f64>() as f32 / self.displacement.len() as f32
    }

    pub fn rms_height(&self) -> f32 {
        let sum_sq: f64 = self.heights().map(|h| f64::from(h) * f64::from(h)).sum();
        (sum_sq / self.displacement.len() as f64).sqrt() as f32
    }
}

/// Per-frame options shared by the CPU and GPU paths
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOptions {
    pub time_s: f32,
    pub use_displacement: bool,
    pub choppiness: f32,
    pub normal_mode: NormalMode,
}

/// Advance every bin to time `t`: h(k,t) = h0(k)e^(iωt) + conj(h0(-k))e^(-iωt)
pub fn evolve(spectrum: &Spectrum, time_s: f32) -> Vec<FieldSample> {
    let n = spectrum.grid_size();
    let mut field = Vec::with_capacity((n * n) as usize);

    for j in 0..n {
        for i in 0..n {
            let texel = spectrum.texel(i, j);
            let mirror = spectrum.texel((n - i) % n, (n - j) % n);
            let phase = complex_exp(texel.omega * time_s);

            let h0 = Vec2::from(texel.h0);
            let h0_mirror = Vec2::from(mirror.h0);
            let height =
                complex_mul(h0, phase) + complex_mul(complex_conj(h0_mirror), complex_conj(phase));

            let k = wavevector(i, j, n);
            let length = k.length();
            if length <= MIN_WAVENUMBER {
                field.push(FieldSample {
                    height,
                    ..Default::default()
                });
                continue;
            }
            let k_hat = k / length;

            // -i·k̂·h and i·k·h
            let minus_i_h = Vec2::new(height.y, -height.x);
            let i_h = -minus_i_h;
            field.push(FieldSample {
                height,
                choppy_x: minus_i_h * k_hat.x,
                choppy_z: minus_i_h * k_hat.y,
                slope_x: i_h * k.x,
                slope_z: i_h * k.y,
            });
        }
    }

    field
}

/// One level of the axis transform, reading `src` and writing every element of `dst`
pub fn ifft_level(
    src: &[FieldSample],
    dst: &mut [FieldSample],
    lookup: &ButterflyLookup,
    level: u32,
    axis: Axis,
) {
    let n = lookup.grid_size();
    let half = n / 2;

    for line in 0..n {
        for index in 0..half {
            let [a, b] = lookup.pair(level, index);
            let first = src[axis.position(line, a, n)];
            let second = src[axis.position(line, b, n)];

            if level == 0 {
                dst[axis.position(line, index, n)] = first;
                dst[axis.position(line, index + half, n)] = second;
            } else {
                let span = 1u32 << (level - 1);
                let offset = a & (span - 1);
                let twiddle = complex_exp(std::f32::consts::PI * offset as f32 / span as f32);
                let rotated = second * twiddle;
                dst[axis.position(line, a, n)] = first + rotated;
                dst[axis.position(line, b, n)] = first - rotated;
            }
        }
    }
}

/// Full two-axis inverse transform in the GPU's ping-pong order
///
/// Returns the unnormalized, parity-shifted field; see [`finalize`].
pub fn ifft_2d(evolved: Vec<FieldSample>, lookup: &ButterflyLookup) -> Vec<FieldSample> {
    let mut buffers = [evolved.clone(), evolved];
    let mut stage = 0usize;

    for axis in [Axis::Row, Axis::Column] {
        for level in 0..lookup.level_count() {
            let (read, write) = if stage % 2 == 0 {
                let (a, b) = buffers.split_at_mut(1);
                (&a[0], &mut b[0])
            } else {
                let (a, b) = buffers.split_at_mut(1);
                (&b[0], &mut a[0])
            };
            ifft_level(read, write, lookup, level, axis);
            stage += 1;
        }
    }

    let [first, second] = buffers;
    if stage % 2 == 0 {
        first
    } else {
        second
    }
}

/// Apply the 1/N² normalization and the (-1)^(x+z) shift of the centred spectrum
pub fn finalize(field: &[FieldSample], grid_size: u32, options: &FrameOptions) -> SurfaceField {
    let n = grid_size;
    let norm = 1.0 / (n as f32 * n as f32);
    let mut displacement = Vec::with_capacity(field.len());
    let mut slope = Vec::with_capacity(field.len());

    for z in 0..n {
        for x in 0..n {
            let sample = &field[(z * n + x) as usize];
            let sign = if (x + z) % 2 == 0 { 1.0 } else { -1.0 };
            let scale = sign * norm;
            let lateral = if options.use_displacement {
                options.choppiness * scale
            } else {
                0.0
            };

            displacement.push(Vec4::new(
                sample.choppy_x.x * lateral,
                sample.height.x * scale,
                sample.choppy_z.x * lateral,
                0.0,
            ));
            slope.push(Vec4::new(
                sample.slope_x.x * scale,
                sample.slope_z.x * scale,
                0.0,
                0.0,
            ));
        }
    }

    let normal = match options.normal_mode {
        NormalMode::Analytic => analytic_normals(&slope),
        NormalMode::Sobel => sobel_normals(&displacement, n),
    };

    SurfaceField {
        grid_size: n,
        displacement,
        slope,
        normal,
    }
}

/// Normals straight from the transformed slope field
pub fn analytic_normals(slope: &[Vec4]) -> Vec<Vec4> {
    slope
        .iter()
        .map(|s| Vec3::new(-s.x, 1.0, -s.y).normalize().extend(0.0))
        .collect()
}

/// Normals from a 3x3 Sobel gradient of the height channel, wrapping at the edges
pub fn sobel_normals(displacement: &[Vec4], grid_size: u32) -> Vec<Vec4> {
    let n = grid_size as i32;
    let spacing = PATCH_SIZE_M / grid_size as f32;
    let height = |x: i32, z: i32| -> f32 {
        displacement[(z.rem_euclid(n) * n + x.rem_euclid(n)) as usize].y
    };

    let mut normals = Vec::with_capacity(displacement.len());
    for z in 0..n {
        for x in 0..n {
            let gx = (height(x + 1, z - 1) + 2.0 * height(x + 1, z) + height(x + 1, z + 1)
                - height(x - 1, z - 1)
                - 2.0 * height(x - 1, z)
                - height(x - 1, z + 1))
                / (8.0 * spacing);
            let gz = (height(x - 1, z + 1) + 2.0 * height(x, z + 1) + height(x + 1, z + 1)
                - height(x - 1, z - 1)
                - 2.0 * height(x, z - 1)
                - height(x + 1, z - 1))
                / (8.0 * spacing);
            normals.push(Vec3::new(-gx, 1.0, -gz).normalize().extend(0.0));
        }
    }
    normals
}

/// Evolve, transform and extract normals for one frame
///
/// Follows the GPU pipeline step for step: same lookup table, same ping-pong
/// order, same final scaling.
pub fn synthesize(spectrum: &Spectrum, lookup: &ButterflyLookup, options: &FrameOptions) -> SurfaceField {
    debug_assert_eq!(
        spectrum.grid_size_power,
        lookup.grid_size_power(),
        "Lookup table is stale for this spectrum"
    );
    let transformed = ifft_2d(evolve(spectrum, options.time_s), lookup);
    finalize(&transformed, spectrum.grid_size(), options)
}
