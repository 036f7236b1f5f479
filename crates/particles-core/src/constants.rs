// Shared simulation/audio/bloom tuning constants used by the web frontend and host tests.

// Particle state texture
pub const PARTICLE_TEX_WIDTH: u32 = 512;
pub const PARTICLE_TEX_HEIGHT: u32 = 512;
pub const SPHERE_RADIUS: f32 = 128.0; // radius of the sphere the targets are sampled on
pub const TARGET_SEED: u64 = 42;

// Audio analysis
pub const FFT_SIZE: u32 = 256;
pub const FREQUENCY_BIN_COUNT: usize = (FFT_SIZE / 2) as usize;
pub const BASS_BINS: (usize, usize) = (0, 8);
pub const MID_BINS: (usize, usize) = (8, 24);
pub const TREBLE_BINS: (usize, usize) = (24, 64);

// Simulation bases
pub const BASE_TIMER_STEP: f32 = 0.01;
pub const BASE_FREQUENCY: f32 = 0.01;
pub const BASE_AMPLITUDE: f32 = 46.0;
pub const MAX_DISTANCE: f32 = 48.0;

// Simulation audio coefficients
pub const TIMER_MID_COEFF: f32 = 0.02;
pub const FREQUENCY_MID_COEFF: f32 = 0.02;
pub const AMPLITUDE_BASS_COEFF: f32 = 46.0;

// Relaxation of the previous position toward the animated target per step
pub const RELAX_BASE: f32 = 0.08;
pub const RELAX_BASS_COEFF: f32 = 0.12;

// Point sprites
pub const BASE_POINT_SIZE: f32 = 320.0;
pub const POINT_SIZE_TREBLE_COEFF: f32 = 320.0;
pub const MIN_POINT_SIZE_PX: f32 = 1.0;
pub const COLOR_SMALL: [f32; 3] = [213.0 / 255.0, 239.0 / 255.0, 229.0 / 255.0];
pub const COLOR_BIG: [f32; 3] = [207.0 / 255.0, 221.0 / 255.0, 212.0 / 255.0];
pub const HUE_SATURATION: f32 = 0.7;
pub const HUE_LIGHTNESS: f32 = 0.5;
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Particle group rotation
pub const ROTATION_X_AMPLITUDE_DEG: f32 = 2.0;
pub const ROTATION_X_RATE_PER_MS: f64 = 0.001;
pub const ROTATION_Y_STEP_DEG: f32 = -0.05;

// Bloom defaults
pub const BLOOM_THRESHOLD: f32 = 0.7;
pub const BLOOM_STRENGTH: f32 = 1.8;
pub const BLOOM_TINT: [f32; 3] = [0x79 as f32 / 255.0, 0.0, 0.0]; // #790000
pub const BLOOM_TINT_STRENGTH: f32 = 0.15;
pub const BLOOM_MIPS: u32 = 3;
pub const BLOOM_MIPS_MIN: u32 = 1;
pub const BLOOM_MIPS_MAX: u32 = 5;
pub const BLOOM_RESOLUTION: f32 = 0.5; // fraction of the viewport
pub const BLOOM_RESOLUTION_MIN: f32 = 0.25;
pub const BLOOM_RESOLUTION_MAX: f32 = 1.0;
pub const BLUR_OFFSET_STEP: f32 = 2.0; // base-resolution texels added per mip level

// Triangle sprites
pub const TRIANGLE_COUNT: usize = 1000;
pub const TRIANGLE_SPREAD: f32 = 10.0;
pub const TRIANGLE_SCALE_MIN: f32 = 0.1;
pub const TRIANGLE_SCALE_SPAN: f32 = 0.5;
pub const TRIANGLE_SPIN_PER_FRAME: f32 = 0.01;
pub const TRIANGLE_LIFE_DECAY_PER_FRAME: f32 = 0.005;

// Camera
pub const CAMERA_Z: f32 = 300.0;
pub const CAMERA_FOVY_DEG: f32 = 45.0;
pub const CAMERA_ZNEAR: f32 = 1.0;
pub const CAMERA_ZFAR: f32 = 2000.0;
