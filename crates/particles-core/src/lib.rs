pub mod audio;
pub mod bloom;
pub mod constants;
pub mod controls;
pub mod error;
pub mod fbo;
pub mod frame;
pub mod points;
pub mod simulation;
pub mod state;
pub mod triangles;

pub static SIMULATION_WGSL: &str = include_str!("../../../shaders/simulation.wgsl");
pub static PARTICLES_WGSL: &str = include_str!("../../../shaders/particles.wgsl");
pub static TRIANGLES_WGSL: &str = include_str!("../../../shaders/triangles.wgsl");
pub static BLOOM_WGSL: &str = include_str!("../../../shaders/bloom.wgsl");

pub use audio::{AcquireTicket, AudioAnalyzer, AudioBands, CapturePhase, CaptureStream};
pub use bloom::{BloomChainPlan, BloomSettings, BloomUniforms, MipSize};
pub use constants::*;
pub use controls::ControlSurface;
pub use error::{Error, Result, Viewport};
pub use fbo::{ParticleLayout, PingPong};
pub use frame::{FrameOrchestrator, FramePhase, GpuPipeline};
pub use points::{ColorMode, PointParams, PointUniforms};
pub use simulation::{SimParams, SimUniforms};
pub use state::*;
pub use triangles::{TriangleField, TriangleInstance};
