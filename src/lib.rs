//! # Particle Gfx
//!
//! A particle graphics subsystem for real-time 3D engines.
//!
//! ## Features
//!
//! - **Stable-Index Pool**: O(1) emit/release of transient sprites with generation-checked
//!   handles, no allocator churn in the steady state
//! - **Typed Emitter Pools**: define-once, emit-many particle types sharing a reference-counted
//!   texture resource
//! - **Per-Frame Renderer**: camera-relative pre-process, distance/alpha culling, global
//!   back-to-front sort and texture batching into an external pipeline sink
//! - **Injectable Context**: one process-wide graphics context with explicit init/shutdown,
//!   no ambient globals (全局状态集中管理，渲染器可隔离测试)
//!
//! ## Example
//!
//! ```
//! use particle_gfx::{GfxContext, RenderOptions};
//! use glam::Vec3;
//!
//! let mut ctx = GfxContext::new(RenderOptions::default()).unwrap();
//! ctx.textures_mut().register("smoke", 64, 64).unwrap();
//! ctx.define_particle_type("smoke", "smoke").unwrap();
//!
//! let handle = ctx.particles_mut().emit("smoke").unwrap();
//! ctx.particles_mut().particle_mut(handle).unwrap().position = Vec3::new(0.0, 1.0, 0.0);
//!
//! // ... per frame: ctx.render_particles(cam_pos, &mut sink);
//!
//! ctx.particles_mut().release(handle).unwrap();
//! ctx.shutdown();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Error types and the stable-index pool
//! - [`config`]: Render options provider (TOML/JSON + env overrides)
//! - [`resources`]: Reference-counted texture cache
//! - [`render`]: Graphics context, particle registry and the per-frame renderer

/// Core infrastructure: error types and the stable-index pool
pub mod core;
/// Render options provider with TOML/JSON loading and env overrides
pub mod config;
/// Resource management: reference-counted texture cache
pub mod resources;
/// Graphics context, particle entities and the per-frame renderer
pub mod render;

pub use crate::core::{
    AssetError, AssetResult, GfxError, GfxResult, ParticleError, ParticleResult, Pool, PoolHandle,
    RenderError, RenderResult,
};
pub use config::{ConfigError, ConfigResult, RenderOptions};
pub use render::{
    BatchDraw, BatchSink, FrameStats, GfxContext, Particle, ParticleBatch, ParticleHandle,
    ParticleRegistry, ParticleRenderer, ParticleTypeId, ParticleVertex, WgpuBatchSink,
};
pub use resources::{TextureCache, TextureRef};
