//! 渲染模块
//!
//! - `context` - 进程级图形上下文（init/shutdown生命周期）
//! - `batch` - 粒子批次、顶点布局与提交接口
//! - `particles` - 粒子实体/注册表/渲染器

pub mod batch;
pub mod context;
pub mod particles;

pub use batch::{BatchDraw, BatchSink, ParticleBatch, ParticleVertex, WgpuBatchSink};
pub use context::GfxContext;
pub use particles::{
    FrameStats, Particle, ParticleHandle, ParticleRegistry, ParticleRenderer, ParticleTypeId,
};
