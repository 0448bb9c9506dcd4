//! 粒子系统模块
//!
//! 固定容量、按类型分池的瞬态视觉实体管理与渲染。
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   Particle System                    │
//! ├──────────────────────────────────────────────────────┤
//! │  1. Registry (define-once, emit-many)                │
//! │     - 类型名 → 共享纹理 + 存活粒子池                   │
//! │     - emit/release 经稳定索引池，O(1)无分配            │
//! │                                                      │
//! │  2. Particle (游戏逻辑帧间自由改写)                    │
//! │     - 位置/尺寸/旋转/颜色/UV                          │
//! │     - 相机派生量由渲染器每帧重算                       │
//! │                                                      │
//! │  3. Renderer (每帧一次)                               │
//! │     - preProcess → 剔除 → 全局距离降序 → 分批          │
//! │     - billboard四边形提交给外部管线                    │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut ctx = GfxContext::new(RenderOptions::default())?;
//! ctx.textures_mut().load("smoke", "textures/smoke.png")?;
//! ctx.define_particle_type("smoke", "smoke")?;
//!
//! let handle = ctx.particles_mut().emit("smoke")?;
//! ctx.particles_mut().particle_mut(handle).unwrap().position = pos;
//!
//! // 每帧
//! ctx.render_particles(cam_pos, &mut sink);
//!
//! // 效果结束时
//! ctx.particles_mut().release(handle)?;
//! ```

pub mod particle;
pub mod registry;
pub mod renderer;

pub use particle::Particle;
pub use registry::{ParticleHandle, ParticleRegistry, ParticleType, ParticleTypeId};
pub use renderer::{FrameStats, ParticleRenderer};
