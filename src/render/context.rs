//! 图形上下文
//!
//! 进程级图形状态的唯一载体：纹理缓存、渲染选项、粒子注册表、
//! 全局粒子环境色。显式init/shutdown生命周期，作为参数注入
//! 渲染器而不是散落的全局变量，渲染器因此可以被隔离测试。

use crate::config::RenderOptions;
use crate::core::error::{GfxError, GfxResult};
use crate::render::batch::BatchSink;
use crate::render::particles::registry::{ParticleHandle, ParticleRegistry, ParticleTypeId};
use crate::render::particles::renderer::{FrameStats, ParticleRenderer};
use crate::resources::texture::TextureCache;
use glam::Vec3;

/// 进程级图形上下文
pub struct GfxContext {
    textures: TextureCache,
    options: RenderOptions,
    particles: ParticleRegistry,
    renderer: ParticleRenderer,
    particle_ambient: Vec3,
}

impl GfxContext {
    /// 用给定渲染选项初始化上下文
    ///
    /// 选项先经过校验，非法配置在此报错而不是渲染期出怪象。
    pub fn new(options: RenderOptions) -> GfxResult<Self> {
        options
            .validate()
            .map_err(|e| GfxError::Context(e.to_string()))?;

        tracing::info!(target: "gfx", "Graphics context initialized");
        Ok(Self {
            textures: TextureCache::new(),
            options,
            particles: ParticleRegistry::new(),
            renderer: ParticleRenderer::new(),
            particle_ambient: Vec3::ONE,
        })
    }

    /// 纹理缓存
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// 纹理缓存（可变）
    pub fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    /// 渲染选项
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// 渲染选项（可变，下一帧生效）
    pub fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    /// 粒子注册表
    pub fn particles(&self) -> &ParticleRegistry {
        &self.particles
    }

    /// 粒子注册表（可变）
    pub fn particles_mut(&mut self) -> &mut ParticleRegistry {
        &mut self.particles
    }

    /// 全局粒子环境色
    pub fn particle_ambient(&self) -> Vec3 {
        self.particle_ambient
    }

    /// 设置全局粒子环境色
    pub fn set_particle_ambient(&mut self, ambient: Vec3) {
        self.particle_ambient = ambient;
    }

    /// 定义粒子类型，纹理按名字从缓存获取
    ///
    /// 原子提交：纹理解析失败或类型重名时注册表不变，
    /// 不会留下半注册的类型；成功后纹理引用由注册表持有。
    pub fn define_particle_type(
        &mut self,
        name: &str,
        texture_name: &str,
    ) -> GfxResult<ParticleTypeId> {
        let texture = self.textures.acquire(texture_name)?;
        match self.particles.define(name, texture) {
            Ok(id) => Ok(id),
            Err(e) => {
                // 定义失败，归还刚获取的引用
                self.textures.release(texture);
                Err(e.into())
            }
        }
    }

    /// 粒子所属类型的纹理像素尺寸（宽, 高）
    pub fn particle_texture_size(&self, handle: ParticleHandle) -> GfxResult<(u32, u32)> {
        let texture = self
            .particles
            .texture_of(handle.type_id())
            .ok_or(crate::core::error::ParticleError::StaleHandle)?;
        Ok(self.textures.pixel_dimensions(texture)?)
    }

    /// 渲染一帧粒子
    pub fn render_particles(&mut self, cam_pos: Vec3, sink: &mut dyn BatchSink) -> FrameStats {
        self.renderer.render(
            &mut self.particles,
            self.particle_ambient,
            &self.options,
            cam_pos,
            sink,
        )
    }

    /// 关闭上下文：批量释放所有粒子并归还纹理引用
    ///
    /// 可重复调用，第二次及以后为空操作。
    pub fn shutdown(&mut self) {
        let textures = self.particles.shutdown();
        if textures.is_empty() {
            return;
        }
        for texture in textures {
            self.textures.release(texture);
        }
        tracing::info!(target: "gfx", "Graphics context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ParticleError;

    fn context() -> GfxContext {
        GfxContext::new(RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let options = RenderOptions {
            max_particle_distance: 0.0,
            ..Default::default()
        };
        assert!(GfxContext::new(options).is_err());
    }

    #[test]
    fn test_define_is_atomic_on_missing_texture() {
        let mut ctx = context();
        let err = ctx.define_particle_type("smoke", "missing").unwrap_err();
        assert!(matches!(err, GfxError::Asset(_)));
        assert!(ctx.particles().all_type_names().is_empty());
    }

    #[test]
    fn test_define_is_atomic_on_duplicate_name() {
        let mut ctx = context();
        ctx.textures_mut().register("tex", 64, 64).unwrap();
        ctx.define_particle_type("smoke", "tex").unwrap();

        let err = ctx.define_particle_type("smoke", "tex").unwrap_err();
        assert!(matches!(
            err,
            GfxError::Particle(ParticleError::AlreadyDefined(_))
        ));
        // 失败路径归还了引用：注册表1次 + 初始register的1次
        let tex = ctx.textures_mut().acquire("tex").unwrap();
        assert_eq!(ctx.textures().user_count(tex).unwrap(), 3);
    }

    #[test]
    fn test_texture_size_query() {
        let mut ctx = context();
        ctx.textures_mut().register("tex", 64, 32).unwrap();
        ctx.define_particle_type("smoke", "tex").unwrap();
        let handle = ctx.particles_mut().emit("smoke").unwrap();
        assert_eq!(ctx.particle_texture_size(handle).unwrap(), (64, 32));
    }

    #[test]
    fn test_shutdown_releases_textures() {
        let mut ctx = context();
        let tex = ctx.textures_mut().register("tex", 8, 8).unwrap();
        ctx.define_particle_type("smoke", "tex").unwrap();
        ctx.particles_mut().emit("smoke").unwrap();

        // register的那次引用先归还，注册表的引用在shutdown时归还
        ctx.textures_mut().release(tex);
        assert!(ctx.textures().is_loaded("tex"));

        ctx.shutdown();
        assert!(!ctx.textures().is_loaded("tex"));
        assert_eq!(ctx.particles().total_live(), 0);

        // 幂等
        ctx.shutdown();
    }
}
