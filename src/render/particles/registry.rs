//! 粒子类型注册表
//!
//! 把类型名映射到共享纹理与该类型的存活粒子池。契约是
//! define-once、emit-many：类型定义后在进程生命周期内不再
//! 重定义或移除，粒子由调用方显式emit/release。

use crate::core::error::{ParticleError, ParticleResult};
use crate::core::pool::{Pool, PoolHandle};
use crate::render::particles::particle::Particle;
use crate::resources::texture::TextureRef;
use std::collections::HashMap;

/// 粒子类型标识
///
/// 注册表内类型表的下标包装；类型不会被移除，因此该标识
/// 在进程生命周期内始终有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleTypeId(u32);

impl ParticleTypeId {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// 粒子句柄
///
/// 调用方对一个已发射粒子的唯一凭据：所属类型 + 池内世代句柄。
/// 粒子释放后句柄失效，后续访问返回`None`/`StaleHandle`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    pub(crate) type_id: ParticleTypeId,
    pub(crate) pool_handle: PoolHandle,
}

impl ParticleHandle {
    /// 粒子所属的类型
    #[inline]
    pub fn type_id(&self) -> ParticleTypeId {
        self.type_id
    }
}

/// 一个已注册的粒子类型
#[derive(Debug)]
pub struct ParticleType {
    name: String,
    texture: TextureRef,
    pool: Pool<Particle>,
}

impl ParticleType {
    /// 类型名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 共享纹理引用
    pub fn texture(&self) -> TextureRef {
        self.texture
    }

    /// 该类型的存活粒子池
    pub(crate) fn pool(&self) -> &Pool<Particle> {
        &self.pool
    }

    /// 该类型的存活粒子池（可变）
    pub(crate) fn pool_mut(&mut self) -> &mut Pool<Particle> {
        &mut self.pool
    }
}

/// 粒子类型注册表
///
/// 独占拥有所有类型及其粒子池；粒子通过句柄访问，
/// 注册表之外不存在指向池内存储的引用。
#[derive(Debug, Default)]
pub struct ParticleRegistry {
    /// 定义顺序排列的类型表
    types: Vec<ParticleType>,
    by_name: HashMap<String, u32>,
}

impl ParticleRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 定义一个新的粒子类型
    ///
    /// 类型是一次性定义的：重名返回`AlreadyDefined`，注册表不变。
    /// 纹理引用计数的增加（acquire）由调用方在传入前完成，
    /// 注册表接管该引用直至整体关闭。
    pub fn define(&mut self, name: &str, texture: TextureRef) -> ParticleResult<ParticleTypeId> {
        if self.by_name.contains_key(name) {
            return Err(ParticleError::AlreadyDefined(name.to_string()));
        }

        let id = ParticleTypeId::new(self.types.len() as u32);
        self.types.push(ParticleType {
            name: name.to_string(),
            texture,
            pool: Pool::new(),
        });
        self.by_name.insert(name.to_string(), id.0);
        tracing::debug!(target: "particles", "Defined particle type '{}'", name);
        Ok(id)
    }

    /// 在指定类型的池中发射一个新粒子
    ///
    /// 未定义的类型名返回`UndefinedType`，不产生任何粒子。
    /// 何时释放完全由调用方决定，子系统不做自动回收或定时过期。
    pub fn emit(&mut self, name: &str) -> ParticleResult<ParticleHandle> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| ParticleError::UndefinedType(name.to_string()))?;
        let type_id = ParticleTypeId(index);
        let ptype = &mut self.types[type_id.index()];
        let pool_handle = ptype.pool.insert(Particle::new(type_id));
        Ok(ParticleHandle {
            type_id,
            pool_handle,
        })
    }

    /// 释放一个粒子，将其从所属池中移除
    ///
    /// 每个粒子恰好释放一次；重复释放返回`StaleHandle`，
    /// 池不变量不受影响（世代校验拦截在移除之前）。
    pub fn release(&mut self, handle: ParticleHandle) -> ParticleResult<()> {
        let ptype = self
            .types
            .get_mut(handle.type_id.index())
            .ok_or(ParticleError::StaleHandle)?;
        if !ptype.pool.contains(handle.pool_handle) {
            return Err(ParticleError::StaleHandle);
        }
        ptype.pool.remove(handle.pool_handle);
        Ok(())
    }

    /// 按句柄访问粒子（释放后返回`None`）
    pub fn particle(&self, handle: ParticleHandle) -> Option<&Particle> {
        self.types
            .get(handle.type_id.index())?
            .pool
            .get(handle.pool_handle)
    }

    /// 按句柄可变访问粒子（释放后返回`None`）
    pub fn particle_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        self.types
            .get_mut(handle.type_id.index())?
            .pool
            .get_mut(handle.pool_handle)
    }

    /// 所有已定义类型名的快照，按定义顺序排列
    pub fn all_type_names(&self) -> Vec<String> {
        self.types.iter().map(|t| t.name.clone()).collect()
    }

    /// 指定类型当前的存活粒子数
    pub fn live_count(&self, name: &str) -> Option<usize> {
        let index = *self.by_name.get(name)?;
        Some(self.types[index as usize].pool.len())
    }

    /// 全部类型的存活粒子总数
    pub fn total_live(&self) -> usize {
        self.types.iter().map(|t| t.pool.len()).sum()
    }

    /// 类型的共享纹理
    pub fn texture_of(&self, type_id: ParticleTypeId) -> Option<TextureRef> {
        Some(self.types.get(type_id.index())?.texture)
    }

    /// 按定义顺序迭代类型（渲染器专用）
    pub(crate) fn types(&self) -> &[ParticleType] {
        &self.types
    }

    /// 按定义顺序可变迭代类型（渲染器专用）
    pub(crate) fn types_mut(&mut self) -> &mut [ParticleType] {
        &mut self.types
    }

    /// 整体关闭：批量释放所有粒子，交还各类型的纹理引用
    ///
    /// 返回值由调用方（图形上下文）归还给纹理缓存。
    pub(crate) fn shutdown(&mut self) -> Vec<TextureRef> {
        let textures = self.types.iter().map(|t| t.texture).collect();
        for ptype in &mut self.types {
            ptype.pool.clear();
        }
        self.types.clear();
        self.by_name.clear();
        textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::texture::TextureCache;
    use glam::Vec3;

    fn registry_with_type(name: &str) -> (ParticleRegistry, TextureCache) {
        let mut cache = TextureCache::new();
        let tex = cache.register(name, 64, 64).unwrap();
        let mut registry = ParticleRegistry::new();
        registry.define(name, tex).unwrap();
        (registry, cache)
    }

    #[test]
    fn test_define_once() {
        let (mut registry, mut cache) = registry_with_type("smoke");
        let tex = cache.register("other", 8, 8).unwrap();
        let err = registry.define("smoke", tex).unwrap_err();
        assert_eq!(err, ParticleError::AlreadyDefined("smoke".to_string()));
    }

    #[test]
    fn test_emit_requires_define() {
        let mut registry = ParticleRegistry::new();
        let err = registry.emit("smoke").unwrap_err();
        assert_eq!(err, ParticleError::UndefinedType("smoke".to_string()));
        assert_eq!(registry.total_live(), 0);
    }

    #[test]
    fn test_emit_release_lifecycle() {
        let (mut registry, _cache) = registry_with_type("smoke");

        let h1 = registry.emit("smoke").unwrap();
        let h2 = registry.emit("smoke").unwrap();
        assert_eq!(registry.live_count("smoke"), Some(2));

        registry.particle_mut(h1).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
        registry.particle_mut(h2).unwrap().position = Vec3::new(4.0, 5.0, 6.0);

        registry.release(h1).unwrap();
        assert_eq!(registry.live_count("smoke"), Some(1));
        assert!(registry.particle(h1).is_none());
        // 释放h1不改变其他存活粒子的字段值
        assert_eq!(
            registry.particle(h2).unwrap().position,
            Vec3::new(4.0, 5.0, 6.0)
        );
    }

    #[test]
    fn test_double_release_is_usage_error() {
        let (mut registry, _cache) = registry_with_type("smoke");
        let h = registry.emit("smoke").unwrap();
        registry.release(h).unwrap();
        assert_eq!(registry.release(h), Err(ParticleError::StaleHandle));
        assert_eq!(registry.live_count("smoke"), Some(0));
    }

    #[test]
    fn test_all_type_names_definition_order() {
        let mut cache = TextureCache::new();
        let mut registry = ParticleRegistry::new();
        for name in ["smoke", "flame", "spark"] {
            let tex = cache.register(name, 16, 16).unwrap();
            registry.define(name, tex).unwrap();
        }
        assert_eq!(registry.all_type_names(), vec!["smoke", "flame", "spark"]);
    }

    #[test]
    fn test_shutdown_returns_textures() {
        let (mut registry, cache) = registry_with_type("smoke");
        registry.emit("smoke").unwrap();
        let textures = registry.shutdown();
        assert_eq!(textures.len(), 1);
        assert_eq!(registry.total_live(), 0);
        assert!(registry.all_type_names().is_empty());
        drop(cache);
    }
}
