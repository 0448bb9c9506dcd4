//! 纹理缓存
//!
//! 显式引用计数的共享纹理存储。粒子类型在定义时获取（acquire）纹理，
//! 引用计数归零时缓存将其逐出。粒子类型在进程生命周期内不会被移除，
//! 因此其纹理引用只在整体关闭时释放。
//!
//! 与异步资源服务器不同，这里的加载是同步的：定义粒子类型的调用点
//! 需要立刻知道纹理是否可用（加载失败可恢复，注册表不提交半成品状态）。

use crate::core::error::{AssetError, AssetResult};
use std::collections::HashMap;
use std::path::Path;

/// 纹理引用
///
/// 缓存内纹理的轻量引用，按值复制。引用本身不管理计数，
/// 计数的增减通过`TextureCache::acquire`/`release`显式进行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureRef {
    id: u32,
}

/// 缓存内的一张纹理
#[derive(Debug)]
struct TextureEntry {
    name: String,
    width: u32,
    height: u32,
    /// RGBA8像素数据；运行时注册的纹理（如渲染目标）没有CPU侧像素
    pixels: Option<Vec<u8>>,
    /// 当前使用者数量，归零即逐出
    users: u32,
}

/// 显式引用计数的纹理缓存
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: Vec<Option<TextureEntry>>,
    by_name: HashMap<String, u32>,
    free: Vec<u32>,
}

impl TextureCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 已缓存纹理数量
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// 纹理是否已加载
    pub fn is_loaded(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// 从磁盘加载纹理并获取一个引用
    ///
    /// 名字已存在时不重新解码，直接增加引用计数。
    /// 解码失败返回`AssetError::TextureLoad`，缓存状态不变。
    pub fn load<P: AsRef<Path>>(&mut self, name: &str, path: P) -> AssetResult<TextureRef> {
        if self.by_name.contains_key(name) {
            return self.acquire(name);
        }

        let image = image::open(path.as_ref()).map_err(|e| AssetError::TextureLoad {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        tracing::debug!(target: "assets", "Loaded texture '{}' ({}x{})", name, width, height);
        Ok(self.insert_entry(name, width, height, Some(rgba.into_raw())))
    }

    /// 注册一张没有CPU侧像素的纹理（渲染目标、程序化纹理等）
    ///
    /// 名字已存在时等价于`acquire`。
    pub fn register(&mut self, name: &str, width: u32, height: u32) -> AssetResult<TextureRef> {
        if self.by_name.contains_key(name) {
            return self.acquire(name);
        }
        Ok(self.insert_entry(name, width, height, None))
    }

    /// 按名字获取一个引用，引用计数加一
    ///
    /// 名字不存在时返回`AssetError::TextureNotFound`。
    pub fn acquire(&mut self, name: &str) -> AssetResult<TextureRef> {
        let id = *self
            .by_name
            .get(name)
            .ok_or_else(|| AssetError::TextureNotFound(name.to_string()))?;
        let entry = self.entry_mut(id)?;
        entry.users += 1;
        Ok(TextureRef { id })
    }

    /// 归还一个引用，计数归零时逐出纹理
    ///
    /// 过期引用被忽略并记录警告（重复释放是调用方缺陷，但不影响缓存一致性）。
    pub fn release(&mut self, texture: TextureRef) {
        let Some(slot) = self.entries.get_mut(texture.id as usize) else {
            tracing::warn!(target: "assets", "Release of an unknown texture ref (id {})", texture.id);
            return;
        };
        let Some(entry) = slot.as_mut() else {
            tracing::warn!(target: "assets", "Double release of texture ref (id {})", texture.id);
            return;
        };

        entry.users -= 1;
        if entry.users == 0 {
            let name = entry.name.clone();
            self.by_name.remove(&name);
            *slot = None;
            self.free.push(texture.id);
            tracing::debug!(target: "assets", "Evicted texture '{}' (no remaining users)", name);
        }
    }

    /// 纹理的像素尺寸（宽, 高）
    pub fn pixel_dimensions(&self, texture: TextureRef) -> AssetResult<(u32, u32)> {
        let entry = self.entry(texture.id)?;
        Ok((entry.width, entry.height))
    }

    /// 纹理名字
    pub fn name_of(&self, texture: TextureRef) -> AssetResult<&str> {
        Ok(self.entry(texture.id)?.name.as_str())
    }

    /// CPU侧RGBA8像素数据（运行时注册的纹理返回`None`）
    pub fn rgba_pixels(&self, texture: TextureRef) -> AssetResult<Option<&[u8]>> {
        Ok(self.entry(texture.id)?.pixels.as_deref())
    }

    /// 当前引用计数（主要用于测试与诊断）
    pub fn user_count(&self, texture: TextureRef) -> AssetResult<u32> {
        Ok(self.entry(texture.id)?.users)
    }

    fn insert_entry(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        pixels: Option<Vec<u8>>,
    ) -> TextureRef {
        let entry = TextureEntry {
            name: name.to_string(),
            width,
            height,
            pixels,
            users: 1,
        };
        let id = if let Some(id) = self.free.pop() {
            self.entries[id as usize] = Some(entry);
            id
        } else {
            self.entries.push(Some(entry));
            (self.entries.len() - 1) as u32
        };
        self.by_name.insert(name.to_string(), id);
        TextureRef { id }
    }

    fn entry(&self, id: u32) -> AssetResult<&TextureEntry> {
        self.entries
            .get(id as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(AssetError::StaleTexture)
    }

    fn entry_mut(&mut self, id: u32) -> AssetResult<&mut TextureEntry> {
        self.entries
            .get_mut(id as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(AssetError::StaleTexture)
    }
}
