//! 资源管理模块
//!
//! 提供粒子系统消费的纹理缓存协作者：
//! - `texture` - 显式引用计数的纹理缓存

pub mod texture;

pub use texture::{TextureCache, TextureRef};
