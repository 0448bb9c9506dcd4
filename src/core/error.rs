//! 统一错误处理模块
//!
//! 提供图形子系统范围内的统一错误类型定义
//!
//! ## 错误分类
//!
//! - **用法错误** (`ParticleError`): 调用方违反契约（发射未定义的类型、重复释放粒子）
//! - **资源错误** (`AssetError`): 纹理加载/查找失败，调用点可恢复
//! - **渲染错误** (`RenderError`): 逐帧提交失败，丢弃当前帧后下一帧正常继续
//!
//! `GfxError` 是顶层错误类型，可以承载所有子系统错误。

use thiserror::Error;

/// 图形子系统顶层错误类型
#[derive(Error, Debug)]
pub enum GfxError {
    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Context error: {0}")]
    Context(String),
}

/// 粒子系统用法错误
///
/// 这些错误属于调用方契约违规，池不变量不受影响。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    /// 发射前未定义粒子类型
    #[error("Particle type '{0}' is not defined, call define before emit")]
    UndefinedType(String),

    /// 粒子类型是一次性定义的，不支持重定义
    #[error("Particle type '{0}' is already defined")]
    AlreadyDefined(String),

    /// 句柄指向的粒子已被释放（重复释放或使用过期句柄）
    #[error("Stale particle handle: the particle was already released")]
    StaleHandle,
}

/// 资源系统错误
#[derive(Error, Debug, Clone)]
pub enum AssetError {
    #[error("Texture '{name}' failed to load: {reason}")]
    TextureLoad { name: String, reason: String },

    #[error("Texture '{0}' is not present in the cache")]
    TextureNotFound(String),

    /// 纹理引用已失效（引用计数归零后被逐出）
    #[error("Texture reference is no longer valid (evicted from cache)")]
    StaleTexture,
}

/// 渲染系统错误
///
/// 逐帧提交路径上的瞬态错误；渲染器记录日志并丢弃该帧剩余批次。
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("Batch sink rejected submission: {0}")]
    SinkSubmit(String),

    #[error("Batch exceeds sink capacity: {quads} quads, capacity {capacity}")]
    BatchOverflow { quads: usize, capacity: usize },

    #[error("Render device lost")]
    DeviceLost,
}

/// 图形子系统Result类型别名
pub type GfxResult<T> = Result<T, GfxError>;

/// 粒子操作Result类型别名
pub type ParticleResult<T> = Result<T, ParticleError>;

/// 资源操作Result类型别名
pub type AssetResult<T> = Result<T, AssetError>;

/// 渲染操作Result类型别名
pub type RenderResult<T> = Result<T, RenderError>;
