//! 核心模块
//!
//! 包含图形子系统的基础设施：
//! - `error` - 错误类型定义
//! - `pool` - 稳定索引池（高频实体的固定身份存储）

pub mod error;
pub mod pool;

// 重新导出错误类型
pub use error::{
    AssetError, AssetResult, GfxError, GfxResult, ParticleError, ParticleResult, RenderError,
    RenderResult,
};

// 重新导出池类型
pub use pool::{Pool, PoolHandle};
