//! 粒子实体
//!
//! 一个粒子就是一张世界空间内的billboard贴片。游戏逻辑在帧间任意改写
//! 其位置/颜色/UV等字段；相机相关的派生量每帧由渲染器通过
//! [`Particle::pre_process`]重算，不跨帧保留。

use crate::render::particles::registry::ParticleTypeId;
use glam::{Vec2, Vec3};

/// 一个粒子实例
///
/// 只能通过[`ParticleRegistry::emit`](crate::render::particles::ParticleRegistry::emit)
/// 创建、通过`release`销毁；调用方持有句柄而非引用，
/// 句柄在粒子释放后自动失效。
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// 所属粒子类型（非拥有回引，仅作标识）
    pub type_id: ParticleTypeId,

    /// 世界空间位置
    pub position: Vec3,
    /// billboard尺寸（宽, 高）
    pub dimensions: Vec2,
    /// 绕视线轴的旋转角（弧度）
    pub angle: f32,

    /// 漫反射色调（实际更接近环境色而非真正的漫反射光照）
    pub diffuse: Vec3,
    /// 自发光色调
    pub emissive: Vec3,
    /// 不透明度，0~1；渲染器剔除 alpha <= 0 的粒子
    pub alpha: f32,

    /// 共享纹理图集上子矩形的UV坐标
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,

    // 渲染期派生量，由pre_process每帧重算
    from_cam_norm: Vec3,
    from_cam_dist: f32,
}

impl Particle {
    /// 创建绑定到指定类型的粒子，UV默认覆盖整张纹理
    pub(crate) fn new(type_id: ParticleTypeId) -> Self {
        Self {
            type_id,
            position: Vec3::ZERO,
            dimensions: Vec2::ONE,
            angle: 0.0,
            diffuse: Vec3::ONE,
            emissive: Vec3::ZERO,
            alpha: 1.0,
            u1: 0.0,
            v1: 0.0,
            u2: 1.0,
            v2: 1.0,
            from_cam_norm: Vec3::ZERO,
            from_cam_dist: 0.0,
        }
    }

    /// 重算相机相关派生量
    ///
    /// 必须在同一帧内任何基于距离的剔除/排序之前调用，
    /// 上一帧的残留值绝不能流入本帧的排序判断。
    pub fn pre_process(&mut self, cam_pos: Vec3) {
        let from_cam = self.position - cam_pos;
        self.from_cam_dist = from_cam.length();
        self.from_cam_norm = from_cam.normalize_or_zero();
    }

    /// 相机指向粒子的单位方向（上一次`pre_process`的结果）
    #[inline]
    pub fn from_cam_norm(&self) -> Vec3 {
        self.from_cam_norm
    }

    /// 相机到粒子的距离（上一次`pre_process`的结果）
    #[inline]
    pub fn from_cam_dist(&self) -> f32 {
        self.from_cam_dist
    }

    /// 重置UV为整张纹理 (0,0)-(1,1)
    pub fn set_default_uv(&mut self) {
        self.u1 = 0.0;
        self.v1 = 0.0;
        self.u2 = 1.0;
        self.v2 = 1.0;
    }

    /// UV子矩形 (u1, v1, u2, v2)
    #[inline]
    pub fn uv(&self) -> (f32, f32, f32, f32) {
        (self.u1, self.v1, self.u2, self.v2)
    }

    /// 轴对齐包围盒包含测试
    ///
    /// 盒子由 position ± dimensions/2 导出（宽作用于x/z，高作用于y），
    /// 用于简单空间查询（如光标拾取），不在渲染路径上。
    pub fn inside(&self, point: Vec3) -> bool {
        let half = Vec3::new(
            self.dimensions.x * 0.5,
            self.dimensions.y * 0.5,
            self.dimensions.x * 0.5,
        );
        let delta = (point - self.position).abs();
        delta.x <= half.x && delta.y <= half.y && delta.z <= half.z
    }
}
