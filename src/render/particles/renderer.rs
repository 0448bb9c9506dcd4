//! 粒子渲染器
//!
//! 每帧一次，对所有类型的所有存活粒子执行：
//!
//! 1. `pre_process` 重算相机相关派生量
//! 2. 剔除（alpha <= 0 或超出最大绘制距离）
//! 3. 全类型合并按距离降序排序（由远及近，满足alpha混合的合成顺序）
//! 4. 相邻同类型粒子合并成共享纹理的批次（绝不破坏既定顺序）
//! 5. 生成面向相机的billboard四边形，提交给批次接收方
//!
//! 排序之前必须完成全部`pre_process`——用上一帧的过期距离排序
//! 是正确性缺陷，不只是画质问题。

use crate::config::RenderOptions;
use crate::render::batch::{BatchSink, ParticleBatch, ParticleVertex};
use crate::render::particles::particle::Particle;
use crate::render::particles::registry::ParticleRegistry;
use glam::Vec3;

/// 单帧渲染统计
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// 本帧遍历到的存活粒子数
    pub live: usize,
    /// 被剔除（未提交）的粒子数
    pub culled: usize,
    /// 实际提交的粒子数
    pub submitted: usize,
    /// 提交的批次数
    pub batches: usize,
    /// 接收方报错导致本帧剩余批次被丢弃
    pub frame_dropped: bool,
}

/// 排序条目：粒子快照 + 排序键
///
/// 收集阶段拷贝粒子数据，排序与顶点生成不再回访池，
/// 帧内的释放操作因此不会影响已收集的条目。
struct SortItem {
    dist: f32,
    /// 次级键：类型定义序 + 池插入序，等距时保持稳定避免闪烁
    type_index: u32,
    seq: u64,
    particle: Particle,
}

/// 粒子渲染器
///
/// 帧间复用收集/顶点缓冲，稳态下渲染路径不分配。
#[derive(Default)]
pub struct ParticleRenderer {
    scratch: Vec<SortItem>,
    vertex_scratch: Vec<ParticleVertex>,
}

impl ParticleRenderer {
    /// 创建渲染器
    pub fn new() -> Self {
        Self::default()
    }

    /// 渲染一帧
    ///
    /// `ambient`为全局粒子环境色，逐顶点调制漫反射色调。
    /// 接收方报错时记录日志并丢弃该帧剩余批次；池状态不受影响，
    /// 下一帧正常继续。
    pub fn render(
        &mut self,
        registry: &mut ParticleRegistry,
        ambient: Vec3,
        options: &RenderOptions,
        cam_pos: Vec3,
        sink: &mut dyn BatchSink,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        if !options.particles_enabled {
            return stats;
        }

        // 阶段1：派生量重算，先于任何基于距离的判断
        for ptype in registry.types_mut() {
            for particle in ptype.pool_mut().iter_mut() {
                particle.pre_process(cam_pos);
            }
        }

        // 阶段2：剔除并收集快照
        self.scratch.clear();
        for (type_index, ptype) in registry.types().iter().enumerate() {
            for (_handle, seq, particle) in ptype.pool().iter_entries() {
                stats.live += 1;
                let dist = particle.from_cam_dist();
                if particle.alpha <= 0.0 || dist > options.max_particle_distance {
                    stats.culled += 1;
                    continue;
                }
                self.scratch.push(SortItem {
                    dist,
                    type_index: type_index as u32,
                    seq,
                    particle: *particle,
                });
            }
        }

        // 阶段3：距离降序（远→近），等距时按收集顺序稳定
        self.scratch.sort_by(|a, b| {
            b.dist
                .total_cmp(&a.dist)
                .then_with(|| a.type_index.cmp(&b.type_index))
                .then_with(|| a.seq.cmp(&b.seq))
        });

        // 阶段4：相邻同类型合并成批次并提交
        let mut batch_start = 0;
        while batch_start < self.scratch.len() {
            let type_index = self.scratch[batch_start].type_index;
            let Some(texture) = registry
                .types()
                .get(type_index as usize)
                .map(|t| t.texture())
            else {
                break;
            };

            self.vertex_scratch.clear();
            let mut end = batch_start;
            while end < self.scratch.len()
                && self.scratch[end].type_index == type_index
                && end - batch_start < options.max_batch_quads
            {
                build_billboard(&self.scratch[end].particle, ambient, &mut self.vertex_scratch);
                end += 1;
            }

            let batch = ParticleBatch {
                texture,
                vertices: &self.vertex_scratch,
            };
            match sink.submit(&batch) {
                Ok(()) => {
                    stats.batches += 1;
                    stats.submitted += end - batch_start;
                }
                Err(e) => {
                    tracing::warn!(
                        target: "particles",
                        "Batch sink failed, dropping remaining batches this frame: {}", e
                    );
                    stats.frame_dropped = true;
                    return stats;
                }
            }
            batch_start = end;
        }

        stats
    }
}

/// 由粒子快照生成面向相机的四边形（两个三角形，6顶点）
fn build_billboard(particle: &Particle, ambient: Vec3, out: &mut Vec<ParticleVertex>) {
    let to_cam = -particle.from_cam_norm();
    // 粒子与相机重合时没有方向可言，退化为面向+Z
    let normal = if to_cam.length_squared() < 1e-12 {
        Vec3::Z
    } else {
        to_cam
    };

    let mut right = Vec3::Y.cross(normal);
    if right.length_squared() < 1e-8 {
        // 视线几乎竖直，世界Y轴退化，换用X轴做参考
        right = Vec3::X.cross(normal);
    }
    let right = right.normalize_or_zero();
    let up = normal.cross(right);

    // 绕视线轴应用粒子自身的旋转角
    let (sin, cos) = particle.angle.sin_cos();
    let half_r = (right * cos + up * sin) * (particle.dimensions.x * 0.5);
    let half_u = (up * cos - right * sin) * (particle.dimensions.y * 0.5);

    let diffuse = (particle.diffuse * ambient).to_array();
    let emissive = particle.emissive.to_array();
    let alpha = particle.alpha;
    let vertex = |position: Vec3, u: f32, v: f32| ParticleVertex {
        position: position.to_array(),
        uv: [u, v],
        diffuse,
        emissive,
        alpha,
    };

    let center = particle.position;
    let top_left = vertex(center - half_r + half_u, particle.u1, particle.v1);
    let top_right = vertex(center + half_r + half_u, particle.u2, particle.v1);
    let bottom_left = vertex(center - half_r - half_u, particle.u1, particle.v2);
    let bottom_right = vertex(center + half_r - half_u, particle.u2, particle.v2);

    out.push(top_left);
    out.push(bottom_left);
    out.push(bottom_right);
    out.push(top_left);
    out.push(bottom_right);
    out.push(top_right);
}
