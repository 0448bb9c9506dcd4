//! 粒子批次与提交接口
//!
//! 渲染器把剔除排序后的粒子打包成共享纹理的顶点批次，
//! 通过[`BatchSink`]提交给外部渲染管线。提交失败只影响当前帧，
//! 池状态与下一帧不受影响。

use crate::core::error::{RenderError, RenderResult};
use crate::resources::texture::TextureRef;
use std::ops::Range;

/// 每个四边形的顶点数（两个三角形，不使用索引缓冲）
pub const VERTICES_PER_QUAD: usize = 6;

/// 粒子顶点数据（对应渲染管线的顶点布局）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleVertex {
    /// 世界空间位置
    pub position: [f32; 3],
    /// 纹理坐标
    pub uv: [f32; 2],
    /// 漫反射色调（已调制全局粒子环境色）
    pub diffuse: [f32; 3],
    /// 自发光色调
    pub emissive: [f32; 3],
    /// 不透明度
    pub alpha: f32,
}

/// 一个待提交的粒子批次
///
/// 同一批次内的所有四边形共享一张纹理；批次按既定的
/// 由远及近顺序提交，接收方不得重排。
#[derive(Debug)]
pub struct ParticleBatch<'a> {
    /// 批次共享的纹理
    pub texture: TextureRef,
    /// 顶点数据，每6个顶点构成一个四边形
    pub vertices: &'a [ParticleVertex],
}

impl ParticleBatch<'_> {
    /// 批次内四边形数量
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }
}

/// 批次接收方
///
/// 外部渲染管线的抽象。设备丢失等瞬态失败通过`Err`报告，
/// 渲染器据此丢弃当前帧剩余批次（丢帧可接受，崩溃不可接受）。
pub trait BatchSink {
    /// 提交一个批次
    fn submit(&mut self, batch: &ParticleBatch<'_>) -> RenderResult<()>;
}

/// 一次记录在案的绘制（纹理 + 顶点区间）
#[derive(Debug, Clone)]
pub struct BatchDraw {
    /// 绘制使用的纹理
    pub texture: TextureRef,
    /// 共享顶点缓冲区内的顶点区间
    pub vertex_range: Range<u32>,
}

/// 基于wgpu顶点缓冲区的批次接收方
///
/// 把所有批次顺序写入一个预分配的顶点缓冲区，并记录每个批次的
/// 绘制区间；调用方在录制render pass时按`draws()`顺序发出draw call。
/// 缓冲区容量固定，超出即报错（由渲染器丢弃该帧剩余批次）。
pub struct WgpuBatchSink<'a> {
    queue: &'a wgpu::Queue,
    vertex_buffer: wgpu::Buffer,
    capacity_quads: usize,
    cursor_quads: usize,
    draws: Vec<BatchDraw>,
}

impl<'a> WgpuBatchSink<'a> {
    /// 创建接收方并预分配顶点缓冲区
    pub fn new(device: &wgpu::Device, queue: &'a wgpu::Queue, capacity_quads: usize) -> Self {
        let size =
            (capacity_quads * VERTICES_PER_QUAD * std::mem::size_of::<ParticleVertex>()) as u64;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Batch Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            queue,
            vertex_buffer,
            capacity_quads,
            cursor_quads: 0,
            draws: Vec::new(),
        }
    }

    /// 开始新的一帧，丢弃上一帧的绘制记录
    pub fn begin_frame(&mut self) {
        self.cursor_quads = 0;
        self.draws.clear();
    }

    /// 本帧记录的绘制列表（提交顺序即绘制顺序）
    pub fn draws(&self) -> &[BatchDraw] {
        &self.draws
    }

    /// 共享顶点缓冲区
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }
}

impl BatchSink for WgpuBatchSink<'_> {
    fn submit(&mut self, batch: &ParticleBatch<'_>) -> RenderResult<()> {
        let quads = batch.quad_count();
        if self.cursor_quads + quads > self.capacity_quads {
            return Err(RenderError::BatchOverflow {
                quads,
                capacity: self.capacity_quads - self.cursor_quads,
            });
        }

        let vertex_offset = self.cursor_quads * VERTICES_PER_QUAD;
        let byte_offset = (vertex_offset * std::mem::size_of::<ParticleVertex>()) as u64;
        self.queue.write_buffer(
            &self.vertex_buffer,
            byte_offset,
            bytemuck::cast_slice(batch.vertices),
        );

        self.draws.push(BatchDraw {
            texture: batch.texture,
            vertex_range: vertex_offset as u32..(vertex_offset + batch.vertices.len()) as u32,
        });
        self.cursor_quads += quads;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[test]
    fn test_vertex_layout() {
        // 顶点必须无填充且16字节对齐，与管线顶点布局一致
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 48);
        assert_eq!(std::mem::size_of::<ParticleVertex>() % 16, 0);
    }

    #[test]
    fn test_quad_count() {
        let mut cache = crate::resources::TextureCache::new();
        let texture = cache.register("t", 1, 1).unwrap();
        let vertices = vec![ParticleVertex::zeroed(); VERTICES_PER_QUAD * 3];
        let batch = ParticleBatch {
            texture,
            vertices: &vertices,
        };
        assert_eq!(batch.quad_count(), 3);
    }
}
