//! 粒子系统性能基准测试
//!
//! 测试池插入/释放、逐帧剔除排序、批次生成等操作的性能

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use particle_gfx::{
    BatchSink, ParticleBatch, ParticleRegistry, ParticleRenderer, Pool, RenderOptions,
    RenderResult, TextureCache,
};

/// 丢弃所有批次的接收方，测量纯CPU端开销
struct NullSink {
    submitted_quads: usize,
}

impl BatchSink for NullSink {
    fn submit(&mut self, batch: &ParticleBatch<'_>) -> RenderResult<()> {
        self.submitted_quads += batch.quad_count();
        Ok(())
    }
}

fn bench_pool_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_churn");

    for count in [100usize, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let mut pool: Pool<u64> = Pool::with_capacity(count);
                let mut handles = Vec::with_capacity(count);
                for i in 0..count {
                    handles.push(pool.insert(i as u64));
                }
                // 释放一半后再填满，覆盖空闲链表复用路径
                for h in handles.iter().step_by(2) {
                    pool.remove(*h);
                }
                for i in 0..count / 2 {
                    pool.insert(i as u64);
                }
                black_box(pool.len())
            });
        });
    }

    group.finish();
}

fn bench_pool_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_iteration");

    for count in [1000usize, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut pool: Pool<u64> = Pool::with_capacity(count);
            let handles: Vec<_> = (0..count).map(|i| pool.insert(i as u64)).collect();
            // 打出空洞，模拟长时间运行后的池形态
            for h in handles.iter().step_by(3) {
                pool.remove(*h);
            }

            b.iter(|| {
                let mut sum = 0u64;
                for v in pool.iter() {
                    sum = sum.wrapping_add(*v);
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

/// 搭建含4种粒子类型、均匀散布在相机前方的场景
fn setup_scene(particle_count: usize) -> (ParticleRegistry, TextureCache) {
    let mut cache = TextureCache::new();
    let mut registry = ParticleRegistry::new();
    for name in ["smoke", "flame", "spark", "dust"] {
        let texture = cache
            .register(&format!("{name}.png"), 64, 64)
            .expect("texture registration");
        registry.define(name, texture).expect("type definition");
    }

    for i in 0..particle_count {
        let name = ["smoke", "flame", "spark", "dust"][i % 4];
        let handle = registry.emit(name).expect("emit");
        let p = registry.particle_mut(handle).expect("live particle");
        p.position = Vec3::new(
            (i % 32) as f32 - 16.0,
            ((i / 32) % 32) as f32 - 16.0,
            (i % 97) as f32 + 1.0,
        );
        p.angle = i as f32 * 0.1;
    }
    (registry, cache)
}

fn bench_frame_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_render");
    let options = RenderOptions::default();

    for count in [256usize, 1024, 8192].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let (mut registry, _cache) = setup_scene(count);
            let mut renderer = ParticleRenderer::new();
            let mut sink = NullSink { submitted_quads: 0 };

            b.iter(|| {
                let stats = renderer.render(
                    &mut registry,
                    Vec3::ONE,
                    black_box(&options),
                    Vec3::new(0.0, 0.0, -5.0),
                    &mut sink,
                );
                black_box(stats.submitted)
            });
        });
    }

    group.finish();
}

fn bench_distance_cull(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_cull");

    // 半数粒子超出渲染距离，衡量剔除路径的收益
    let mut options = RenderOptions::default();
    options.max_particle_distance = 48.0;

    let (mut registry, _cache) = setup_scene(8192);
    let mut renderer = ParticleRenderer::new();
    let mut sink = NullSink { submitted_quads: 0 };

    group.bench_function("8192_half_culled", |b| {
        b.iter(|| {
            let stats = renderer.render(
                &mut registry,
                Vec3::ONE,
                black_box(&options),
                Vec3::ZERO,
                &mut sink,
            );
            black_box((stats.submitted, stats.culled))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pool_churn,
    bench_pool_iteration,
    bench_frame_render,
    bench_distance_cull
);
criterion_main!(benches);
