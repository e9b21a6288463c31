//! Criterion benchmarks for the tree engine: insertion, lookup, iteration,
//! and JSON encoding over a mid-sized document.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lite3::Lite3Ctx;

const KEYS: usize = 256;

fn populated_ctx() -> Lite3Ctx {
    let mut ctx = Lite3Ctx::with_size(256 * 1024).unwrap();
    ctx.init_obj().unwrap();
    for i in 0..KEYS {
        ctx.set_i64(0, &format!("bench_key_{i:04}"), i as i64).unwrap();
    }
    ctx
}

fn bench_set(c: &mut Criterion) {
    c.bench_function("set_i64_256_keys", |b| {
        let mut ctx = Lite3Ctx::with_size(256 * 1024).unwrap();
        b.iter(|| {
            ctx.init_obj().unwrap();
            for i in 0..KEYS {
                ctx.set_i64(0, &format!("bench_key_{i:04}"), i as i64).unwrap();
            }
            black_box(ctx.len())
        })
    });
}

fn bench_get(c: &mut Criterion) {
    let ctx = populated_ctx();
    c.bench_function("get_i64_hit", |b| {
        b.iter(|| black_box(ctx.get_i64(0, "bench_key_0128").unwrap()))
    });
    c.bench_function("get_i64_miss", |b| {
        b.iter(|| black_box(ctx.get_i64(0, "bench_key_9999").is_err()))
    });
}

fn bench_iter(c: &mut Criterion) {
    let ctx = populated_ctx();
    c.bench_function("iterate_256_entries", |b| {
        b.iter(|| {
            let mut it = ctx.iter_create(0).unwrap();
            let mut n = 0usize;
            while ctx.iter_next(&mut it).unwrap().is_some() {
                n += 1;
            }
            black_box(n)
        })
    });
}

#[cfg(feature = "json-codec")]
fn bench_json(c: &mut Criterion) {
    let ctx = populated_ctx();
    c.bench_function("json_enc_256_entries", |b| {
        b.iter(|| black_box(ctx.json_enc(0).unwrap().len()))
    });
}

#[cfg(not(feature = "json-codec"))]
fn bench_json(_c: &mut Criterion) {}

criterion_group!(benches, bench_set, bench_get, bench_iter, bench_json);
criterion_main!(benches);
