//! Buffer pool benchmarks.

use blockbuf::{
    BlockId, BlockStore, BufferPoolConfig, BufferPoolManager, FileManager, Lsn, Page,
    ReplacementPolicy, TxnId,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::{tempdir, TempDir};

const FILE: &str = "bench.tbl";

fn create_bpm(
    pool_size: usize,
    blocks: u32,
    policy: ReplacementPolicy,
) -> (BufferPoolManager<FileManager>, TempDir) {
    let dir = tempdir().unwrap();
    let fm = FileManager::open(dir.path()).unwrap();
    for _ in 0..blocks {
        fm.append_block(FILE, &Page::new()).unwrap();
    }
    let config = BufferPoolConfig::default()
        .with_pool_size(pool_size)
        .with_policy(policy);
    (BufferPoolManager::with_config(config, fm), dir)
}

fn pin_hit_benchmark(c: &mut Criterion) {
    let (bpm, _dir) = create_bpm(8, 8, ReplacementPolicy::ModifiedFirst);
    for i in 0..8 {
        let handle = bpm.pin(&BlockId::new(FILE, i)).unwrap();
        bpm.unpin(handle).unwrap();
    }

    c.bench_function("pin_unpin_resident_8", |b| {
        b.iter(|| {
            for i in 0..8 {
                let handle = bpm.pin(&BlockId::new(FILE, i)).unwrap();
                black_box(handle.buffer_id());
                bpm.unpin(handle).unwrap();
            }
        })
    });
}

fn pin_miss_benchmark(c: &mut Criterion) {
    for (name, policy) in [
        ("pin_unpin_cycle_modified_first", ReplacementPolicy::ModifiedFirst),
        ("pin_unpin_cycle_fifo", ReplacementPolicy::Fifo),
    ] {
        let (bpm, _dir) = create_bpm(4, 16, policy);

        c.bench_function(name, |b| {
            b.iter(|| {
                for i in 0..16 {
                    let handle = bpm.pin(&BlockId::new(FILE, i)).unwrap();
                    bpm.unpin(handle).unwrap();
                }
            })
        });
    }
}

fn dirty_eviction_benchmark(c: &mut Criterion) {
    let (bpm, _dir) = create_bpm(4, 16, ReplacementPolicy::ModifiedFirst);
    let txn = TxnId::new(1);
    let mut lsn = 0u64;

    c.bench_function("write_evict_cycle_16", |b| {
        b.iter(|| {
            for i in 0..16 {
                let handle = bpm.pin(&BlockId::new(FILE, i)).unwrap();
                {
                    let mut page = bpm.write_page(&handle).unwrap();
                    page.set_u32(0, i);
                    lsn += 1;
                    page.set_modified(txn, Lsn::new(lsn));
                }
                bpm.unpin(handle).unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    pin_hit_benchmark,
    pin_miss_benchmark,
    dirty_eviction_benchmark
);
criterion_main!(benches);
