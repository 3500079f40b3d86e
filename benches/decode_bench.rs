// In benches/decode_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;

use smlm_loader::manifest::FormatSpec;
use smlm_loader::table::{decode_table, SequentialUnpackDecoder, TableDecoder};

// --- Synthetic localization tables ---

/// `frame:uint32, x:float32, y:float32, intensity:float64, flag:uint8` (21-byte stride).
fn localization_spec() -> FormatSpec {
    serde_json::from_value(json!({
        "mode": "binary",
        "headers": ["frame", "x", "y", "intensity", "flag"],
        "dtype": ["uint32", "float32", "float32", "float64", "uint8"],
        "shape": [1, 1, 1, 1, 1]
    }))
    .unwrap()
}

fn generate_rows(rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(rows * 21);
    for i in 0..rows {
        out.extend_from_slice(&((i / 100) as u32).to_le_bytes());
        out.extend_from_slice(&((i as f32 * 0.37).sin() * 5000.0).to_le_bytes());
        out.extend_from_slice(&((i as f32 * 0.11).cos() * 5000.0).to_le_bytes());
        out.extend_from_slice(&(1000.0 + (i % 997) as f64).to_le_bytes());
        out.push((i % 2) as u8);
    }
    out
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 1_000_000;

fn decoders() -> Vec<Box<dyn TableDecoder>> {
    let mut decoders: Vec<Box<dyn TableDecoder>> = vec![Box::new(SequentialUnpackDecoder)];
    #[cfg(feature = "ndarray")]
    decoders.push(Box::new(smlm_loader::table::StridedViewDecoder));
    decoders
}

fn bench_table_decoders(c: &mut Criterion) {
    let spec = localization_spec();
    let bytes = generate_rows(BENCH_ROWS);

    let mut group = c.benchmark_group("Table Decoders Comparison");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.sample_size(20);

    for decoder in decoders() {
        group.bench_function(decoder.name(), |b| {
            b.iter(|| {
                black_box(decode_table(
                    decoder.as_ref(),
                    "bench",
                    black_box(&spec),
                    black_box(&bytes),
                    BENCH_ROWS,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_table_decoders);
criterion_main!(benches);
