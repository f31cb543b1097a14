use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::io::Cursor;

fn varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Stream of `blocks` blocks of `data_len` zero bytes each.  CRC fields are
/// left zero; the scanner does not verify them.
fn synthetic_stream(blocks: usize, data_len: usize) -> Vec<u8> {
    let mut out = vec![0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00, 0x00, 0x01, 0, 0, 0, 0];
    let mut index = vec![0x00];
    varint(blocks as u64, &mut index);

    for _ in 0..blocks {
        let mut header = vec![0u8, 0xC0];
        varint(data_len as u64, &mut header);
        varint(data_len as u64 * 4, &mut header);
        header.extend_from_slice(&[0x21, 0x01, 0x16]);
        let size = (header.len() + 4 + 3) / 4 * 4;
        header.resize(size, 0);
        header[0] = (size / 4 - 1) as u8;
        out.extend_from_slice(&header);
        out.resize(out.len() + data_len + (4 - data_len % 4) % 4 + 4, 0);
        varint((size + data_len + 4) as u64, &mut index);
        varint(data_len as u64 * 4, &mut index);
    }

    index.resize((index.len() + 3) / 4 * 4 + 4, 0);
    let backward = (index.len() / 4 - 1) as u32;
    out.extend_from_slice(&index);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&backward.to_le_bytes());
    out.extend_from_slice(&[0x00, 0x01, b'Y', b'Z']);
    out
}

fn bench_many_blocks(c: &mut Criterion) {
    let data = synthetic_stream(10_000, 13);
    c.bench_function("scan_10k_small_blocks", |b| {
        b.iter(|| xzscan::scan(black_box(&data[..])).unwrap())
    });
}

fn bench_large_payload(c: &mut Criterion) {
    let data = synthetic_stream(16, 1024 * 1024);
    c.bench_function("scan_16mb_streamed", |b| {
        b.iter(|| xzscan::scan(black_box(&data[..])).unwrap())
    });
    c.bench_function("scan_16mb_seekable", |b| {
        b.iter(|| xzscan::scan_seekable(Cursor::new(black_box(&data[..]))).unwrap())
    });
}

criterion_group!(benches, bench_many_blocks, bench_large_payload);
criterion_main!(benches);
