//! Builds well-formed single-stream .xz files for the integration tests.
//!
//! Block data is LZMA2 made of uncompressed chunks, so any conforming
//! decoder can read it back.  CRC32 fields are real; checks other than
//! None/CRC32 are written as zero bytes of the right length.

#![allow(dead_code)]

use crc32fast::Hasher;

pub const LZMA2_FILTER: u64 = 0x21;
/// LZMA2 dictionary-size property byte (8 MiB).
pub const LZMA2_DICT_PROP: u8 = 0x16;

pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut h = Hasher::new();
    h.update(bytes);
    h.finalize()
}

/// LZMA2 stream of uncompressed chunks (at most 64 KiB each) plus end marker.
pub fn lzma2_stored(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, chunk) in data.chunks(0x10000).enumerate() {
        // 0x01: uncompressed, dictionary reset; 0x02: uncompressed, no reset.
        out.push(if i == 0 { 0x01 } else { 0x02 });
        let n = (chunk.len() - 1) as u16;
        out.extend_from_slice(&n.to_be_bytes());
        out.extend_from_slice(chunk);
    }
    out.push(0x00);
    out
}

#[derive(Debug, Clone)]
pub struct BlockSpec {
    pub data:                  Vec<u8>,
    pub declare_compressed:    bool,
    pub declare_uncompressed:  bool,
    /// Filters placed before LZMA2 as (id, properties).
    pub extra_filters:         Vec<(u64, Vec<u8>)>,
    /// Extra 4-byte words of header padding.
    pub extra_padding_words:   usize,
    /// Uncompressed size to declare (header and index) instead of the real one.
    pub uncompressed_override: Option<u64>,
}

impl BlockSpec {
    pub fn new(data: &[u8]) -> Self {
        Self {
            data:                  data.to_vec(),
            declare_compressed:    true,
            declare_uncompressed:  true,
            extra_filters:         Vec::new(),
            extra_padding_words:   0,
            uncompressed_override: None,
        }
    }
}

/// Where each part of a built block landed.
#[derive(Debug, Clone)]
pub struct BlockLayout {
    pub start:           usize,
    pub header_size:     usize,
    pub data_start:      usize,
    pub compressed_size: usize,
    pub padding_start:   usize,
    pub padding_len:     usize,
    pub check_start:     usize,
}

#[derive(Debug, Clone)]
pub struct Built {
    pub bytes:        Vec<u8>,
    pub blocks:       Vec<BlockLayout>,
    pub index_start:  usize,
    pub footer_start: usize,
    pub compressed:   u64,
    pub uncompressed: u64,
}

pub struct XzBuilder {
    check_id:      u8,
    blocks:        Vec<BlockSpec>,
    index_records: Option<Vec<(u64, u64)>>,
}

impl XzBuilder {
    pub fn new(check_id: u8) -> Self {
        Self { check_id, blocks: Vec::new(), index_records: None }
    }

    pub fn block(mut self, spec: BlockSpec) -> Self {
        self.blocks.push(spec);
        self
    }

    pub fn data(self, data: &[u8]) -> Self {
        self.block(BlockSpec::new(data))
    }

    /// Write these (unpadded, uncompressed) records instead of the real ones.
    pub fn index_records(mut self, records: Vec<(u64, u64)>) -> Self {
        self.index_records = Some(records);
        self
    }

    fn check_size(&self) -> usize {
        [0, 4, 4, 4, 8, 8, 8, 16, 16, 16, 32, 32, 32, 64, 64, 64][self.check_id as usize]
    }

    fn check_bytes(&self, data: &[u8]) -> Vec<u8> {
        match self.check_id {
            0 => Vec::new(),
            1 => crc32(data).to_le_bytes().to_vec(),
            _ => vec![0u8; self.check_size()],
        }
    }

    pub fn build(self) -> Built {
        let flags = [0x00, self.check_id];
        let mut out = Vec::new();
        out.extend_from_slice(&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00]);
        out.extend_from_slice(&flags);
        out.extend_from_slice(&crc32(&flags).to_le_bytes());

        let mut layouts = Vec::new();
        let mut records = Vec::new();
        let mut compressed_total = 0u64;
        let mut uncompressed_total = 0u64;

        for spec in &self.blocks {
            let compressed = lzma2_stored(&spec.data);

            let mut filters = spec.extra_filters.clone();
            filters.push((LZMA2_FILTER, vec![LZMA2_DICT_PROP]));

            let declared_uncompressed =
                spec.uncompressed_override.unwrap_or(spec.data.len() as u64);

            let mut header = vec![0u8];
            let mut block_flags = (filters.len() - 1) as u8;
            if spec.declare_compressed {
                block_flags |= 0x40;
            }
            if spec.declare_uncompressed {
                block_flags |= 0x80;
            }
            header.push(block_flags);
            if spec.declare_compressed {
                header.extend(encode_varint(compressed.len() as u64));
            }
            if spec.declare_uncompressed {
                header.extend(encode_varint(declared_uncompressed));
            }
            for (id, props) in &filters {
                header.extend(encode_varint(*id));
                header.extend(encode_varint(props.len() as u64));
                header.extend_from_slice(props);
            }
            let header_size = (header.len() + 4 + 3) / 4 * 4 + 4 * spec.extra_padding_words;
            header.resize(header_size - 4, 0);
            header[0] = (header_size / 4 - 1) as u8;
            let header_crc = crc32(&header);
            header.extend_from_slice(&header_crc.to_le_bytes());

            let start = out.len();
            out.extend_from_slice(&header);
            let data_start = out.len();
            out.extend_from_slice(&compressed);
            let padding_start = out.len();
            let padding_len = (4 - compressed.len() % 4) % 4;
            out.resize(out.len() + padding_len, 0);
            let check_start = out.len();
            let check = self.check_bytes(&spec.data);
            out.extend_from_slice(&check);

            records.push((
                (header_size + compressed.len() + check.len()) as u64,
                declared_uncompressed,
            ));
            layouts.push(BlockLayout {
                start,
                header_size,
                data_start,
                compressed_size: compressed.len(),
                padding_start,
                padding_len,
                check_start,
            });
            compressed_total += compressed.len() as u64;
            uncompressed_total = uncompressed_total.saturating_add(declared_uncompressed);
        }

        let records = self.index_records.clone().unwrap_or(records);
        let index_start = out.len();
        let mut index = vec![0x00];
        index.extend(encode_varint(records.len() as u64));
        for (unpadded, uncompressed) in &records {
            index.extend(encode_varint(*unpadded));
            index.extend(encode_varint(*uncompressed));
        }
        index.resize((index.len() + 3) / 4 * 4, 0);
        let index_crc = crc32(&index);
        index.extend_from_slice(&index_crc.to_le_bytes());
        let backward_size = (index.len() / 4 - 1) as u32;
        out.extend_from_slice(&index);

        let footer_start = out.len();
        let mut footer_body = backward_size.to_le_bytes().to_vec();
        footer_body.extend_from_slice(&flags);
        out.extend_from_slice(&crc32(&footer_body).to_le_bytes());
        out.extend_from_slice(&footer_body);
        out.extend_from_slice(b"YZ");

        Built {
            bytes: out,
            blocks: layouts,
            index_start,
            footer_start,
            compressed: compressed_total,
            uncompressed: uncompressed_total,
        }
    }
}

/// Deterministic, mildly varied test payload.
pub fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}
