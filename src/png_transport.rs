//! Embedding and extracting arbitrary payloads in a PNG's `tEXt` chunks
//! (spec.md §4.10, SPEC_FULL.md §3.10). The payload itself is stored as raw
//! deflate output (no zlib/gzip framing, no base64) — chosen over
//! base64url so round-tripping through [`flate2`] needs no extra encoding
//! step; see DESIGN.md.

use crc32fast::Hasher;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use std::io::{Read, Write};

use crate::error::{Result, TransportError};

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const IEND: [u8; 4] = *b"IEND";
const TEXT: [u8; 4] = *b"tEXt";

/// A single PNG chunk: four-byte type tag plus raw data (CRC is recomputed
/// on write, never stored).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PngChunk {
    /// The four-byte chunk type, e.g. `IHDR`, `IDAT`, `tEXt`, `IEND`.
    pub chunk_type: [u8; 4],
    /// The chunk's payload bytes.
    pub data: Vec<u8>,
}

impl PngChunk {
    fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    fn crc(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&self.chunk_type);
        hasher.update(&self.data);
        hasher.finalize()
    }
}

fn parse_chunks(bytes: &[u8]) -> Result<Vec<PngChunk>> {
    if bytes.len() < SIGNATURE.len() || bytes[..SIGNATURE.len()] != SIGNATURE {
        return Err(TransportError::Signature.into());
    }
    let mut chunks = Vec::new();
    let mut pos = SIGNATURE.len();
    loop {
        if pos + 8 > bytes.len() {
            break;
        }
        let len = u32::from_be_bytes(bytes[pos..pos + 4].try_into().unwrap_or_default()) as usize;
        let chunk_type: [u8; 4] = bytes[pos + 4..pos + 8].try_into().unwrap_or_default();
        let data_start = pos + 8;
        let data_end = data_start + len;
        if data_end + 4 > bytes.len() {
            break;
        }
        let data = bytes[data_start..data_end].to_vec();
        let stored_crc = u32::from_be_bytes(bytes[data_end..data_end + 4].try_into().unwrap_or_default());

        let chunk = PngChunk { chunk_type, data };
        if chunk.crc() != stored_crc {
            return Err(TransportError::CorruptChunk { chunk_type: chunk.type_name() }.into());
        }
        let is_end = chunk.chunk_type == IEND;
        chunks.push(chunk);
        pos = data_end + 4;
        if is_end {
            break;
        }
    }
    Ok(chunks)
}

fn write_chunks(chunks: &[PngChunk]) -> Vec<u8> {
    let mut out = Vec::from(SIGNATURE);
    for chunk in chunks {
        out.extend_from_slice(&(chunk.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&chunk.chunk_type);
        out.extend_from_slice(&chunk.data);
        out.extend_from_slice(&chunk.crc().to_be_bytes());
    }
    out
}

fn deflate(payload: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    // Writing to an in-memory Vec via DeflateEncoder cannot fail.
    let _ = encoder.write_all(payload);
    encoder.finish().unwrap_or_default()
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| TransportError::InflateError(e.to_string()))?;
    Ok(out)
}

/// Embed `payload` into a new `tEXt` chunk keyed by `keyword`, inserted
/// immediately before `IEND`. `payload` is stored as raw deflate output.
pub fn embed(png_bytes: &[u8], keyword: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let mut chunks = parse_chunks(png_bytes)?;
    let mut data = Vec::with_capacity(keyword.len() + 1 + payload.len());
    data.extend_from_slice(keyword.as_bytes());
    data.push(0);
    data.extend_from_slice(&deflate(payload));

    let new_chunk = PngChunk { chunk_type: TEXT, data };
    let insert_at = chunks.iter().position(|c| c.chunk_type == IEND).unwrap_or(chunks.len());
    chunks.insert(insert_at, new_chunk);
    Ok(write_chunks(&chunks))
}

/// Find the first `tEXt` chunk keyed by `keyword` and inflate its payload.
pub fn extract(png_bytes: &[u8], keyword: &str) -> Result<Option<Vec<u8>>> {
    let chunks = parse_chunks(png_bytes)?;
    for chunk in chunks.iter().filter(|c| c.chunk_type == TEXT) {
        let Some(nul) = chunk.data.iter().position(|&b| b == 0) else { continue };
        if &chunk.data[..nul] != keyword.as_bytes() {
            continue;
        }
        let text = &chunk.data[nul + 1..];
        return Ok(Some(inflate(text)?));
    }
    Ok(None)
}
