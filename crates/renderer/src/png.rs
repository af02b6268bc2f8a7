//! PNG encoding for rendered maps.
//!
//! Two encodings are produced:
//! - **Indexed (color type 3)** when the image has at most 256 distinct
//!   RGBA values. Filled maps without text usually qualify.
//! - **RGBA (color type 6)** otherwise, e.g. once anti-aliased text and
//!   arrows are drawn.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RendererError, RendererResult};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 64 * 64;

/// One RGBA palette entry.
pub type PaletteEntry = (u8, u8, u8, u8);

/// Encode RGBA pixels, choosing indexed output when the palette fits.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> RendererResult<Vec<u8>> {
    check_size(pixels, width, height)?;

    let palette = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

fn check_size(pixels: &[u8], width: usize, height: usize) -> RendererResult<()> {
    if width == 0 || height == 0 || pixels.len() != width * height * 4 {
        return Err(RendererError::Encode(format!(
            "{} bytes do not form a {}x{} RGBA image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

#[inline(always)]
fn unpack_color(packed: u32) -> PaletteEntry {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<PaletteEntry>, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px);
        let index = match lookup.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(unpack_color(packed));
                lookup.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel variant: collect distinct colors per chunk, merge, then map
/// pixels to indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<PaletteEntry>, Vec<u8>)> {
    let chunk_px = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let per_chunk: Vec<Option<HashSet<u32>>> = pixels
        .par_chunks(chunk_px * 4)
        .map(|chunk| {
            let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack_color(px));
                if seen.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(seen)
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for seen in per_chunk {
        for packed in seen? {
            if lookup.contains_key(&packed) {
                continue;
            }
            if palette.len() == MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[PaletteEntry],
    indices: &[u8],
) -> RendererResult<Vec<u8>> {
    if indices.len() != width * height || palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RendererError::Encode(format!(
            "indexed image {}x{} with {} indices and {} palette entries",
            width,
            height,
            indices.len(),
            palette.len()
        )));
    }

    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Create a truecolor PNG (color type 6) from RGBA pixels.
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> RendererResult<Vec<u8>> {
    check_size(pixels, width, height)?;

    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Prefix each row with filter type 0 and zlib-compress the result.
fn deflate_scanlines(data: &[u8], stride: usize, height: usize) -> RendererResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (stride + 1));
    for row in data.chunks_exact(stride).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Encode an image and write it to `path`, creating parent directories.
/// Returns the number of bytes written.
pub fn write_png(path: &Path, img: &RgbaImage) -> RendererResult<usize> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(RendererError::CanvasSize { width, height });
    }
    let png = create_png_auto(img.as_raw(), width as usize, height as usize)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &png)?;
    debug!(path = ?path, bytes = png.len(), width, height, "Wrote PNG");
    Ok(png.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];

        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_parallel_matches_sequential_palette_size() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let k = ((x / 8 + y / 8) % 40) as u8;
                pixels.extend_from_slice(&[k * 5, 100 + k, 200 - k, 255]);
            }
        }

        let (seq_palette, _) = extract_palette_sequential(&pixels).unwrap();
        let (par_palette, par_indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(seq_palette.len(), par_palette.len());
        assert_eq!(par_indices.len(), 128 * 128);
        // Every index must point back at the pixel's own color
        for (px, &idx) in pixels.chunks_exact(4).zip(&par_indices) {
            let (r, g, b, a) = par_palette[idx as usize];
            assert_eq!([r, g, b, a], [px[0], px[1], px[2], px[3]]);
        }
    }

    #[test]
    fn test_too_many_colors_falls_back() {
        let mut pixels = Vec::with_capacity(300 * 4);
        for i in 0..300u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
        }
        assert!(extract_palette_sequential(&pixels).is_none());

        let png = create_png_auto(&pixels, 300, 1).unwrap();
        assert_eq!(&png[0..8], &SIGNATURE);
        // Color type byte of IHDR
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        assert!(create_png(&[0, 0, 0], 1, 1).is_err());
        assert!(create_png_auto(&[], 0, 0).is_err());
    }
}
