//! PNG screenshots of the LCD pixmap.
//!
//! Pixels are expanded to 8-bit RGB whatever the pixmap depth, and the image
//! data is zlib-compressed with miniz_oxide.

use std::path::Path;

use crate::error::Result;
use crate::pixmap::Pixmap;

const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Encode the pixmap as an RGB PNG file.
pub fn encode_pixmap(pm: &Pixmap) -> Vec<u8> {
    let (width, height) = (pm.width as u32, pm.height as u32);
    let mut png = Vec::with_capacity(8 * 1024);
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(2); // color type: RGB
    ihdr.push(0); // compression
    ihdr.push(0); // filter
    ihdr.push(0); // interlace
    write_chunk(&mut png, b"IHDR", &ihdr);

    let mut raw = Vec::with_capacity((width as usize * 3 + 1) * height as usize);
    for y in 0..pm.height {
        raw.push(0); // filter: None
        for x in 0..pm.width {
            let (r, g, b) = pm.depth.to_rgb888(pm.pixel(x, y));
            raw.extend_from_slice(&[r, g, b]);
        }
    }
    let idat = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    png
}

/// Write a screenshot of `pm` to `path`.
pub fn save_screenshot(pm: &Pixmap, path: &Path) -> Result<()> {
    std::fs::write(path, encode_pixmap(pm))?;
    tracing::info!("screenshot saved to {}", path.display());
    Ok(())
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc32(chunk_type, data).to_be_bytes());
}

// CRC-32 over chunk type and data
fn crc32(chunk_type: &[u8], data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &b in chunk_type.iter().chain(data) {
        crc ^= b as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, Depth};

    /// Return (type, data) of every chunk.
    fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
        let mut out = Vec::new();
        let mut pos = 8;
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let ty: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
            let data = png[pos + 8..pos + 8 + len].to_vec();
            let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());
            assert_eq!(crc, crc32(&ty, &data));
            out.push((ty, data));
            pos += 12 + len;
        }
        out
    }

    #[test]
    fn test_crc32_known_value() {
        // CRC of an empty IEND chunk
        assert_eq!(crc32(b"IEND", &[]), 0xAE42_6082);
    }

    #[test]
    fn test_encode_pixmap() {
        let mut pm = Pixmap::new(240, 135, Depth::Rgb444);
        let orange = pm.color(Color::Orange);
        pm.set_pixel(1, 0, orange);
        let png = encode_pixmap(&pm);
        assert_eq!(&png[..8], &SIGNATURE);

        let chunks = chunks(&png);
        let names: Vec<&[u8; 4]> = chunks.iter().map(|(t, _)| t).collect();
        assert_eq!(names, [b"IHDR", b"IDAT", b"IEND"]);
        assert_eq!(&chunks[0].1[0..8], &[0, 0, 0, 240, 0, 0, 0, 135]);

        let raw = miniz_oxide::inflate::decompress_to_vec_zlib(&chunks[1].1).unwrap();
        assert_eq!(raw.len(), (240 * 3 + 1) * 135);
        assert_eq!(&raw[0..7], &[0, 0, 0, 0, 0xff, 0xaa, 0x00]);
    }
}
