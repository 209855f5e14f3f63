//! Media type detection from file content signatures.
//!
//! The extension is never consulted.

use std::io::Read;
use std::path::Path;

use crate::error::FileError;
use crate::types::MediaType;

/// Bytes read from the head of a file. MPEG-TS needs the second sync byte at 188.
const HEADER_LEN: usize = 512;

/// ISO-BMFF brands for still images.
const IMAGE_BRANDS: [&[u8; 4]; 6] = [b"heic", b"heix", b"heim", b"heis", b"mif1", b"avif"];

/// ISO-BMFF brands for audio-only files.
const AUDIO_BRANDS: [&[u8; 4]; 5] = [b"M4A ", b"M4B ", b"M4P ", b"F4A ", b"F4B "];

/// Read the head of a file and detect its media type.
pub fn sniff_file(path: &Path) -> Result<MediaType, FileError> {
    let file = std::fs::File::open(path).map_err(|e| FileError::Read {
        path: path.to_path_buf(),
        message: format!("Cannot open file: {}", e),
    })?;

    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| FileError::Read {
            path: path.to_path_buf(),
            message: format!("Cannot read header: {}", e),
        })?;

    Ok(sniff(&header))
}

/// Detect the media type of a header buffer.
pub fn sniff(header: &[u8]) -> MediaType {
    if header.len() < 4 {
        return MediaType::Unrecognized;
    }
    if is_image(header) {
        return MediaType::Image;
    }
    if is_video(header) {
        return MediaType::Video;
    }
    MediaType::Unrecognized
}

fn is_image(h: &[u8]) -> bool {
    // JPEG: FF D8 FF
    if h.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return true;
    }

    // PNG
    if h.starts_with(&[0x89, b'P', b'N', b'G']) {
        return true;
    }

    // GIF87a / GIF89a
    if h.starts_with(b"GIF8") {
        return true;
    }

    // WebP: RIFF....WEBP
    if h.starts_with(b"RIFF") && h.get(8..12) == Some(&b"WEBP"[..]) {
        return true;
    }

    // BMP
    if h.starts_with(b"BM") && h.len() >= 14 {
        return true;
    }

    // TIFF, little- and big-endian, version 42
    if h.starts_with(&[b'I', b'I', 0x2A, 0x00]) || h.starts_with(&[b'M', b'M', 0x00, 0x2A]) {
        return true;
    }

    // ICO
    if h.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return true;
    }

    // HEIF/HEIC/AVIF
    matches!(ftyp_brand(h), Some(brand) if IMAGE_BRANDS.iter().any(|b| *b == brand))
}

fn is_video(h: &[u8]) -> bool {
    // MP4, MOV, 3GP and other ISO-BMFF containers that are not stills or audio
    if let Some(brand) = ftyp_brand(h) {
        return !IMAGE_BRANDS.iter().any(|b| *b == brand)
            && !AUDIO_BRANDS.iter().any(|b| *b == brand);
    }

    // Matroska / WebM
    if h.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return true;
    }

    // AVI: RIFF....AVI
    if h.starts_with(b"RIFF") && h.get(8..11) == Some(&b"AVI"[..]) {
        return true;
    }

    // FLV
    if h.starts_with(b"FLV") {
        return true;
    }

    // MPEG-PS pack header
    if h.starts_with(&[0x00, 0x00, 0x01, 0xBA]) {
        return true;
    }

    // MPEG-TS: sync byte at the start of two consecutive packets
    if h[0] == 0x47 && h.get(188) == Some(&0x47) {
        return true;
    }

    // ASF / WMV
    h.starts_with(&[0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11])
}

/// Major brand of an ISO-BMFF `ftyp` box at offset 4.
fn ftyp_brand(h: &[u8]) -> Option<&[u8; 4]> {
    if h.get(4..8) != Some(&b"ftyp"[..]) {
        return None;
    }
    h.get(8..12).and_then(|brand| brand.try_into().ok())
}
