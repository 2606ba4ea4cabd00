//! Snapshot buffer encoding.
//!
//! A snapshot is `width` and `height` as little-endian `u32`, followed by
//! `width * height` pixels as little-endian `u32`, row-major. Sessions
//! treat the buffer as opaque bytes; clients and tests use [`decode`].

use mural_core::error::{MuralError, Result};

const HEADER_LEN: usize = 8;

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Snapshot {
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

pub fn encode(width: u32, height: u32, pixels: &[u32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + pixels.len() * 4);
    buf.extend_from_slice(&width.to_le_bytes());
    buf.extend_from_slice(&height.to_le_bytes());
    for px in pixels {
        buf.extend_from_slice(&px.to_le_bytes());
    }
    buf
}

pub fn decode(buf: &[u8]) -> Result<Snapshot> {
    if buf.len() < HEADER_LEN {
        return Err(MuralError::Snapshot(format!(
            "buffer too short: {} bytes",
            buf.len()
        )));
    }

    let width = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let height = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

    let expected = HEADER_LEN as u64 + width as u64 * height as u64 * 4;
    if buf.len() as u64 != expected {
        return Err(MuralError::Snapshot(format!(
            "expected {expected} bytes for {width}x{height}, got {}",
            buf.len()
        )));
    }

    let pixels = buf[HEADER_LEN..]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(Snapshot {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let pixels = vec![0, 1, 2, 3, 4, 5];
        let buf = encode(3, 2, &pixels);
        let snap = decode(&buf).unwrap();
        assert_eq!(snap.width, 3);
        assert_eq!(snap.height, 2);
        assert_eq!(snap.pixels, pixels);
    }

    #[test]
    fn test_pixel_lookup() {
        let buf = encode(2, 2, &[10, 11, 12, 13]);
        let snap = decode(&buf).unwrap();
        assert_eq!(snap.pixel(0, 0), Some(10));
        assert_eq!(snap.pixel(1, 0), Some(11));
        assert_eq!(snap.pixel(0, 1), Some(12));
        assert_eq!(snap.pixel(1, 1), Some(13));
        assert_eq!(snap.pixel(2, 0), None);
    }

    #[test]
    fn test_decode_short_buffer() {
        assert!(matches!(
            decode(&[1, 2, 3]),
            Err(MuralError::Snapshot(_))
        ));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let mut buf = encode(2, 2, &[0, 0, 0, 0]);
        buf.pop();
        assert!(matches!(decode(&buf), Err(MuralError::Snapshot(_))));
    }

    #[test]
    fn test_empty_canvas() {
        let buf = encode(0, 0, &[]);
        let snap = decode(&buf).unwrap();
        assert_eq!(snap.pixels.len(), 0);
        assert_eq!(snap.pixel(0, 0), None);
    }
}
