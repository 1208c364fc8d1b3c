#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// An uncompressed YUV4MPEG2 clip at 25 fps with neutral chroma, one frame per luma value
pub fn y4m(width: usize, height: usize, lumas: &[u8]) -> Vec<u8> {
    let chroma = width.div_ceil(2) * height.div_ceil(2);

    let mut data = format!("YUV4MPEG2 W{width} H{height} F25:1 Ip A1:1 C420jpeg\n").into_bytes();
    for &luma in lumas {
        data.extend_from_slice(b"FRAME\n");
        data.extend(std::iter::repeat(luma).take(width * height));
        data.extend(std::iter::repeat(128).take(2 * chroma));
    }
    data
}

pub fn write_y4m(dir: &Path, name: &str, width: usize, height: usize, lumas: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, y4m(width, height, lumas)).unwrap();
    path
}

/// Luma of the pixel at `x`, `y` in a tightly packed yuv420p image
pub fn luma_at(image: &[u8], width: usize, x: usize, y: usize) -> u8 {
    image[y * width + x]
}
