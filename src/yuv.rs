use crate::error::VideoError;
use crate::frame::{Frame, PlanarImage};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes frames back to back as raw planar yuv420p: all Y rows, then U, then V
pub struct YuvWriter<W: Write> {
    inner: W,
    frames: u64,
}

impl YuvWriter<BufWriter<File>> {
    /// Create (or truncate) the output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, VideoError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> YuvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, frames: 0 }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        let image = frame.planar().ok_or(VideoError::UnsupportedPixelFormat)?;
        self.write_image(&image)?;
        Ok(())
    }

    /// Write the visible part of each plane, dropping any stride padding
    pub fn write_image(&mut self, image: &PlanarImage<'_>) -> io::Result<()> {
        for plane in 0..3 {
            for row in image.rows(plane) {
                self.inner.write_all(row)?;
            }
        }
        self.frames += 1;
        Ok(())
    }

    #[inline]
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dimensions;

    #[test]
    fn writes_planes_without_padding() {
        // 4x2 luma with stride 6, 2x1 chroma with stride 3
        let luma: [u8; 12] = [1, 1, 1, 1, 0, 0, 2, 2, 2, 2, 0, 0];
        let u: [u8; 3] = [3, 3, 0];
        let v: [u8; 3] = [4, 4, 0];
        let image = PlanarImage::new(Dimensions::new(4, 2), [&luma, &u, &v], [6, 3, 3]).unwrap();

        let mut writer = YuvWriter::new(Vec::new());
        writer.write_image(&image).unwrap();
        writer.write_image(&image).unwrap();
        assert_eq!(writer.frames_written(), 2);

        let out = writer.finish().unwrap();
        let frame: [u8; 12] = [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 4, 4];
        assert_eq!(out, [frame, frame].concat());
    }

    #[test]
    fn odd_sizes_round_chroma_up() {
        let luma = [9u8; 3 * 3];
        let chroma = [5u8; 2 * 2];
        let image =
            PlanarImage::new(Dimensions::new(3, 3), [&luma, &chroma, &chroma], [3, 2, 2]).unwrap();

        let mut writer = YuvWriter::new(Vec::new());
        writer.write_image(&image).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out.len(), Dimensions::new(3, 3).yuv420p_size());
        assert_eq!(&out[9..], &[5u8; 8]);
    }

    #[test]
    fn write_frame_from_allocated_frame() {
        let dimensions = Dimensions::new(8, 6);
        let mut frame = Frame::new_yuv420p(dimensions).unwrap();
        for (plane, value) in frame.planes_mut().unwrap().into_iter().zip([16u8, 100, 200]) {
            plane.0.fill(value);
        }

        let mut writer = YuvWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();
        let out = writer.finish().unwrap();

        assert_eq!(out.len(), dimensions.yuv420p_size());
        assert!(out[..48].iter().all(|&b| b == 16));
        assert!(out[48..60].iter().all(|&b| b == 100));
        assert!(out[60..].iter().all(|&b| b == 200));
    }
}
