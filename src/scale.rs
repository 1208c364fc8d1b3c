use crate::error::{check, VideoError};
use crate::frame::Frame;
use std::ffi::c_int;
use std::ptr;

/// Converts yuv420p frames to packed RGB24 for presentation
pub struct Scaler {
    /// Recreated by ffmpeg whenever the frame size changes
    sws_context: *mut ffmpeg::SwsContext,
    texture_data: Vec<u8>,
}

impl Scaler {
    pub fn new() -> Self {
        Self {
            sws_context: ptr::null_mut(),
            texture_data: Vec::new(),
        }
    }

    /// Convert a frame, returning `width * height * 3` bytes of RGB without row padding
    pub fn convert(&mut self, frame: &Frame) -> Result<&[u8], VideoError> {
        if !frame.is_yuv420p() {
            return Err(VideoError::UnsupportedPixelFormat);
        }

        let dimensions = frame.dimensions();
        let (width, height) = (dimensions.width() as c_int, dimensions.height() as c_int);

        unsafe {
            self.sws_context = ffmpeg::sws_getCachedContext(
                self.sws_context,
                width,                                     // Source
                height,                                    // Source
                ffmpeg::AVPixelFormat::AV_PIX_FMT_YUV420P, // Source
                width,                                     // Destination
                height,                                    // Destination
                ffmpeg::AVPixelFormat::AV_PIX_FMT_RGB24,   // Destination
                ffmpeg::SWS_BILINEAR as c_int,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null(),
            );
            if self.sws_context.is_null() {
                return Err(VideoError::UnableToCreateScaler);
            }

            self.texture_data.resize(dimensions.area() * 3, 0);
            let dst = [
                self.texture_data.as_mut_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
            ];
            let dst_stride: [c_int; 4] = [width * 3, 0, 0, 0];

            let src = frame.as_ptr();
            check(
                ffmpeg::sws_scale(
                    self.sws_context,
                    (*src).data.as_ptr() as *const *const u8,
                    (*src).linesize.as_ptr(),
                    0,
                    height,
                    dst.as_ptr(),
                    dst_stride.as_ptr(),
                ),
                VideoError::Scale,
            )?;
        }

        Ok(&self.texture_data)
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scaler {
    fn drop(&mut self) {
        unsafe { ffmpeg::sws_freeContext(self.sws_context) };
    }
}

/// Pack RGB24 triplets into `0x00RRGGBB` pixels, as many as fit in `out`
pub fn pack_rgb24(rgb: &[u8], out: &mut [u32]) {
    for (pixel, c) in out.iter_mut().zip(rgb.chunks_exact(3)) {
        *pixel = (c[0] as u32) << 16 | (c[1] as u32) << 8 | c[2] as u32;
    }
}
