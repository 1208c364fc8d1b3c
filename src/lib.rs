mod c;
pub mod config;
mod decoder;
mod error;
mod filter;
mod frame;
mod pipeline;
mod scale;
mod source;
mod yuv;

#[cfg(feature = "display")]
pub mod display;

pub use config::Config;
pub use decoder::VideoDecoder;
pub use error::{AvError, VideoError};
pub use filter::{overlay_description, BufferSourceArgs, FilterGraph, Rational};
pub use frame::{Frame, PlanarImage};
pub use pipeline::Pipeline;
pub use scale::{pack_rgb24, Scaler};
pub use source::VideoSource;
pub use yuv::YuvWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the U and V planes of a 4:2:0 image, rounding odd sizes up
    #[inline]
    pub fn chroma(&self) -> Dimensions {
        Self {
            width: self.width.div_ceil(2),
            height: self.height.div_ceil(2),
        }
    }

    /// Bytes in one tightly packed yuv420p image
    #[inline]
    pub fn yuv420p_size(&self) -> usize {
        let chroma = self.chroma();
        self.area() + 2 * chroma.area()
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
