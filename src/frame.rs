use crate::error::{check, VideoError};
use crate::Dimensions;
use std::slice;

const YUV420P: i32 = ffmpeg::AVPixelFormat::AV_PIX_FMT_YUV420P as i32;

/// An owned `AVFrame`, freed on drop
pub struct Frame {
    ptr: *mut ffmpeg::AVFrame,
}

impl Frame {
    /// Allocate an empty frame with no data buffers attached
    pub(crate) fn empty() -> Result<Self, VideoError> {
        let ptr = unsafe { ffmpeg::av_frame_alloc() };
        if ptr.is_null() {
            return Err(VideoError::Allocation("frame"));
        }
        Ok(Self { ptr })
    }

    /// Allocate a writable planar yuv420p frame
    pub fn new_yuv420p(dimensions: Dimensions) -> Result<Self, VideoError> {
        let frame = Self::empty()?;
        unsafe {
            (*frame.ptr).width = dimensions.width() as i32;
            (*frame.ptr).height = dimensions.height() as i32;
            (*frame.ptr).format = YUV420P;
            check(ffmpeg::av_frame_get_buffer(frame.ptr, 0), |_| {
                VideoError::Allocation("frame buffer")
            })?;
        }
        Ok(frame)
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const ffmpeg::AVFrame {
        self.ptr
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut ffmpeg::AVFrame {
        self.ptr
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = unsafe { ((*self.ptr).width, (*self.ptr).height) };
        Dimensions::new(width.max(0) as u32, height.max(0) as u32)
    }

    /// The raw `AVPixelFormat` value of the frame data
    #[inline]
    pub fn pixel_format(&self) -> i32 {
        unsafe { (*self.ptr).format }
    }

    #[inline]
    pub fn is_yuv420p(&self) -> bool {
        self.pixel_format() == YUV420P
    }

    /// Presentation timestamp, `None` if unset
    pub fn pts(&self) -> Option<i64> {
        match unsafe { (*self.ptr).pts } {
            ffmpeg::AV_NOPTS_VALUE => None,
            pts => Some(pts),
        }
    }

    pub fn set_pts(&mut self, pts: Option<i64>) {
        unsafe { (*self.ptr).pts = pts.unwrap_or(ffmpeg::AV_NOPTS_VALUE) }
    }

    /// Borrow the three planes of a yuv420p frame
    pub fn planar(&self) -> Option<PlanarImage<'_>> {
        if !self.is_yuv420p() {
            return None;
        }

        let dimensions = self.dimensions();
        let layout = plane_layout(dimensions);
        let mut planes: [&[u8]; 3] = [&[]; 3];
        let mut strides = [0isize; 3];

        for (i, (width, rows)) in layout.into_iter().enumerate() {
            let (data, stride) = unsafe { ((*self.ptr).data[i], (*self.ptr).linesize[i]) };
            let stride = stride as isize;
            // filters such as vflip hand out bottom-up planes with a negative stride
            if data.is_null() || stride.unsigned_abs() < width {
                return None;
            }
            let span = rows.saturating_sub(1) * stride.unsigned_abs();
            let len = if rows == 0 { 0 } else { span + width };
            // the slice always starts at the lowest address of the plane
            let start = if stride < 0 {
                unsafe { data.sub(span) }
            } else {
                data
            };
            planes[i] = unsafe { slice::from_raw_parts(start, len) };
            strides[i] = stride;
        }

        Some(PlanarImage {
            dimensions,
            planes,
            strides,
        })
    }

    /// Mutable access to the planes of a yuv420p frame, along with their strides
    pub fn planes_mut(&mut self) -> Result<[(&mut [u8], usize); 3], VideoError> {
        if !self.is_yuv420p() {
            return Err(VideoError::UnsupportedPixelFormat);
        }
        unsafe {
            check(ffmpeg::av_frame_make_writable(self.ptr), |_| {
                VideoError::Allocation("writable frame")
            })?;
        }

        let layout = plane_layout(self.dimensions());
        let frame = self.ptr;
        for (i, (width, _)) in layout.into_iter().enumerate() {
            if unsafe { (*frame).linesize[i] } < width as i32 {
                return Err(VideoError::UnsupportedPixelFormat);
            }
        }
        let plane = |i: usize| unsafe {
            let (width, rows) = layout[i];
            let stride = (*frame).linesize[i] as usize;
            let len = if rows == 0 { 0 } else { stride * (rows - 1) + width };
            (slice::from_raw_parts_mut((*frame).data[i], len), stride)
        };

        Ok([plane(0), plane(1), plane(2)])
    }

    /// Move the frame's buffers into a new frame, leaving this one empty
    pub(crate) fn take(&mut self) -> Result<Frame, VideoError> {
        let mut out = Frame::empty()?;
        unsafe { ffmpeg::av_frame_move_ref(out.ptr, self.ptr) };
        Ok(out)
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        unsafe { ffmpeg::av_frame_free(&mut self.ptr) };
    }
}

/// Visible bytes per row and row count of each plane
fn plane_layout(dimensions: Dimensions) -> [(usize, usize); 3] {
    let chroma = dimensions.chroma();
    let luma = (dimensions.width() as usize, dimensions.height() as usize);
    let chroma = (chroma.width() as usize, chroma.height() as usize);
    [luma, chroma, chroma]
}

/// A borrowed planar yuv420p image
#[derive(Debug, Clone, Copy)]
pub struct PlanarImage<'a> {
    dimensions: Dimensions,
    planes: [&'a [u8]; 3],
    /// Negative for bottom-up planes, whose first row is the last one in memory
    strides: [isize; 3],
}

impl<'a> PlanarImage<'a> {
    /// Wrap existing Y, U and V planes. Returns `None` if a plane is too short for its stride.
    pub fn new(dimensions: Dimensions, planes: [&'a [u8]; 3], strides: [usize; 3]) -> Option<Self> {
        for (i, (width, rows)) in plane_layout(dimensions).into_iter().enumerate() {
            if strides[i] < width {
                return None;
            }
            if rows > 0 && planes[i].len() < strides[i] * (rows - 1) + width {
                return None;
            }
        }

        Some(Self {
            dimensions,
            planes,
            strides: strides.map(|stride| stride as isize),
        })
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// The visible rows of a plane (0 = Y, 1 = U, 2 = V), without stride padding
    pub fn rows(&self, plane: usize) -> impl Iterator<Item = &'a [u8]> + '_ {
        let (width, rows) = plane_layout(self.dimensions)[plane];
        let stride = self.strides[plane];
        let step = stride.unsigned_abs();
        let data = self.planes[plane];
        (0..rows).map(move |y| {
            let start = if stride < 0 { (rows - 1 - y) * step } else { y * step };
            &data[start..start + width]
        })
    }
}
