//! A libavfilter graph with a single `buffer` source and a single `buffersink` sink

use crate::decoder::VideoDecoder;
use crate::error::{check, AvError, VideoError};
use crate::frame::Frame;
use crate::Dimensions;
use std::ffi::{c_int, c_void, CString};
use std::path::Path;
use std::{fmt, mem, ptr};
use tracing::debug;

/// A rational number as used for time bases and aspect ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    #[inline]
    pub fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }
}

impl From<ffmpeg::AVRational> for Rational {
    fn from(r: ffmpeg::AVRational) -> Self {
        Self::new(r.num, r.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Parameters of the frames that will be pushed into the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSourceArgs {
    pub dimensions: Dimensions,
    /// Raw `AVPixelFormat` value
    pub pixel_format: i32,
    pub time_base: Rational,
    pub pixel_aspect: Rational,
}

impl BufferSourceArgs {
    pub fn from_decoder(decoder: &VideoDecoder) -> Self {
        Self {
            dimensions: decoder.dimensions(),
            pixel_format: decoder.pixel_format(),
            time_base: decoder.time_base(),
            pixel_aspect: decoder.sample_aspect_ratio(),
        }
    }
}

impl fmt::Display for BufferSourceArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // unknown aspect ratios come out of the demuxer as 0/0, which the buffer source rejects
        let aspect = if self.pixel_aspect.den == 0 {
            Rational::new(0, 1)
        } else {
            self.pixel_aspect
        };
        write!(
            f,
            "video_size={}x{}:pix_fmt={}:time_base={}:pixel_aspect={}",
            self.dimensions.width(),
            self.dimensions.height(),
            self.pixel_format,
            self.time_base,
            aspect
        )
    }
}

/// Graph description that overlays `image` on the input at the pixel offset `x`:`y`
pub fn overlay_description(image: &Path, x: i32, y: i32) -> String {
    let image = escape_graph(&escape_option(&image.to_string_lossy()));
    format!("movie={image}[wm];[in][wm]overlay={x}:{y}[out]")
}

/// Escape a value for the filter option parser
fn escape_option(value: &str) -> String {
    escape(value, &['\\', '\'', ':', '='])
}

/// Escape a filter's argument string for the graph parser
fn escape_graph(value: &str) -> String {
    escape(value, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub struct FilterGraph {
    graph: *mut ffmpeg::AVFilterGraph,
    /// The `in` pad, owned by `graph`
    source: *mut ffmpeg::AVFilterContext,
    /// The `out` pad, owned by `graph`
    sink: *mut ffmpeg::AVFilterContext,
    scratch: Frame,
}

impl FilterGraph {
    /// Build and configure a graph from a textual description.
    ///
    /// The description must read from a pad labelled `in` and write to a pad labelled `out`.
    /// The sink only accepts planar yuv420p, ffmpeg inserts a conversion if needed.
    pub fn new(description: &str, args: &BufferSourceArgs) -> Result<Self, VideoError> {
        let scratch = Frame::empty()?;
        let graph = unsafe { ffmpeg::avfilter_graph_alloc() };
        if graph.is_null() {
            return Err(VideoError::Allocation("filter graph"));
        }

        let mut filter_graph = FilterGraph {
            graph,
            source: ptr::null_mut(),
            sink: ptr::null_mut(),
            scratch,
        };
        unsafe { filter_graph.configure(description, args)? };

        debug!(%args, description, "configured filter graph");
        Ok(filter_graph)
    }

    unsafe fn configure(
        &mut self,
        description: &str,
        args: &BufferSourceArgs,
    ) -> Result<(), VideoError> {
        let buffersrc = ffmpeg::avfilter_get_by_name(c"buffer".as_ptr());
        if buffersrc.is_null() {
            return Err(VideoError::FilterNotFound("buffer"));
        }
        let buffersink = ffmpeg::avfilter_get_by_name(c"buffersink".as_ptr());
        if buffersink.is_null() {
            return Err(VideoError::FilterNotFound("buffersink"));
        }

        let source_args = CString::new(args.to_string())
            .map_err(|_| VideoError::InvalidFilterDescription(args.to_string()))?;
        let descr = CString::new(description)
            .map_err(|_| VideoError::InvalidFilterDescription(description.to_string()))?;

        // buffer video source: the decoded frames from the decoder will be inserted here
        check(
            ffmpeg::avfilter_graph_create_filter(
                &mut self.source,
                buffersrc,
                c"in".as_ptr(),
                source_args.as_ptr(),
                ptr::null_mut(),
                self.graph,
            ),
            VideoError::UnableToCreateBufferSource,
        )?;

        // buffer video sink: to terminate the filter chain
        check(
            ffmpeg::avfilter_graph_create_filter(
                &mut self.sink,
                buffersink,
                c"out".as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                self.graph,
            ),
            VideoError::UnableToCreateBufferSink,
        )?;
        let pix_fmts = [ffmpeg::AVPixelFormat::AV_PIX_FMT_YUV420P];
        check(
            ffmpeg::av_opt_set_bin(
                self.sink as *mut c_void,
                c"pix_fmts".as_ptr(),
                pix_fmts.as_ptr() as *const u8,
                mem::size_of_val(&pix_fmts) as c_int,
                ffmpeg::AV_OPT_SEARCH_CHILDREN as c_int,
            ),
            VideoError::UnableToCreateBufferSink,
        )?;

        // endpoints for the filter graph, named after the labels in the description
        let mut outputs = ffmpeg::avfilter_inout_alloc();
        let mut inputs = ffmpeg::avfilter_inout_alloc();
        if outputs.is_null() || inputs.is_null() {
            ffmpeg::avfilter_inout_free(&mut outputs);
            ffmpeg::avfilter_inout_free(&mut inputs);
            return Err(VideoError::Allocation("filter endpoints"));
        }

        (*outputs).name = ffmpeg::av_strdup(c"in".as_ptr());
        (*outputs).filter_ctx = self.source;
        (*outputs).pad_idx = 0;
        (*outputs).next = ptr::null_mut();

        (*inputs).name = ffmpeg::av_strdup(c"out".as_ptr());
        (*inputs).filter_ctx = self.sink;
        (*inputs).pad_idx = 0;
        (*inputs).next = ptr::null_mut();

        let ret = ffmpeg::avfilter_graph_parse_ptr(
            self.graph,
            descr.as_ptr(),
            &mut inputs,
            &mut outputs,
            ptr::null_mut(),
        );
        ffmpeg::avfilter_inout_free(&mut inputs);
        ffmpeg::avfilter_inout_free(&mut outputs);
        check(ret, |source| VideoError::UnableToParseFilterGraph {
            description: description.to_string(),
            source,
        })?;

        // check validity and configure all the links and formats in the graph
        check(
            ffmpeg::avfilter_graph_config(self.graph, ptr::null_mut()),
            VideoError::UnableToConfigureFilterGraph,
        )?;

        Ok(())
    }

    /// Push a decoded frame into the graph
    pub fn push(&mut self, mut frame: Frame) -> Result<(), VideoError> {
        unsafe {
            check(
                ffmpeg::av_buffersrc_add_frame(self.source, frame.as_mut_ptr()),
                VideoError::FeedFilterGraph,
            )?;
        }
        Ok(())
    }

    /// Signal that no more frames will be pushed, so buffered frames can be drained
    pub fn flush(&mut self) -> Result<(), VideoError> {
        unsafe {
            check(
                ffmpeg::av_buffersrc_add_frame(self.source, ptr::null_mut()),
                VideoError::FeedFilterGraph,
            )?;
        }
        Ok(())
    }

    /// Pull one filtered frame, `None` if the graph needs more input or is fully drained
    pub fn pull(&mut self) -> Result<Option<Frame>, VideoError> {
        let ret = unsafe { ffmpeg::av_buffersink_get_frame(self.sink, self.scratch.as_mut_ptr()) };
        if ret < 0 {
            let error = AvError::new(ret);
            if error.is_again() || error.is_eof() {
                return Ok(None);
            }
            return Err(VideoError::DrainFilterGraph(error));
        }

        self.scratch.take().map(Some)
    }

    /// Size of the frames the sink produces
    pub fn output_dimensions(&self) -> Dimensions {
        unsafe {
            Dimensions::new(
                ffmpeg::av_buffersink_get_w(self.sink).max(0) as u32,
                ffmpeg::av_buffersink_get_h(self.sink).max(0) as u32,
            )
        }
    }
}

impl Drop for FilterGraph {
    fn drop(&mut self) {
        unsafe { ffmpeg::avfilter_graph_free(&mut self.graph) };
    }
}
