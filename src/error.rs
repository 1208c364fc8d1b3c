use crate::c::error_string;
use std::fmt;

/// A negative return code from one of the ffmpeg libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvError(i32);

impl AvError {
    #[inline]
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw ffmpeg error code
    #[inline]
    pub fn code(&self) -> i32 {
        self.0
    }

    /// The library reached the end of its input
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.0 == ffmpeg::AVERROR_EOF
    }

    /// The library needs more input before it can produce output
    #[inline]
    pub fn is_again(&self) -> bool {
        self.0 == ffmpeg::AVERROR(libc::EAGAIN)
    }
}

impl fmt::Display for AvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", error_string(self.0), self.0)
    }
}

impl std::error::Error for AvError {}

/// An error from any stage of the filtering pipeline
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    #[error("unable to open input data: {0}")]
    UnableToOpenInput(AvError),
    #[error("unable to read stream information: {0}")]
    UnableToReadStreamInfo(AvError),
    /// This may mean that the source data does not have an active video stream
    #[error("unable to find video stream")]
    UnableToFindVideoStream,
    /// The target codec is not supported by ffmpeg
    #[error("unsupported codec (by ffmpeg)")]
    UnsupportedCodec,
    #[error("unable to open video decoder: {0}")]
    UnableToOpenDecoder(AvError),
    #[error("decode error: {0}")]
    Decode(AvError),
    /// The path can't be passed to ffmpeg (not utf-8, or contains a nul byte)
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// The filter description contains a nul byte
    #[error("invalid filter description `{0}`")]
    InvalidFilterDescription(String),
    #[error("could not allocate {0}")]
    Allocation(&'static str),
    /// The linked libavfilter was built without a filter we need
    #[error("filter `{0}` is not available")]
    FilterNotFound(&'static str),
    #[error("unable to create buffer source: {0}")]
    UnableToCreateBufferSource(AvError),
    #[error("unable to create buffer sink: {0}")]
    UnableToCreateBufferSink(AvError),
    #[error("unable to parse filter graph `{description}`: {source}")]
    UnableToParseFilterGraph {
        description: String,
        source: AvError,
    },
    #[error("unable to configure filter graph: {0}")]
    UnableToConfigureFilterGraph(AvError),
    #[error("error while feeding the filter graph: {0}")]
    FeedFilterGraph(AvError),
    #[error("error while draining the filter graph: {0}")]
    DrainFilterGraph(AvError),
    #[error("unable to create colour converter")]
    UnableToCreateScaler,
    #[error("colour conversion failed: {0}")]
    Scale(AvError),
    #[error("frame is not planar yuv420p")]
    UnsupportedPixelFormat,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "display")]
    #[error("display error: {0}")]
    Display(String),
}

/// Convert a negative ffmpeg return code into an error, passing through everything else
pub(crate) fn check(ret: i32, err: impl FnOnce(AvError) -> VideoError) -> Result<i32, VideoError> {
    if ret < 0 {
        Err(err(AvError::new(ret)))
    } else {
        Ok(ret)
    }
}
