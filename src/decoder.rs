use super::{Dimensions, VideoSource};
use crate::c::{path_to_raw, read_stream, Stream};
use crate::error::{check, AvError, VideoError};
use crate::filter::Rational;
use crate::frame::Frame;
use std::collections::VecDeque;
use std::ffi::{c_void, CStr};
use std::ptr;
use tracing::{debug, warn};

/// ffmpeg buffer size
const BUFFER_SIZE: usize = 8192;

pub struct VideoDecoder {
    /// The dimensions of the decoded video
    dimensions: Dimensions,
    /// The framerate of the decoded video
    framerate: f32,
    /// Time base of the video stream, in which frame timestamps are expressed
    time_base: Rational,
    sample_aspect_ratio: Rational,
    pixel_format: i32,
    /// Internal frame buffer, as ffmpeg returns frames in chunks
    buffer: VecDeque<Frame>,
    /// Set once the input is exhausted and the decoder has been drained
    finished: bool,

    // -------------- ffmpeg data --------------
    raw_frame: Frame,
    /// Only used if we got a [`VideoSource::Raw(_)`]
    avio: Option<*mut ffmpeg::AVIOContext>,
    /// Read by `avio` through its opaque pointer, so it must not move while the context is alive
    stream: Option<Box<Stream>>,
    codec_ctx: *mut ffmpeg::AVCodecContext,
    input_ctx: *mut ffmpeg::AVFormatContext,
    packet: *mut ffmpeg::AVPacket,
    stream_id: i32,
}

impl VideoDecoder {
    /// Open the input and the decoder for its best video stream.
    ///
    /// # Arguments
    ///
    /// * `source` - The input video data
    pub fn new<S>(source: S) -> Result<Self, VideoError>
    where
        S: Into<VideoSource>,
    {
        let source: VideoSource = source.into();

        let raw_frame = Frame::empty()?;
        let packet = unsafe { ffmpeg::av_packet_alloc() };
        if packet.is_null() {
            return Err(VideoError::Allocation("packet"));
        }

        // Everything allocated from here on is released by `Drop`, even on early return
        let mut decoder = VideoDecoder {
            dimensions: Dimensions::new(0, 0),
            framerate: 0.0,
            time_base: Rational::new(0, 1),
            sample_aspect_ratio: Rational::new(0, 1),
            pixel_format: ffmpeg::AVPixelFormat::AV_PIX_FMT_NONE as i32,
            buffer: VecDeque::new(),
            finished: false,
            raw_frame,
            avio: None,
            stream: None,
            codec_ctx: ptr::null_mut(),
            input_ctx: ptr::null_mut(),
            packet,
            stream_id: -1,
        };

        unsafe {
            decoder.open_input(source)?;
            decoder.open_codec()?;
        }

        Ok(decoder)
    }

    unsafe fn open_input(&mut self, source: VideoSource) -> Result<(), VideoError> {
        self.input_ctx = ffmpeg::avformat_alloc_context();
        if self.input_ctx.is_null() {
            return Err(VideoError::Allocation("format context"));
        }

        let path = match source {
            VideoSource::Raw(data) => {
                let buffer = ffmpeg::av_malloc(BUFFER_SIZE) as *mut u8;
                if buffer.is_null() {
                    return Err(VideoError::Allocation("avio buffer"));
                }

                let mut stream = Box::new(Stream { offset: 0, data });
                let avio = ffmpeg::avio_alloc_context(
                    buffer,
                    BUFFER_SIZE as i32,
                    0,
                    &mut *stream as *mut Stream as *mut c_void,
                    Some(read_stream),
                    None,
                    None,
                );
                if avio.is_null() {
                    ffmpeg::av_free(buffer as *mut c_void);
                    return Err(VideoError::Allocation("avio context"));
                }

                self.avio = Some(avio);
                self.stream = Some(stream);
                (*self.input_ctx).pb = avio;
                (*self.input_ctx).flags |= ffmpeg::AVFMT_FLAG_CUSTOM_IO as i32;
                None
            }
            VideoSource::Filesystem(path) => Some(
                path_to_raw(&path)
                    .ok_or_else(|| VideoError::InvalidPath(path.display().to_string()))?,
            ),
        };
        let url = path.as_ref().map_or(ptr::null(), |path| path.as_ptr());

        // Open video, on failure ffmpeg frees the context and nulls our pointer
        check(
            ffmpeg::avformat_open_input(&mut self.input_ctx, url, ptr::null(), ptr::null_mut()),
            VideoError::UnableToOpenInput,
        )?;

        // Get stream information
        check(
            ffmpeg::avformat_find_stream_info(self.input_ctx, ptr::null_mut()),
            VideoError::UnableToReadStreamInfo,
        )?;

        Ok(())
    }

    unsafe fn open_codec(&mut self) -> Result<(), VideoError> {
        // Find video stream
        let mut codec: *const ffmpeg::AVCodec = ptr::null();
        let stream_id = ffmpeg::av_find_best_stream(
            self.input_ctx,
            ffmpeg::AVMediaType::AVMEDIA_TYPE_VIDEO,
            -1,
            -1,
            &mut codec,
            0,
        );
        if stream_id == ffmpeg::AVERROR_DECODER_NOT_FOUND {
            return Err(VideoError::UnsupportedCodec);
        }
        if stream_id < 0 {
            return Err(VideoError::UnableToFindVideoStream);
        }
        if codec.is_null() {
            return Err(VideoError::UnsupportedCodec);
        }

        let stream = *(*self.input_ctx).streams.offset(stream_id as isize);

        self.codec_ctx = ffmpeg::avcodec_alloc_context3(codec);
        if self.codec_ctx.is_null() {
            return Err(VideoError::Allocation("codec context"));
        }
        check(
            ffmpeg::avcodec_parameters_to_context(self.codec_ctx, (*stream).codecpar),
            VideoError::UnableToOpenDecoder,
        )?;
        (*self.codec_ctx).pkt_timebase = (*stream).time_base;

        // Open decoder context
        check(
            ffmpeg::avcodec_open2(self.codec_ctx, codec, ptr::null_mut()),
            VideoError::UnableToOpenDecoder,
        )?;

        let framerate = ffmpeg::av_guess_frame_rate(self.input_ctx, stream, ptr::null_mut());
        self.framerate = if framerate.den == 0 {
            0.0
        } else {
            framerate.num as f32 / framerate.den as f32
        };
        self.dimensions = Dimensions::new(
            (*self.codec_ctx).width.max(0) as u32,
            (*self.codec_ctx).height.max(0) as u32,
        );
        self.pixel_format = (*self.codec_ctx).pix_fmt as i32;
        self.time_base = (*stream).time_base.into();
        self.sample_aspect_ratio =
            ffmpeg::av_guess_sample_aspect_ratio(self.input_ctx, stream, ptr::null_mut()).into();
        self.stream_id = stream_id;

        debug!(
            stream = stream_id,
            codec = %CStr::from_ptr((*codec).name).to_string_lossy(),
            width = self.dimensions.width(),
            height = self.dimensions.height(),
            time_base = %self.time_base,
            "opened video decoder"
        );

        Ok(())
    }

    /// Get the next decoded frame, with its pts set to the best effort timestamp.
    ///
    /// Returns `Ok(None)` once the input is exhausted and every delayed frame has been returned.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        loop {
            if let Some(next) = self.buffer.pop_front() {
                return Ok(Some(next));
            }
            if self.finished {
                return Ok(None);
            }

            unsafe {
                let ret = ffmpeg::av_read_frame(self.input_ctx, self.packet);
                if ret < 0 {
                    // out of packets
                    let error = AvError::new(ret);
                    if !error.is_eof() {
                        warn!(%error, "stopped reading input");
                    }

                    // A null packet puts the decoder in draining mode
                    self.finished = true;
                    self.decode(ptr::null())?;
                    continue;
                }

                // Check that this packet is in the right stream
                let decoded = if (*self.packet).stream_index == self.stream_id {
                    self.decode(self.packet)
                } else {
                    Ok(())
                };
                ffmpeg::av_packet_unref(self.packet);
                decoded?;
            }
        }
    }

    /// Send one packet to the decoder and buffer every frame it produces
    unsafe fn decode(&mut self, packet: *const ffmpeg::AVPacket) -> Result<(), VideoError> {
        check(
            ffmpeg::avcodec_send_packet(self.codec_ctx, packet),
            VideoError::Decode,
        )?;

        loop {
            let ret = ffmpeg::avcodec_receive_frame(self.codec_ctx, self.raw_frame.as_mut_ptr());
            if ret < 0 {
                let error = AvError::new(ret);
                if error.is_again() || error.is_eof() {
                    return Ok(());
                }
                return Err(VideoError::Decode(error));
            }

            let raw = self.raw_frame.as_mut_ptr();
            (*raw).pts = (*raw).best_effort_timestamp;
            self.buffer.push_back(self.raw_frame.take()?);
        }
    }

    /// Get the dimensions of the video
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Get the framerate of the video (in frames-per-second)
    #[inline]
    pub fn framerate(&self) -> f32 {
        self.framerate
    }

    /// The time base of the selected stream
    #[inline]
    pub fn time_base(&self) -> Rational {
        self.time_base
    }

    #[inline]
    pub fn sample_aspect_ratio(&self) -> Rational {
        self.sample_aspect_ratio
    }

    /// The raw `AVPixelFormat` value the decoder outputs
    #[inline]
    pub fn pixel_format(&self) -> i32 {
        self.pixel_format
    }

    /// Index of the selected video stream within the container
    #[inline]
    pub fn stream_index(&self) -> usize {
        self.stream_id as usize
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        unsafe {
            ffmpeg::av_packet_free(&mut self.packet);
            if !self.codec_ctx.is_null() {
                ffmpeg::avcodec_free_context(&mut self.codec_ctx);
            }
            if !self.input_ctx.is_null() {
                ffmpeg::avformat_close_input(&mut self.input_ctx);
            }
            // Custom io is never closed by avformat, and its buffer may have been reallocated
            if let Some(mut avio) = self.avio.take() {
                ffmpeg::av_freep(&mut (*avio).buffer as *mut *mut u8 as *mut c_void);
                ffmpeg::avio_context_free(&mut avio);
            }
        }
    }
}
