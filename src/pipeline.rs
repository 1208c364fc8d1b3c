use crate::decoder::VideoDecoder;
use crate::error::VideoError;
use crate::filter::{BufferSourceArgs, FilterGraph};
use crate::frame::Frame;
use crate::{Dimensions, VideoSource};
use tracing::{debug, info, warn};

/// Decoder feeding a filter graph: frames are pushed into the graph's source pad
/// and pulled back out of its sink pad one at a time.
pub struct Pipeline {
    // the graph is declared first so it is released before the decoder
    graph: FilterGraph,
    decoder: VideoDecoder,
    /// End of stream has been signalled to the graph
    flushed: bool,
    processed: u64,
}

impl Pipeline {
    pub fn new<S>(source: S, description: &str) -> Result<Self, VideoError>
    where
        S: Into<VideoSource>,
    {
        let source = source.into();
        debug!(%source, "opening input");

        let decoder = VideoDecoder::new(source)?;
        let graph = FilterGraph::new(description, &BufferSourceArgs::from_decoder(&decoder))?;

        Ok(Self {
            graph,
            decoder,
            flushed: false,
            processed: 0,
        })
    }

    /// The next filtered yuv420p frame, `None` once the input is exhausted and the graph is drained
    pub fn next_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        loop {
            if let Some(frame) = self.graph.pull()? {
                if !frame.is_yuv420p() {
                    warn!(
                        format = frame.pixel_format(),
                        "dropping filtered frame that is not yuv420p"
                    );
                    continue;
                }

                info!(pts = ?frame.pts(), "Process {} frame", self.processed);
                self.processed += 1;
                return Ok(Some(frame));
            }

            if self.flushed {
                return Ok(None);
            }

            match self.decoder.next_frame()? {
                Some(frame) => self.graph.push(frame)?,
                None => {
                    debug!(processed = self.processed, "end of input, draining filter graph");
                    self.graph.flush()?;
                    self.flushed = true;
                }
            }
        }
    }

    /// Number of filtered frames returned so far
    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.processed
    }

    /// Size of the filtered frames
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.graph.output_dimensions()
    }
}
