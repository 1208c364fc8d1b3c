//! A window that shows filtered frames at a fixed pace

use crate::error::VideoError;
use crate::pipeline::Pipeline;
use crate::scale::{pack_rgb24, Scaler};
use crate::yuv::YuvWriter;
use crate::Dimensions;
use softbuffer::{Context, Surface};
use std::io::Write;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::info;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub title: String,
    /// Time each frame stays on screen
    pub delay: Duration,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: "Simplest FFmpeg Video Filter".to_string(),
            delay: Duration::from_millis(40),
        }
    }
}

/// Run the pipeline to completion, writing every frame to `writer` and showing it in a window.
///
/// Returns early without error if the window is closed or Escape is pressed.
pub fn play<W: Write>(
    pipeline: &mut Pipeline,
    writer: &mut YuvWriter<W>,
    options: &DisplayOptions,
) -> Result<(), VideoError> {
    let event_loop = EventLoop::new().map_err(display_error)?;

    let size = pipeline.dimensions();
    let window = Rc::new(
        WindowBuilder::new()
            .with_title(&options.title)
            .with_inner_size(PhysicalSize::new(size.width(), size.height()))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(display_error)?,
    );

    let context = Context::new(window.clone()).map_err(display_error)?;
    let mut surface = Surface::new(&context, window.clone()).map_err(display_error)?;

    let mut scaler = Scaler::new();
    let mut pixels: Vec<u32> = Vec::new();
    let mut shown = Dimensions::new(0, 0);
    let mut next_due = Instant::now();
    let mut failure = None;

    event_loop
        .run(|event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            }
            | Event::WindowEvent {
                event:
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                state: ElementState::Pressed,
                                ..
                            },
                        ..
                    },
                ..
            } => {
                info!("playback stopped by user");
                elwt.exit();
            }
            Event::WindowEvent {
                window_id,
                event: WindowEvent::RedrawRequested,
            } if window_id == window.id() => {
                if let Err(error) = present(&mut surface, &pixels, shown) {
                    failure = Some(error);
                    elwt.exit();
                }
            }
            Event::AboutToWait => {
                if Instant::now() >= next_due {
                    match advance(pipeline, writer, &mut scaler, &mut pixels) {
                        Ok(Some(dimensions)) => {
                            shown = dimensions;
                            window.request_redraw();
                            next_due = Instant::now() + options.delay;
                        }
                        Ok(None) => {
                            elwt.exit();
                            return;
                        }
                        Err(error) => {
                            failure = Some(error);
                            elwt.exit();
                            return;
                        }
                    }
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(next_due));
            }
            _ => {}
        })
        .map_err(display_error)?;

    failure.map_or(Ok(()), Err)
}

/// Pull the next frame through the pipeline into `pixels`
fn advance<W: Write>(
    pipeline: &mut Pipeline,
    writer: &mut YuvWriter<W>,
    scaler: &mut Scaler,
    pixels: &mut Vec<u32>,
) -> Result<Option<Dimensions>, VideoError> {
    let Some(frame) = pipeline.next_frame()? else {
        return Ok(None);
    };
    writer.write_frame(&frame)?;

    let rgb = scaler.convert(&frame)?;
    let dimensions = frame.dimensions();
    pixels.resize(dimensions.area(), 0);
    pack_rgb24(rgb, pixels);

    Ok(Some(dimensions))
}

fn present(
    surface: &mut Surface<Rc<Window>, Rc<Window>>,
    pixels: &[u32],
    size: Dimensions,
) -> Result<(), VideoError> {
    let (Some(width), Some(height)) =
        (NonZeroU32::new(size.width()), NonZeroU32::new(size.height()))
    else {
        // nothing decoded yet
        return Ok(());
    };

    surface.resize(width, height).map_err(display_error)?;
    let mut buffer = surface.buffer_mut().map_err(display_error)?;
    buffer.copy_from_slice(pixels);
    buffer.present().map_err(display_error)
}

fn display_error(error: impl std::fmt::Display) -> VideoError {
    VideoError::Display(error.to_string())
}
