use anyhow::{Context, Result};
use ffmpeg_video_filter::{Config, Pipeline, YuvWriter};
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::load()?;
    let description = config.filter_description();

    let mut pipeline = Pipeline::new(config.input.as_path(), &description)
        .with_context(|| format!("failed to set up filtering of {}", config.input.display()))?;
    let mut writer = YuvWriter::create(&config.output)
        .with_context(|| format!("failed to create {}", config.output.display()))?;

    play(&config, &mut pipeline, &mut writer)?;

    let frames = writer.frames_written();
    writer
        .finish()
        .with_context(|| format!("failed to flush {}", config.output.display()))?;
    info!(frames, output = %config.output.display(), "done");

    Ok(())
}

#[cfg(feature = "display")]
fn play<W: Write>(
    config: &Config,
    pipeline: &mut Pipeline,
    writer: &mut YuvWriter<W>,
) -> Result<()> {
    if config.no_display {
        return play_headless(pipeline, writer);
    }
    ffmpeg_video_filter::display::play(pipeline, writer, &config.display_options())?;
    Ok(())
}

#[cfg(not(feature = "display"))]
fn play<W: Write>(
    _config: &Config,
    pipeline: &mut Pipeline,
    writer: &mut YuvWriter<W>,
) -> Result<()> {
    play_headless(pipeline, writer)
}

fn play_headless<W: Write>(pipeline: &mut Pipeline, writer: &mut YuvWriter<W>) -> Result<()> {
    while let Some(frame) = pipeline.next_frame()? {
        writer.write_frame(&frame)?;
    }
    Ok(())
}
