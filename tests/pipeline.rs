mod common;

use ffmpeg_video_filter::{overlay_description, Dimensions, Pipeline, VideoError, YuvWriter};
use std::path::PathBuf;

#[test]
fn watermark_is_written_to_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_y4m(dir.path(), "clip.y4m", 16, 16, &[16, 16, 16]);
    let logo = common::write_y4m(dir.path(), "logo.y4m", 4, 4, &[235]);
    let output = dir.path().join("test.yuv");

    let mut pipeline = Pipeline::new(input, &overlay_description(&logo, 5, 5)).unwrap();
    assert_eq!(pipeline.dimensions(), Dimensions::new(16, 16));

    let mut writer = YuvWriter::create(&output).unwrap();
    while let Some(frame) = pipeline.next_frame().unwrap() {
        writer.write_frame(&frame).unwrap();
    }
    assert_eq!(writer.frames_written(), 3);
    assert_eq!(pipeline.frames_processed(), 3);
    writer.finish().unwrap();

    let frame_size = Dimensions::new(16, 16).yuv420p_size();
    let data = std::fs::read(&output).unwrap();
    assert_eq!(data.len(), 3 * frame_size);

    for frame in data.chunks_exact(frame_size) {
        assert!(common::luma_at(frame, 16, 6, 6) > 200);
        assert!(common::luma_at(frame, 16, 0, 0) < 40);
        assert!(common::luma_at(frame, 16, 15, 15) < 40);
    }

    // exhausted pipelines stay exhausted
    assert!(pipeline.next_frame().unwrap().is_none());
}

#[test]
fn memory_input_through_plain_graph() {
    let source = common::y4m(8, 6, &[40, 50, 60, 70]);
    let mut pipeline = Pipeline::new(source, "[in]null[out]").unwrap();

    let mut writer = YuvWriter::new(Vec::new());
    while let Some(frame) = pipeline.next_frame().unwrap() {
        writer.write_frame(&frame).unwrap();
    }
    let data = writer.finish().unwrap();

    let frame_size = Dimensions::new(8, 6).yuv420p_size();
    assert_eq!(data.len(), 4 * frame_size);
    let first_lumas: Vec<u8> = data.chunks_exact(frame_size).map(|f| f[0]).collect();
    assert_eq!(first_lumas, [40, 50, 60, 70]);
}

#[test]
fn missing_input() {
    let err = Pipeline::new(PathBuf::from("cuc_ieschool_missing.flv"), "[in]null[out]")
        .err()
        .unwrap();
    assert!(matches!(err, VideoError::UnableToOpenInput(_)), "{err}");
}

#[test]
fn missing_watermark() {
    let dir = tempfile::tempdir().unwrap();
    let input = common::write_y4m(dir.path(), "clip.y4m", 16, 16, &[16]);
    let description = overlay_description(&dir.path().join("no_logo.png"), 5, 5);

    assert!(Pipeline::new(input, &description).is_err());
}
