mod common;

use ffmpeg_video_filter::{Dimensions, Rational, VideoDecoder, VideoError, VideoSource};
use std::path::PathBuf;

const LUMAS: [u8; 3] = [16, 80, 160];

fn run_decode_test(source: VideoSource) {
    let mut decoder = VideoDecoder::new(source).unwrap();

    // Check video dimensions are correct
    assert_eq!(decoder.dimensions(), Dimensions::new(16, 16));

    // Check video framerate is correct
    assert_eq!(decoder.framerate(), 25.0);
    assert_eq!(decoder.time_base(), Rational::new(1, 25));
    assert_eq!(decoder.stream_index(), 0);

    let mut count = 0;
    while let Some(frame) = decoder.next_frame().unwrap() {
        assert_eq!(frame.dimensions(), decoder.dimensions());
        assert_eq!(frame.pts(), Some(count as i64));

        let image = frame.planar().unwrap();
        let first_row = image.rows(0).next().unwrap();
        assert!(first_row.iter().all(|&y| y == LUMAS[count]));

        count += 1;
    }

    assert_eq!(count, LUMAS.len());
    // stays finished
    assert!(decoder.next_frame().unwrap().is_none());
}

#[test]
fn file() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_y4m(dir.path(), "test.y4m", 16, 16, &LUMAS);
    run_decode_test(source.into());
}

#[test]
fn unicode_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = common::write_y4m(dir.path(), "テスト.y4m", 16, 16, &LUMAS);
    run_decode_test(source.into());
}

#[test]
fn memory() {
    let source = common::y4m(16, 16, &LUMAS);
    run_decode_test(source.into());
}

#[test]
fn missing_file() {
    let source = PathBuf::from("definitely/not/here.flv");
    let err = VideoDecoder::new(source).err().unwrap();
    assert!(matches!(err, VideoError::UnableToOpenInput(_)), "{err}");
}

#[test]
fn not_a_video() {
    let source = b"this is plain text and not a media container\n".repeat(64);
    assert!(VideoDecoder::new(source).is_err());
}
