use ffmpeg_video_filter::{
    BufferSourceArgs, Dimensions, FilterGraph, Frame, Rational, VideoError, YuvWriter,
};

const YUV420P: i32 = 0;

fn args(dimensions: Dimensions) -> BufferSourceArgs {
    BufferSourceArgs {
        dimensions,
        pixel_format: YUV420P,
        time_base: Rational::new(1, 25),
        pixel_aspect: Rational::new(1, 1),
    }
}

fn solid_frame(dimensions: Dimensions, luma: u8, pts: i64) -> Frame {
    let mut frame = Frame::new_yuv420p(dimensions).unwrap();
    for (plane, value) in frame.planes_mut().unwrap().into_iter().zip([luma, 128, 128]) {
        plane.0.fill(value);
    }
    frame.set_pts(Some(pts));
    frame
}

/// Push every frame, signal end of stream and collect everything the graph produces
fn run_graph(graph: &mut FilterGraph, frames: Vec<Frame>) -> Vec<Frame> {
    let mut out = Vec::new();
    for frame in frames {
        graph.push(frame).unwrap();
        while let Some(filtered) = graph.pull().unwrap() {
            out.push(filtered);
        }
    }

    graph.flush().unwrap();
    while let Some(filtered) = graph.pull().unwrap() {
        out.push(filtered);
    }
    out
}

fn luma(frame: &Frame, x: usize, y: usize) -> u8 {
    frame.planar().unwrap().rows(0).nth(y).unwrap()[x]
}

#[test]
fn passthrough() {
    let size = Dimensions::new(16, 16);
    let mut graph = FilterGraph::new("[in]null[out]", &args(size)).unwrap();
    assert_eq!(graph.output_dimensions(), size);

    let out = run_graph(&mut graph, vec![solid_frame(size, 50, 0), solid_frame(size, 60, 1)]);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].pts(), Some(0));
    assert_eq!(out[1].pts(), Some(1));
    assert!(out.iter().all(|frame| frame.is_yuv420p() && frame.dimensions() == size));
    assert_eq!(luma(&out[0], 3, 3), 50);
    assert_eq!(luma(&out[1], 3, 3), 60);

    // drained graphs stay empty
    assert!(graph.pull().unwrap().is_none());
}

#[test]
fn overlay_at_offset() {
    let size = Dimensions::new(16, 16);
    let mut graph = FilterGraph::new(
        "color=c=white:s=4x4[wm];[in][wm]overlay=5:5:shortest=1[out]",
        &args(size),
    )
    .unwrap();

    let out = run_graph(&mut graph, vec![solid_frame(size, 16, 0)]);
    assert_eq!(out.len(), 1);

    let frame = &out[0];
    assert!(luma(frame, 6, 6) > 200);
    assert!(luma(frame, 5, 5) > 200);
    assert!(luma(frame, 0, 0) < 40);
    assert!(luma(frame, 9, 9) < 40);
    assert!(luma(frame, 12, 12) < 40);
}

#[test]
fn flipped_frames_are_written_top_row_first() {
    let size = Dimensions::new(16, 4);
    let mut frame = Frame::new_yuv420p(size).unwrap();
    {
        let [(y, stride), (u, _), (v, _)] = frame.planes_mut().unwrap();
        for row in 0..4 {
            y[row * stride..row * stride + 16].fill(10 * (row as u8 + 1));
        }
        u.fill(128);
        v.fill(128);
    }

    let mut graph = FilterGraph::new("[in]vflip[out]", &args(size)).unwrap();
    let out = run_graph(&mut graph, vec![frame]);
    assert_eq!(out.len(), 1);

    let mut writer = YuvWriter::new(Vec::new());
    writer.write_frame(&out[0]).unwrap();
    let bytes = writer.finish().unwrap();

    assert_eq!(bytes.len(), size.yuv420p_size());
    let rows: Vec<u8> = bytes[..64].chunks(16).map(|row| row[0]).collect();
    assert_eq!(rows, [40, 30, 20, 10]);
    assert!(bytes[64..].iter().all(|&b| b == 128));
}

#[test]
fn output_size_follows_the_graph() {
    let mut graph = FilterGraph::new("[in]scale=8:6[out]", &args(Dimensions::new(16, 16))).unwrap();
    assert_eq!(graph.output_dimensions(), Dimensions::new(8, 6));

    let out = run_graph(&mut graph, vec![solid_frame(Dimensions::new(16, 16), 90, 0)]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].dimensions(), Dimensions::new(8, 6));
}

#[test]
fn unknown_filter() {
    let description = "[in]definitely_not_a_filter[out]";
    let err = FilterGraph::new(description, &args(Dimensions::new(16, 16)))
        .err()
        .unwrap();
    match err {
        VideoError::UnableToParseFilterGraph { description: d, .. } => assert_eq!(d, description),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn description_with_nul_byte() {
    let err = FilterGraph::new("[in]null\0[out]", &args(Dimensions::new(16, 16)))
        .err()
        .unwrap();
    assert!(matches!(err, VideoError::InvalidFilterDescription(_)), "{err}");
}
