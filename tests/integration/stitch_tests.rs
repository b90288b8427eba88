//! End-to-end stitching tests over the mock fetcher.
//!
//! Tests verify:
//! - One output image per figure, named `<slug>-<index>.<format>`
//! - Output dimensions match each figure's declared size
//! - Zoom discovery picks the deepest level
//! - Missing tiles and missing tile sets do not abort the run
//! - Sequential and concurrent downloads produce identical images

use image::Rgb;
use std::path::PathBuf;

use tile_stitcher::error::{AssembleError, ExtractError, FetchError, StitchError};
use tile_stitcher::sink::FileSink;
use tile_stitcher::stitch::{StitchContext, Stitcher};
use tile_stitcher::tile::{SkipReason, TileCoord};

use super::test_utils::{
    artwork_page, color_close, tile_color, MemorySink, MockFetcher, TestPyramid,
};

const PAGE_URL: &str = "https://catalog.example/artwork/vincent-van-gogh-starry-night";

// =============================================================================
// Multi-figure Runs
// =============================================================================

#[tokio::test]
async fn test_two_figures_produce_two_images() {
    let first =
        TestPyramid::new("https://tiles.example/fig-a/dztiles", 100, 70, 32).with_top_level(3);
    let second =
        TestPyramid::new("https://tiles.example/fig-b/dztiles", 45, 90, 16).with_top_level(1);

    let page = artwork_page(
        "starry-night",
        &[first.deep_zoom_json(), second.deep_zoom_json()],
    );
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, page)
        .with_pyramid(&first)
        .with_pyramid(&second);
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    let report = stitcher.run().await.unwrap();

    assert_eq!(report.slug, "starry-night");
    assert!(report.is_success());
    assert_eq!(report.figures.len(), 2);

    assert_eq!(
        sink.paths(),
        vec![
            PathBuf::from("out/starry-night-0.png"),
            PathBuf::from("out/starry-night-1.png"),
        ]
    );

    let image_a = sink.get("out/starry-night-0.png").unwrap();
    assert_eq!(image_a.dimensions(), (100, 70));
    let image_b = sink.get("out/starry-night-1.png").unwrap();
    assert_eq!(image_b.dimensions(), (45, 90));

    let saved: Vec<_> = report.saved().collect();
    assert_eq!(saved[0].zoom_level, 3);
    assert_eq!(saved[1].zoom_level, 1);
    assert_eq!((saved[1].width, saved[1].height), (45, 90));
}

#[tokio::test]
async fn test_tiles_are_placed_at_grid_offsets() {
    let pyramid = TestPyramid::new("https://tiles.example/art", 90, 50, 32).with_top_level(2);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("art", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid);
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    stitcher.run().await.unwrap();

    let image = sink.get("out/art-0.png").unwrap();
    for col in 0..3 {
        for row in 0..2 {
            let coord = TileCoord::new(col, row);
            // Top-left and bottom-right pixel of every tile
            let x0 = col * 32;
            let y0 = row * 32;
            let x1 = (x0 + 31).min(89);
            let y1 = (y0 + 31).min(49);
            assert_eq!(image.get_pixel(x0, y0), &Rgb(tile_color(coord)));
            assert_eq!(image.get_pixel(x1, y1), &Rgb(tile_color(coord)));
        }
    }
}

#[tokio::test]
async fn test_request_pattern() {
    let pyramid = TestPyramid::new("https://tiles.example/art", 40, 20, 16).with_top_level(2);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("art", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid);

    let stitcher = Stitcher::new(
        fetcher.clone(),
        MemorySink::new(),
        StitchContext::new(PAGE_URL, "out"),
    );
    stitcher.run().await.unwrap();

    let requests = fetcher.get_requests().await;
    assert_eq!(requests[0], PAGE_URL);
    assert_eq!(requests[1], "https://tiles.example/art/0/0_0.png");
    assert_eq!(requests[2], "https://tiles.example/art/1/0_0.png");
    assert_eq!(requests[3], "https://tiles.example/art/2/0_0.png");
    assert_eq!(requests[4], "https://tiles.example/art/3/0_0.png");
    // Columns outer, rows inner
    assert_eq!(
        &requests[5..],
        &[
            "https://tiles.example/art/2/0_0.png",
            "https://tiles.example/art/2/0_1.png",
            "https://tiles.example/art/2/1_0.png",
            "https://tiles.example/art/2/1_1.png",
            "https://tiles.example/art/2/2_0.png",
            "https://tiles.example/art/2/2_1.png",
        ]
    );
    assert_eq!(fetcher.request_count(), 11);
}

// =============================================================================
// Failure Tolerance
// =============================================================================

#[tokio::test]
async fn test_missing_tiles_are_reported() {
    let pyramid = TestPyramid::new("https://tiles.example/art", 64, 48, 16).with_top_level(1);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("art", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid)
        .without_resource(&pyramid.tile(1, 1))
        .with_resource(pyramid.tile(3, 0), "not an image");
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    let report = stitcher.run().await.unwrap();

    assert!(report.is_success());
    let saved: Vec<_> = report.saved().collect();
    let skipped = &saved[0].skipped;

    // 64x48 with 16px tiles: 5x4 grid, of which column 4 and row 3 lie past the edge
    let phantom = skipped
        .iter()
        .filter(|s| s.coord.col == 4 || s.coord.row == 3)
        .count();
    assert_eq!(phantom, 8);

    let missing = skipped.iter().find(|s| s.coord == TileCoord::new(1, 1)).unwrap();
    assert!(matches!(missing.reason, SkipReason::Fetch(FetchError::NotFound(_))));

    let corrupt = skipped.iter().find(|s| s.coord == TileCoord::new(3, 0)).unwrap();
    assert!(matches!(corrupt.reason, SkipReason::Decode(_)));

    let image = sink.get("out/art-0.png").unwrap();
    assert_eq!(image.dimensions(), (64, 48));
    assert_eq!(image.get_pixel(16, 16), &Rgb([0, 0, 0]));
    assert_eq!(image.get_pixel(48, 0), &Rgb([0, 0, 0]));
    assert_eq!(image.get_pixel(32, 16), &Rgb(tile_color(TileCoord::new(2, 1))));
}

#[tokio::test]
async fn test_figure_failure_does_not_stop_later_figures() {
    let broken = TestPyramid::new("https://tiles.example/broken", 30, 30, 16);
    let working = TestPyramid::new("https://tiles.example/working", 30, 30, 16).with_top_level(1);

    // Only the second figure's tiles are served
    let fetcher = MockFetcher::new()
        .with_resource(
            PAGE_URL,
            artwork_page("diptych", &[broken.deep_zoom_json(), working.deep_zoom_json()]),
        )
        .with_pyramid(&working);
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    let report = stitcher.run().await.unwrap();

    assert_eq!(report.figures.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        report.figures[0].result,
        Err(StitchError::Assemble(AssembleError::NoTileset { .. }))
    ));
    assert_eq!(report.figures[1].index, 1);
    assert!(report.figures[1].result.is_ok());

    assert_eq!(sink.paths(), vec![PathBuf::from("out/diptych-1.png")]);
}

#[tokio::test]
async fn test_figures_without_deep_zoom_keep_their_index() {
    let pyramid = TestPyramid::new("https://tiles.example/art", 20, 20, 16);
    let page = artwork_page(
        "sketch",
        &[serde_json::json!({ "deepZoom": null }), pyramid.deep_zoom_json()],
    );
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, page)
        .with_pyramid(&pyramid);
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    let report = stitcher.run().await.unwrap();

    assert_eq!(report.figures.len(), 1);
    assert_eq!(sink.paths(), vec![PathBuf::from("out/sketch-1.png")]);
}

#[tokio::test]
async fn test_page_without_payload_fails() {
    let fetcher = MockFetcher::new().with_resource(PAGE_URL, "<html><body>Artwork</body></html>");
    let stitcher = Stitcher::new(fetcher, MemorySink::new(), StitchContext::new(PAGE_URL, "out"));

    let result = stitcher.run().await;
    assert!(matches!(result, Err(StitchError::Extract(_))));
}

#[tokio::test]
async fn test_page_not_utf8_fails() {
    let mut body = artwork_page("art", &[]).into_bytes();
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    let fetcher = MockFetcher::new().with_resource(PAGE_URL, body);
    let stitcher = Stitcher::new(fetcher, MemorySink::new(), StitchContext::new(PAGE_URL, "out"));

    let result = stitcher.run().await;
    assert!(matches!(
        result,
        Err(StitchError::Extract(ExtractError::Encoding(_)))
    ));
}

#[tokio::test]
async fn test_slug_cannot_escape_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out");

    let pyramid = TestPyramid::new("https://tiles.example/art", 20, 20, 16);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("../escaped", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid);

    let stitcher = Stitcher::new(fetcher, FileSink, StitchContext::new(PAGE_URL, &output_dir));
    let result = stitcher.run().await;

    assert!(matches!(
        result,
        Err(StitchError::Extract(ExtractError::InvalidSlug(_)))
    ));
    assert!(!dir.path().join("escaped-0.png").exists());
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_format_cannot_escape_output_dir() {
    let pyramid =
        TestPyramid::new("https://tiles.example/art", 20, 20, 16).with_format("png/../../x");
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("art", &[pyramid.deep_zoom_json()]));
    let sink = MemorySink::new();

    let stitcher = Stitcher::new(fetcher, sink.clone(), StitchContext::new(PAGE_URL, "out"));
    let result = stitcher.run().await;

    assert!(matches!(
        result,
        Err(StitchError::Extract(ExtractError::InvalidDescriptor { figure: 0, .. }))
    ));
    assert!(sink.paths().is_empty());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_concurrent_download_matches_sequential() {
    let pyramid = TestPyramid::new("https://tiles.example/big", 150, 110, 16).with_top_level(2);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("big", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid)
        .without_resource(&pyramid.tile(4, 4));

    let sequential_sink = MemorySink::new();
    let sequential = Stitcher::new(
        fetcher.clone(),
        sequential_sink.clone(),
        StitchContext::new(PAGE_URL, "out"),
    );
    let sequential_report = sequential.run().await.unwrap();

    let concurrent_sink = MemorySink::new();
    let mut context = StitchContext::new(PAGE_URL, "out");
    context.concurrency = 8;
    let concurrent = Stitcher::new(fetcher, concurrent_sink.clone(), context);
    let concurrent_report = concurrent.run().await.unwrap();

    assert_eq!(
        sequential_sink.get("out/big-0.png").unwrap(),
        concurrent_sink.get("out/big-0.png").unwrap()
    );

    let seq_skipped = &sequential_report.saved().next().unwrap().skipped;
    let con_skipped = &concurrent_report.saved().next().unwrap().skipped;
    assert_eq!(seq_skipped, con_skipped);
}

// =============================================================================
// Writing to Disk
// =============================================================================

#[tokio::test]
async fn test_jpeg_output_written_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("downloads");

    let pyramid = TestPyramid::new("https://tiles.example/art", 70, 40, 32)
        .with_format("jpg")
        .with_top_level(1);
    let fetcher = MockFetcher::new()
        .with_resource(PAGE_URL, artwork_page("starry-night", &[pyramid.deep_zoom_json()]))
        .with_pyramid(&pyramid);

    let stitcher = Stitcher::new(fetcher, FileSink, StitchContext::new(PAGE_URL, &output_dir));
    let report = stitcher.run().await.unwrap();

    let expected = output_dir.join("starry-night-0.jpg");
    let saved: Vec<_> = report.saved().collect();
    assert_eq!(saved[0].path, expected);

    let image = image::open(&expected).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (70, 40));
    assert!(color_close(image.get_pixel(10, 10), tile_color(TileCoord::new(0, 0))));
    assert!(color_close(image.get_pixel(45, 20), tile_color(TileCoord::new(1, 0))));
}
