//! Integration tests for the image harvester
//!
//! These tests serve generated images from a wiremock server and run the
//! harvester with the real HTTP fetcher.

use hero_harvest::config::{FetchConfig, HarvestConfig};
use hero_harvest::crawler::{FetchError, HttpFetcher, ImageFetcher};
use hero_harvest::harvest::{QualityWarning, Rejection};
use hero_harvest::{CandidateImage, Harvester};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Uncompressed BMP of a solid color, well above the byte minimum
fn bmp(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
        .write_to(&mut buf, ImageFormat::Bmp)
        .expect("Failed to encode BMP");
    buf.into_inner()
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetchConfig::default()).expect("Failed to build fetcher")
}

async fn serve(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/bmp")
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

/// HEAD is answered with 405 so every probe reports an unknown size
async fn refuse_head(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    let body = bmp(10, 10, [1, 2, 3]);
    serve(&server, "/a.bmp", body.clone()).await;

    let url = Url::parse(&format!("{}/a.bmp", server.uri())).unwrap();
    let fetched = fetcher().fetch(&url).await.unwrap();

    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_fetch_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/missing.jpg", server.uri())).unwrap();
    let result = fetcher().fetch(&url).await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_probe_non_success_is_unknown() {
    let server = MockServer::start().await;
    refuse_head(&server).await;

    let url = Url::parse(&format!("{}/a.jpg", server.uri())).unwrap();
    assert_eq!(fetcher().probe_size(&url).await, None);
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&FetchConfig {
        fetch_timeout_secs: 1,
        ..FetchConfig::default()
    })
    .unwrap();
    let url = Url::parse(&format!("{}/slow.jpg", server.uri())).unwrap();

    assert!(matches!(
        fetcher.fetch(&url).await,
        Err(FetchError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_harvest_picks_four_largest_in_area_order() {
    let server = MockServer::start().await;
    refuse_head(&server).await;

    // Document order differs from area order
    let sizes = [(610, 820), (700, 1000), (800, 1200), (620, 850), (650, 900)];
    let mut candidates = Vec::new();
    for (i, (w, h)) in sizes.iter().enumerate() {
        let route = format!("/photos/{}.bmp", i);
        serve(&server, &route, bmp(*w, *h, [20 * i as u8 + 10, 60, 90])).await;
        candidates.push(CandidateImage::new(route, *w, *h));
    }

    let page_url = format!("{}/listing/17", server.uri());
    let report = Harvester::new(HarvestConfig::default())
        .harvest(&page_url, &candidates, &fetcher())
        .await;

    let dims: Vec<(u32, u32)> = report
        .accepted
        .iter()
        .map(|img| (img.width, img.height))
        .collect();
    assert_eq!(dims, vec![(800, 1200), (700, 1000), (650, 900), (620, 850)]);
    assert_eq!(report.budget_per_image_kib, Some(25.0));
    for img in &report.accepted {
        assert!(img.bytes.len() < img.original_size);
        assert!(image::load_from_memory(&img.bytes).is_ok());
    }
}

#[tokio::test]
async fn test_harvest_mixed_page() {
    let server = MockServer::start().await;
    refuse_head(&server).await;

    let photo = bmp(900, 600, [40, 80, 120]);
    serve(&server, "/hero.bmp", photo.clone()).await;
    serve(&server, "/hero-copy.bmp", photo).await;
    serve(&server, "/blank.bmp", bmp(1000, 700, [255, 255, 255])).await;
    serve(&server, "/square.bmp", bmp(700, 680, [10, 10, 10])).await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let candidates = vec![
        CandidateImage::new("/logo.png", 120, 40),
        CandidateImage::new("/gone.jpg", 1600, 1200),
        CandidateImage::new("/blank.bmp", 1000, 700),
        CandidateImage::new("/hero.bmp", 900, 600),
        CandidateImage::new("/hero-copy.bmp", 900, 600),
        CandidateImage::new("/square.bmp", 700, 680),
    ];

    let page_url = format!("{}/listing/3", server.uri());
    let report = Harvester::new(HarvestConfig::default())
        .harvest(&page_url, &candidates, &fetcher())
        .await;

    assert_eq!(report.accepted.len(), 1);
    assert!(report.accepted[0].source_url.ends_with("/hero.bmp"));
    assert_eq!(report.budget_per_image_kib, Some(100.0));
    assert!(report.accepted[0].bytes.len() <= 100 * 1024);

    assert_eq!(report.qualifying, 5);
    assert_eq!(report.rejections(|r| matches!(r, Rejection::DeclaredTooSmall { .. })), 1);
    assert_eq!(report.rejections(|r| matches!(r, Rejection::FetchFailed(_))), 1);
    assert_eq!(report.rejections(|r| *r == Rejection::NearBlank), 1);
    assert_eq!(report.rejections(|r| *r == Rejection::Duplicate), 1);
    assert_eq!(report.rejections(|r| matches!(r, Rejection::TooSquare { .. })), 1);
}

#[tokio::test]
async fn test_harvest_keeps_last_option_with_warning() {
    let server = MockServer::start().await;
    refuse_head(&server).await;
    serve(&server, "/square.bmp", bmp(700, 650, [10, 90, 10])).await;

    let candidates = vec![CandidateImage::new("/square.bmp", 700, 650)];
    let page_url = format!("{}/listing/9", server.uri());
    let report = Harvester::new(HarvestConfig::default())
        .harvest(&page_url, &candidates, &fetcher())
        .await;

    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.accepted[0].warnings, vec![QualityWarning::TooSquare]);
}
