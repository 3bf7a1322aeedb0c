//! Integration tests for the crawl driver
//!
//! Pages come from a fixture renderer; their images are served by a
//! wiremock server and downloaded with the real HTTP fetcher.

use async_trait::async_trait;
use hero_harvest::config::{Config, FetchConfig, HarvestConfig};
use hero_harvest::crawler::{
    prepare_url_list, resume_index, CrawlDriver, HttpFetcher, PageRenderer, RenderError,
    RenderedPage,
};
use hero_harvest::output::OutputStore;
use hero_harvest::{CandidateImage, Harvester, UrlEntry, UrlList};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns canned pages and remembers what it was asked to render
#[derive(Default)]
struct FixtureRenderer {
    pages: HashMap<String, RenderedPage>,
    rendered: Vec<String>,
    closed: bool,
}

impl FixtureRenderer {
    fn page(&mut self, url: &str, title: &str, images: Vec<CandidateImage>) {
        self.pages.insert(
            url.to_string(),
            RenderedPage {
                title: title.to_string(),
                images,
            },
        );
    }
}

#[async_trait]
impl PageRenderer for FixtureRenderer {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
        self.rendered.push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| RenderError::Timeout {
            url: url.to_string(),
            secs: 30,
        })
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        Ok(())
    }
}

fn bmp(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
        .write_to(&mut buf, ImageFormat::Bmp)
        .expect("Failed to encode BMP");
    buf.into_inner()
}

async fn image_server(images: &[(&str, Vec<u8>)]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    for (route, body) in images {
        Mock::given(method("GET"))
            .and(path(*route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;
    }
    server
}

fn url_list(urls: &[String]) -> UrlList {
    UrlList::from_entries(urls.iter().map(|u| UrlEntry::new(u.as_str())).collect())
}

fn driver(list: UrlList, dir: &Path) -> CrawlDriver {
    CrawlDriver::new(
        list,
        dir.join("final_urls.json"),
        OutputStore::new(dir.join("screenshots")),
        Harvester::new(HarvestConfig::default()),
    )
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetchConfig::default()).expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_crawl_writes_images_and_titles() {
    let server = image_server(&[
        ("/a/front.bmp", bmp(900, 600, [200, 40, 40])),
        ("/a/yard.bmp", bmp(600, 900, [40, 200, 40])),
        ("/b/front.bmp", bmp(1200, 800, [40, 40, 200])),
    ])
    .await;
    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/listing/a", server.uri()),
        format!("{}/listing/b", server.uri()),
    ];

    let mut renderer = FixtureRenderer::default();
    renderer.page(
        &urls[0],
        "Realty | Springfield, Illinois 62704 | Listing",
        vec![
            CandidateImage::new("/a/front.bmp", 900, 600),
            CandidateImage::new("/a/yard.bmp", 600, 900),
            CandidateImage::new("/icons/share.svg", 24, 24),
        ],
    );
    renderer.page(
        &urls[1],
        "Modern home for sale",
        vec![CandidateImage::new("/b/front.bmp", 1200, 800)],
    );

    let mut driver = driver(url_list(&urls), dir.path());
    let summary = driver.run(&mut renderer, &fetcher(), 0).await.unwrap();

    assert_eq!(summary.pages_persisted, 2);
    assert_eq!(summary.images_saved, 3);

    let store = OutputStore::new(dir.path().join("screenshots"));
    assert!(store.image_path(0, 1).exists());
    assert!(store.image_path(0, 2).exists());
    assert!(!store.image_path(0, 3).exists());
    assert!(store.image_path(1, 1).exists());
    assert!(!store.image_path(1, 2).exists());

    let total: u64 = (1..=2)
        .map(|slot| fs::metadata(store.image_path(0, slot)).unwrap().len())
        .sum();
    assert!(total <= 100 * 1024);

    let saved = UrlList::load(&dir.path().join("final_urls.json")).unwrap();
    assert_eq!(saved.get(0).unwrap().title, "Springfield, Illinois 62704");
    assert_eq!(saved.get(1).unwrap().title, "<bad>Modern home for sale");
}

#[tokio::test]
async fn test_shared_image_saved_for_each_page() {
    let banner = bmp(900, 600, [90, 90, 30]);
    let server = image_server(&[("/banner.bmp", banner)]).await;
    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/listing/1", server.uri()),
        format!("{}/listing/2", server.uri()),
    ];

    let mut renderer = FixtureRenderer::default();
    for url in &urls {
        renderer.page(url, "", vec![CandidateImage::new("/banner.bmp", 900, 600)]);
    }

    let mut driver = driver(url_list(&urls), dir.path());
    let summary = driver.run(&mut renderer, &fetcher(), 0).await.unwrap();

    assert_eq!(summary.images_saved, 2);
    let store = OutputStore::new(dir.path().join("screenshots"));
    assert!(store.image_path(0, 1).exists());
    assert!(store.image_path(1, 1).exists());
}

#[tokio::test]
async fn test_failed_page_leaves_no_output() {
    let server = image_server(&[("/ok.bmp", bmp(900, 600, [30, 60, 90]))]).await;
    let dir = tempdir().unwrap();
    let urls = vec![
        format!("{}/listing/broken", server.uri()),
        format!("{}/listing/ok", server.uri()),
    ];

    let mut renderer = FixtureRenderer::default();
    renderer.page(&urls[1], "", vec![CandidateImage::new("/ok.bmp", 900, 600)]);

    let mut driver = driver(url_list(&urls), dir.path());
    let summary = driver.run(&mut renderer, &fetcher(), 0).await.unwrap();

    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.pages_persisted, 1);
    let store = OutputStore::new(dir.path().join("screenshots"));
    assert_eq!(store.clear_page(0).unwrap(), 0);
    assert!(store.image_path(1, 1).exists());
}

#[tokio::test]
async fn test_resume_reprocesses_marker_page() {
    let server = image_server(&[
        ("/p2.bmp", bmp(900, 600, [10, 120, 10])),
        ("/p3.bmp", bmp(600, 900, [120, 10, 10])),
    ])
    .await;
    let dir = tempdir().unwrap();
    let urls: Vec<String> = (0..4)
        .map(|i| format!("{}/listing/{}", server.uri(), i))
        .collect();

    let store = OutputStore::new(dir.path().join("screenshots"));
    store.ensure_dir().unwrap();
    fs::write(store.image_path(0, 1), b"done").unwrap();
    fs::write(store.image_path(2, 1), b"partial").unwrap();
    fs::write(store.image_path(2, 3), b"stale").unwrap();

    let start = resume_index(&store, false).unwrap();
    assert_eq!(start, 2);

    let mut renderer = FixtureRenderer::default();
    renderer.page(&urls[2], "", vec![CandidateImage::new("/p2.bmp", 900, 600)]);
    renderer.page(&urls[3], "", vec![CandidateImage::new("/p3.bmp", 600, 900)]);

    let mut driver = driver(url_list(&urls), dir.path());
    driver.run(&mut renderer, &fetcher(), start).await.unwrap();

    assert_eq!(renderer.rendered, vec![urls[2].clone(), urls[3].clone()]);
    assert_eq!(fs::read(store.image_path(0, 1)).unwrap(), b"done");
    assert_ne!(fs::read(store.image_path(2, 1)).unwrap(), b"partial");
    assert!(!store.image_path(2, 3).exists());
    assert!(store.image_path(3, 1).exists());
    assert_eq!(store.resume_marker().unwrap(), Some(3));
}

#[tokio::test]
async fn test_renderer_close_is_callers_choice() {
    let dir = tempdir().unwrap();
    let mut renderer = FixtureRenderer::default();
    let mut driver = driver(url_list(&["https://example.com/x".to_string()]), dir.path());

    let summary = driver.run(&mut renderer, &fetcher(), 0).await.unwrap();
    renderer.close().await.unwrap();

    assert_eq!(summary.pages_failed, 1);
    assert!(renderer.closed);
}

#[test]
fn test_prepare_url_list_merges_input_file() {
    let dir = tempdir().unwrap();
    let list_path = dir.path().join("final_urls.json");
    let merge_path = dir.path().join("urls.txt");
    fs::write(
        &list_path,
        r#"{"urls": ["https://example.com/a/", {"url": "https://example.com/b", "title": "Old"}]}"#,
    )
    .unwrap();
    fs::write(
        &merge_path,
        "https://example.com/a?utm=1\n\nhttps://example.com/c#top\n",
    )
    .unwrap();

    let mut config = Config::default();
    config.paths.url_list = list_path.display().to_string();
    config.paths.merge_file = merge_path.display().to_string();

    let list = prepare_url_list(&config).unwrap();

    let urls: Vec<&str> = list.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://example.com/a", "https://example.com/b", "https://example.com/c"]
    );
    assert_eq!(list.get(1).unwrap().title, "Old");
    assert_eq!(UrlList::load(&list_path).unwrap(), list);
}

#[test]
fn test_prepare_url_list_without_inputs_is_fatal() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.paths.url_list = dir.path().join("final_urls.json").display().to_string();
    config.paths.merge_file = dir.path().join("urls.txt").display().to_string();

    assert!(prepare_url_list(&config).is_err());
}
