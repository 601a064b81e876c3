use std::fs;
use std::time::Duration;

use plotmap_core::{InputFile, Submission};
use plotmap_engine::{
    download_overlay, ensure_output_dir, write_atomically, EngineEvent, EngineHandle,
    FailureKind, FetchSettings, ReqwestFetcher, UploadSettings, DOWNLOAD_FILENAME,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect/></svg>"#;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();

    let first = write_atomically(temp.path(), DOWNLOAD_FILENAME, b"<svg/>").unwrap();
    assert_eq!(first.file_name().unwrap(), DOWNLOAD_FILENAME);
    assert_eq!(fs::read_to_string(&first).unwrap(), "<svg/>");

    let second = write_atomically(temp.path(), DOWNLOAD_FILENAME, b"<svg></svg>").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "<svg></svg>");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    assert!(write_atomically(&file_path, DOWNLOAD_FILENAME, b"data").is_err());
    assert!(!temp.path().join(DOWNLOAD_FILENAME).exists());
}

#[tokio::test]
async fn download_saves_overlay_as_interpolation_svg() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/42.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let saved = download_overlay(
        &fetcher,
        &format!("{}/results/42.svg", server.uri()),
        temp.path(),
    )
    .await
    .expect("download ok");

    assert_eq!(saved, temp.path().join("interpolation.svg"));
    assert_eq!(fs::read_to_string(saved).unwrap(), SVG);
}

#[tokio::test]
async fn download_accepts_any_content_type() {
    let png: &[u8] = b"\x89PNG\r\n\x1a\nfake";
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/42.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png, "image/png"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let fetcher = ReqwestFetcher::new(FetchSettings::default().for_download());
    let saved = download_overlay(
        &fetcher,
        &format!("{}/results/42.png", server.uri()),
        temp.path(),
    )
    .await
    .expect("download ok");

    assert_eq!(fs::read(saved).unwrap(), png);
}

#[test]
fn engine_downloads_non_svg_overlay() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/results/7.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(&b"png"[..], "image/png"))
            .mount(&server),
    );

    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(UploadSettings::default(), FetchSettings::default()).unwrap();
    engine.download(format!("{}/results/7.png", server.uri()), temp.path());

    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::DownloadCompleted { result: Ok(saved), .. }) => {
            assert_eq!(saved, temp.path().join(DOWNLOAD_FILENAME));
            assert_eq!(fs::read(saved).unwrap(), b"png");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn engine_reports_download_failure() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/gone.svg"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server),
    );

    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(UploadSettings::default(), FetchSettings::default()).unwrap();
    let url = format!("{}/gone.svg", server.uri());
    engine.download(url.clone(), temp.path());

    match engine.recv_timeout(Duration::from_secs(5)) {
        Some(EngineEvent::DownloadCompleted {
            url: reported,
            result: Err(err),
        }) => {
            assert_eq!(reported, url);
            assert!(matches!(
                err,
                plotmap_engine::DownloadError::Fetch(ref fetch) if fetch.kind == FailureKind::HttpStatus(410)
            ));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!temp.path().join(DOWNLOAD_FILENAME).exists());
}

#[test]
fn engine_upload_emits_progress_then_completion() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "warnings": ["sparse samples"] })),
            )
            .mount(&server),
    );

    let engine = EngineHandle::new(
        UploadSettings {
            api_base: server.uri(),
            ..UploadSettings::default()
        },
        FetchSettings::default(),
    )
    .unwrap();
    engine.upload(
        3,
        Submission {
            plot_files: vec![InputFile::new("plots.geojson", "{}")],
            sample_file: InputFile::new("samples.csv", "a,b\n"),
        },
    );

    let mut saw_progress = false;
    loop {
        match engine.recv_timeout(Duration::from_secs(5)) {
            Some(EngineEvent::UploadProgress(progress)) => {
                assert_eq!(progress.request_id, 3);
                saw_progress = true;
            }
            Some(EngineEvent::UploadCompleted { request_id, result }) => {
                assert_eq!(request_id, 3);
                let response = result.expect("upload ok");
                assert_eq!(response.warnings, Some(vec!["sparse samples".to_string()]));
                break;
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert!(saw_progress);
}
