use std::fs;

use clap::Parser;
use plotmap_app::{run_app, Cli};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;

#[test]
fn runs_analysis_and_downloads_overlay() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(async {
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "overlayUrl": format!("{}/results/run.svg", server.uri()),
                "bounds": [[10.0, 20.0], [11.0, 21.0]],
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/results/run.svg"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(SVG, "image/svg+xml"))
            .mount(&server)
            .await;
    });

    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("plotmap.ron");
    fs::write(&config, "(request_timeout_secs: 10)").unwrap();
    let plots = temp.path().join("plots.geojson");
    let samples = temp.path().join("samples.csv");
    fs::write(&plots, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    fs::write(&samples, "x,y,value\n").unwrap();
    let out = temp.path().join("out");

    let cli = Cli::try_parse_from([
        "plotmap".into(),
        "--config".into(),
        config.into_os_string(),
        "--api-url".into(),
        server.uri().into(),
        "--output-dir".into(),
        out.clone().into_os_string(),
        "--download".into(),
        plots.into_os_string(),
        samples.into_os_string(),
    ])
    .unwrap();

    run_app(cli).expect("run ok");
    assert_eq!(fs::read_to_string(out.join("interpolation.svg")).unwrap(), SVG);
}

#[test]
fn incomplete_inputs_fail_the_run() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());

    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("plotmap.ron");
    fs::write(&config, "(log_destination: terminal)").unwrap();
    let samples = temp.path().join("samples.csv");
    fs::write(&samples, "x,y,value\n").unwrap();

    let cli = Cli::try_parse_from([
        "plotmap".into(),
        "--config".into(),
        config.into_os_string(),
        "--api-url".into(),
        server.uri().into(),
        samples.into_os_string(),
    ])
    .unwrap();

    assert!(run_app(cli).is_err());
    let requests = rt.block_on(server.received_requests()).unwrap_or_default();
    assert!(requests.is_empty());
}
