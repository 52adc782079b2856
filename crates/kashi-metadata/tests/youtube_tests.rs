use kashi_metadata::youtube::{YoutubeClient, YoutubeError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn watch_page(initial_data: serde_json::Value) -> String {
    format!(
        "<!DOCTYPE html><html><body><script nonce=\"x\">var ytInitialData = {};</script></body></html>",
        initial_data
    )
}

fn initial_data_with_card() -> serde_json::Value {
    json!({
        "engagementPanels": [{
            "engagementPanelSectionListRenderer": {
                "panelIdentifier": "engagement-panel-structured-description",
                "content": { "structuredDescriptionContentRenderer": { "items": [
                    { "horizontalCardListRenderer": { "cards": [
                        { "videoAttributeViewModel": {
                            "title": "アイドル",
                            "subtitle": "YOASOBI",
                            "image": { "sources": [ { "url": "https://i.ytimg.com/idol.jpg" } ] }
                        }}
                    ]}}
                ]}}
            }
        }]
    })
}

#[tokio::test]
async fn test_fetch_song_card_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "ZRtdQ81jPUQ"))
        .respond_with(ResponseTemplate::new(200).set_body_string(watch_page(initial_data_with_card())))
        .expect(1)
        .mount(&server)
        .await;

    let client = YoutubeClient::builder().base_url(server.uri()).build().unwrap();
    let card = client.fetch_song_card("ZRtdQ81jPUQ").await.unwrap().unwrap();

    assert_eq!(card.title, "アイドル");
    assert_eq!(card.artist, "YOASOBI");
    assert_eq!(card.thumbnail_url.as_deref(), Some("https://i.ytimg.com/idol.jpg"));
}

#[tokio::test]
async fn test_fetch_song_card_without_music_section() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(watch_page(json!({ "engagementPanels": [] }))),
        )
        .mount(&server)
        .await;

    let client = YoutubeClient::builder().base_url(server.uri()).build().unwrap();
    let card = client.fetch_song_card("abc123").await.unwrap();

    assert!(card.is_none());
}

#[tokio::test]
async fn test_fetch_song_card_handles_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = YoutubeClient::builder().base_url(server.uri()).build().unwrap();
    let result = client.fetch_song_card("abc123").await;

    assert!(matches!(result, Err(YoutubeError::HttpStatus { .. })));
}

#[tokio::test]
async fn test_fetch_song_card_rejects_bad_id_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = YoutubeClient::builder().base_url(server.uri()).build().unwrap();
    let result = client.fetch_song_card("../etc").await;

    assert!(matches!(result, Err(YoutubeError::InvalidVideoId(_))));
}
