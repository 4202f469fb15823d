//! Listing, download and availability.

use axum::http::StatusCode;

use homeshare_storage::lock::file_key;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_list_and_download_root() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let root = app.layout.upload_root();
    tokio::fs::write(root.join("b-notes.txt"), b"bbb").await.unwrap();
    tokio::fs::write(root.join("a-photo.png"), b"png!").await.unwrap();

    let listing = app
        .request("GET", "/api/folders/root/files", None, Some(&admin), None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    let entries = listing.body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["file_name"], "a-photo");
    assert_eq!(entries[0]["file_extension"], ".png");
    assert_eq!(entries[0]["file_size_bytes"], 4);

    let download = app
        .request(
            "GET",
            "/api/folders/root/files/b-notes.txt",
            None,
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.raw[..], b"bbb");
}

#[tokio::test]
async fn test_percent_encoded_root_folder() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let listing = app
        .request("GET", "/api/folders/%2F/files", None, Some(&admin), None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
}

#[tokio::test]
async fn test_availability_tracks_file_lock() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    tokio::fs::write(app.layout.upload_root().join("movie.mp4"), b"frames")
        .await
        .unwrap();
    let path = "/api/folders/root/files/movie.mp4/available";

    let guard = app.locks.try_lock(&file_key("/", "movie.mp4")).unwrap();
    let busy = app.request("GET", path, None, Some(&admin), None).await;
    assert_eq!(busy.status, StatusCode::SERVICE_UNAVAILABLE);

    drop(guard);
    let ready = app.request("GET", path, None, Some(&admin), None).await;
    assert_eq!(ready.status, StatusCode::OK);

    let missing = app
        .request(
            "GET",
            "/api/folders/root/files/ghost.mp4/available",
            None,
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
