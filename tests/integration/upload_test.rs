//! Chunked uploads over multipart.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{ChunkUpload, TestApp, md5_hex};

#[tokio::test]
async fn test_chunks_assemble_into_root() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let parts: [&[u8]; 3] = [b"first-", b"second-", b"third"];
    let hash = md5_hex(&parts.concat());
    let transfer = Uuid::new_v4().to_string();

    // Out of order on purpose.
    for (step, index) in [2u32, 0, 1].into_iter().enumerate() {
        let response = app
            .upload(
                ChunkUpload {
                    transfer_id: &transfer,
                    folder_id: "/",
                    file_name: "report",
                    file_extension: ".txt",
                    file_hash: &hash,
                    chunk_index: index,
                    total_chunks: 3,
                    chunk: parts[index as usize],
                },
                &admin,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        assert_eq!(response.body["received_chunks"], step as u64 + 1);
        assert_eq!(response.body["assembling"], step == 2);
    }

    app.tasks.wait_idle().await;

    let published = app.layout.upload_root().join("report.txt");
    assert_eq!(
        tokio::fs::read(&published).await.unwrap(),
        b"first-second-third".to_vec()
    );
}

#[tokio::test]
async fn test_hash_mismatch_publishes_nothing() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let transfer = Uuid::new_v4().to_string();

    let response = app
        .upload(
            ChunkUpload {
                transfer_id: &transfer,
                folder_id: "/",
                file_name: "broken",
                file_extension: ".txt",
                file_hash: &md5_hex(b"something else"),
                chunk_index: 0,
                total_chunks: 1,
                chunk: b"payload",
            },
            &admin,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    app.tasks.wait_idle().await;

    assert!(!app.layout.upload_root().join("broken.txt").exists());
    assert!(!app.layout.upload_root().join("chunks").join(&transfer).exists());
}

#[tokio::test]
async fn test_write_share_can_upload_into_its_folder() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let created = app
        .request(
            "POST",
            "/api/shares",
            Some(json!({
                "folder_name": "drop box",
                "otp": "123456",
                "access": "w",
                "expiration_date": (Utc::now() + Duration::hours(2)).to_rfc3339(),
            })),
            Some(&admin),
            None,
        )
        .await;
    let folder_id = created.body["folder_id"].as_str().unwrap().to_string();
    let redeemed = app
        .request(
            "POST",
            "/api/shares/redeem",
            Some(json!({"link_url": created.body["link_id"], "otp": "123456"})),
            None,
            None,
        )
        .await;
    let writer = redeemed.body["access_token"].as_str().unwrap().to_string();

    let data = b"%PDF-1.7 tiny";
    let response = app
        .upload(
            ChunkUpload {
                transfer_id: &Uuid::new_v4().to_string(),
                folder_id: &folder_id,
                file_name: "invoice",
                file_extension: ".pdf",
                file_hash: &md5_hex(data),
                chunk_index: 0,
                total_chunks: 1,
                chunk: data,
            },
            &writer,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    app.tasks.wait_idle().await;
    assert!(app.layout.folder_path(&folder_id).unwrap().join("invoice.pdf").is_file());

    // Write-only scope cannot upload to the root area.
    let denied = app
        .upload(
            ChunkUpload {
                transfer_id: &Uuid::new_v4().to_string(),
                folder_id: "/",
                file_name: "invoice",
                file_extension: ".pdf",
                file_hash: &md5_hex(data),
                chunk_index: 0,
                total_chunks: 1,
                chunk: data,
            },
            &writer,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_chunks_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let transfer = Uuid::new_v4().to_string();
    let hash = md5_hex(b"x");

    let bad_extension = app
        .upload(
            ChunkUpload {
                transfer_id: &transfer,
                folder_id: "/",
                file_name: "payload",
                file_extension: ".exe",
                file_hash: &hash,
                chunk_index: 0,
                total_chunks: 1,
                chunk: b"x",
            },
            &admin,
        )
        .await;
    assert_eq!(bad_extension.status, StatusCode::BAD_REQUEST);

    let out_of_range = app
        .upload(
            ChunkUpload {
                transfer_id: &transfer,
                folder_id: "/",
                file_name: "payload",
                file_extension: ".txt",
                file_hash: &hash,
                chunk_index: 1,
                total_chunks: 1,
                chunk: b"x",
            },
            &admin,
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);

    let missing_folder = app
        .upload(
            ChunkUpload {
                transfer_id: &transfer,
                folder_id: "no-such-share",
                file_name: "payload",
                file_extension: ".txt",
                file_hash: &hash,
                chunk_index: 0,
                total_chunks: 1,
                chunk: b"x",
            },
            &admin,
        )
        .await;
    assert_eq!(missing_folder.status, StatusCode::NOT_FOUND);
}
