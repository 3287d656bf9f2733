//! Tests for the import CLI command
//!
//! History databases are built on the fly and pages are served from a
//! local listener, so no browser or outside network is needed.

use crate::cli::test_helpers::create_cli_test_services;
use crate::common::page_html;
use hister::cli::commands::import::{execute, read_history, Browser, ImportArgs};
use hister::cli::OutputFormat;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// History database with the browser's table and `(url, visit_count)` rows
async fn history_db(dir: &TempDir, browser: Browser, rows: &[(&str, i64)]) -> PathBuf {
    let (file, table) = match browser {
        Browser::Firefox => ("places.sqlite", "moz_places"),
        Browser::Chrome => ("History", "urls"),
    };
    let path = dir.path().join(file);

    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .unwrap();

    sqlx::query(&format!(
        "CREATE TABLE {table} (id INTEGER PRIMARY KEY, url TEXT NOT NULL, \
         title TEXT, visit_count INTEGER NOT NULL DEFAULT 0)"
    ))
    .execute(&mut conn)
    .await
    .unwrap();

    for (url, visits) in rows {
        sqlx::query(&format!(
            "INSERT INTO {table} (url, title, visit_count) VALUES (?1, ?2, ?3)"
        ))
        .bind(*url)
        .bind("stored title")
        .bind(*visits)
        .execute(&mut conn)
        .await
        .unwrap();
    }

    conn.close().await.unwrap();
    path
}

/// Serve `page_html("Page <path>", ..)` for every request; returns the base URL
async fn serve_pages() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let body = page_html(&format!("Page {path}"), "imported from history");
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{addr}")
}

fn args(browser: Browser, db_path: PathBuf) -> ImportArgs {
    ImportArgs {
        browser,
        db_path,
        min_visit: 1,
        quiet: true,
    }
}

/// Test that Firefox URLs come back most visited first
#[tokio::test]
async fn test_read_firefox_history_most_visited_first() {
    let temp = TempDir::new().unwrap();
    let db = history_db(
        &temp,
        Browser::Firefox,
        &[
            ("https://a.example/", 1),
            ("https://b.example/", 5),
            ("https://c.example/", 3),
            ("https://never.example/", 0),
        ],
    )
    .await;

    let urls = read_history(Browser::Firefox, &db, 1).await.unwrap();
    assert_eq!(
        urls,
        vec![
            "https://b.example/",
            "https://c.example/",
            "https://a.example/",
            "https://never.example/",
        ]
    );
}

/// Test that --min-visit drops rarely visited URLs
#[tokio::test]
async fn test_read_history_min_visit() {
    let temp = TempDir::new().unwrap();
    let db = history_db(
        &temp,
        Browser::Firefox,
        &[
            ("https://a.example/", 1),
            ("https://b.example/", 5),
            ("https://c.example/", 3),
        ],
    )
    .await;

    let urls = read_history(Browser::Firefox, &db, 3).await.unwrap();
    assert_eq!(urls, vec!["https://b.example/", "https://c.example/"]);
}

/// Test that Chrome history is read from the urls table
#[tokio::test]
async fn test_read_chrome_history() {
    let temp = TempDir::new().unwrap();
    let db = history_db(
        &temp,
        Browser::Chrome,
        &[("https://x.example/", 2), ("https://y.example/", 7)],
    )
    .await;

    let urls = read_history(Browser::Chrome, &db, 1).await.unwrap();
    assert_eq!(urls, vec!["https://y.example/", "https://x.example/"]);

    assert!(read_history(Browser::Firefox, &db, 1).await.is_err());
}

/// Test that fetched pages are indexed and unreachable ones do not stop the import
#[tokio::test]
async fn test_import_indexes_pages_and_continues_on_failure() {
    let (services, temp) = create_cli_test_services();
    let base = serve_pages().await;
    let first = format!("{base}/first");
    let second = format!("{base}/second");

    let db = history_db(
        &temp,
        Browser::Firefox,
        &[
            (first.as_str(), 4),
            ("http://127.0.0.1:1/unreachable", 3),
            (second.as_str(), 2),
        ],
    )
    .await;

    let result = execute(args(Browser::Firefox, db), &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Import should succeed: {:?}", result.err());

    assert_eq!(services.indexer.count().unwrap(), 2);
    let stored = services.indexer.get_by_url(&first).unwrap().unwrap();
    assert_eq!(stored.title, "Page /first");
    assert!(services.indexer.get_by_url(&second).unwrap().is_some());
}

/// Test that a missing database is an error
#[tokio::test]
async fn test_import_missing_database() {
    let (services, temp) = create_cli_test_services();
    let result = execute(
        args(Browser::Chrome, temp.path().join("missing")),
        &services,
        OutputFormat::Json,
    )
    .await;
    assert!(result.is_err());
}

/// Test that an empty history is an error
#[tokio::test]
async fn test_import_empty_history() {
    let (services, temp) = create_cli_test_services();
    let db = history_db(&temp, Browser::Chrome, &[]).await;

    let result = execute(args(Browser::Chrome, db), &services, OutputFormat::Human).await;
    assert!(result.unwrap_err().to_string().contains("No URLs found"));
}
