//! Host and client talking over real TCP sockets

use super::test_utils::{build, hash_map, install_fixture, without, write_fixture};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use treelink::config::SyncConfig;
use treelink::diff::diff;
use treelink::error::{ApiError, ProtocolError};
use treelink::protocol::Host;
use treelink::session::SyncSession;

async fn start_host(config: &SyncConfig) -> String {
    let host = Arc::new(Host::prepare(config).await.unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(host.serve(listener));
    addr
}

fn roots_config(install: &Path, config_root: Option<&Path>) -> SyncConfig {
    let mut config = SyncConfig::default();
    config.roots.install_root = install.to_path_buf();
    config.roots.config_root = config_root.map(Path::to_path_buf);
    config
}

#[tokio::test]
async fn test_sync_converges_client_onto_host() {
    let host_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();
    write_fixture(host_dir.path(), &install_fixture());
    write_fixture(client_dir.path(), &without(&install_fixture(), "Interior"));
    fs::write(client_dir.path().join("hi.txt"), "stale").unwrap();
    fs::write(client_dir.path().join("goodbye.txt"), "extra").unwrap();

    let addr = start_host(&roots_config(host_dir.path(), None)).await;
    let session = SyncSession::new(roots_config(client_dir.path(), None), &addr, false);

    let outcome = session.run(|_| Ok(true)).await.unwrap();
    assert!(outcome.applied);
    assert_eq!(outcome.diff.to_modify.len(), 1);
    assert_eq!(outcome.diff.to_delete.len(), 1);
    assert_eq!(
        fs::read_to_string(client_dir.path().join("Interior/deep/hihi.txt")).unwrap(),
        "hihi deep"
    );
    assert!(client_dir.path().join("Interior/empty").is_dir());
    assert!(!client_dir.path().join("goodbye.txt").exists());

    let after = session.compare().await.unwrap();
    assert!(after.is_empty());
    assert_eq!(hash_map(&build(host_dir.path())), hash_map(&build(client_dir.path())));
}

#[tokio::test]
async fn test_second_run_has_nothing_to_do() {
    let host_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();
    write_fixture(host_dir.path(), &install_fixture());
    write_fixture(client_dir.path(), &install_fixture());

    let addr = start_host(&roots_config(host_dir.path(), None)).await;
    let session = SyncSession::new(roots_config(client_dir.path(), None), &addr, false);

    let mut asked = false;
    let outcome = session
        .run(|_| {
            asked = true;
            Ok(true)
        })
        .await
        .unwrap();
    assert!(!asked);
    assert!(!outcome.applied);
    assert!(outcome.diff.is_empty());
}

#[tokio::test]
async fn test_declined_sync_leaves_client_untouched() {
    let host_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();
    write_fixture(host_dir.path(), &install_fixture());
    fs::write(client_dir.path().join("goodbye.txt"), "keep me").unwrap();

    let addr = start_host(&roots_config(host_dir.path(), None)).await;
    let session = SyncSession::new(roots_config(client_dir.path(), None), &addr, false);

    let outcome = session.run(|_| Ok(false)).await.unwrap();
    assert!(!outcome.applied);
    assert!(!outcome.diff.is_empty());
    assert!(outcome.fetched.is_empty());
    assert_eq!(
        fs::read_to_string(client_dir.path().join("goodbye.txt")).unwrap(),
        "keep me"
    );
    assert!(!client_dir.path().join("hi.txt").exists());
}

#[tokio::test]
async fn test_config_root_synced_alongside_install() {
    let host_install = TempDir::new().unwrap();
    let host_config = TempDir::new().unwrap();
    let client_install = TempDir::new().unwrap();
    let client_config = TempDir::new().unwrap();
    write_fixture(host_install.path(), &install_fixture());
    write_fixture(client_install.path(), &install_fixture());
    write_fixture(
        host_config.path(),
        &[
            ("Config", None),
            ("Config/ModsConfig.xml", Some("<activeMods/>")),
            ("Config/Prefs.xml", Some("<volume>0.5</volume>")),
        ],
    );
    write_fixture(
        client_config.path(),
        &[("Config", None), ("Config/Prefs.xml", Some("<volume>1.0</volume>"))],
    );

    let addr = start_host(&roots_config(host_install.path(), Some(host_config.path()))).await;
    let session = SyncSession::new(
        roots_config(client_install.path(), Some(client_config.path())),
        &addr,
        true,
    );

    let outcome = session.run(|_| Ok(true)).await.unwrap();
    assert!(outcome.applied);
    assert_eq!(outcome.fetched.len(), 2);
    assert_eq!(
        fs::read_to_string(client_config.path().join("Config/ModsConfig.xml")).unwrap(),
        "<activeMods/>"
    );
    assert_eq!(
        fs::read_to_string(client_config.path().join("Config/Prefs.xml")).unwrap(),
        "<volume>0.5</volume>"
    );
    assert!(diff(&build(host_config.path()), &build(client_config.path())).is_empty());
}

#[tokio::test]
async fn test_config_compare_without_host_config_fails() {
    let host_dir = TempDir::new().unwrap();
    let client_install = TempDir::new().unwrap();
    let client_config = TempDir::new().unwrap();
    write_fixture(host_dir.path(), &install_fixture());
    write_fixture(client_install.path(), &install_fixture());

    let addr = start_host(&roots_config(host_dir.path(), None)).await;
    let session = SyncSession::new(
        roots_config(client_install.path(), Some(client_config.path())),
        &addr,
        true,
    );

    // The host drops the connection without a reply
    let result = session.compare().await;
    assert!(matches!(result, Err(ApiError::ProtocolError(_))));
}

#[tokio::test]
async fn test_connection_refused_is_connect_error() {
    let client_dir = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let session = SyncSession::new(roots_config(client_dir.path(), None), &addr, false);
    let result = session.compare().await;
    assert!(matches!(
        result,
        Err(ApiError::ProtocolError(ProtocolError::Connect { .. }))
    ));
}

#[tokio::test]
async fn test_bad_connections_do_not_stop_the_host() {
    let host_dir = TempDir::new().unwrap();
    let client_dir = TempDir::new().unwrap();
    write_fixture(host_dir.path(), &install_fixture());
    write_fixture(client_dir.path(), &without(&install_fixture(), "bye.py"));

    let addr = start_host(&roots_config(host_dir.path(), None)).await;

    // Unknown command byte: dropped without a reply
    let mut stream = TcpStream::connect(&addr).await.unwrap();
    stream.write_all(&[0x77]).await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    assert!(reply.is_empty());

    // Compare whose frame ends early
    let mut stream = TcpStream::connect(&addr).await.unwrap();
    stream.write_all(&[0x00]).await.unwrap();
    stream.write_all(&50u64.to_be_bytes()).await.unwrap();
    stream.write_all(b"abc").await.unwrap();
    drop(stream);

    let session = SyncSession::new(roots_config(client_dir.path(), None), &addr, false);
    let outcome = session.run(|_| Ok(true)).await.unwrap();
    assert!(outcome.applied);
    assert_eq!(outcome.fetched.len(), 1);
    assert_eq!(outcome.fetched[0].relative_path, "bye.py");
    assert_eq!(
        fs::read_to_string(client_dir.path().join("bye.py")).unwrap(),
        "print('bye')"
    );
}
