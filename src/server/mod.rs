//! Static file server: serves one directory over plain HTTP until Ctrl-C.
//!
//! Requests are handled by a single axum fallback handler on a current-thread
//! tokio runtime.

pub mod error;
pub mod handlers;
pub mod listing;

use crate::domain::models::ServeConfig;
use crate::infra::output::Console;
use anyhow::{Context, bail};
use axum::Router;
use handlers::{ServerState, serve_static};
use log::{error, info};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn build_router(root: PathBuf) -> Router {
    let state = ServerState {
        root: Arc::new(root),
    };
    Router::new().fallback(serve_static).with_state(state)
}

/// Resolves the serving directory to a canonical path.
pub fn resolve_serving_root(directory: &Path) -> anyhow::Result<PathBuf> {
    if !directory.exists() {
        bail!("Serving directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Serving path is not a directory: {}", directory.display());
    }
    directory
        .canonicalize()
        .with_context(|| format!("Could not resolve serving directory {}", directory.display()))
}

/// Serves requests from `root` on `listener` until `shutdown` resolves, then
/// closes the listener.
pub async fn serve_until<F>(
    listener: TcpListener,
    root: PathBuf,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(root))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

pub async fn serve(config: &ServeConfig) -> anyhow::Result<()> {
    let root = resolve_serving_root(&config.directory)?;
    info!("Serving files from: {}", root.display());

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    Console::Stdout.notice(&format!("Serving at http://127.0.0.1:{}", config.port))?;

    serve_until(listener, root, shutdown_signal())
        .await
        .context("Server error")?;

    Console::Stdout.notice("\nServer stopped.")?;
    Ok(())
}

/// Blocking entry point: runs the server on a single-threaded runtime.
pub fn run(config: &ServeConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    runtime.block_on(serve(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::SocketAddr;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn request(addr: SocketAddr, raw: &str) -> String {
        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(raw.as_bytes()).await.unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn public_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("public");
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::create_dir_all(root.join("site")).unwrap();
        fs::write(root.join("hello.txt"), "hello world").unwrap();
        fs::write(root.join("docs/guide.md"), "# Guide").unwrap();
        fs::write(root.join("site/index.html"), "<h1>home</h1>").unwrap();
        let root = resolve_serving_root(&root).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_resolve_serving_root_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_serving_root(&temp_dir.path().join("public")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_serves_files_until_shutdown() {
        let (_temp_dir, root) = public_dir();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(listener, root, async move {
            let _ = rx.await;
        }));

        let first = request(addr, "GET /hello.txt HTTP/1.0\r\n\r\n").await;
        assert!(first.contains("200 OK"));
        assert!(first.to_lowercase().contains("content-type: text/plain"));
        assert!(first.to_lowercase().contains("last-modified:"));
        assert!(first.ends_with("hello world"));

        // Still serving after the first request.
        let second = request(addr, "GET /docs/guide.md HTTP/1.0\r\n\r\n").await;
        assert!(second.contains("200 OK"));
        assert!(second.ends_with("# Guide"));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_behaviour() {
        let (_temp_dir, root) = public_dir();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(listener, root, async move {
            let _ = rx.await;
        }));

        let redirect = request(addr, "GET /docs HTTP/1.0\r\n\r\n").await;
        assert!(redirect.contains("301 Moved Permanently"));
        assert!(redirect.to_lowercase().contains("location: /docs/"));

        let listing = request(addr, "GET /docs/ HTTP/1.0\r\n\r\n").await;
        assert!(listing.contains("200 OK"));
        assert!(listing.contains("Directory listing for /docs/"));
        assert!(listing.contains("<a href=\"guide.md\">guide.md</a>"));

        let index = request(addr, "GET /site/ HTTP/1.0\r\n\r\n").await;
        assert!(index.ends_with("<h1>home</h1>"));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_index_symlink_outside_root_falls_back_to_listing() {
        let (temp_dir, root) = public_dir();
        let secret = temp_dir.path().join("secret.html");
        fs::write(&secret, "top secret").unwrap();
        std::os::unix::fs::symlink(&secret, root.join("docs/index.html")).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(listener, root, async move {
            let _ = rx.await;
        }));

        let listing = request(addr, "GET /docs/ HTTP/1.0\r\n\r\n").await;
        assert!(listing.contains("200 OK"));
        assert!(listing.contains("Directory listing for /docs/"));
        assert!(!listing.contains("top secret"));

        let direct = request(addr, "GET /docs/index.html HTTP/1.0\r\n\r\n").await;
        assert!(direct.contains("404 Not Found"));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_error_responses() {
        let (_temp_dir, root) = public_dir();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(serve_until(listener, root, async move {
            let _ = rx.await;
        }));

        let missing = request(addr, "GET /nope.txt HTTP/1.0\r\n\r\n").await;
        assert!(missing.contains("404 Not Found"));
        assert!(missing.contains("Message: File not found."));

        let trailing = request(addr, "GET /hello.txt/ HTTP/1.0\r\n\r\n").await;
        assert!(trailing.contains("404 Not Found"));

        let escape = request(addr, "GET /../hello.txt HTTP/1.0\r\n\r\n").await;
        assert!(escape.contains("200 OK"));
        assert!(escape.ends_with("hello world"));

        let post = request(
            addr,
            "POST /hello.txt HTTP/1.0\r\nContent-Length: 0\r\n\r\n",
        )
        .await;
        assert!(post.contains("501 Not Implemented"));

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
