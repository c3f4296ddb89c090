//! Loopback HTTP stub for exercising the reqwest-backed adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve the same response to every connection. Returns the base URL.
pub async fn serve(status: u16, content_type: &str, body: &str) -> String {
    serve_sequence(vec![(status, content_type.to_string(), body.to_string())]).await
}

/// Serve `responses` in order, repeating the last one once exhausted.
pub async fn serve_sequence(responses: Vec<(u16, String, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let responses = Arc::new(responses);
    let served = Arc::new(AtomicUsize::new(0));

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let responses = Arc::clone(&responses);
            let n = served.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let (status, content_type, body) = &responses[n.min(responses.len() - 1)];
                let response = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}/")
}
