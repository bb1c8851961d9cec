use async_trait::async_trait;
use reqwest::Method;

use sound_dna_core::{AssetRequest, AssetResponse, FetchError, Fetcher};

/// [`Fetcher`] that goes to the network with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait(?Send)]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| FetchError::new(&request.url, e.to_string()))?;

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::new(&request.url, e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(&request.url, e.to_string()))?;

        log::debug!("{} {} -> {status}", request.method, request.url);

        Ok(AssetResponse {
            url: request.url.clone(),
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn request_body_and_headers_reach_the_server() -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut received = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !String::from_utf8_lossy(&received).contains("Yellow") {
                let read = socket.read(&mut chunk).await?;
                if read == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..read]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 201 Created\r\nX-Served-By: test\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                )
                .await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&received).to_string())
        });

        let fetcher = ReqwestFetcher::new(reqwest::Client::new());
        let request = AssetRequest::new("post", format!("http://{addr}/recommend"))
            .with_header("X-Song-Source", "tests")
            .with_body(r#"{"song_name":"Yellow"}"#);
        let response = fetcher.fetch(&request).await?;
        let received = server.await??;

        assert!(received.starts_with("POST /recommend"));
        assert!(received.to_ascii_lowercase().contains("x-song-source: tests"));
        assert!(received.ends_with(r#"{"song_name":"Yellow"}"#));
        assert_eq!(response.status, 201);
        assert_eq!(response.header("x-served-by"), Some("test"));
        assert_eq!(response.body, b"ok");
        Ok(())
    }
}
