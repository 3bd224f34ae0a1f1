use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::REMOTE_TIMEOUT;
use crate::error::BackendError;
use crate::searcher::SearchBackend;
use crate::types::{RemoteResponse, ResultSet};

/// Everything HTTP 搜索服务
pub struct RemoteIndexBackend {
    endpoint: String,
    timeout: Duration,
}

impl RemoteIndexBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_url(&self, query: &str) -> String {
        format!("{}?q={}", self.endpoint, urlencoding::encode(query))
    }
}

impl SearchBackend for RemoteIndexBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn execute(&self, query: &str) -> Result<ResultSet, BackendError> {
        let url = self.request_url(query);
        tracing::info!("API 请求: {}", url);

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;

        let response = client.get(&url).send().map_err(|e| {
            tracing::error!("API 连接失败: {}", e);
            BackendError::ConnectionFailed(e.to_string())
        })?;

        let status = response.status();
        tracing::info!("API 响应状态: {}", status);
        if !status.is_success() {
            return Err(match status {
                StatusCode::BAD_REQUEST => BackendError::InvalidQuery {
                    query: query.to_string(),
                },
                StatusCode::NOT_FOUND => BackendError::EndpointNotFound,
                other => BackendError::Http {
                    status: other.as_u16(),
                },
            });
        }

        let body = response
            .bytes()
            .map_err(|e| BackendError::ConnectionFailed(e.to_string()))?;
        let parsed: RemoteResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("API 响应解析失败: {}", e);
            BackendError::Parse(e.to_string())
        })?;

        tracing::info!("API 返回 {} 条结果", parsed.count);
        Ok(parsed.into())
    }
}

/// 单次响应的本地 HTTP 服务，供测试使用
#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::sync::mpsc;
    use std::thread::JoinHandle;

    pub struct OneShot {
        pub addr: SocketAddr,
        pub request_line: mpsc::Receiver<String>,
        pub handle: JoinHandle<()>,
    }

    impl OneShot {
        pub fn endpoint(&self) -> String {
            format!("http://{}/everything-search-api/search", self.addr)
        }
    }

    pub fn serve(status: u16, body: &str) -> OneShot {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind to ephemeral port");
        let addr = listener.local_addr().expect("get local addr");
        let response = format!(
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let n = stream.read(&mut buf).unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]);
                let _ = tx.send(head.lines().next().unwrap_or_default().to_string());
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        OneShot {
            addr,
            request_line: rx,
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_body_and_encodes_query() {
        let server = test_server::serve(
            200,
            r#"{"count": 2, "results": [
                {"filename": "a b.txt", "path": "C:\\x\\a b.txt", "size": 10, "date_modified": "2024-03-05T12:30:00Z"},
                {"filename": "c.txt", "path": "C:\\x\\c.txt", "size": 0, "date_modified": null}
            ]}"#,
        );
        let backend = RemoteIndexBackend::new(server.endpoint());
        let set = backend.execute("a b:c").unwrap();
        assert_eq!(set.total_count, 2);
        assert_eq!(set.entries[0].filename, "a b.txt");
        assert_eq!(
            set.entries[0].modified_time.as_deref(),
            Some("2024-03-05T12:30:00Z")
        );

        let line = server.request_line.recv().unwrap();
        assert!(line.starts_with("GET /everything-search-api/search?q=a%20b%3Ac "), "{line}");
        server.handle.join().unwrap();
    }

    #[test]
    fn maps_http_statuses() {
        let server = test_server::serve(400, "{}");
        let err = RemoteIndexBackend::new(server.endpoint()).execute("bad").unwrap_err();
        assert!(matches!(err, BackendError::InvalidQuery { ref query } if query == "bad"));

        let server = test_server::serve(404, "");
        let err = RemoteIndexBackend::new(server.endpoint()).execute("abc").unwrap_err();
        assert!(matches!(err, BackendError::EndpointNotFound));

        let server = test_server::serve(503, "");
        let err = RemoteIndexBackend::new(server.endpoint()).execute("abc").unwrap_err();
        assert!(matches!(err, BackendError::Http { status: 503 }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let server = test_server::serve(200, "<html>not json</html>");
        let err = RemoteIndexBackend::new(server.endpoint()).execute("abc").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn refused_connection_is_connection_failed() {
        // 绑定后立即释放，端口上无人监听
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend = RemoteIndexBackend::new(format!("http://127.0.0.1:{port}/search"))
            .with_timeout(Duration::from_secs(1));
        assert!(matches!(
            backend.execute("abc"),
            Err(BackendError::ConnectionFailed(_))
        ));
    }
}
