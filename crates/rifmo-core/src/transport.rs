//! HTTP access for rhyme lookups. One session per lookup, closed when the lookup ends.

use async_trait::async_trait;
use url::Url;

use crate::rhymes::{FetcherConfig, LookupError};

/// Opens a fresh session for each lookup.
pub trait Connector: Send + Sync {
    type Session: Session;

    fn connect(&self, config: &FetcherConfig) -> Result<Self::Session, LookupError>;
}

/// A single-use HTTP session.
#[async_trait]
pub trait Session: Send + Sync {
    /// GET `url` and return the body as text. Non-2xx is an error.
    async fn get_text(&self, url: &Url) -> Result<String, LookupError>;

    /// Release the session. Called exactly once, after the request settled or was abandoned.
    fn close(self);
}

/// reqwest-backed connector. Builds a client with the configured timeout and user agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    type Session = HttpSession;

    fn connect(&self, config: &FetcherConfig) -> Result<HttpSession, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LookupError::Client(e.to_string()))?;
        Ok(HttpSession { client })
    }
}

#[derive(Debug)]
pub struct HttpSession {
    client: reqwest::Client,
}

#[async_trait]
impl Session for HttpSession {
    async fn get_text(&self, url: &Url) -> Result<String, LookupError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout
            } else {
                LookupError::Body(e.to_string())
            }
        })
    }

    fn close(self) {
        tracing::trace!("closing rhyme HTTP session");
        drop(self.client);
    }
}

fn request_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout
    } else if e.is_connect() {
        LookupError::Connect(e.to_string())
    } else {
        LookupError::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::rhymes::RhymeFetcher;

    /// Serves one canned response on localhost and reports the request head it received.
    fn serve_once(response: String) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            tx.send(head).ok();
        });
        let base = Url::parse(&format!("http://{}/r/", addr)).unwrap();
        (base, rx)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn config_for(base_url: Url) -> FetcherConfig {
        FetcherConfig {
            base_url,
            ..FetcherConfig::default()
        }
    }

    #[tokio::test]
    async fn get_text_sends_user_agent() {
        let (base, rx) = serve_once(http_response("200 OK", "<p>ok</p>"));
        let config = FetcherConfig {
            user_agent: "rifmo-test/1".into(),
            ..config_for(base.clone())
        };
        let session = HttpConnector.connect(&config).unwrap();
        let body = session.get_text(&base.join("word").unwrap()).await.unwrap();
        session.close();
        assert_eq!(body, "<p>ok</p>");

        let head = rx.recv().unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /r/word "));
        assert!(head.contains("user-agent: rifmo-test/1"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _rx) = serve_once(http_response("404 Not Found", ""));
        let session = HttpConnector.connect(&config_for(base.clone())).unwrap();
        let err = session.get_text(&base).await.unwrap_err();
        session.close();
        assert_eq!(err, LookupError::Status(404));
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let url = Url::parse(&format!("http://{}/r/", addr)).unwrap();
        let session = HttpConnector.connect(&config_for(url.clone())).unwrap();
        let err = session.get_text(&url).await.unwrap_err();
        session.close();
        assert_eq!(err.kind(), "connect");
    }

    #[tokio::test]
    async fn end_to_end_over_http() {
        let page = r#"<html><body>
            <ul id="tochnye">
              <li data-w="рот">рот</li><li data-w="кот">кот</li>
              <li data-w="плот">плот</li><li data-w="://evil">x</li>
            </ul>
            <ul id="meneestrogie"><li data-w="год">год</li></ul>
        </body></html>"#;
        let (base, rx) = serve_once(http_response("200 OK", page));
        let fetcher = RhymeFetcher::new(config_for(base));

        let words = fetcher.fetch_rhymes("кот", 100).await;
        assert_eq!(words, vec!["рот", "плот", "год"]);

        let head = rx.recv().unwrap();
        assert!(head.starts_with("GET /r/%D0%BA%D0%BE%D1%82 "));
    }

    /// Accepts connections and keeps them open without ever answering.
    fn serve_silently() -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut open = Vec::new();
            for stream in listener.incoming().flatten() {
                open.push(stream);
            }
        });
        Url::parse(&format!("http://{}/r/", addr)).unwrap()
    }

    #[tokio::test]
    async fn silent_server_hits_configured_timeout() {
        let base = serve_silently();
        let config = FetcherConfig {
            timeout: Duration::from_millis(300),
            ..config_for(base)
        };
        let fetcher = RhymeFetcher::new(config);

        let started = Instant::now();
        assert_eq!(fetcher.lookup("moon", 10).await, Err(LookupError::Timeout));
        assert!(fetcher.fetch_rhymes("moon", 10).await.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn end_to_end_failure_is_empty() {
        let (base, _rx) = serve_once(http_response("500 Internal Server Error", "oops"));
        let fetcher = RhymeFetcher::new(config_for(base));
        assert!(fetcher.fetch_rhymes("moon", 10).await.is_empty());
    }
}
