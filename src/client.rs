/// Client for the report-generation service.
///
/// `POST /research` produces a report for an area; `POST /ask` answers a
/// follow-up question against a report's text.
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;
use crate::report::Report;

#[derive(Debug, Clone, Serialize)]
pub struct ResearchRequest<'a> {
    pub area: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskRequest<'a> {
    pub report_id: &'a str,
    pub question: &'a str,
    pub report_context: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

/// The report service as seen by the session.
#[allow(async_fn_in_trait)]
pub trait ReportService {
    async fn research(&self, area: &str) -> Result<Report, ClientError>;

    async fn ask(&self, request: &AskRequest<'_>) -> Result<AnswerResponse, ClientError>;
}

/// `reqwest`-backed service client.
#[derive(Debug, Clone)]
pub struct HttpReportService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReportService {
    /// Build a client for `base_url`. `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "reportview/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!("POST {url}");

        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status(error_message(
                status.as_u16(),
                status.canonical_reason(),
                &text,
            )));
        }

        resp.json::<R>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

impl ReportService for HttpReportService {
    async fn research(&self, area: &str) -> Result<Report, ClientError> {
        self.post_json("/research", &ResearchRequest { area }).await
    }

    async fn ask(&self, request: &AskRequest<'_>) -> Result<AnswerResponse, ClientError> {
        self.post_json("/ask", request).await
    }
}

/// User-facing message for a non-success response.
///
/// A JSON body with a `detail` field wins; a JSON body without one yields the
/// bare status; an unparseable body appends the reason phrase.
#[must_use]
pub fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    let generic = format!("HTTP error! Status: {status}");

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Null) | None => generic,
            Some(serde_json::Value::String(_)) => generic,
            Some(other) => other.to_string(),
        },
        Err(_) => format!("{generic} - {}", reason.unwrap_or("Server error")),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answer one HTTP request with a canned response. The handle resolves
    /// to the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + len {
                        break;
                    }
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    #[test]
    fn test_error_message_detail() {
        assert_eq!(
            error_message(400, Some("Bad Request"), r#"{"detail":"Area cannot be empty."}"#),
            "Area cannot be empty."
        );
    }

    #[test]
    fn test_error_message_json_without_detail() {
        assert_eq!(
            error_message(500, Some("Internal Server Error"), r#"{"error":"x"}"#),
            "HTTP error! Status: 500"
        );
        assert_eq!(
            error_message(500, None, r#"{"detail":""}"#),
            "HTTP error! Status: 500"
        );
    }

    #[test]
    fn test_error_message_unparseable_body() {
        assert_eq!(
            error_message(502, Some("Bad Gateway"), "<html>nginx</html>"),
            "HTTP error! Status: 502 - Bad Gateway"
        );
        assert_eq!(
            error_message(599, None, ""),
            "HTTP error! Status: 599 - Server error"
        );
    }

    #[test]
    fn test_error_message_structured_detail() {
        let body = r#"{"detail":[{"loc":["body","area"],"msg":"field required"}]}"#;
        assert!(error_message(422, Some("Unprocessable Entity"), body).contains("field required"));
    }

    #[test]
    fn test_request_bodies() {
        let research = serde_json::to_value(ResearchRequest { area: "Lagos" }).unwrap();
        assert_eq!(research, serde_json::json!({"area": "Lagos"}));

        let ask = serde_json::to_value(AskRequest {
            report_id: "r1",
            question: "What is the infant mortality rate?",
            report_context: "ctx",
        })
        .unwrap();
        assert_eq!(ask["report_id"], "r1");
        assert_eq!(ask["report_context"], "ctx");
    }

    #[tokio::test]
    async fn test_research_posts_area() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"report_id":"r1","area_name":"Lagos","full_report_markdown":"Body","charts":[]}"#,
        )
        .await;

        let svc = HttpReportService::new(&base_url, None).unwrap();
        let report = svc.research("Lagos").await.unwrap();
        assert_eq!(report.area_name(), Some("Lagos"));
        assert_eq!(report.report_id, "r1");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /research HTTP/1.1"));
        assert!(request.ends_with(r#"{"area":"Lagos"}"#));
    }

    #[tokio::test]
    async fn test_ask_returns_answer() {
        let (base_url, server) =
            serve_once("HTTP/1.1 200 OK", r#"{"answer":"About **58** years."}"#).await;

        let svc = HttpReportService::new(&base_url, None).unwrap();
        let request = AskRequest {
            report_id: "r1",
            question: "How long?",
            report_context: "Body",
        };
        let resp = svc.ask(&request).await.unwrap();
        assert_eq!(resp.answer.as_deref(), Some("About **58** years."));
        assert!(server.await.unwrap().starts_with("POST /ask HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_status_error_uses_detail() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 400 Bad Request",
            r#"{"detail":"Area cannot be empty."}"#,
        )
        .await;

        let svc = HttpReportService::new(&base_url, None).unwrap();
        let err = svc.research("x").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(_)));
        assert_eq!(err.to_string(), "Area cannot be empty.");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_status_error_with_unparseable_body() {
        let (base_url, server) = serve_once("HTTP/1.1 502 Bad Gateway", "<html>nginx</html>").await;

        let svc = HttpReportService::new(&base_url, None).unwrap();
        let err = svc.research("x").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! Status: 502 - Bad Gateway");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_success_with_invalid_body_is_decode_error() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", "not json").await;

        let svc = HttpReportService::new(&base_url, None).unwrap();
        let err = svc.research("x").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        server.await.unwrap();
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let svc = HttpReportService::new("http://localhost:8000/", None).unwrap();
        assert_eq!(svc.base_url, "http://localhost:8000");
    }
}
