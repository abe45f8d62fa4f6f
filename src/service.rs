//! Async request service
//!
//! A [`SearchService`] owns a [`SearchEngine`] and handles one request at a
//! time. Hosts talk to it through a cloneable [`SearchHandle`]; requests go
//! through a single-slot queue and each gets its reply on a oneshot channel.
//! Searches wait for the document's load signal before scanning.

use crate::engine::{EngineError, EngineResult, SearchEngine};
use crate::search::{Direction, SearchResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

fn default_flags() -> String {
    "gi".to_string()
}

/// A host request, tagged by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    #[serde(rename_all = "camelCase")]
    SearchAndHighlightRegex {
        pattern: String,
        #[serde(default = "default_flags")]
        flags: String,
        #[serde(default)]
        original_terms: Vec<String>,
    },
    NavigateMatch {
        direction: Direction,
    },
    ClearHighlights,
    /// Deprecated exact-term search
    #[serde(rename_all = "camelCase")]
    SearchAndHighlight {
        search_term: String,
    },
}

impl Request {
    const ACTIONS: [&'static str; 4] = [
        "searchAndHighlightRegex",
        "navigateMatch",
        "clearHighlights",
        "searchAndHighlight",
    ];

    /// Parse one JSON request, mapping failures to an error response
    pub fn parse(json: &str) -> Result<Self, Response> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| Response::error(format!("Invalid request: {}", e)))?;
        let action = value.get("action").and_then(|a| a.as_str()).unwrap_or_default();
        if !Self::ACTIONS.contains(&action) {
            return Err(Response::error("Unknown action"));
        }
        serde_json::from_value(value).map_err(|e| Response::error(format!("Invalid request: {}", e)))
    }

    fn needs_document(&self) -> bool {
        matches!(self, Request::SearchAndHighlightRegex { .. })
    }

    /// Run the request against an engine
    pub fn apply(self, engine: &mut SearchEngine) -> Response {
        match self {
            Request::SearchAndHighlightRegex {
                pattern,
                flags,
                original_terms,
            } => engine.search(&pattern, &flags, &original_terms).into(),
            Request::NavigateMatch { direction } => Response::Matches(engine.navigate(direction)),
            Request::ClearHighlights => {
                engine.clear();
                Response::Cleared { success: true }
            }
            Request::SearchAndHighlight { search_term } => {
                Response::Matches(engine.legacy_search(&search_term))
            }
        }
    }
}

/// Reply to a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Matches(SearchResult),
    Cleared { success: bool },
    Error { error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"unserializable response: {}"}}"#, e))
    }
}

impl From<EngineResult<SearchResult>> for Response {
    fn from(result: EngineResult<SearchResult>) -> Self {
        match result {
            Ok(result) => Response::Matches(result),
            Err(e) => Response::error(e.to_string()),
        }
    }
}

/// Document readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Complete,
}

/// Sender half of the document load signal
#[derive(Debug)]
pub struct LoadSignal {
    tx: watch::Sender<ReadyState>,
}

impl LoadSignal {
    /// Mark the document loaded, releasing any waiting search
    pub fn complete(&self) {
        self.tx.send_replace(ReadyState::Complete);
    }

    pub fn state(&self) -> ReadyState {
        *self.tx.borrow()
    }
}

struct Job {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Actor that owns the engine
pub struct SearchService {
    engine: SearchEngine,
    ready: watch::Receiver<ReadyState>,
    jobs: mpsc::Receiver<Job>,
    busy: Arc<AtomicBool>,
}

impl SearchService {
    /// Start a service for an already-loaded document
    pub fn spawn(engine: SearchEngine) -> (SearchHandle, JoinHandle<SearchEngine>) {
        let (handle, signal, task) = Self::spawn_loading(engine);
        signal.complete();
        (handle, task)
    }

    /// Start a service whose searches wait until `LoadSignal::complete`
    ///
    /// Dropping the signal before completing it fails pending and future
    /// searches with [`EngineError::LoadAborted`].
    pub fn spawn_loading(engine: SearchEngine) -> (SearchHandle, LoadSignal, JoinHandle<SearchEngine>) {
        let (ready_tx, ready_rx) = watch::channel(ReadyState::Loading);
        let (jobs_tx, jobs_rx) = mpsc::channel(1);
        let busy = Arc::new(AtomicBool::new(false));

        let service = SearchService {
            engine,
            ready: ready_rx,
            jobs: jobs_rx,
            busy: busy.clone(),
        };
        let task = tokio::spawn(service.run());
        let handle = SearchHandle { jobs: jobs_tx, busy };
        (handle, LoadSignal { tx: ready_tx }, task)
    }

    /// Process requests until every handle is dropped, then give back the engine
    pub async fn run(mut self) -> SearchEngine {
        info!("search service started");
        while let Some(job) = self.jobs.recv().await {
            self.busy.store(true, Ordering::Release);
            let response = self.handle(job.request).await;
            if job.reply.send(response).is_err() {
                debug!("requester went away before the reply");
            }
            self.busy.store(false, Ordering::Release);
        }
        info!("search service stopped");
        self.engine
    }

    async fn handle(&mut self, request: Request) -> Response {
        if request.needs_document() {
            if let Err(e) = self.wait_loaded().await {
                warn!(error = %e, "search dropped");
                return Response::error(e.to_string());
            }
        }
        request.apply(&mut self.engine)
    }

    async fn wait_loaded(&mut self) -> EngineResult<()> {
        if *self.ready.borrow() != ReadyState::Complete {
            debug!("waiting for document load");
        }
        self.ready
            .wait_for(|state| *state == ReadyState::Complete)
            .await
            .map(|_| ())
            .map_err(|_| EngineError::LoadAborted)
    }
}

/// Cloneable client for a [`SearchService`]
#[derive(Debug, Clone)]
pub struct SearchHandle {
    jobs: mpsc::Sender<Job>,
    busy: Arc<AtomicBool>,
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("request", &self.request).finish()
    }
}

impl SearchHandle {
    /// Whether the service is working on a request
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Send a request, waiting behind any outstanding one
    pub async fn request(&self, request: Request) -> EngineResult<Response> {
        let (reply, rx) = oneshot::channel();
        self.jobs
            .send(Job { request, reply })
            .await
            .map_err(|_| EngineError::ServiceStopped)?;
        rx.await.map_err(|_| EngineError::ServiceStopped)
    }

    /// Send a request only if nothing else is outstanding
    pub async fn try_request(&self, request: Request) -> EngineResult<Response> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        let (reply, rx) = oneshot::channel();
        self.jobs.try_send(Job { request, reply }).map_err(|e| match e {
            TrySendError::Full(_) => EngineError::Busy,
            TrySendError::Closed(_) => EngineError::ServiceStopped,
        })?;
        rx.await.map_err(|_| EngineError::ServiceStopped)
    }

    pub async fn search(
        &self,
        pattern: impl Into<String>,
        flags: impl Into<String>,
        original_terms: Vec<String>,
    ) -> EngineResult<Response> {
        self.request(Request::SearchAndHighlightRegex {
            pattern: pattern.into(),
            flags: flags.into(),
            original_terms,
        })
        .await
    }

    pub async fn navigate(&self, direction: Direction) -> EngineResult<Response> {
        self.request(Request::NavigateMatch { direction }).await
    }

    pub async fn clear(&self) -> EngineResult<Response> {
        self.request(Request::ClearHighlights).await
    }
}

/// Serve JSON-lines requests from stdin until EOF, one response per line
pub async fn serve_lines<R, W>(handle: &SearchHandle, input: R, mut output: W) -> std::io::Result<usize>
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut served = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match Request::parse(&line) {
            Ok(request) => handle
                .request(request)
                .await
                .unwrap_or_else(|e| Response::error(e.to_string())),
            Err(response) => response,
        };
        output.write_all(response.to_json().as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        served += 1;
    }
    Ok(served)
}

/// Run a stdio request loop over `engine`; returns a process exit code
pub fn run_stdio_server(engine: SearchEngine) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let (handle, task) = SearchService::spawn(engine);
        eprintln!("termlight serving JSON requests on stdio...");

        let served = match serve_lines(&handle, tokio::io::stdin(), tokio::io::stdout()).await {
            Ok(n) => n,
            Err(e) => {
                eprintln!("stdio error: {}", e);
                return 1;
            }
        };
        drop(handle);
        if let Err(e) = task.await {
            eprintln!("search service failed: {}", e);
            return 1;
        }
        info!(served, "stdio session finished");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use serde_json::json;

    fn engine() -> SearchEngine {
        SearchEngine::new(Document::from_markdown(
            "Acme Corp announced Acme's new strategy.\n",
        ))
    }

    const ACME: &str = r"\b(?:Acme Corp|Acme)\b";

    #[test]
    fn test_parse_search_request() {
        let request = Request::parse(
            r#"{"action":"searchAndHighlightRegex","pattern":"\\bAcme\\b","flags":"gi","originalTerms":["Acme"]}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::SearchAndHighlightRegex {
                pattern: r"\bAcme\b".to_string(),
                flags: "gi".to_string(),
                original_terms: vec!["Acme".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_defaults_and_other_actions() {
        let request = Request::parse(r#"{"action":"searchAndHighlightRegex","pattern":"x"}"#).unwrap();
        assert!(matches!(
            request,
            Request::SearchAndHighlightRegex { ref flags, ref original_terms, .. }
                if flags == "gi" && original_terms.is_empty()
        ));
        assert_eq!(
            Request::parse(r#"{"action":"navigateMatch","direction":"prev"}"#).unwrap(),
            Request::NavigateMatch { direction: Direction::Prev }
        );
        assert_eq!(
            Request::parse(r#"{"action":"clearHighlights"}"#).unwrap(),
            Request::ClearHighlights
        );
        assert_eq!(
            Request::parse(r#"{"action":"searchAndHighlight","searchTerm":"acme"}"#).unwrap(),
            Request::SearchAndHighlight { search_term: "acme".to_string() }
        );
    }

    #[test]
    fn test_parse_unknown_action() {
        assert_eq!(
            Request::parse(r#"{"action":"highlightEverything"}"#),
            Err(Response::error("Unknown action"))
        );
        assert_eq!(Request::parse(r#"{"pattern":"x"}"#), Err(Response::error("Unknown action")));
    }

    #[test]
    fn test_parse_malformed() {
        let err = Request::parse("not json").unwrap_err();
        assert!(err.is_error());
        let err = Request::parse(r#"{"action":"navigateMatch","direction":"sideways"}"#).unwrap_err();
        assert!(err.is_error());
    }

    #[test]
    fn test_response_wire_format() {
        let matches = Response::Matches(SearchResult { match_count: 2, current_match: 1 });
        assert_eq!(
            serde_json::to_value(&matches).unwrap(),
            json!({"matchCount": 2, "currentMatch": 1})
        );
        assert_eq!(
            serde_json::to_value(Response::Cleared { success: true }).unwrap(),
            json!({"success": true})
        );
        assert_eq!(
            serde_json::to_value(Response::error("Unknown action")).unwrap(),
            json!({"error": "Unknown action"})
        );
    }

    #[tokio::test]
    async fn test_search_navigate_clear() {
        let (handle, task) = SearchService::spawn(engine());

        let response = handle.search(ACME, "gi", vec!["Acme Corp".into(), "Acme".into()]).await.unwrap();
        assert_eq!(response, Response::Matches(SearchResult { match_count: 2, current_match: 1 }));

        let response = handle.navigate(Direction::Next).await.unwrap();
        assert_eq!(response, Response::Matches(SearchResult { match_count: 2, current_match: 2 }));
        let response = handle.navigate(Direction::Next).await.unwrap();
        assert_eq!(response, Response::Matches(SearchResult { match_count: 2, current_match: 1 }));

        assert_eq!(handle.clear().await.unwrap(), Response::Cleared { success: true });

        drop(handle);
        let engine = task.await.unwrap();
        let doc = engine.document();
        assert_eq!(doc.text_content(doc.root()), "Acme Corp announced Acme's new strategy.");
        assert!(doc.elements_with_class(doc.root(), &engine.config().highlight_class).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_error_response() {
        let (handle, _task) = SearchService::spawn(engine());
        let response = handle.search(r"\b(?:Acme", "gi", vec![]).await.unwrap();
        assert!(response.is_error());

        let response = handle.navigate(Direction::Next).await.unwrap();
        assert_eq!(response, Response::Matches(SearchResult::empty()));
    }

    #[tokio::test]
    async fn test_search_waits_for_load() {
        let (handle, signal, _task) = SearchService::spawn_loading(engine());
        assert_eq!(signal.state(), ReadyState::Loading);

        let searcher = handle.clone();
        let pending = tokio::spawn(async move { searcher.search(ACME, "gi", vec![]).await });

        while !handle.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            handle.try_request(Request::ClearHighlights).await,
            Err(EngineError::Busy)
        ));

        signal.complete();
        let response = pending.await.unwrap().unwrap();
        assert_eq!(response, Response::Matches(SearchResult { match_count: 2, current_match: 1 }));

        while handle.is_busy() {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            handle.try_request(Request::ClearHighlights).await.unwrap(),
            Response::Cleared { success: true }
        );
    }

    #[tokio::test]
    async fn test_dropped_load_signal_aborts_search() {
        let (handle, signal, _task) = SearchService::spawn_loading(engine());
        drop(signal);
        let response = handle.search(ACME, "gi", vec![]).await.unwrap();
        assert_eq!(response, Response::error(EngineError::LoadAborted.to_string()));

        // Non-scanning requests still work
        let response = handle.navigate(Direction::Prev).await.unwrap();
        assert_eq!(response, Response::Matches(SearchResult::empty()));
    }

    #[tokio::test]
    async fn test_legacy_search_restores() {
        let (handle, task) = SearchService::spawn(engine());
        handle.search(ACME, "gi", vec![]).await.unwrap();
        let response = handle
            .request(Request::SearchAndHighlight { search_term: "Acme".into() })
            .await
            .unwrap();
        assert_eq!(response, Response::Matches(SearchResult::empty()));

        drop(handle);
        let engine = task.await.unwrap();
        let doc = engine.document();
        assert!(doc.elements_with_class(doc.root(), &engine.config().highlight_class).is_empty());
    }

    #[tokio::test]
    async fn test_serve_lines() {
        let (handle, _task) = SearchService::spawn(engine());
        let input = concat!(
            r#"{"action":"searchAndHighlightRegex","pattern":"\\b(?:Acme Corp|Acme)\\b","flags":"gi","originalTerms":["Acme Corp","Acme"]}"#,
            "\n",
            r#"{"action":"navigateMatch","direction":"prev"}"#,
            "\n\n",
            r#"{"action":"bogus"}"#,
            "\n",
            r#"{"action":"clearHighlights"}"#,
            "\n",
        );
        let mut output = Vec::new();
        let served = serve_lines(&handle, input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(served, 4);

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({"matchCount": 2, "currentMatch": 1}),
                json!({"matchCount": 2, "currentMatch": 2}),
                json!({"error": "Unknown action"}),
                json!({"success": true}),
            ]
        );
    }
}
