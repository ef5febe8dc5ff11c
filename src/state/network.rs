use crate::state::messages::{NetworkRequest, NetworkResponse, RequestToken};
use extrainnings_api::GameQuery;
use extrainnings_api::client::ExtraInningsApi;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Counts a request as in flight until dropped, including when its task is aborted.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct NetworkWorker {
    client: ExtraInningsApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
    last_failed: Arc<AtomicBool>,
    /// The games fetch currently running. A newer games request aborts it.
    games_task: Option<JoinHandle<()>>,
}

impl NetworkWorker {
    pub fn new(
        client: ExtraInningsApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
            last_failed: Arc::new(AtomicBool::new(false)),
            games_task: None,
        }
    }

    pub async fn run(mut self) {
        let spinner = tokio::spawn(run_spinner(
            self.in_flight.clone(),
            self.last_failed.clone(),
            self.responses.clone(),
        ));
        let mut side_tasks: Vec<JoinHandle<()>> = Vec::new();

        while let Some(request) = self.requests.recv().await {
            side_tasks.retain(|task| !task.is_finished());
            match request {
                NetworkRequest::LoadGames { token, query } => {
                    if let Some(previous) = self.games_task.take()
                        && !previous.is_finished()
                    {
                        debug!("superseding in-flight games request");
                        previous.abort();
                    }
                    self.games_task = Some(tokio::spawn(self.load_games(token, query)));
                }
                NetworkRequest::LoadTeams => side_tasks.push(tokio::spawn(self.load_teams())),
                NetworkRequest::LoadSeasons => side_tasks.push(tokio::spawn(self.load_seasons())),
            }
        }

        debug!("network request channel closed");
        if let Some(task) = self.games_task.take() {
            task.abort();
        }
        for task in side_tasks {
            task.abort();
        }
        spinner.abort();
    }

    fn load_games(&self, token: RequestToken, query: GameQuery) -> impl Future<Output = ()> + 'static {
        let client = self.client.clone();
        let responses = self.responses.clone();
        let guard = InFlight::enter(&self.in_flight);
        let last_failed = self.last_failed.clone();
        async move {
            debug!("loading games {query:?} (request {})", token.0);
            let response = match client.fetch_games(&query).await {
                Ok(response) => {
                    debug!("request {} returned {} games", token.0, response.games.len());
                    last_failed.store(false, Ordering::Relaxed);
                    NetworkResponse::GamesLoaded { token, response }
                }
                Err(err) => {
                    error!("games request {} failed: {err}", token.0);
                    last_failed.store(true, Ordering::Relaxed);
                    NetworkResponse::GamesFailed { token, message: err.to_string() }
                }
            };
            drop(guard);
            send(&responses, response).await;
        }
    }

    fn load_teams(&self) -> impl Future<Output = ()> + 'static {
        let client = self.client.clone();
        let responses = self.responses.clone();
        let guard = InFlight::enter(&self.in_flight);
        async move {
            debug!("loading team list");
            let response = match client.fetch_teams().await {
                Ok(teams) => NetworkResponse::TeamsLoaded { teams },
                Err(err) => {
                    error!("team list request failed: {err}");
                    NetworkResponse::TeamsFailed { message: err.to_string() }
                }
            };
            drop(guard);
            send(&responses, response).await;
        }
    }

    fn load_seasons(&self) -> impl Future<Output = ()> + 'static {
        let client = self.client.clone();
        let responses = self.responses.clone();
        let guard = InFlight::enter(&self.in_flight);
        async move {
            debug!("loading season list");
            let response = match client.fetch_seasons().await {
                Ok(seasons) => NetworkResponse::SeasonsLoaded { seasons },
                Err(err) => {
                    error!("season list request failed: {err}");
                    NetworkResponse::SeasonsFailed { message: err.to_string() }
                }
            };
            drop(guard);
            send(&responses, response).await;
        }
    }
}

async fn send(responses: &mpsc::Sender<NetworkResponse>, response: NetworkResponse) {
    if let Err(e) = responses.send(response).await {
        error!("Failed to send network response: {e}");
    }
}

/// Ticks the spinner while anything is in flight and emits one final state
/// when the last request settles.
async fn run_spinner(
    in_flight: Arc<AtomicUsize>,
    last_failed: Arc<AtomicBool>,
    responses: mpsc::Sender<NetworkResponse>,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(33));
    let mut spinner_index = 0;
    let mut was_loading = false;
    loop {
        interval.tick().await;
        let is_loading = in_flight.load(Ordering::SeqCst) > 0;
        let loading_state = if is_loading {
            let spinner_char = SPINNER_CHARS[spinner_index];
            spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
            Some(LoadingState { is_loading: true, spinner_char })
        } else if was_loading {
            let spinner_char = if last_failed.load(Ordering::Relaxed) { ERROR_CHAR } else { ' ' };
            Some(LoadingState { is_loading: false, spinner_char })
        } else {
            None
        };
        was_loading = is_loading;

        if let Some(loading_state) = loading_state
            && responses
                .send(NetworkResponse::LoadingStateChanged { loading_state })
                .await
                .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let a = InFlight::enter(&counter);
        let b = InFlight::enter(&counter);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        drop(a);
        drop(b);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_request_reports_its_token() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let client = ExtraInningsApi::new("http://127.0.0.1:9", Duration::from_secs(2));
        let worker = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::LoadGames { token: RequestToken(3), query: GameQuery::default() })
            .await
            .unwrap();

        let mut failed_token = None;
        while let Some(response) = resp_rx.recv().await {
            if let NetworkResponse::GamesFailed { token, .. } = response {
                failed_token = Some(token);
                break;
            }
        }
        assert_eq!(failed_token, Some(RequestToken(3)));
        worker.abort();
    }

    /// Serves `/games`, holding back any request for `slow_start` by `delay`.
    async fn serve_games(slow_start: &'static str, delay: Duration) -> (String, Arc<tokio::sync::Notify>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let slow_arrived = Arc::new(tokio::sync::Notify::new());
        let notify = slow_arrived.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let notify = notify.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    if String::from_utf8_lossy(&request).contains(&format!("start={slow_start}")) {
                        notify.notify_one();
                        tokio::time::sleep(delay).await;
                    }
                    let body = r#"{"games":[],"total":0,"page":1,"limit":500}"#;
                    let reply = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(reply.as_bytes()).await;
                });
            }
        });
        (url, slow_arrived)
    }

    #[tokio::test]
    async fn newer_games_request_cancels_the_one_in_flight() {
        let delay = Duration::from_millis(600);
        let (url, slow_arrived) = serve_games("2024-01-01", delay).await;
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let client = ExtraInningsApi::new(&url, Duration::from_secs(10));
        let worker = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());

        let query_for = |start: &str| GameQuery {
            start: extrainnings_api::parse_calendar_date(start),
            ..Default::default()
        };
        req_tx
            .send(NetworkRequest::LoadGames { token: RequestToken(1), query: query_for("2024-01-01") })
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), slow_arrived.notified())
            .await
            .expect("first request reached the server");
        req_tx
            .send(NetworkRequest::LoadGames { token: RequestToken(2), query: query_for("2024-02-01") })
            .await
            .unwrap();

        // Listen well past the point where the first reply would have landed.
        let mut tokens = Vec::new();
        let deadline = tokio::time::Instant::now() + delay * 3;
        while let Ok(Some(response)) = tokio::time::timeout_at(deadline, resp_rx.recv()).await {
            match response {
                NetworkResponse::GamesLoaded { token, .. } | NetworkResponse::GamesFailed { token, .. } => {
                    tokens.push(token)
                }
                _ => {}
            }
        }
        assert_eq!(tokens, vec![RequestToken(2)]);
        worker.abort();
    }
}
