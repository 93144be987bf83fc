//! Axum server for inspecting a recorded run, with WebSocket streaming.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::error::Result;
use crate::events::MeshSnapshot;
use crate::playback::{Playback, PlaybackSpeed, PlaybackState, PlaybackStatus};
use crate::simulation::Simulation;

/// Shared application state.
pub struct AppState {
    simulation: RwLock<Simulation>,
    playback: RwLock<Playback>,
}

/// Inspection server over one finished simulation.
pub struct InspectServer {
    state: Arc<AppState>,
}

impl InspectServer {
    pub fn new(simulation: Simulation) -> Self {
        let playback = Playback::new(simulation.events().to_vec(), simulation.tick());
        Self {
            state: Arc::new(AppState {
                simulation: RwLock::new(simulation),
                playback: RwLock::new(playback),
            }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/stop", post(stop_handler))
            .route("/api/playback/seek", post(seek_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/playback/step", post(step_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port until it fails.
    pub async fn serve(self, port: u16) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(drive_playback(self.state.clone()));
        info!("Inspection server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Advance the cursor while playback is running.
async fn drive_playback(state: Arc<AppState>) {
    loop {
        let delay = {
            let mut playback = state.playback.write().await;
            if playback.state() == PlaybackState::Playing {
                playback.step_forward();
            }
            playback.speed().ms_per_tick()
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    tile_count: usize,
    event_count: usize,
    ticks: u64,
    settled: bool,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let sim = state.simulation.read().await;
    Json(StatusResponse {
        status: "ok",
        tile_count: sim.tile_count(),
        event_count: sim.event_count(),
        ticks: sim.tick(),
        settled: sim.is_settled(),
    })
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<MeshSnapshot> {
    let playback = state.playback.read().await;
    Json(playback.snapshot())
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let playback = state.playback.read().await;
    Json(PlaybackStatus::from(&*playback))
}

async fn play_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.play();
    Json(PlaybackStatus::from(&*playback))
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.pause();
    Json(PlaybackStatus::from(&*playback))
}

async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.stop();
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Deserialize)]
struct SeekRequest {
    tick: u64,
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.seek(req.tick);
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: PlaybackSpeed,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    playback.set_speed(req.speed);
    Json(PlaybackStatus::from(&*playback))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StepDirection {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: StepDirection,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> Json<PlaybackStatus> {
    let mut playback = state.playback.write().await;
    match req.direction {
        StepDirection::Forward => {
            playback.step_forward();
        }
        StepDirection::Backward => playback.step_backward(),
    }
    Json(PlaybackStatus::from(&*playback))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let snapshot = state.playback.read().await.snapshot();
    if let Ok(json) = serde_json::to_string(&WsResponse::Snapshot(snapshot)) {
        if socket.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let response = match serde_json::from_str::<WsCommand>(&text) {
                    Ok(cmd) => handle_ws_command(&state, cmd).await,
                    Err(e) => {
                        debug!(error = %e, "unparseable ws command");
                        WsResponse::Error {
                            message: e.to_string(),
                        }
                    }
                };
                if let Ok(json) = serde_json::to_string(&response) {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetStatus,
    Seek { tick: u64 },
    Step,
    Play,
    Pause,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    Snapshot(MeshSnapshot),
    Status(PlaybackStatus),
    Error { message: String },
}

async fn handle_ws_command(state: &Arc<AppState>, cmd: WsCommand) -> WsResponse {
    let mut playback = state.playback.write().await;
    match cmd {
        WsCommand::GetSnapshot => return WsResponse::Snapshot(playback.snapshot()),
        WsCommand::GetStatus => {}
        WsCommand::Seek { tick } => playback.seek(tick),
        WsCommand::Step => {
            playback.step_forward();
        }
        WsCommand::Play => playback.play(),
        WsCommand::Pause => playback.pause(),
    }
    WsResponse::Status(PlaybackStatus::from(&*playback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use hexroll_topology::Layout;

    fn server() -> InspectServer {
        let mut sim =
            Simulation::with_layout(SimulationConfig::default(), &Layout::line(2)).unwrap();
        sim.run(10);
        InspectServer::new(sim)
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }

    #[test]
    fn ws_commands_parse() {
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"seek","tick":4}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Seek { tick: 4 }));
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"get_snapshot"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::GetSnapshot));
    }

    #[test]
    fn step_request_parses_direction() {
        let req: StepRequest = serde_json::from_str(r#"{"direction":"backward"}"#).unwrap();
        assert_eq!(req.direction, StepDirection::Backward);
    }

    #[test]
    fn commands_drive_shared_playback() {
        let server = server();
        let state = server.state.clone();
        tokio_test::block_on(async {
            let response = handle_ws_command(&state, WsCommand::Seek { tick: 5 }).await;
            assert!(matches!(response, WsResponse::Status(PlaybackStatus { current_tick: 5, .. })));

            let response = handle_ws_command(&state, WsCommand::GetSnapshot).await;
            match response {
                WsResponse::Snapshot(snap) => {
                    assert_eq!(snap.tick, 5);
                    assert_eq!(snap.tile_count, 2);
                }
                _ => panic!("expected snapshot"),
            }
        });
    }
}
