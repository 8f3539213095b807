//! Servidor web Axum com WebSocket para visualização da desambiguação de
//! sentidos em tempo real

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use wsd_core::{
    corpus::{demo_corpus, demo_texts},
    pipeline::{PipelineEvent, WsdPipeline},
    scorer::score,
    Evidence, Prediction, WsdConfig, WsdModel,
};

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: WsdPipeline,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    prediction: Prediction,
    target: String,
    total_tokens: usize,
}

/// Uma entrada da lista de decisão exposta pela API de inspeção
#[derive(Serialize)]
struct ModelEntry {
    key: String,
    sense: String,
    score: f64,
    counts: std::collections::BTreeMap<String, u32>,
}

#[derive(Serialize)]
struct EvaluateResponse {
    accuracy: f64,
    correct: usize,
    total: usize,
    confusion: std::collections::BTreeMap<String, std::collections::BTreeMap<String, usize>>,
    rendered: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let pipeline = WsdPipeline::from_demo_corpus().expect("corpus de demonstração válido");
    info!(
        "modelo treinado: {} colocações, sentido majoritário \"{}\"",
        pipeline.model.decision_list().len(),
        pipeline.model.majority_sense()
    );
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/ws", get(ws_handler))
        .route("/model", get(model_handler))
        .route("/evaluate", get(evaluate_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("🚀 Servidor WSD iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Desambiguação via HTTP POST (sem streaming)
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let target = state.pipeline.model.config().target.clone();
    match state.pipeline.disambiguate(&req.text) {
        Some(prediction) => Json(AnalyzeResponse {
            prediction,
            target,
            total_tokens: req.text.split_whitespace().count(),
        })
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("o texto não contém a palavra-alvo \"{}\"", target)
            })),
        )
            .into_response(),
    }
}

/// Entradas da lista de decisão em ordem decrescente de pontuação
async fn model_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut entries: Vec<(&String, &Evidence)> =
        state.pipeline.model.decision_list().iter().collect();
    entries.sort_by(|a, b| {
        b.1.score
            .partial_cmp(&a.1.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    entries.truncate(50);

    let payload: Vec<ModelEntry> = entries
        .into_iter()
        .map(|(key, evidence)| ModelEntry {
            key: key.clone(),
            sense: evidence.sense.clone(),
            score: evidence.score,
            counts: evidence.counts.clone(),
        })
        .collect();
    Json(payload)
}

/// Treina na metade par do corpus embutido e avalia na metade ímpar
async fn evaluate_handler() -> impl IntoResponse {
    let corpus = demo_corpus();
    let train: Vec<_> = corpus.iter().step_by(2).cloned().collect();
    let test: Vec<_> = corpus.iter().skip(1).step_by(2).cloned().collect();

    let model = match WsdModel::train(&train, WsdConfig::default()) {
        Ok(model) => model,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    let predicted: Vec<String> = test.iter().map(|i| model.predict(i).sense).collect();
    let actual: Vec<String> = test
        .iter()
        .filter_map(|i| i.sense.clone())
        .collect();

    match score(&predicted, &actual) {
        Ok(result) => Json(EvaluateResponse {
            accuracy: result.accuracy,
            correct: result.correct,
            total: result.total,
            confusion: result.confusion.clone(),
            rendered: result.to_string(),
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(sense, text)| {
            serde_json::json!({
                "sense": sense,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, roda o pipeline e envia os eventos
/// passo a passo
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Tenta parsear como JSON {text}; senão usa como texto puro
                let text_str = if let Ok(req) = serde_json::from_str::<WsRequest>(&text) {
                    req.text.trim().to_string()
                } else {
                    text.trim().to_string()
                };

                if text_str.is_empty() {
                    continue;
                }

                info!("analisando via WebSocket: {} chars", text_str.len());

                let (tx_std, rx_std) = std::sync::mpsc::channel::<PipelineEvent>();

                let state_for_thread = Arc::clone(&state);
                let text_for_thread = text_str.clone();

                // Roda o pipeline em thread separada (é síncrono)
                let handle = tokio::task::spawn_blocking(move || {
                    state_for_thread
                        .pipeline
                        .disambiguate_streaming(&text_for_thread, tx_std);
                });
                handle.await.ok();

                let events: Vec<PipelineEvent> = rx_std.try_iter().collect();

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
