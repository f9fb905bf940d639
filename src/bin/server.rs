use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use bar_cut_optimizer::config::{DEFAULT_MAX_USABLE_LENGTH, DEFAULT_PURCHASE_UNIT_LENGTH, PlanConfig};
use bar_cut_optimizer::plan;
use bar_cut_optimizer::report::PlanReport;
use bar_cut_optimizer::types::{Cell, Diagnostic, RawRow};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    rows: Vec<RowRequest>,
    #[serde(default = "default_max_usable_length")]
    max_usable_length: f64,
    #[serde(default = "default_purchase_unit_length")]
    purchase_unit_length: f64,
}

#[derive(Deserialize, Serialize)]
struct RowRequest {
    #[serde(default)]
    material: Cell,
    #[serde(default)]
    quantity: Cell,
    #[serde(default)]
    length: Cell,
    #[serde(default)]
    unit: Cell,
    #[serde(default)]
    tag: Cell,
    /// 0-based row index; defaults to the row's index in the request
    #[serde(default)]
    position: Option<usize>,
}

fn default_max_usable_length() -> f64 {
    DEFAULT_MAX_USABLE_LENGTH
}

fn default_purchase_unit_length() -> f64 {
    DEFAULT_PURCHASE_UNIT_LENGTH
}

/// Rows arrive with a 1-line title and a header above them, as in the workbook
const ROW_OFFSET: usize = 3;

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<PlanReport>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let config = PlanConfig::new(req.max_usable_length, req.purchase_unit_length);
    let rows: Vec<RawRow> = req
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| RawRow {
            position: r.position.unwrap_or(i),
            material: r.material,
            quantity: r.quantity,
            length: r.length,
            unit: r.unit,
            tag: r.tag,
        })
        .filter(|r| !r.is_blank())
        .collect();

    // Diagnostics travel back on the plan itself
    let mut sink: Vec<Diagnostic> = Vec::new();
    let plan = plan::run(&rows, &config, ROW_OFFSET, &mut sink)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(PlanReport::from(&plan)))
}

#[tokio::main]
async fn main() {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
