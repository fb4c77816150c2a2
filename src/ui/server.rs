use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use super::{layout, plot};
use crate::data::filter::FilterSelection;
use crate::data::model::FilterOptions;
use crate::state::{Controller, ControllerError, Published};

const DASHBOARD_JS: &str = include_str!("../../assets/dashboard.js");

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything the handlers need; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    /// The page is static for the dataset's lifetime, so build it once.
    pub page: Arc<str>,
}

impl AppState {
    /// Fails only if the page template does not render.
    pub fn new(controller: Controller) -> Result<Self, minijinja::Error> {
        let dataset = controller.dataset();
        let page = layout::page(
            dataset.options(),
            &FilterSelection::everything(dataset.options()),
        )?;
        Ok(AppState {
            controller: Arc::new(controller),
            page: page.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub options: FilterOptions,
    pub default_selection: FilterSelection,
    /// Churn label and its fixed series colour.
    pub churn_colors: Vec<(String, String)>,
    pub total_records: usize,
    pub dropped_rows: usize,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub generation: u64,
    pub selection: FilterSelection,
    pub matched: usize,
    pub total_records: usize,
    /// plotly.js figures keyed by chart id.
    pub figures: BTreeMap<&'static str, Value>,
}

impl RenderResponse {
    fn from_published(published: &Published, total_records: usize) -> Self {
        let figures = published
            .charts
            .charts()
            .into_iter()
            .map(|spec| (spec.id.as_str(), plot::figure(spec)))
            .collect();
        RenderResponse {
            generation: published.generation,
            selection: published.selection.clone(),
            matched: published.matched,
            total_records,
            figures,
        }
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        DASHBOARD_JS,
    )
}

pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let dataset = state.controller.dataset();
    Json(OptionsResponse {
        options: dataset.options().clone(),
        default_selection: FilterSelection::everything(dataset.options()),
        churn_colors: dataset.churn_palette().legend_entries(),
        total_records: dataset.len(),
        dropped_rows: dataset.dropped_rows(),
    })
}

pub async fn render(
    State(state): State<AppState>,
    Json(selection): Json<FilterSelection>,
) -> Result<Json<RenderResponse>, ControllerError> {
    let published = state.controller.render(selection).await?;
    let total = state.controller.dataset().len();
    Ok(Json(RenderResponse::from_published(&published, total)))
}

pub async fn latest_charts(State(state): State<AppState>) -> Json<Published> {
    Json(Published::clone(&state.controller.latest()))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "phase": state.controller.phase(),
        "records": state.controller.dataset().len(),
    }))
}

// ---------------------------------------------------------------------------
// Router & server
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/assets/dashboard.js", get(script))
        .route("/api/options", get(options))
        .route("/api/render", post(render))
        .route("/api/charts", get(latest_charts))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::Choice;
    use crate::data::model::{Dataset, Record};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> AppState {
        let rec = |gender: &str, contract: &str, churn: &str| Record {
            gender: gender.into(),
            senior_citizen: 0,
            contract: contract.into(),
            payment_method: "Electronic check".into(),
            tenure: 10,
            monthly_charges: 30.0,
            total_charges: 300.0,
            churn: churn.into(),
            services: [0; 6],
        };
        let ds = Dataset::from_records(
            vec![
                rec("Female", "Month-to-month", "Yes"),
                rec("Male", "Two year", "No"),
            ],
            1,
        );
        AppState::new(Controller::start(Arc::new(ds))).unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = router(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), content_type)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn options_report_dataset_shape() {
        let Json(body) = options(State(state())).await;
        assert_eq!(body.total_records, 2);
        assert_eq!(body.dropped_rows, 1);
        assert_eq!(body.options.genders, vec!["Female", "Male"]);
        assert_eq!(body.default_selection.contracts.len(), 2);
        let labels: Vec<&str> = body.churn_colors.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["No", "Yes"]);
    }

    #[tokio::test]
    async fn render_returns_all_seven_figures() {
        let st = state();
        let selection = FilterSelection {
            gender: Choice::Only("Male".into()),
            ..FilterSelection::everything(st.controller.dataset().options())
        };
        let Json(body) = render(State(st), Json(selection)).await.unwrap();
        assert_eq!(body.matched, 1);
        assert_eq!(body.total_records, 2);
        assert_eq!(body.figures.len(), 7);
        assert_eq!(body.figures["churn-distribution"]["data"][0]["values"], serde_json::json!([1]));
    }

    #[tokio::test]
    async fn index_serves_the_dashboard_page() {
        let Html(body) = index(State(state())).await;
        assert!(body.contains(layout::TITLE));
        assert!(body.contains("/assets/dashboard.js"));
    }

    #[tokio::test]
    async fn render_route_rejects_a_malformed_selection() {
        let (status, _, _) = send(post_json("/api/render", r#"{"senior":"Yes"}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _, _) = send(post_json("/api/render", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn render_route_accepts_the_wire_format() {
        let body = r#"{"gender":"All","contracts":["Two year"],"payment":"All","senior":0}"#;
        let (status, bytes, _) = send(post_json("/api/render", body)).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["matched"], 1);
        assert_eq!(json["selection"]["senior"], 0);
        assert_eq!(json["figures"].as_object().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn charts_route_returns_the_latest_bundle() {
        let (status, bytes, content_type) = send(get("/api/charts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        for key in ["generation", "renders", "selection", "matched", "charts"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["generation"], 0);
        assert_eq!(json["matched"], 2);
        assert_eq!(json["charts"]["churn_distribution"]["kind"], "pie");
    }

    #[tokio::test]
    async fn health_route_reports_status_and_records() {
        let (status, bytes, _) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["records"], 2);
        assert!(json["phase"].is_string());
    }

    #[tokio::test]
    async fn script_route_serves_javascript() {
        let (status, bytes, content_type) = send(get("/assets/dashboard.js")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            content_type.as_deref(),
            Some("application/javascript; charset=utf-8")
        );
        assert!(String::from_utf8(bytes).unwrap().contains("/api/render"));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _, _) = send(get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
