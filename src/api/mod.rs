use std::collections::HashSet;
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::core::{
    DEFAULT_ANNUAL_RATE, Ledger, Month, MonthlyInput, MonthlyResult, compute_ledger,
    default_inputs,
};
use crate::error::LedgerError;
use crate::export::{
    STATEMENT_FILE_NAME, TABLE_FILE_NAME, read_inputs, render_statement, table_bytes, write_table,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Parser, Debug)]
#[command(
    name = "pf-ledger",
    about = "Provident fund ledger calculator (April-March year, lowest-balance monthly interest)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the data-entry page and JSON API.
    Serve(ServeArgs),
    /// Compute a ledger and print the statement.
    Ledger(LedgerArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    #[arg(long, default_value_t = 0.0, help = "Opening balance as of 1st April")]
    pub opening_balance: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_ANNUAL_RATE,
        help = "Interest rate in percent per annum for every month; ignored when --input is given"
    )]
    pub rate: f64,
    #[arg(
        long,
        help = "CSV with columns Month,Dep_Before_15,Dep_After_15,Withdrawal,Rate (12 rows, APR..MAR)"
    )]
    pub input: Option<PathBuf>,
    #[arg(long, help = "Write the ledger table as CSV to this path")]
    pub table: Option<PathBuf>,
    #[arg(long, help = "Write the paged statement to this path")]
    pub statement: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LedgerQuery {
    opening_balance: Option<f64>,
    default_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LedgerPayload {
    opening_balance: Option<f64>,
    default_rate: Option<f64>,
    months: Option<Vec<MonthPayload>>,
}

impl From<LedgerQuery> for LedgerPayload {
    fn from(value: LedgerQuery) -> Self {
        Self {
            opening_balance: value.opening_balance,
            default_rate: value.default_rate,
            months: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MonthPayload {
    month: String,
    dep_before_15: Option<f64>,
    dep_after_15: Option<f64>,
    withdrawal: Option<f64>,
    rate: Option<f64>,
}

#[derive(Debug)]
struct LedgerRequest {
    opening_balance: f64,
    inputs: [MonthlyInput; 12],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LedgerResponse {
    rows: Vec<MonthlyResult>,
    total_interest: f64,
    final_principal: f64,
    final_balance: f64,
}

impl From<&Ledger> for LedgerResponse {
    fn from(ledger: &Ledger) -> Self {
        Self {
            rows: ledger.rows.to_vec(),
            total_interest: ledger.total_interest,
            final_principal: ledger.final_principal,
            final_balance: ledger.final_balance(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn ensure_amount(name: &str, value: f64) -> Result<(), LedgerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(LedgerError::InvalidInput(format!(
            "{name} must be a finite number >= 0"
        )));
    }
    Ok(())
}

/// Applies the data-entry constraints: every amount and rate finite and non-negative.
fn validate_inputs(opening_balance: f64, inputs: &[MonthlyInput; 12]) -> Result<(), LedgerError> {
    ensure_amount("openingBalance", opening_balance)?;
    for input in inputs {
        let month = input.month;
        ensure_amount(&format!("{month} depBefore15"), input.deposit_before_cutoff)?;
        ensure_amount(&format!("{month} depAfter15"), input.deposit_after_cutoff)?;
        ensure_amount(&format!("{month} withdrawal"), input.withdrawal)?;
        ensure_amount(&format!("{month} rate"), input.rate)?;
    }
    Ok(())
}

fn ledger_request_from_payload(payload: LedgerPayload) -> Result<LedgerRequest, LedgerError> {
    let opening_balance = payload.opening_balance.unwrap_or(0.0);
    let default_rate = payload.default_rate.unwrap_or(DEFAULT_ANNUAL_RATE);
    ensure_amount("defaultRate", default_rate)?;

    let mut inputs = default_inputs(default_rate);
    let months = payload.months.unwrap_or_default();
    if months.len() > Month::ALL.len() {
        return Err(LedgerError::RowCount {
            expected: Month::ALL.len(),
            found: months.len(),
        });
    }

    let mut seen = HashSet::new();
    for entry in months {
        let month = Month::from_label(&entry.month)
            .ok_or_else(|| LedgerError::UnknownMonth(entry.month.clone()))?;
        if !seen.insert(month) {
            return Err(LedgerError::InvalidInput(format!(
                "{month} appears more than once"
            )));
        }

        let slot = &mut inputs[month.position()];
        if let Some(v) = entry.dep_before_15 {
            slot.deposit_before_cutoff = v;
        }
        if let Some(v) = entry.dep_after_15 {
            slot.deposit_after_cutoff = v;
        }
        if let Some(v) = entry.withdrawal {
            slot.withdrawal = v;
        }
        if let Some(v) = entry.rate {
            slot.rate = v;
        }
    }

    validate_inputs(opening_balance, &inputs)?;
    Ok(LedgerRequest {
        opening_balance,
        inputs,
    })
}

#[cfg(test)]
fn ledger_request_from_json(json: &str) -> Result<LedgerRequest, LedgerError> {
    let payload = serde_json::from_str::<LedgerPayload>(json)?;
    ledger_request_from_payload(payload)
}

fn compute_from_payload(payload: LedgerPayload) -> Result<Ledger, LedgerError> {
    let request = ledger_request_from_payload(payload)?;
    let ledger = compute_ledger(request.opening_balance, &request.inputs);
    debug!(
        opening_balance = request.opening_balance,
        total_interest = ledger.total_interest,
        final_principal = ledger.final_principal,
        "computed ledger"
    );
    Ok(ledger)
}

/// Runs the `ledger` subcommand: computes the year, writes any requested
/// exports and returns the statement text.
pub fn run_ledger_command(args: &LedgerArgs) -> Result<String, LedgerError> {
    let inputs = match &args.input {
        Some(path) => read_inputs(File::open(path)?)?,
        None => {
            ensure_amount("--rate", args.rate)?;
            default_inputs(args.rate)
        }
    };
    validate_inputs(args.opening_balance, &inputs)?;

    let ledger = compute_ledger(args.opening_balance, &inputs);
    info!(
        total_interest = ledger.total_interest,
        final_principal = ledger.final_principal,
        "ledger computed"
    );

    if let Some(path) = &args.table {
        write_table(&ledger, File::create(path)?)?;
        info!(path = %path.display(), "wrote ledger table");
    }

    let statement = render_statement(&ledger);
    if let Some(path) = &args.statement {
        std::fs::write(path, &statement)?;
        info!(path = %path.display(), "wrote statement");
    }

    Ok(statement)
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route("/api/ledger", get(ledger_get_handler).post(ledger_post_handler))
        .route("/api/ledger/table", post(table_handler))
        .route("/api/ledger/statement", post(statement_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}").parse::<SocketAddr>()?;
    let listener = TcpListener::bind(addr).await?;
    info!("PF ledger HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router()).await?;
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn ledger_get_handler(Query(query): Query<LedgerQuery>) -> Response {
    ledger_handler_impl(query.into())
}

async fn ledger_post_handler(Json(payload): Json<LedgerPayload>) -> Response {
    ledger_handler_impl(payload)
}

fn ledger_handler_impl(payload: LedgerPayload) -> Response {
    match compute_from_payload(payload) {
        Ok(ledger) => json_response(StatusCode::OK, LedgerResponse::from(&ledger)),
        Err(err) => rejected(err),
    }
}

async fn table_handler(Json(payload): Json<LedgerPayload>) -> Response {
    let ledger = match compute_from_payload(payload) {
        Ok(ledger) => ledger,
        Err(err) => return rejected(err),
    };
    match table_bytes(&ledger) {
        Ok(bytes) => download_response("text/csv; charset=utf-8", TABLE_FILE_NAME, bytes),
        Err(err) => {
            warn!(error = %err, "failed to render ledger table");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

async fn statement_handler(Json(payload): Json<LedgerPayload>) -> Response {
    match compute_from_payload(payload) {
        Ok(ledger) => download_response(
            "text/plain; charset=utf-8",
            STATEMENT_FILE_NAME,
            render_statement(&ledger).into_bytes(),
        ),
        Err(err) => rejected(err),
    }
}

fn rejected(err: LedgerError) -> Response {
    warn!(error = %err, "rejected ledger request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn download_response(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    with_cache_control((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn post_json(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("valid request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[test]
    fn empty_payload_uses_default_grid() {
        let request = ledger_request_from_json("{}").expect("json should parse");
        assert_approx(request.opening_balance, 0.0);
        for (input, month) in request.inputs.iter().zip(Month::ALL) {
            assert_eq!(input.month, month);
            assert_approx(input.rate, DEFAULT_ANNUAL_RATE);
            assert_approx(input.deposit_before_cutoff, 0.0);
        }
    }

    #[test]
    fn payload_months_are_placed_by_label() {
        let json = r#"{
          "openingBalance": 50000,
          "defaultRate": 8.1,
          "months": [
            { "month": "jan", "depBefore15": 1000, "withdrawal": 200 },
            { "month": "APR", "depAfter15": 300, "rate": 7.1 }
          ]
        }"#;
        let request = ledger_request_from_json(json).expect("json should parse");

        assert_approx(request.opening_balance, 50_000.0);
        let april = &request.inputs[0];
        assert_approx(april.deposit_after_cutoff, 300.0);
        assert_approx(april.rate, 7.1);
        let january = &request.inputs[9];
        assert_eq!(january.month, Month::Jan);
        assert_approx(january.deposit_before_cutoff, 1_000.0);
        assert_approx(january.withdrawal, 200.0);
        assert_approx(january.rate, 8.1);
        assert_approx(request.inputs[5].rate, 8.1);
    }

    #[test]
    fn payload_rejects_negative_opening_balance() {
        let err = ledger_request_from_json(r#"{ "openingBalance": -1 }"#)
            .expect_err("must reject negative balance");
        assert!(err.to_string().contains("openingBalance"));
    }

    #[test]
    fn payload_rejects_negative_monthly_amounts() {
        let json = r#"{ "months": [ { "month": "SEP", "withdrawal": -5 } ] }"#;
        let err = ledger_request_from_json(json).expect_err("must reject negative withdrawal");
        assert!(err.to_string().contains("SEP withdrawal"));
    }

    #[test]
    fn payload_rejects_duplicate_and_unknown_months() {
        let json = r#"{ "months": [ { "month": "MAY" }, { "month": "may" } ] }"#;
        let err = ledger_request_from_json(json).expect_err("must reject duplicate");
        assert!(err.to_string().contains("MAY appears more than once"));

        let json = r#"{ "months": [ { "month": "Sept" } ] }"#;
        let err = ledger_request_from_json(json).expect_err("must reject unknown label");
        assert!(matches!(err, LedgerError::UnknownMonth(label) if label == "Sept"));
    }

    #[test]
    fn ledger_response_serialization_contains_expected_fields() {
        let ledger = compute_ledger(0.0, &default_inputs(DEFAULT_ANNUAL_RATE));
        let json =
            serde_json::to_string(&LedgerResponse::from(&ledger)).expect("should serialize");
        assert!(json.contains("\"rows\""));
        assert!(json.contains("\"totalInterest\""));
        assert!(json.contains("\"finalPrincipal\""));
        assert!(json.contains("\"finalBalance\""));
        assert!(json.contains("\"lowestBalance\""));
        assert!(json.contains("\"depositBeforeCutoff\""));
        assert!(json.contains("\"month\":\"APR\""));
    }

    #[test]
    fn ledger_command_writes_requested_exports() {
        let dir = std::env::temp_dir().join(format!("pf-ledger-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let table = dir.join("ledger.csv");
        let statement = dir.join("statement.txt");

        let args = LedgerArgs {
            opening_balance: 12_000.0,
            rate: 12.0,
            input: None,
            table: Some(table.clone()),
            statement: Some(statement.clone()),
        };
        let printed = run_ledger_command(&args).expect("command should succeed");

        assert!(printed.contains("Total Interest for the Year: 1,440.00"));
        let written = std::fs::read_to_string(&statement).expect("statement written");
        assert_eq!(written, printed);
        let csv = std::fs::read_to_string(&table).expect("table written");
        assert_eq!(csv.lines().count(), 13);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn ledger_command_rejects_negative_rate() {
        let args = LedgerArgs {
            opening_balance: 0.0,
            rate: -1.0,
            input: None,
            table: None,
            statement: None,
        };
        let err = run_ledger_command(&args).expect_err("must reject negative rate");
        assert!(err.to_string().contains("--rate"));
    }

    #[tokio::test]
    async fn post_ledger_returns_rows_and_totals() {
        let json = r#"{
          "openingBalance": 100,
          "defaultRate": 12,
          "months": [ { "month": "APR", "withdrawal": 500 } ]
        }"#;
        let response = router()
            .oneshot(post_json("/api/ledger", json))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        let rows = body["rows"].as_array().expect("rows array");
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0]["month"], "APR");
        assert_approx(rows[0]["lowestBalance"].as_f64().expect("number"), 0.0);
        assert_approx(rows[0]["closingBalance"].as_f64().expect("number"), -400.0);
        assert_approx(rows[1]["openingBalance"].as_f64().expect("number"), -400.0);
        assert_approx(body["totalInterest"].as_f64().expect("number"), 0.0);
        assert_approx(body["finalPrincipal"].as_f64().expect("number"), -400.0);
    }

    #[tokio::test]
    async fn get_ledger_reads_query_parameters() {
        let request = Request::builder()
            .uri("/api/ledger?openingBalance=1200&defaultRate=12")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_approx(body["totalInterest"].as_f64().expect("number"), 144.0);
        assert_approx(body["finalBalance"].as_f64().expect("number"), 1_344.0);
    }

    #[tokio::test]
    async fn invalid_payload_returns_bad_request() {
        let response = router()
            .oneshot(post_json("/api/ledger", r#"{ "defaultRate": -2 }"#))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("defaultRate"));
    }

    #[tokio::test]
    async fn table_download_is_csv_attachment() {
        let response = router()
            .oneshot(post_json("/api/ledger/table", r#"{ "openingBalance": 1000 }"#))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(
            disposition.as_deref(),
            Some("attachment; filename=\"PF_Ledger_Calculated.csv\"")
        );
        let body = body_text(response).await;
        assert!(body.starts_with("Month,Opening Balance,"));
        assert!(body.contains("APR,1000.00,"));
    }

    #[tokio::test]
    async fn statement_download_contains_summary() {
        let response = router()
            .oneshot(post_json("/api/ledger/statement", r#"{ "openingBalance": 1200, "defaultRate": 12 }"#))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Provident Fund Ledger Statement"));
        assert!(body.contains("Final Balance (Principal + Interest): 1,344.00"));
    }

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router should respond");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, r#"{"error":"Not found"}"#);
    }

    #[tokio::test]
    async fn index_page_is_served() {
        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("valid request");
        let response = router().oneshot(request).await.expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Provident Fund Ledger Calculator"));
    }
}
