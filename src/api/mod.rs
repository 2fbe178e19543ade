use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    AnnualSchedule, AnnualScheduleEntry, ProjectionResult, YearWindow, YieldPeriod, YieldPlan,
};

const MAX_PERSISTED_YEAR: i64 = 99;
/// Longest single assumed-yield period, matching the 100-year annual horizon.
const MAX_PERIOD_YEARS: u32 = 100;
/// Upper bound on the summed duration of all periods; the chart curve holds
/// one point per year.
const MAX_TOTAL_PERIOD_YEARS: u32 = 1_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMode {
    Annual,
    Yield,
}

/// One persisted annual row as a store or form hands it over.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnualRow {
    year: i64,
    rate: f64,
    #[serde(alias = "monthly_deposit")]
    monthly_deposit: f64,
}

/// One persisted assumed-yield row. A stored `order` field is accepted and
/// ignored; rows are used in the sequence they arrive.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
struct YieldRow {
    year: f64,
    rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    principal: Option<f64>,
    rate: Option<f64>,
    monthly_deposit: Option<f64>,
    schedule_years: Option<u32>,
    max_year: Option<u32>,
    #[serde(alias = "annualSimulations")]
    schedule: Option<Vec<AnnualRow>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummarizePayload {
    principal: Option<f64>,
    /// `RATE:YEARS[,RATE:YEARS...]`, the query-string form of `assumedYields`.
    periods: Option<String>,
    /// Compounded in list order; each row's `order` is reassigned from its position.
    assumed_yields: Option<Vec<YieldRow>>,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Compound savings projection: per-year schedule or assumed-yield periods"
)]
struct Cli {
    #[arg(long, value_enum, default_value_t = CliMode::Annual)]
    mode: CliMode,
    #[arg(long, default_value_t = 100_000.0, help = "Starting balance")]
    principal: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Annual rate in percent applied to every schedule year"
    )]
    rate: f64,
    #[arg(
        long,
        default_value_t = 10_000.0,
        help = "Deposit added each month of every schedule year"
    )]
    monthly_deposit: f64,
    #[arg(
        long,
        default_value_t = 100,
        help = "Number of schedule years to generate (at most 100)"
    )]
    schedule_years: u32,
    #[arg(
        long,
        default_value_t = 30,
        help = "Display window in years: 10, 30, 50 or 100"
    )]
    max_year: u32,
    #[arg(
        long = "period",
        value_parser = parse_period,
        help = "Assumed-yield period as RATE:YEARS, repeatable (yield mode)"
    )]
    periods: Vec<YieldRow>,
    #[arg(skip)]
    schedule: Option<Vec<AnnualRow>>,
}

#[derive(Debug)]
struct ProjectInputs {
    principal: f64,
    schedule: AnnualSchedule,
    window: YearWindow,
}

#[derive(Debug)]
struct SummaryInputs {
    principal: f64,
    plan: YieldPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    principal: f64,
    max_year: u32,
    schedule_years: usize,
    final_balance: f64,
    points: ProjectionResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeResponse {
    principal: f64,
    total_years: u32,
    final_amount: i64,
    summary: String,
    period_count: usize,
    points: ProjectionResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn is_whole(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

fn parse_period(raw: &str) -> Result<YieldRow, String> {
    let (rate, years) = raw
        .split_once(':')
        .ok_or_else(|| format!("period `{raw}` must look like RATE:YEARS"))?;
    let rate = rate
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("period `{raw}` has an invalid rate: {e}"))?;
    let year = years
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("period `{raw}` has an invalid year count: {e}"))?;
    Ok(YieldRow {
        year,
        rate,
    })
}

fn parse_period_list(raw: &str) -> Result<Vec<YieldRow>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_period)
        .collect()
}

fn validate_principal(principal: f64) -> Result<(), String> {
    if !principal.is_finite() || principal < 0.0 {
        return Err("--principal must be a finite number >= 0".to_string());
    }
    Ok(())
}

fn build_project_inputs(cli: &Cli) -> Result<ProjectInputs, String> {
    validate_principal(cli.principal)?;

    let Some(window) = YearWindow::from_years(cli.max_year) else {
        return Err("--max-year must be one of 10, 30, 50, 100".to_string());
    };

    let schedule = match &cli.schedule {
        Some(rows) => schedule_from_rows(rows)?,
        None => {
            if !is_whole(cli.rate) {
                return Err("--rate must be a whole number".to_string());
            }
            if !is_whole(cli.monthly_deposit) {
                return Err("--monthly-deposit must be a whole number".to_string());
            }
            if i64::from(cli.schedule_years) > MAX_PERSISTED_YEAR + 1 {
                return Err("--schedule-years must be <= 100".to_string());
            }
            AnnualSchedule::uniform(cli.schedule_years, cli.rate, cli.monthly_deposit)
        }
    };

    Ok(ProjectInputs {
        principal: cli.principal,
        schedule,
        window,
    })
}

fn schedule_from_rows(rows: &[AnnualRow]) -> Result<AnnualSchedule, String> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut entries = Vec::with_capacity(rows.len());

    for row in rows {
        if !(0..=MAX_PERSISTED_YEAR).contains(&row.year) {
            return Err(format!(
                "schedule year {} must be between 0 and {MAX_PERSISTED_YEAR}",
                row.year
            ));
        }
        if !seen.insert(row.year) {
            return Err(format!("schedule year {} appears more than once", row.year));
        }
        if !is_whole(row.rate) {
            return Err(format!("schedule year {}: rate must be a whole number", row.year));
        }
        if !is_whole(row.monthly_deposit) {
            return Err(format!(
                "schedule year {}: monthlyDeposit must be a whole number",
                row.year
            ));
        }
        entries.push(AnnualScheduleEntry::new(
            row.year as u32,
            row.rate,
            row.monthly_deposit,
        ));
    }

    AnnualSchedule::from_entries(entries).map_err(|e| e.to_string())
}

fn build_summary_inputs(cli: &Cli) -> Result<SummaryInputs, String> {
    validate_principal(cli.principal)?;

    let mut periods = Vec::with_capacity(cli.periods.len());
    let mut total_years = 0u32;
    for (idx, row) in cli.periods.iter().enumerate() {
        let position = idx as u32 + 1;
        if !row.rate.is_finite() {
            return Err(format!("period {position}: rate must be a finite number"));
        }
        if !is_whole(row.year) || row.year < 0.0 {
            return Err(format!(
                "period {position}: years must be a whole number >= 0"
            ));
        }
        if row.year > f64::from(MAX_PERIOD_YEARS) {
            return Err(format!(
                "period {position}: years must be <= {MAX_PERIOD_YEARS}"
            ));
        }
        let years = row.year as u32;
        total_years = total_years
            .checked_add(years)
            .filter(|total| *total <= MAX_TOTAL_PERIOD_YEARS)
            .ok_or_else(|| {
                format!("periods must add up to at most {MAX_TOTAL_PERIOD_YEARS} years")
            })?;
        periods.push(YieldPeriod::new(position, years, row.rate));
    }

    Ok(SummaryInputs {
        principal: cli.principal,
        plan: YieldPlan::from_sequence(periods),
    })
}

fn run_projection(inputs: &ProjectInputs) -> ProjectResponse {
    let points = inputs.schedule.project(inputs.principal, inputs.window);
    ProjectResponse {
        principal: inputs.principal,
        max_year: inputs.window.years(),
        schedule_years: inputs.schedule.window(inputs.window).len(),
        final_balance: points.final_balance(),
        points,
    }
}

fn run_summary(inputs: &SummaryInputs) -> SummarizeResponse {
    let summary = inputs.plan.summarize(inputs.principal);
    SummarizeResponse {
        principal: inputs.principal,
        total_years: summary.total_years,
        final_amount: summary.final_amount,
        summary: summary.to_string(),
        period_count: inputs.plan.len(),
        points: inputs.plan.series(inputs.principal),
    }
}

/// Parses command-line arguments and renders the requested projection as
/// JSON. `--help` and `--version` come back as `Ok` text; malformed
/// arguments come back as the rendered clap error.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(e.to_string()),
                _ => Err(e.to_string()),
            };
        }
    };
    render_cli(&cli)
}

fn render_cli(cli: &Cli) -> Result<String, String> {
    let json = match cli.mode {
        CliMode::Annual => {
            let inputs = build_project_inputs(cli)?;
            tracing::debug!(
                principal = inputs.principal,
                schedule_years = inputs.schedule.len(),
                max_year = inputs.window.years(),
                "projecting annual schedule"
            );
            serde_json::to_string_pretty(&run_projection(&inputs))
        }
        CliMode::Yield => {
            let inputs = build_summary_inputs(cli)?;
            tracing::debug!(
                principal = inputs.principal,
                periods = inputs.plan.len(),
                "summarizing yield periods"
            );
            serde_json::to_string_pretty(&run_summary(&inputs))
        }
    };
    json.map_err(|e| format!("failed to render report: {e}"))
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/summarize",
            get(summarize_get_handler).post(summarize_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("nestegg HTTP API listening on http://{addr}");
    tracing::info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn summarize_get_handler(Query(payload): Query<SummarizePayload>) -> Response {
    summarize_handler_impl(payload)
}

async fn summarize_post_handler(Json(payload): Json<SummarizePayload>) -> Response {
    summarize_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = match project_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            tracing::warn!("rejected projection request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    tracing::debug!(
        schedule_years = inputs.schedule.len(),
        max_year = inputs.window.years(),
        "projecting annual schedule"
    );
    json_response(StatusCode::OK, run_projection(&inputs))
}

fn summarize_handler_impl(payload: SummarizePayload) -> Response {
    let inputs = match summary_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => {
            tracing::warn!("rejected summary request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    tracing::debug!(periods = inputs.plan.len(), "summarizing yield periods");
    json_response(StatusCode::OK, run_summary(&inputs))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn project_inputs_from_payload(payload: ProjectPayload) -> Result<ProjectInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.rate {
        cli.rate = v;
    }
    if let Some(v) = payload.monthly_deposit {
        cli.monthly_deposit = v;
    }
    if let Some(v) = payload.schedule_years {
        cli.schedule_years = v;
    }
    if let Some(v) = payload.max_year {
        cli.max_year = v;
    }
    if let Some(rows) = payload.schedule {
        cli.schedule = Some(rows);
    }

    build_project_inputs(&cli)
}

fn summary_inputs_from_payload(payload: SummarizePayload) -> Result<SummaryInputs, String> {
    let mut cli = default_cli_for_api();
    cli.mode = CliMode::Yield;

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(raw) = payload.periods {
        cli.periods = parse_period_list(&raw)?;
    }
    if let Some(rows) = payload.assumed_yields {
        cli.periods = rows;
    }

    build_summary_inputs(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        mode: CliMode::Annual,
        principal: 100_000.0,
        rate: 3.0,
        monthly_deposit: 10_000.0,
        schedule_years: 100,
        max_year: 30,
        periods: Vec::new(),
        schedule: None,
    }
}
