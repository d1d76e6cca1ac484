use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

use crate::config::GeneratorConfig;
use crate::display::week_banner;
use crate::export::records_to_csv;
use crate::parser::InputSource;
use crate::schedule::AssignmentRecord;
use crate::{generate_records, AssignResult};

/// Latest generated table, as served by the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub week: String,
    pub banner: String,
    pub week_start: String,
    pub week_end: String,
    pub failures: Vec<String>,
    pub records: Vec<AssignmentRecord>,
}

// In-memory storage for the generated table
pub struct AppState {
    pub data: Mutex<Option<DashboardData>>,
    pub source: InputSource,
    pub config: GeneratorConfig,
}

impl AppState {
    pub fn new(source: InputSource, config: GeneratorConfig) -> Self {
        AppState {
            data: Mutex::new(None),
            source,
            config,
        }
    }

    /// Loads the tables and regenerates the schedule from scratch
    pub fn regenerate(&self) -> AssignResult<usize> {
        let tables = self.source.load(self.config.time_convention)?;
        let (report, records) = generate_records(tables, &self.config)?;

        let data = DashboardData {
            week: report.week.label(),
            banner: week_banner(&report),
            week_start: report.week.start_date().format("%d-%m-%Y").to_string(),
            week_end: report.week.end_date().format("%d-%m-%Y").to_string(),
            failures: report
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.label, f.error))
                .collect(),
            records,
        };
        let rows = data.records.len();

        match self.data.lock() {
            Ok(mut guard) => *guard = Some(data),
            Err(poisoned) => *poisoned.into_inner() = Some(data),
        }
        Ok(rows)
    }
}

fn lock_data(state: &AppState) -> Result<MutexGuard<'_, Option<DashboardData>>> {
    state
        .data
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("dashboard state is poisoned"))
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignmentFilter {
    day: Option<String>,
    observer: Option<String>,
    subject: Option<String>,
}

impl AssignmentFilter {
    fn matches(&self, record: &AssignmentRecord) -> bool {
        let check = |wanted: &Option<String>, value: &str| match wanted {
            Some(w) if !w.is_empty() => w == value,
            _ => true,
        };
        check(&self.day, &record.day)
            && check(&self.observer, &record.observer_name)
            && check(&self.subject, &record.subject)
    }
}

#[derive(Serialize)]
pub struct FilterOptions {
    days: Vec<String>,
    observers: Vec<String>,
    subjects: Vec<String>,
}

/// Distinct values in order of first appearance
fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

#[derive(Serialize)]
pub struct WeekResponse {
    week: String,
    banner: String,
    week_start: String,
    week_end: String,
    failures: Vec<String>,
    total: usize,
}

// Week info endpoint
async fn get_week(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = lock_data(&state)?;
    if let Some(ref data) = *data {
        Ok(HttpResponse::Ok().json(WeekResponse {
            week: data.week.clone(),
            banner: data.banner.clone(),
            week_start: data.week_start.clone(),
            week_end: data.week_end.clone(),
            failures: data.failures.clone(),
            total: data.records.len(),
        }))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No assignments generated"})))
    }
}

// Filtered assignments endpoint
async fn get_assignments(
    filter: web::Query<AssignmentFilter>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let data = lock_data(&state)?;
    if let Some(ref data) = *data {
        let records: Vec<&AssignmentRecord> =
            data.records.iter().filter(|r| filter.matches(r)).collect();
        Ok(HttpResponse::Ok().json(records))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No assignments generated"})))
    }
}

// Filter options endpoint
async fn get_filters(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = lock_data(&state)?;
    if let Some(ref data) = *data {
        Ok(HttpResponse::Ok().json(FilterOptions {
            days: distinct(data.records.iter().map(|r| &r.day)),
            observers: distinct(data.records.iter().map(|r| &r.observer_name)),
            subjects: distinct(data.records.iter().map(|r| &r.subject)),
        }))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No assignments generated"})))
    }
}

// CSV download endpoint
async fn download_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = lock_data(&state)?;
    if let Some(ref data) = *data {
        let body = records_to_csv(&data.records).map_err(|e| {
            actix_web::error::ErrorInternalServerError(format!("Failed to render CSV: {}", e))
        })?;
        Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"peer_assignments_{}.csv\"", data.week),
            ))
            .body(body))
    } else {
        Ok(HttpResponse::NotFound().json(serde_json::json!({"error": "No assignments generated"})))
    }
}

// Regenerate endpoint: re-reads both tables from disk
async fn regenerate(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.regenerate() {
        Ok(rows) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "rows": rows
        }))),
        Err(e) => {
            error!(error = %e, "regeneration failed");
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": format!("Failed to generate assignments: {}", e)
            })))
        }
    }
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/week", web::get().to(get_week))
        .route("/api/assignments", web::get().to(get_assignments))
        .route("/api/assignments.csv", web::get().to(download_csv))
        .route("/api/filters", web::get().to(get_filters))
        .route("/api/regenerate", web::post().to(regenerate));
}

pub async fn start_server(port: u16, state: AppState) -> std::io::Result<()> {
    // A failed first run still serves the page; /api/regenerate can retry
    if let Err(e) = state.regenerate() {
        error!(error = %e, "initial generation failed");
    }

    let app_state = web::Data::new(state);
    info!(port, "starting dashboard");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
