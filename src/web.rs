use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};
use crate::config::{validate_request, AppConfig, GenerateRequest};
use crate::error::TimetableError;
use crate::parser::SchoolData;
use crate::schedule::{Assignment, GenerationInputs, GenerationReport, PlanSession};
use crate::store::JsonFilePlanStore;

/// Shared server state. The session map lock also serializes generation
/// runs, so a plan is never regenerated twice at once.
pub struct AppState {
    pub school: SchoolData,
    pub store: JsonFilePlanStore,
    pub sessions: Mutex<HashMap<String, PlanSession>>,
    pub admin_password: String,
}

#[derive(Serialize)]
pub struct PlanResponse {
    plan_id: String,
    can_revert: bool,
    block_assignments: Assignment,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    success: bool,
    report: GenerationReport,
    plan: PlanResponse,
}

fn plan_response(session: &PlanSession) -> PlanResponse {
    PlanResponse {
        plan_id: session.plan_id().to_string(),
        can_revert: session.has_backup(),
        block_assignments: session.current().clone(),
    }
}

fn error_response(err: &TimetableError) -> HttpResponse {
    let body = serde_json::json!({"success": false, "error": err.to_string()});
    match err {
        TimetableError::NothingToGenerate(_) => HttpResponse::UnprocessableEntity().json(body),
        TimetableError::InvalidRequest(_) => HttpResponse::BadRequest().json(body),
        TimetableError::UnknownTemplate(_) => HttpResponse::NotFound().json(body),
        _ => {
            error!(error = %err, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn is_admin(req: &HttpRequest, state: &AppState) -> bool {
    req.headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .map(|password| password == state.admin_password)
        .unwrap_or(false)
}

fn lock_sessions(state: &AppState) -> Result<MutexGuard<'_, HashMap<String, PlanSession>>> {
    state
        .sessions
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("session state poisoned"))
}

/// Session for `plan_id`, loaded from the store on first use
fn session_for<'a>(
    sessions: &'a mut HashMap<String, PlanSession>,
    store: &JsonFilePlanStore,
    plan_id: &str,
) -> std::result::Result<&'a mut PlanSession, TimetableError> {
    if !sessions.contains_key(plan_id) {
        let session = PlanSession::load(store, plan_id)?;
        sessions.insert(plan_id.to_string(), session);
    }
    sessions
        .get_mut(plan_id)
        .ok_or_else(|| TimetableError::InvalidRequest(format!("plan {} unavailable", plan_id)))
}

// Current timetable of a plan
async fn get_plan(plan_id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut sessions = lock_sessions(&state)?;
    match session_for(&mut sessions, &state.store, &plan_id) {
        Ok(session) => Ok(HttpResponse::Ok().json(plan_response(session))),
        Err(e) => Ok(error_response(&e)),
    }
}

// Regenerates a plan and saves it
async fn generate_plan(
    req: HttpRequest,
    plan_id: web::Path<String>,
    body: web::Json<GenerateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }
    if let Err(e) = validate_request(&body) {
        return Ok(error_response(&e));
    }

    let inputs = match GenerationInputs::gather(&state.school, &state.school, &body.template_id) {
        Ok(inputs) => inputs,
        Err(e) => return Ok(error_response(&e)),
    };
    let config = body.generation_config();
    let mut rng = match body.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sessions = lock_sessions(&state)?;
    let session = match session_for(&mut sessions, &state.store, &plan_id) {
        Ok(session) => session,
        Err(e) => return Ok(error_response(&e)),
    };
    let report = match session.generate(&inputs, &config, &mut rng) {
        Ok(report) => report,
        Err(e) => return Ok(error_response(&e)),
    };
    // the new timetable stays in the session even if saving fails
    if let Err(e) = session.save(&state.store) {
        return Ok(error_response(&e));
    }
    info!(plan_id = %plan_id, filled = report.filled_cells, "plan regenerated");

    Ok(HttpResponse::Ok().json(GenerateResponse {
        success: true,
        report,
        plan: plan_response(session),
    }))
}

// Undoes the last generation of a plan
async fn revert_plan(
    req: HttpRequest,
    plan_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&req, &state) {
        return Ok(HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let mut sessions = lock_sessions(&state)?;
    let session = match session_for(&mut sessions, &state.store, &plan_id) {
        Ok(session) => session,
        Err(e) => return Ok(error_response(&e)),
    };
    let reverted = session.revert();
    if reverted {
        if let Err(e) = session.save(&state.store) {
            return Ok(error_response(&e));
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "reverted": reverted,
        "plan": plan_response(session),
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/plans/{plan_id}").route(web::get().to(get_plan)))
        .service(web::resource("/api/plans/{plan_id}/generate").route(web::post().to(generate_plan)))
        .service(web::resource("/api/plans/{plan_id}/revert").route(web::post().to(revert_plan)));
}

pub async fn start_server(port: u16, config: AppConfig) -> std::io::Result<()> {
    let school = SchoolData::load(&config.data_dir)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    let app_state = web::Data::new(AppState {
        school,
        store: JsonFilePlanStore::new(&config.plan_dir),
        sessions: Mutex::new(HashMap::new()),
        admin_password: config.admin_password,
    });

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
