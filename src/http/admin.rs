//! Editor dashboard: draft CRUD plus publish / discard.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::models::{PlayerFields, RosterTable};
use crate::error::RosterError;
use crate::http::auth::JwtAuth;
use crate::http::players::{list_view, PlayerView, SearchParams};
use crate::identity::EditorCheck;
use crate::publish::BulkOp;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BulkRequest {
    /// Must be `true`; the dashboard sends it from the confirmation dialog.
    #[serde(default)]
    pub confirm: bool,
}

/// GET /api/admin/permissions
#[get("/admin/permissions")]
pub async fn permissions(
    auth: JwtAuth,
    state: web::Data<AppState>,
) -> Result<HttpResponse, RosterError> {
    let editor = auth.editor(&state).is_authorized_editor().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "editor": editor })))
}

async fn require_editor(auth: &JwtAuth, state: &AppState) -> Result<(), RosterError> {
    if auth.editor(state).is_authorized_editor().await? {
        Ok(())
    } else {
        Err(RosterError::Unauthorized)
    }
}

/// GET /api/admin/players?search=
#[get("/admin/players")]
pub async fn list_draft(
    auth: JwtAuth,
    state: web::Data<AppState>,
    web::Query(params): web::Query<SearchParams>,
) -> Result<HttpResponse, RosterError> {
    require_editor(&auth, &state).await?;
    let list = list_view(&state, RosterTable::Draft, params.search.as_deref(), true).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// POST /api/admin/players
#[post("/admin/players")]
pub async fn create(
    auth: JwtAuth,
    state: web::Data<AppState>,
    body: web::Json<PlayerFields>,
) -> Result<HttpResponse, RosterError> {
    let created = state
        .store
        .create_draft(&auth.editor(&state), body.into_inner())
        .await?;
    state.cache.invalidate(RosterTable::Draft);
    Ok(HttpResponse::Created().json(PlayerView::with_notes(created)))
}

/// PUT /api/admin/players/{id}
#[put("/admin/players/{id}")]
pub async fn update(
    auth: JwtAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerFields>,
) -> Result<HttpResponse, RosterError> {
    let updated = state
        .store
        .update_draft(&auth.editor(&state), path.into_inner(), body.into_inner())
        .await?;
    state.cache.invalidate(RosterTable::Draft);
    Ok(HttpResponse::Ok().json(PlayerView::with_notes(updated)))
}

/// DELETE /api/admin/players/{id}
#[delete("/admin/players/{id}")]
pub async fn remove(
    auth: JwtAuth,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, RosterError> {
    state
        .store
        .delete_draft(&auth.editor(&state), path.into_inner())
        .await?;
    state.cache.invalidate(RosterTable::Draft);
    Ok(HttpResponse::NoContent().finish())
}

async fn run_bulk(
    op: BulkOp,
    auth: JwtAuth,
    state: web::Data<AppState>,
    req: BulkRequest,
) -> Result<HttpResponse, RosterError> {
    state
        .controller
        .run(op, &auth.editor(&state), req.confirm)
        .await?;
    Ok(HttpResponse::Ok().json(state.controller.state(op)))
}

/// POST /api/admin/publish
#[post("/admin/publish")]
pub async fn publish(
    auth: JwtAuth,
    state: web::Data<AppState>,
    body: web::Json<BulkRequest>,
) -> Result<HttpResponse, RosterError> {
    run_bulk(BulkOp::Publish, auth, state, body.into_inner()).await
}

/// POST /api/admin/discard
#[post("/admin/discard")]
pub async fn discard(
    auth: JwtAuth,
    state: web::Data<AppState>,
    body: web::Json<BulkRequest>,
) -> Result<HttpResponse, RosterError> {
    run_bulk(BulkOp::Discard, auth, state, body.into_inner()).await
}

/// GET /api/admin/bulk/{op}
#[get("/admin/bulk/{op}")]
pub async fn bulk_state(
    auth: JwtAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, RosterError> {
    require_editor(&auth, &state).await?;
    let op = match path.as_str() {
        "publish" => BulkOp::Publish,
        "discard" => BulkOp::Discard,
        other => {
            return Err(RosterError::InvalidInput {
                reason: format!("unknown bulk operation {other:?}"),
            })
        }
    };
    Ok(HttpResponse::Ok().json(state.controller.state(op)))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(permissions)
        .service(list_draft)
        .service(create)
        .service(update)
        .service(remove)
        .service(publish)
        .service(discard)
        .service(bulk_state);
}
