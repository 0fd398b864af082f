//! Public, read-only views of the live roster.

use actix_web::{get, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{PlayerRecord, RosterTable};
use crate::error::RosterError;
use crate::presenter::{self, ColorStyle};
use crate::query;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// One player as the front-end renders it.
#[derive(Serialize)]
pub struct PlayerView {
    pub id: Uuid,
    pub username: String,
    pub rating: f64,
    pub quip_rating: String,
    pub tier: f64,
    pub style: ColorStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlayerView {
    pub fn public(r: PlayerRecord) -> Self {
        let mut view = Self::with_notes(r);
        view.notes = None;
        view
    }

    pub fn with_notes(r: PlayerRecord) -> Self {
        let style = presenter::rating_style(r.rating);
        PlayerView {
            id: r.id,
            quip_rating: presenter::display_rating(r.rating),
            tier: style.tier,
            style: style.style,
            username: r.username,
            rating: r.rating,
            notes: r.notes,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct TierRow {
    pub tier: f64,
    pub label: String,
    pub heading: presenter::HeadingColor,
    pub players: Vec<PlayerView>,
}

#[derive(Serialize)]
pub struct PlayerList {
    pub count: usize,
    pub players: Vec<PlayerView>,
}

/// Query `table` through the cache and present it.
pub async fn list_view(
    state: &AppState,
    table: RosterTable,
    search: Option<&str>,
    show_notes: bool,
) -> Result<PlayerList, RosterError> {
    let roster = state.cache.roster(&state.store, table).await?;
    let players: Vec<PlayerView> = query::query(roster.records(), search, state.matcher.as_ref())
        .into_iter()
        .map(|r| {
            if show_notes {
                PlayerView::with_notes(r)
            } else {
                PlayerView::public(r)
            }
        })
        .collect();
    Ok(PlayerList {
        count: players.len(),
        players,
    })
}

/// GET /api/players?search=
#[get("/players")]
pub async fn list_players(
    state: web::Data<AppState>,
    web::Query(params): web::Query<SearchParams>,
) -> Result<HttpResponse, RosterError> {
    let list = list_view(&state, RosterTable::Live, params.search.as_deref(), false).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/players/{username}
#[get("/players/{username}")]
pub async fn player_by_name(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, RosterError> {
    let username = path.into_inner();
    let roster = state.cache.roster(&state.store, RosterTable::Live).await?;
    let record = roster
        .find_username(&username)
        .cloned()
        .ok_or(RosterError::UsernameNotFound {
            table: RosterTable::Live,
            username,
        })?;
    Ok(HttpResponse::Ok().json(PlayerView::public(record)))
}

/// GET /api/tierlist
#[get("/tierlist")]
pub async fn tierlist(state: web::Data<AppState>) -> Result<HttpResponse, RosterError> {
    let roster = state.cache.roster(&state.store, RosterTable::Live).await?;
    let rows: Vec<TierRow> = query::group_by_tier(roster.records())
        .into_iter()
        .map(|g| TierRow {
            tier: g.tier,
            label: g.label,
            heading: g.heading,
            players: g.players.into_iter().map(PlayerView::public).collect(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(rows))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_players)
        .service(player_by_name)
        .service(tierlist);
}
