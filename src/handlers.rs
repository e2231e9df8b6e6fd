use crate::{
    aggregate::{Area, group_areas},
    db,
    error::AppError,
    extractors::{ApiJson, EntityId},
    models::{Artist, ArtistPayload, SearchPayload, Show, ShowPayload, Venue, VenuePayload},
    state::AppState,
    views::{ArtistDetail, ArtistSummary, SearchResults, ShowListing, VenueDetail},
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use chrono::{Local, NaiveDateTime};
use tracing::info;

/// Show times are naive wall-clock values, so "now" is local time too.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn venue_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("venue {id} not found"))
}

fn artist_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("artist {id} not found"))
}

pub async fn route_not_found() -> AppError {
    AppError::NotFound("resource not found".to_string())
}

// Venues

pub async fn list_venues(State(app_state): State<AppState>) -> Result<Json<Vec<Area>>, AppError> {
    let schedules = db::venue_schedules(&app_state.pool).await?;
    Ok(Json(group_areas(schedules, now())))
}

pub async fn search_venues(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<SearchPayload>,
) -> Result<Json<SearchResults>, AppError> {
    let matches = db::search_venues(&app_state.pool, payload.search_term.trim()).await?;
    Ok(Json(SearchResults::new(matches, now())))
}

pub async fn get_venue(
    State(app_state): State<AppState>,
    EntityId(venue_id): EntityId,
) -> Result<Json<VenueDetail>, AppError> {
    let venue = db::get_venue(&app_state.pool, venue_id)
        .await?
        .ok_or_else(|| venue_not_found(venue_id))?;
    let bookings = db::venue_bookings(&app_state.pool, venue_id).await?;
    Ok(Json(VenueDetail::new(venue, bookings, now())))
}

pub async fn create_venue(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<VenuePayload>,
) -> Result<(StatusCode, Json<Venue>), AppError> {
    payload.validate()?;
    let venue = db::create_venue(&app_state.pool, &payload).await?;
    info!("Venue {} was successfully listed (id {})", venue.name, venue.id);
    Ok((StatusCode::CREATED, Json(venue)))
}

pub async fn update_venue(
    State(app_state): State<AppState>,
    EntityId(venue_id): EntityId,
    ApiJson(payload): ApiJson<VenuePayload>,
) -> Result<Json<Venue>, AppError> {
    payload.validate()?;
    db::update_venue(&app_state.pool, venue_id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| venue_not_found(venue_id))
}

pub async fn delete_venue(
    State(app_state): State<AppState>,
    EntityId(venue_id): EntityId,
) -> Result<StatusCode, AppError> {
    if !db::delete_venue(&app_state.pool, venue_id).await? {
        return Err(venue_not_found(venue_id));
    }
    info!("Venue {venue_id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Artists

pub async fn list_artists(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ArtistSummary>>, AppError> {
    let artists = db::list_artists(&app_state.pool).await?;
    Ok(Json(
        artists
            .into_iter()
            .map(|(id, name)| ArtistSummary { id, name })
            .collect(),
    ))
}

pub async fn search_artists(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<SearchPayload>,
) -> Result<Json<SearchResults>, AppError> {
    let matches = db::search_artists(&app_state.pool, payload.search_term.trim()).await?;
    Ok(Json(SearchResults::new(matches, now())))
}

pub async fn get_artist(
    State(app_state): State<AppState>,
    EntityId(artist_id): EntityId,
) -> Result<Json<ArtistDetail>, AppError> {
    let artist = db::get_artist(&app_state.pool, artist_id)
        .await?
        .ok_or_else(|| artist_not_found(artist_id))?;
    let bookings = db::artist_bookings(&app_state.pool, artist_id).await?;
    Ok(Json(ArtistDetail::new(artist, bookings, now())))
}

pub async fn create_artist(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<ArtistPayload>,
) -> Result<(StatusCode, Json<Artist>), AppError> {
    payload.validate()?;
    let artist = db::create_artist(&app_state.pool, &payload).await?;
    info!("Artist {} was successfully listed (id {})", artist.name, artist.id);
    Ok((StatusCode::CREATED, Json(artist)))
}

pub async fn update_artist(
    State(app_state): State<AppState>,
    EntityId(artist_id): EntityId,
    ApiJson(payload): ApiJson<ArtistPayload>,
) -> Result<Json<Artist>, AppError> {
    payload.validate()?;
    db::update_artist(&app_state.pool, artist_id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| artist_not_found(artist_id))
}

pub async fn delete_artist(
    State(app_state): State<AppState>,
    EntityId(artist_id): EntityId,
) -> Result<StatusCode, AppError> {
    if !db::delete_artist(&app_state.pool, artist_id).await? {
        return Err(artist_not_found(artist_id));
    }
    info!("Artist {artist_id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Shows

pub async fn list_shows(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ShowListing>>, AppError> {
    db::list_shows(&app_state.pool).await.map(Json)
}

pub async fn create_show(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<ShowPayload>,
) -> Result<(StatusCode, Json<Show>), AppError> {
    let show = db::create_show(
        &app_state.pool,
        payload.venue_id,
        payload.artist_id,
        payload.start_time,
    )
    .await?;
    info!("Show {} was successfully listed", show.id);
    Ok((StatusCode::CREATED, Json(show)))
}
