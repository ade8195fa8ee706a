use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::models::{DeveloperUpdate, NewDeveloper};
use crate::developers::views::{FriendDeveloper, PublicDeveloper};
use crate::error::{AppError, DatabaseError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AvatarPayload {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    pub avatar: AvatarPayload,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRef {
    pub id: i64,
}

/// GET /api/developers
pub async fn list_developers(
    query: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let developers = state.db.list_developers(query.limit, query.offset).await?;
    let profiles = state.db.load_profiles(developers).await?;

    Ok(HttpResponse::Ok().json(profiles))
}

/// GET /api/developers/{id}
///
/// Friends of the caller get the full view, everyone else the public view.
pub async fn get_developer(
    current: CurrentUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let current_developer = state
        .db
        .get_developer_by_user(current.0.id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    let developer = state
        .db
        .get_developer(id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    let friends = state.db.are_friends(current_developer.id, developer.id).await?;
    let profile = state.db.load_profile(developer).await?;

    if friends {
        Ok(HttpResponse::Ok().json(FriendDeveloper::build(profile)))
    } else {
        Ok(HttpResponse::Ok().json(PublicDeveloper::build(profile)))
    }
}

/// GET /api/developers/lang/{lang_id}
pub async fn get_developers_by_language(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let developers = state.db.list_developers_by_language(path.into_inner()).await?;
    let profiles = state.db.load_profiles(developers).await?;

    Ok(HttpResponse::Ok().json(profiles))
}

/// GET /api/developers/cohort/{cohort}
pub async fn get_developers_by_cohort(
    path: web::Path<i32>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let developers = state.db.list_developers_by_cohort(path.into_inner()).await?;
    let profiles = state.db.load_profiles(developers).await?;

    Ok(HttpResponse::Ok().json(profiles))
}

/// GET /api/developers/likes/{dev_id}
pub async fn get_approved_geekouts(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let geekouts = state.db.list_geekouts_approved_by(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(geekouts))
}

/// GET /api/developers/self
pub async fn get_self(
    current: CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let developer = state
        .db
        .get_developer_by_user(current.0.id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    let profile = state.db.load_profile(developer).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/developers
pub async fn create_developer(
    current: CurrentUser,
    payload: web::Json<NewDeveloper>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Creating developer profile for user {}", current.0.id);

    // The unique index on developers.user_id turns a second profile for the
    // same user into a 409.
    let developer = state.db.create_developer(current.0.id, &payload).await?;
    let profile = state.db.load_profile(developer).await?;

    Ok(HttpResponse::Created().json(profile))
}

/// POST /api/developers/photo
pub async fn add_photo(
    current: CurrentUser,
    payload: web::Json<PhotoRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let url = payload.avatar.url.trim();
    if url.is_empty() {
        return Err(AppError::ValidationError("Avatar url must not be empty".into()));
    }

    let developer = state
        .db
        .get_developer_by_user(current.0.id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    let developer = state.db.set_developer_photo(&developer, url).await?;
    let profile = state.db.load_profile(developer).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/developers/language
pub async fn add_languages(
    current: CurrentUser,
    payload: web::Json<Vec<LanguageRef>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let developer = state
        .db
        .get_developer_by_user(current.0.id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    let language_ids: Vec<i64> = payload.iter().map(|language| language.id).collect();
    state.db.add_developer_languages(developer.id, &language_ids).await?;

    let profile = state.db.load_profile(developer).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/developers
pub async fn update_developer(
    current: CurrentUser,
    payload: web::Json<DeveloperUpdate>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut developer = state
        .db
        .get_developer_by_user(current.0.id)
        .await?
        .ok_or(DatabaseError::NotFound)?;

    developer.apply_update(&payload);
    let developer = state.db.save_developer(&developer).await?;
    let profile = state.db.load_profile(developer).await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// DELETE /api/developers
pub async fn destroy_developer(
    current: CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deleted = state.db.delete_developer_by_user(current.0.id).await?;
    info!("Deleted {} developer profile(s) for user {}", deleted, current.0.id);

    Ok(HttpResponse::Ok().body("Deleted"))
}

/// DELETE /api/developers/{id}
///
/// No ownership check, matching the original API contract.
pub async fn destroy_developer_by_id(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let deleted = state.db.delete_developer(id).await?;
    info!("Deleted {} developer profile(s) with id {}", deleted, id);

    Ok(HttpResponse::Ok().body("Deleted"))
}
