use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, types::Json};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub genres: Json<Vec<String>>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub genres: Json<Vec<String>>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Show {
    pub id: i64,
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct VenuePayload {
    pub name: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub address: String,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "clean_genres")]
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    #[serde(default)]
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistPayload {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "clean_genres")]
    pub genres: Vec<String>,
    pub image_link: Option<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    #[serde(default)]
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ShowPayload {
    pub venue_id: i64,
    pub artist_id: i64,
    #[serde(deserialize_with = "lenient_datetime")]
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub search_term: String,
}

impl VenuePayload {
    pub fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        require("state", &self.state)?;
        require_genres(&self.genres)
    }
}

impl ArtistPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        require("name", &self.name)?;
        require("city", &self.city)?;
        require("state", &self.state)?;
        require_genres(&self.genres)
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(())
}

fn require_genres(genres: &[String]) -> Result<(), AppError> {
    if genres.is_empty() {
        return Err(AppError::BadRequest("at least one genre is required".to_string()));
    }
    Ok(())
}

/// Trims each genre and drops blank entries.
fn clean_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let genres = Vec::<String>::deserialize(deserializer)?;
    Ok(genres
        .into_iter()
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect())
}

/// Form-style `2035-04-01 20:00:00` as well as ISO `2035-04-01T20:00[:00]`.
const START_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid start_time: {raw}")))
}
