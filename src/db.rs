use crate::aggregate::{Booking, VenueSchedule};
use crate::error::AppError;
use crate::models::{Artist, ArtistPayload, Show, Venue, VenuePayload};
use crate::views::{ArtistRef, ShowListing, VenueRef};
use chrono::NaiveDateTime;
use sqlx::{SqlitePool, types::Json};
use std::collections::HashMap;

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS venue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            phone TEXT,
            genres TEXT NOT NULL,
            image_link TEXT,
            facebook_link TEXT,
            website_link TEXT,
            seeking_talent BOOLEAN NOT NULL DEFAULT 0,
            seeking_description TEXT
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS artist (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            phone TEXT,
            genres TEXT NOT NULL,
            image_link TEXT,
            facebook_link TEXT,
            website_link TEXT,
            seeking_venue BOOLEAN NOT NULL DEFAULT 0,
            seeking_description TEXT
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS show (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            venue_id INTEGER NOT NULL,
            artist_id INTEGER NOT NULL,
            start_time TIMESTAMP NOT NULL,
            FOREIGN KEY (venue_id) REFERENCES venue (id) ON DELETE CASCADE,
            FOREIGN KEY (artist_id) REFERENCES artist (id) ON DELETE CASCADE
        );",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// Venues

pub async fn get_venue(pool: &SqlitePool, id: i64) -> Result<Option<Venue>, AppError> {
    sqlx::query_as("SELECT * FROM venue WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn create_venue(pool: &SqlitePool, venue: &VenuePayload) -> Result<Venue, AppError> {
    let created = sqlx::query_as(
        "INSERT INTO venue (name, city, state, address, phone, genres, image_link, facebook_link, website_link, seeking_talent, seeking_description)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&venue.name)
    .bind(&venue.city)
    .bind(&venue.state)
    .bind(&venue.address)
    .bind(&venue.phone)
    .bind(Json(&venue.genres))
    .bind(&venue.image_link)
    .bind(&venue.facebook_link)
    .bind(&venue.website_link)
    .bind(venue.seeking_talent)
    .bind(&venue.seeking_description)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

pub async fn update_venue(
    pool: &SqlitePool,
    id: i64,
    venue: &VenuePayload,
) -> Result<Option<Venue>, AppError> {
    sqlx::query_as(
        "UPDATE venue SET name = ?, city = ?, state = ?, address = ?, phone = ?, genres = ?,
            image_link = ?, facebook_link = ?, website_link = ?, seeking_talent = ?, seeking_description = ?
         WHERE id = ? RETURNING *",
    )
    .bind(&venue.name)
    .bind(&venue.city)
    .bind(&venue.state)
    .bind(&venue.address)
    .bind(&venue.phone)
    .bind(Json(&venue.genres))
    .bind(&venue.image_link)
    .bind(&venue.facebook_link)
    .bind(&venue.website_link)
    .bind(venue.seeking_talent)
    .bind(&venue.seeking_description)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from)
}

/// Returns whether a row was removed. Shows go with it through the foreign key.
pub async fn delete_venue(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let deleted = sqlx::query("DELETE FROM venue WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}

/// Every venue with the start times of its shows, by ascending venue id.
pub async fn venue_schedules(pool: &SqlitePool) -> Result<Vec<VenueSchedule>, AppError> {
    let venues: Vec<(i64, String, String, String)> =
        sqlx::query_as("SELECT id, name, city, state FROM venue ORDER BY id")
            .fetch_all(pool)
            .await?;

    let show_times: Vec<(i64, NaiveDateTime)> =
        sqlx::query_as("SELECT venue_id, start_time FROM show ORDER BY start_time, id")
            .fetch_all(pool)
            .await?;

    let mut by_venue: HashMap<i64, Vec<NaiveDateTime>> = HashMap::new();
    for (venue_id, start_time) in show_times {
        by_venue.entry(venue_id).or_default().push(start_time);
    }

    Ok(venues
        .into_iter()
        .map(|(id, name, city, state)| VenueSchedule {
            start_times: by_venue.remove(&id).unwrap_or_default(),
            id,
            name,
            city,
            state,
        })
        .collect())
}

/// Case-insensitive substring search on venue names, Unicode-aware.
pub async fn search_venues(
    pool: &SqlitePool,
    term: &str,
) -> Result<Vec<(i64, String, Vec<NaiveDateTime>)>, AppError> {
    let rows: Vec<(i64, String, Option<NaiveDateTime>)> = sqlx::query_as(
        "SELECT v.id, v.name, s.start_time
         FROM venue v
         LEFT JOIN show s ON s.venue_id = v.id
         ORDER BY v.id, s.start_time",
    )
    .fetch_all(pool)
    .await?;
    Ok(group_start_times(rows, term))
}

/// Shows held at a venue, each paired with its artist.
pub async fn venue_bookings(
    pool: &SqlitePool,
    venue_id: i64,
) -> Result<Vec<Booking<ArtistRef>>, AppError> {
    let rows: Vec<(i64, String, Option<String>, NaiveDateTime)> = sqlx::query_as(
        "SELECT a.id, a.name, a.image_link, s.start_time
         FROM show s
         JOIN artist a ON s.artist_id = a.id
         WHERE s.venue_id = ?
         ORDER BY s.start_time, s.id",
    )
    .bind(venue_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(artist_id, artist_name, artist_image_link, start_time)| Booking {
            counterpart: ArtistRef {
                artist_id,
                artist_name,
                artist_image_link,
            },
            start_time,
        })
        .collect())
}

// Artists

pub async fn get_artist(pool: &SqlitePool, id: i64) -> Result<Option<Artist>, AppError> {
    sqlx::query_as("SELECT * FROM artist WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn list_artists(pool: &SqlitePool) -> Result<Vec<(i64, String)>, AppError> {
    sqlx::query_as("SELECT id, name FROM artist ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn create_artist(pool: &SqlitePool, artist: &ArtistPayload) -> Result<Artist, AppError> {
    let created = sqlx::query_as(
        "INSERT INTO artist (name, city, state, phone, genres, image_link, facebook_link, website_link, seeking_venue, seeking_description)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&artist.name)
    .bind(&artist.city)
    .bind(&artist.state)
    .bind(&artist.phone)
    .bind(Json(&artist.genres))
    .bind(&artist.image_link)
    .bind(&artist.facebook_link)
    .bind(&artist.website_link)
    .bind(artist.seeking_venue)
    .bind(&artist.seeking_description)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

pub async fn update_artist(
    pool: &SqlitePool,
    id: i64,
    artist: &ArtistPayload,
) -> Result<Option<Artist>, AppError> {
    sqlx::query_as(
        "UPDATE artist SET name = ?, city = ?, state = ?, phone = ?, genres = ?,
            image_link = ?, facebook_link = ?, website_link = ?, seeking_venue = ?, seeking_description = ?
         WHERE id = ? RETURNING *",
    )
    .bind(&artist.name)
    .bind(&artist.city)
    .bind(&artist.state)
    .bind(&artist.phone)
    .bind(Json(&artist.genres))
    .bind(&artist.image_link)
    .bind(&artist.facebook_link)
    .bind(&artist.website_link)
    .bind(artist.seeking_venue)
    .bind(&artist.seeking_description)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from)
}

pub async fn delete_artist(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let deleted = sqlx::query("DELETE FROM artist WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(deleted > 0)
}

pub async fn search_artists(
    pool: &SqlitePool,
    term: &str,
) -> Result<Vec<(i64, String, Vec<NaiveDateTime>)>, AppError> {
    let rows: Vec<(i64, String, Option<NaiveDateTime>)> = sqlx::query_as(
        "SELECT a.id, a.name, s.start_time
         FROM artist a
         LEFT JOIN show s ON s.artist_id = a.id
         ORDER BY a.id, s.start_time",
    )
    .fetch_all(pool)
    .await?;
    Ok(group_start_times(rows, term))
}

/// Shows an artist plays, each paired with its venue.
pub async fn artist_bookings(
    pool: &SqlitePool,
    artist_id: i64,
) -> Result<Vec<Booking<VenueRef>>, AppError> {
    let rows: Vec<(i64, String, Option<String>, NaiveDateTime)> = sqlx::query_as(
        "SELECT v.id, v.name, v.image_link, s.start_time
         FROM show s
         JOIN venue v ON s.venue_id = v.id
         WHERE s.artist_id = ?
         ORDER BY s.start_time, s.id",
    )
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(venue_id, venue_name, venue_image_link, start_time)| Booking {
            counterpart: VenueRef {
                venue_id,
                venue_name,
                venue_image_link,
            },
            start_time,
        })
        .collect())
}

// Shows

pub async fn list_shows(pool: &SqlitePool) -> Result<Vec<ShowListing>, AppError> {
    let rows: Vec<(i64, String, i64, String, Option<String>, NaiveDateTime)> = sqlx::query_as(
        "SELECT v.id, v.name, a.id, a.name, a.image_link, s.start_time
         FROM show s
         JOIN venue v ON s.venue_id = v.id
         JOIN artist a ON s.artist_id = a.id
         ORDER BY s.start_time, s.id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(venue_id, venue_name, artist_id, artist_name, artist_image_link, start_time)| {
                ShowListing::new(
                    venue_id,
                    venue_name,
                    artist_id,
                    artist_name,
                    artist_image_link,
                    start_time,
                )
            },
        )
        .collect())
}

/// Links an existing venue and artist. Both must exist or nothing is written.
pub async fn create_show(
    pool: &SqlitePool,
    venue_id: i64,
    artist_id: i64,
    start_time: NaiveDateTime,
) -> Result<Show, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM venue WHERE id = ?")
        .bind(venue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("venue {venue_id} does not exist")))?;

    sqlx::query("SELECT id FROM artist WHERE id = ?")
        .bind(artist_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("artist {artist_id} does not exist")))?;

    let show = sqlx::query_as(
        "INSERT INTO show (venue_id, artist_id, start_time) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(venue_id)
    .bind(artist_id)
    .bind(start_time)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(show)
}

/// Literal match: no wildcards, case folded with Unicode rules.
fn name_matches(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.to_lowercase())
}

/// Folds joined `(id, name, start_time)` rows into one entry per matching name.
fn group_start_times(
    rows: Vec<(i64, String, Option<NaiveDateTime>)>,
    term: &str,
) -> Vec<(i64, String, Vec<NaiveDateTime>)> {
    let mut grouped: Vec<(i64, String, Vec<NaiveDateTime>)> = Vec::new();
    for (id, name, start_time) in rows {
        if !name_matches(&name, term) {
            continue;
        }
        match grouped.last_mut() {
            Some((last_id, _, times)) if *last_id == id => times.extend(start_time),
            _ => grouped.push((id, name, start_time.into_iter().collect())),
        }
    }
    grouped
}

// Seeding

pub async fn seed_database_if_empty(pool: &SqlitePool) -> Result<bool, AppError> {
    let venue_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM venue")
        .fetch_one(pool)
        .await?;
    if venue_count.0 > 0 {
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    let venues = [
        ("The Musical Hop", "San Francisco", "CA", "1015 Folsom Street", "123-123-1234",
         &["Jazz", "Reggae", "Swing", "Classical", "Folk"][..],
         "https://images.unsplash.com/photo-1543900694-133f37abaaa5?w=400",
         true, Some("We are on the lookout for a local artist to play every two weeks. Please call us.")),
        ("The Dueling Pianos Bar", "New York", "NY", "335 Delancey Street", "914-003-1132",
         &["Classical", "R&B", "Hip-Hop"][..],
         "https://images.unsplash.com/photo-1497032205916-ac775f0649ae?w=750",
         false, None),
        ("Park Square Live Music & Coffee", "San Francisco", "CA", "34 Whiskey Moore Ave", "415-000-1234",
         &["Rock n Roll", "Jazz", "Classical", "Folk"][..],
         "https://images.unsplash.com/photo-1485686531765-ba63b07845a7?w=747",
         false, None),
    ];

    let mut venue_ids = Vec::new();
    for (name, city, state, address, phone, genres, image_link, seeking_talent, seeking_description) in venues {
        let id = sqlx::query(
            "INSERT INTO venue (name, city, state, address, phone, genres, image_link, seeking_talent, seeking_description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(city)
        .bind(state)
        .bind(address)
        .bind(phone)
        .bind(Json(genres))
        .bind(image_link)
        .bind(seeking_talent)
        .bind(seeking_description)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        venue_ids.push(id);
    }

    let artists = [
        ("Guns N Petals", "San Francisco", "CA", "326-123-5000", &["Rock n Roll"][..],
         "https://images.unsplash.com/photo-1549213783-8284d0336c4f?w=300",
         true, Some("Looking for shows to perform at in the San Francisco Bay Area!")),
        ("Matt Quevedo", "New York", "NY", "300-400-5000", &["Jazz"][..],
         "https://images.unsplash.com/photo-1495223153807-b916f75de8c5?w=334",
         false, None),
        ("The Wild Sax Band", "San Francisco", "CA", "432-325-5432", &["Jazz", "Classical"][..],
         "https://images.unsplash.com/photo-1558369981-f9ca78462e61?w=794",
         false, None),
    ];

    let mut artist_ids = Vec::new();
    for (name, city, state, phone, genres, image_link, seeking_venue, seeking_description) in artists {
        let id = sqlx::query(
            "INSERT INTO artist (name, city, state, phone, genres, image_link, seeking_venue, seeking_description)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(city)
        .bind(state)
        .bind(phone)
        .bind(Json(genres))
        .bind(image_link)
        .bind(seeking_venue)
        .bind(seeking_description)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        artist_ids.push(id);
    }

    let shows = [
        (0, 0, "2019-05-21 21:30:00"),
        (2, 1, "2019-06-15 23:00:00"),
        (2, 2, "2035-04-01 20:00:00"),
        (2, 2, "2035-04-08 20:00:00"),
        (2, 2, "2035-04-15 20:00:00"),
    ];

    for (venue, artist, start_time) in shows {
        sqlx::query("INSERT INTO show (venue_id, artist_id, start_time) VALUES (?, ?, ?)")
            .bind(venue_ids[venue])
            .bind(artist_ids[artist])
            .bind(start_time)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(true)
}
