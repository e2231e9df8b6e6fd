//! JSON view models handed back by the handlers.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::aggregate::{Booking, ShowBuckets, count_upcoming, format_show_time, partition_shows};
use crate::models::{Artist, Venue};

/// The artist side of a show, as listed on a venue page.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistRef {
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
}

/// The venue side of a show, as listed on an artist page.
#[derive(Debug, Clone, Serialize)]
pub struct VenueRef {
    pub venue_id: i64,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VenueDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    #[serde(flatten)]
    pub shows: ShowBuckets<ArtistRef>,
}

impl VenueDetail {
    pub fn new(venue: Venue, bookings: Vec<Booking<ArtistRef>>, now: NaiveDateTime) -> Self {
        Self {
            id: venue.id,
            name: venue.name,
            genres: venue.genres.0,
            address: venue.address,
            city: venue.city,
            state: venue.state,
            phone: venue.phone,
            website: venue.website_link,
            facebook_link: venue.facebook_link,
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description,
            image_link: venue.image_link,
            shows: partition_shows(bookings, now),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: Option<String>,
    #[serde(flatten)]
    pub shows: ShowBuckets<VenueRef>,
}

impl ArtistDetail {
    pub fn new(artist: Artist, bookings: Vec<Booking<VenueRef>>, now: NaiveDateTime) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            genres: artist.genres.0,
            city: artist.city,
            state: artist.state,
            phone: artist.phone,
            website: artist.website_link,
            facebook_link: artist.facebook_link,
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description,
            image_link: artist.image_link,
            shows: partition_shows(bookings, now),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<SearchHit>,
}

impl SearchResults {
    pub fn new(matches: Vec<(i64, String, Vec<NaiveDateTime>)>, now: NaiveDateTime) -> Self {
        let data: Vec<SearchHit> = matches
            .into_iter()
            .map(|(id, name, start_times)| SearchHit {
                id,
                name,
                num_upcoming_shows: count_upcoming(start_times, now),
            })
            .collect();
        Self {
            count: data.len(),
            data,
        }
    }
}

/// One row of the all-shows listing.
#[derive(Debug, Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

impl ShowListing {
    pub fn new(
        venue_id: i64,
        venue_name: String,
        artist_id: i64,
        artist_name: String,
        artist_image_link: Option<String>,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            venue_id,
            venue_name,
            artist_id,
            artist_name,
            artist_image_link,
            start_time: format_show_time(start_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use sqlx::types::Json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn musical_hop() -> Venue {
        Venue {
            id: 1,
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: Some("123-123-1234".into()),
            genres: Json(vec!["Jazz".into(), "Reggae".into()]),
            image_link: None,
            facebook_link: None,
            website_link: Some("https://www.themusicalhop.com".into()),
            seeking_talent: true,
            seeking_description: Some("every two weeks".into()),
        }
    }

    #[test]
    fn venue_detail_has_flat_show_keys() {
        let t = now();
        let bookings = vec![
            Booking {
                counterpart: ArtistRef {
                    artist_id: 4,
                    artist_name: "Guns N Petals".into(),
                    artist_image_link: None,
                },
                start_time: t - Duration::days(1),
            },
            Booking {
                counterpart: ArtistRef {
                    artist_id: 6,
                    artist_name: "The Wild Sax Band".into(),
                    artist_image_link: None,
                },
                start_time: t + Duration::hours(1),
            },
        ];

        let json = serde_json::to_value(VenueDetail::new(musical_hop(), bookings, t)).unwrap();

        assert_eq!(json["website"], "https://www.themusicalhop.com");
        assert_eq!(json["genres"], serde_json::json!(["Jazz", "Reggae"]));
        assert_eq!(json["past_shows_count"], 1);
        assert_eq!(json["upcoming_shows_count"], 1);
        assert_eq!(json["past_shows"][0]["artist_name"], "Guns N Petals");
        assert_eq!(json["upcoming_shows"][0]["artist_id"], 6);
        assert_eq!(json["upcoming_shows"][0]["start_time"], "10/19/2026, 13:00");
        assert!(json.get("shows").is_none());
    }

    #[test]
    fn search_results_count_upcoming_per_hit() {
        let t = now();
        let results = SearchResults::new(
            vec![
                (1, "The Musical Hop".into(), vec![t - Duration::days(2), t + Duration::days(2)]),
                (3, "Park Square Live Music & Coffee".into(), vec![]),
            ],
            t,
        );
        assert_eq!(results.count, 2);
        assert_eq!(results.data[0].num_upcoming_shows, 1);
        assert_eq!(results.data[1].num_upcoming_shows, 0);
    }
}
