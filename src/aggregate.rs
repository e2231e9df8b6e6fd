//! Past/upcoming show partitioning and the area grouping of venues.
//!
//! Everything here is pure: callers read "now" once per request and pass it in.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// Display layout for show times, e.g. `05/21/2019, 21:30`.
pub const SHOW_TIME_FORMAT: &str = "%m/%d/%Y, %H:%M";

pub fn format_show_time(start_time: NaiveDateTime) -> String {
    start_time.format(SHOW_TIME_FORMAT).to_string()
}

/// A show at its start time is already past.
pub fn is_past(start_time: NaiveDateTime, now: NaiveDateTime) -> bool {
    start_time <= now
}

pub fn count_upcoming<I>(start_times: I, now: NaiveDateTime) -> usize
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    start_times.into_iter().filter(|t| !is_past(*t, now)).count()
}

/// One show of a venue or artist, paired with whatever describes the other side.
#[derive(Debug, Clone)]
pub struct Booking<C> {
    pub counterpart: C,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowCard<C> {
    #[serde(flatten)]
    pub counterpart: C,
    pub start_time: String,
}

impl<C> From<Booking<C>> for ShowCard<C> {
    fn from(booking: Booking<C>) -> Self {
        Self {
            counterpart: booking.counterpart,
            start_time: format_show_time(booking.start_time),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowBuckets<C> {
    pub past_shows: Vec<ShowCard<C>>,
    pub upcoming_shows: Vec<ShowCard<C>>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// Splits bookings into past and upcoming, keeping input order in each bucket.
pub fn partition_shows<C>(bookings: Vec<Booking<C>>, now: NaiveDateTime) -> ShowBuckets<C> {
    let (past, upcoming): (Vec<_>, Vec<_>) = bookings
        .into_iter()
        .partition(|b| is_past(b.start_time, now));

    let past_shows: Vec<ShowCard<C>> = past.into_iter().map(ShowCard::from).collect();
    let upcoming_shows: Vec<ShowCard<C>> = upcoming.into_iter().map(ShowCard::from).collect();

    ShowBuckets {
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }
}

/// A venue with the start times of all its shows.
#[derive(Debug, Clone)]
pub struct VenueSchedule {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub start_times: Vec<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaVenue {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<AreaVenue>,
}

/// Groups venues by exact `(city, state)`; areas appear in first-seen order.
pub fn group_areas(venues: Vec<VenueSchedule>, now: NaiveDateTime) -> Vec<Area> {
    let mut areas: Vec<Area> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for venue in venues {
        let slot = *index
            .entry((venue.city.clone(), venue.state.clone()))
            .or_insert_with(|| {
                areas.push(Area {
                    city: venue.city.clone(),
                    state: venue.state.clone(),
                    venues: Vec::new(),
                });
                areas.len() - 1
            });

        areas[slot].venues.push(AreaVenue {
            num_upcoming_shows: count_upcoming(venue.start_times.iter().copied(), now),
            id: venue.id,
            name: venue.name,
        });
    }

    areas
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn booking(name: &str, start_time: NaiveDateTime) -> Booking<String> {
        Booking {
            counterpart: name.to_string(),
            start_time,
        }
    }

    fn schedule(id: i64, city: &str, state: &str, start_times: Vec<NaiveDateTime>) -> VenueSchedule {
        VenueSchedule {
            id,
            name: format!("venue {id}"),
            city: city.to_string(),
            state: state.to_string(),
            start_times,
        }
    }

    #[test]
    fn splits_shows_around_now() {
        let t = now();
        let bookings = vec![
            booking("a", t - Duration::days(1)),
            booking("b", t + Duration::hours(1)),
            booking("c", t - Duration::hours(1)),
        ];

        let buckets = partition_shows(bookings, t);

        assert_eq!(buckets.past_shows_count, 2);
        assert_eq!(buckets.upcoming_shows_count, 1);
        let past: Vec<_> = buckets.past_shows.iter().map(|s| s.counterpart.as_str()).collect();
        assert_eq!(past, ["a", "c"]);
        assert_eq!(buckets.upcoming_shows[0].counterpart, "b");
    }

    #[test]
    fn show_starting_now_is_past() {
        let t = now();
        let buckets = partition_shows(vec![booking("a", t)], t);
        assert_eq!(buckets.past_shows_count, 1);
        assert!(buckets.upcoming_shows.is_empty());
    }

    #[test]
    fn counts_cover_every_show() {
        let t = now();
        let bookings: Vec<_> = (-5..7)
            .map(|h| booking("x", t + Duration::hours(h)))
            .collect();
        let total = bookings.len();

        let buckets = partition_shows(bookings, t);

        assert_eq!(buckets.past_shows_count + buckets.upcoming_shows_count, total);
        assert_eq!(buckets.past_shows.len(), buckets.past_shows_count);
        assert_eq!(buckets.upcoming_shows.len(), buckets.upcoming_shows_count);
    }

    #[test]
    fn no_shows_gives_empty_buckets() {
        let buckets = partition_shows(Vec::<Booking<String>>::new(), now());
        assert_eq!(buckets.past_shows_count, 0);
        assert_eq!(buckets.upcoming_shows_count, 0);
    }

    #[test]
    fn show_time_uses_fixed_width_24h_layout() {
        let t = NaiveDate::from_ymd_opt(2019, 5, 21)
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap();
        assert_eq!(format_show_time(t), "05/21/2019, 21:30");

        let morning = NaiveDate::from_ymd_opt(2035, 4, 1)
            .unwrap()
            .and_hms_opt(8, 5, 59)
            .unwrap();
        assert_eq!(format_show_time(morning), "04/01/2035, 08:05");
    }

    #[test]
    fn card_flattens_counterpart_fields() {
        #[derive(Serialize)]
        struct Artist {
            artist_id: i64,
            artist_name: &'static str,
        }

        let card = ShowCard::from(Booking {
            counterpart: Artist {
                artist_id: 4,
                artist_name: "Guns N Petals",
            },
            start_time: NaiveDate::from_ymd_opt(2019, 5, 21)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap(),
        });

        let json = serde_json::to_value(card).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "artist_id": 4,
                "artist_name": "Guns N Petals",
                "start_time": "05/21/2019, 21:30",
            })
        );
    }

    #[test]
    fn venues_in_same_city_and_state_share_an_area() {
        let t = now();
        let areas = group_areas(
            vec![
                schedule(1, "San Francisco", "CA", vec![]),
                schedule(2, "New York", "NY", vec![]),
                schedule(3, "San Francisco", "CA", vec![]),
            ],
            t,
        );

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].city, "San Francisco");
        let ids: Vec<_> = areas[0].venues.iter().map(|v| v.id).collect();
        assert_eq!(ids, [1, 3]);
        assert_eq!(areas[1].venues.len(), 1);
        assert_eq!(areas[1].venues[0].id, 2);
    }

    #[test]
    fn same_city_in_another_state_is_another_area() {
        let areas = group_areas(
            vec![
                schedule(1, "Portland", "OR", vec![]),
                schedule(2, "Portland", "ME", vec![]),
            ],
            now(),
        );
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn area_venues_count_only_upcoming_shows() {
        let t = now();
        let areas = group_areas(
            vec![schedule(
                1,
                "San Francisco",
                "CA",
                vec![t - Duration::days(3), t, t + Duration::days(2), t + Duration::days(9)],
            )],
            t,
        );
        assert_eq!(areas[0].venues[0].num_upcoming_shows, 2);
    }
}
