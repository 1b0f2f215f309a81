use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::args::{BoundingBox, PositiveUsize};

use super::csv::journey_datetime;
use super::{DATETIME_FORMAT, JOURNEYS_PATH, RequestCorpus};

/// Departure of sampled journeys, in seconds after midnight of the start date.
const SAMPLE_DEPARTURE_SECONDS: i64 = 28_800;

/// Generates `count` journeys between uniformly sampled points of `bbox`.
#[must_use]
pub fn sample_corpus(
    bbox: &BoundingBox,
    count: PositiveUsize,
    seed: Option<u64>,
    start_date: NaiveDate,
) -> RequestCorpus {
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let datetime = journey_datetime(start_date, 0, SAMPLE_DEPARTURE_SECONDS).unwrap_or_else(|_| {
        start_date
            .and_time(chrono::NaiveTime::MIN)
            .format(DATETIME_FORMAT)
            .to_string()
    });
    info!(
        "Sampling {} journeys in [{}, {}] x [{}, {}]",
        count.get(),
        bbox.min_lon,
        bbox.max_lon,
        bbox.min_lat,
        bbox.max_lat
    );

    let pairs = (0..count.get()).map(|_| {
        let from = sample_point(&mut rng, bbox);
        let to = sample_point(&mut rng, bbox);
        (
            JOURNEYS_PATH.to_owned(),
            format!("from={}&to={}&datetime={}", from, to, datetime),
        )
    });
    RequestCorpus::from_pairs(pairs)
}

/// `lon;lat` with 6 decimals, as accepted by the journeys endpoint.
fn sample_point<R: Rng>(rng: &mut R, bbox: &BoundingBox) -> String {
    let lon = rng.gen_range(bbox.min_lon..bbox.max_lon);
    let lat = rng.gen_range(bbox.min_lat..bbox.max_lat);
    format!("{:.6};{:.6}", lon, lat)
}
