//! Synthetic review generation
//!
//! Each review picks a restaurant uniformly, draws a star rating from a
//! skewed-positive distribution and takes its text from the pool matching
//! the rating's sentiment. With a seed, every field except `created_at` is
//! reproducible: identifiers are drawn from the same seeded generator.

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rsm_common::review::RawReview;
use rsm_common::uuid_utils;

/// Smallest batch served by `GET /reviews`
pub const MIN_LIMIT: u32 = 1;
/// Largest batch served by `GET /reviews`
pub const MAX_LIMIT: u32 = 500;
pub const DEFAULT_LIMIT: u32 = 50;

/// (restaurant, city) pairs
pub const RESTAURANTS: [(&str, &str); 5] = [
    ("La Taquería Central", "CDMX"),
    ("Sushi Nami", "Monterrey"),
    ("Pasta & Co.", "Guadalajara"),
    ("Burger Station", "Puebla"),
    ("Café Aurora", "Querétaro"),
];

/// (stars, relative weight)
const STAR_WEIGHTS: [(i64, u32); 5] = [(1, 8), (2, 10), (3, 20), (4, 30), (5, 32)];

pub const TEXTS_POSITIVE: [&str; 3] = [
    "Excelente servicio y la comida estuvo deliciosa, volveré pronto.",
    "Muy buena atención, el sabor fue increíble y las porciones perfectas.",
    "Me encantó el lugar, todo limpio y el staff muy amable.",
];

pub const TEXTS_NEGATIVE: [&str; 3] = [
    "La comida llegó fría y el servicio fue muy lento.",
    "Mala experiencia, el personal fue grosero y la comida no tenía sabor.",
    "Demasiado caro para lo que ofrecen, no lo recomiendo.",
];

pub const TEXTS_NEUTRAL: [&str; 3] = [
    "El lugar está bien, nada extraordinario pero cumple.",
    "La comida estuvo normal, el servicio aceptable.",
    "Una experiencia promedio, podría mejorar.",
];

/// Reviews are backdated by up to this many minutes
const MAX_AGE_MINUTES: i64 = 20_000;

/// Text pool matching a star rating
pub fn texts_for_stars(stars: i64) -> &'static [&'static str] {
    match stars {
        s if s >= 4 => &TEXTS_POSITIVE,
        s if s <= 2 => &TEXTS_NEGATIVE,
        _ => &TEXTS_NEUTRAL,
    }
}

/// Review generator over a (possibly seeded) random source
pub struct ReviewGenerator {
    rng: StdRng,
}

impl ReviewGenerator {
    /// Seeded generator, or one seeded from OS entropy when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Next review, backdated relative to `now` (naive UTC)
    pub fn next_review(&mut self, now: NaiveDateTime) -> RawReview {
        let (name, city) = RESTAURANTS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(RESTAURANTS[0]);
        let stars = STAR_WEIGHTS
            .choose_weighted(&mut self.rng, |(_, weight)| *weight)
            .map(|(stars, _)| *stars)
            .unwrap_or(3);
        let text = texts_for_stars(stars)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default();
        let age = self.rng.gen_range(1..=MAX_AGE_MINUTES);

        let review_id = uuid_utils::from_random_bytes(self.rng.gen());
        let business_id = uuid_utils::from_random_bytes(self.rng.gen());

        RawReview {
            review_id: review_id.to_string(),
            business_id: business_id.to_string(),
            restaurant_name: name.to_string(),
            city: city.to_string(),
            stars,
            text: text.to_string(),
            created_at: (now - Duration::minutes(age))
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }

    /// `n` reviews backdated relative to `now`
    pub fn generate(&mut self, n: usize, now: NaiveDateTime) -> Vec<RawReview> {
        (0..n).map(|_| self.next_review(now)).collect()
    }
}
