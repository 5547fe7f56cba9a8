//! Static city/country coordinate lookup with name normalization.

use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::record::AnnotationRecord;

/// Known cities per country, as (latitude, longitude).
static CITY_COORDINATES: &[(&str, &[(&str, (f64, f64))])] = &[
    (
        "Algeria",
        &[
            ("Algiers", (36.6997, 3.0576)),
            ("Batna", (35.556, 6.1741)),
            ("Oran", (35.6911, -0.6417)),
            ("Annaba", (36.9, 7.7667)),
            ("Blida", (36.4667, 2.8167)),
            ("Constantine", (36.365, 6.6147)),
            ("Biskra", (34.8504, 5.7281)),
            ("Djelfa", (34.6728, 3.263)),
            ("Sétif", (36.1911, 5.4137)),
        ],
    ),
    ("Bahrain", &[("Manama", (26.2279, 50.5857))]),
    (
        "Egypt",
        &[
            ("Cairo", (30.0626, 31.2497)),
            ("Alexandria", (31.2018, 29.9158)),
        ],
    ),
    (
        "Iraq",
        &[
            ("Basra", (30.5085, 47.7804)),
            ("Baghdad", (33.3406, 44.4009)),
        ],
    ),
    (
        "Jordan",
        &[("Amman", (31.9552, 35.945)), ("Irbid", (32.556, 35.848))],
    ),
    ("Kuwait", &[("Kuwait (City)", (29.3759, 47.9774))]),
    (
        "Lebanon",
        &[
            ("Beirut", (33.8938, 35.5018)),
            ("Cheikh Taba", (34.5333, 36.0833)),
        ],
    ),
    (
        "Libya",
        &[
            ("Tripoli", (32.8872, 13.1913)),
            ("Benghazi", (32.1167, 20.0667)),
        ],
    ),
    (
        "Morocco",
        &[
            ("Fes", (34.0333, -5.0)),
            ("Casablanca", (33.5731, -7.5898)),
            ("Rabat", (34.0209, -6.8416)),
            ("Marrakech", (31.6295, -7.9811)),
            ("Tanger (Tangier)", (35.7796, -5.8339)),
        ],
    ),
    ("Oman", &[("Oman (Muscat)", (23.5841, 58.4078))]),
    (
        "Palestine",
        &[
            ("Nablus", (32.2211, 35.2544)),
            ("Hebron", (31.5294, 35.0938)),
            ("Ramallah", (31.8996, 35.2042)),
            ("Jerusalem", (31.769, 35.2163)),
            ("Qaza (Gaza City)", (31.5016, 34.4667)),
        ],
    ),
    ("Qatar", &[("Doha", (25.2854, 51.531))]),
    (
        "Saudi Arabia",
        &[
            ("Riyadh", (24.7136, 46.6753)),
            ("Jeddah", (21.4901, 39.1862)),
            ("Makkah (Mecca)", (21.4266, 39.8256)),
        ],
    ),
    (
        "Somalia",
        &[
            ("Shabelle (Lower Shabelle region)", (1.7683, 44.39)),
            ("Mogadishu", (2.0371, 45.3438)),
            ("Daljir (Mogadishu area)", (2.0371, 45.3438)),
        ],
    ),
    (
        "Sudan",
        &[
            ("El Obeid", (13.1842, 30.2167)),
            ("Omdurman", (15.6445, 32.4777)),
            ("Khartoum", (15.5007, 32.5599)),
            ("Wad Medani", (14.4012, 33.5199)),
            ("Port Sudan", (19.6175, 37.2164)),
        ],
    ),
    (
        "Syria",
        &[
            ("Aleppo", (36.2012, 37.1612)),
            ("Damascus", (33.5104, 36.2783)),
        ],
    ),
    ("Tunisia", &[("Tunis", (36.819, 10.1658))]),
    (
        "UAE",
        &[
            ("Ajman", (25.4052, 55.5136)),
            ("Dubai", (25.2048, 55.2708)),
            ("Fujairah", (25.1288, 56.3265)),
            ("Abu Dhabi", (24.4539, 54.3773)),
            ("Sharjah", (25.3463, 55.4209)),
        ],
    ),
    (
        "Yemen",
        &[
            ("Sana'a", (15.3694, 44.191)),
            ("Aden", (12.7794, 45.0367)),
            ("Taiz", (13.5794, 44.0207)),
            ("Al-Hodeidah", (14.7978, 42.9545)),
        ],
    ),
];

/// Raw city tokens seen in annotation files mapped to canonical city names.
/// `None` marks a token that is known to carry no location.
static CITY_ALIASES: &[(&str, Option<&str>)] = &[
    ("alger", Some("Algiers")),
    ("batna", Some("Batna")),
    ("djelfa", Some("Djelfa")),
    ("biskra", Some("Biskra")),
    ("Tanger", Some("Tanger (Tangier)")),
    ("Ajman", Some("Ajman")),
    ("Jeddah", Some("Jeddah")),
    ("Qaza", Some("Qaza (Gaza City)")),
    ("amman", Some("Amman")),
    ("kuwait", Some("Kuwait (City)")),
    ("Muscat", Some("Oman (Muscat)")),
    ("Abu Dhabi", Some("Abu Dhabi")),
    ("sanaa", Some("Sana'a")),
    ("cheikh_taba", Some("Cheikh Taba")),
    ("Riyadh", Some("Riyadh")),
    ("unknown_city", None),
    ("manama_nation-wide", Some("Manama")),
    ("constantine", Some("Constantine")),
    ("setif", Some("Sétif")),
    ("tunis", Some("Tunis")),
    ("taiz", Some("Taiz")),
    ("beirut", Some("Beirut")),
    ("hebron", Some("Hebron")),
    ("Shabelle", Some("Shabelle (Lower Shabelle region)")),
    ("manama", Some("Manama")),
    ("bilda", Some("Blida")),
    ("Somali", Some("Mogadishu")),
];

static COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("United_Arab_Emirate", "UAE"),
    ("Saudi_Arabia", "Saudi Arabia"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Placeholder written for rows whose location could not be resolved.
    pub const SENTINEL: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };
}

/// Counts produced by [`Geocoder::annotate`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeocodeSummary {
    pub resolved: usize,
    pub missing: usize,
}

/// Resolves raw (country, city) tokens to coordinates.
pub struct Geocoder {
    coordinates: HashMap<&'static str, HashMap<&'static str, Coordinates>>,
    city_aliases: HashMap<&'static str, Option<&'static str>>,
    country_aliases: HashMap<&'static str, &'static str>,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder {
    pub fn new() -> Self {
        let coordinates = CITY_COORDINATES
            .iter()
            .map(|(country, cities)| {
                let cities = cities
                    .iter()
                    .map(|&(city, (latitude, longitude))| {
                        (
                            city,
                            Coordinates {
                                latitude,
                                longitude,
                            },
                        )
                    })
                    .collect();
                (*country, cities)
            })
            .collect();

        Self {
            coordinates,
            city_aliases: CITY_ALIASES.iter().copied().collect(),
            country_aliases: COUNTRY_ALIASES.iter().copied().collect(),
        }
    }

    /// Looks up the coordinates of `city` in `country`, after applying the
    /// alias tables. Returns `None` for unknown or deliberately unmapped places.
    pub fn lookup(&self, country: &str, city: &str) -> Option<Coordinates> {
        let city = match self.city_aliases.get(city) {
            Some(None) => return None,
            Some(Some(canonical)) => *canonical,
            None => city,
        };
        let country = self
            .country_aliases
            .get(country)
            .copied()
            .unwrap_or(country);

        self.coordinates.get(country)?.get(city).copied()
    }

    /// Writes coordinates into every record, using [`Coordinates::SENTINEL`]
    /// for rows that do not resolve.
    #[tracing::instrument(skip_all, fields(rows = records.len()))]
    pub fn annotate(&self, records: &mut [AnnotationRecord]) -> GeocodeSummary {
        let mut summary = GeocodeSummary::default();

        for record in records.iter_mut() {
            let coords = match self.lookup(&record.country, &record.city) {
                Some(coords) => {
                    summary.resolved += 1;
                    coords
                }
                None => {
                    debug!(country = %record.country, city = %record.city, "No coordinates");
                    summary.missing += 1;
                    Coordinates::SENTINEL
                }
            };
            record.latitude = coords.latitude;
            record.longitude = coords.longitude;
        }

        info!(
            resolved = summary.resolved,
            missing = summary.missing,
            "Coordinates added"
        );
        summary
    }
}
