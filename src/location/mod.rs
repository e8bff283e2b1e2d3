//! Country / state / city lookups over an embedded geographic dataset,
//! plus reverse lookup from coordinates.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::UserLocation;

/// Reverse lookups further than this from any known city resolve to nothing.
const MAX_RESOLVE_DISTANCE_KM: f64 = 300.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

static DATASET: LazyLock<Vec<Country>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("dataset.json")).expect("embedded dataset is well-formed")
});

#[derive(Debug, Clone, Deserialize)]
struct Country {
    name: String,
    iso2: String,
    states: Vec<State>,
}

#[derive(Debug, Clone, Deserialize)]
struct State {
    name: String,
    state_code: String,
    cities: Vec<City>,
}

#[derive(Debug, Clone, Deserialize)]
struct City {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryRef {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateRef {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRef {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[must_use]
pub fn countries() -> Vec<CountryRef> {
    DATASET
        .iter()
        .map(|c| CountryRef {
            name: c.name.clone(),
            code: c.iso2.clone(),
        })
        .collect()
}

#[must_use]
pub fn states(country_code: &str) -> Vec<StateRef> {
    DATASET
        .iter()
        .find(|c| c.iso2.eq_ignore_ascii_case(country_code))
        .map_or_else(Vec::new, |c| {
            c.states
                .iter()
                .map(|s| StateRef {
                    name: s.name.clone(),
                    code: s.state_code.clone(),
                })
                .collect()
        })
}

#[must_use]
pub fn cities(country_code: &str, state_code: &str) -> Vec<CityRef> {
    DATASET
        .iter()
        .find(|c| c.iso2.eq_ignore_ascii_case(country_code))
        .and_then(|c| {
            c.states
                .iter()
                .find(|s| s.state_code.eq_ignore_ascii_case(state_code))
        })
        .map_or_else(Vec::new, |s| {
            s.cities
                .iter()
                .map(|city| CityRef {
                    name: city.name.clone(),
                    latitude: city.latitude,
                    longitude: city.longitude,
                })
                .collect()
        })
}

/// Nearest known city to the given coordinates, or `None` when everything
/// is out of range.
#[must_use]
pub fn resolve(latitude: f64, longitude: f64) -> Option<UserLocation> {
    let mut best: Option<(f64, UserLocation)> = None;

    for country in DATASET.iter() {
        for state in &country.states {
            for city in &state.cities {
                let distance =
                    haversine_km(latitude, longitude, city.latitude, city.longitude);
                if distance > MAX_RESOLVE_DISTANCE_KM {
                    continue;
                }
                if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                    best = Some((
                        distance,
                        UserLocation {
                            country: country.name.clone(),
                            country_code: country.iso2.clone(),
                            state: Some(state.name.clone()),
                            state_code: Some(state.state_code.clone()),
                            city: Some(city.name.clone()),
                            latitude: Some(city.latitude),
                            longitude: Some(city.longitude),
                        },
                    ));
                }
            }
        }
    }

    best.map(|(_, location)| location)
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_countries_with_iso_codes() {
        let all = countries();
        assert!(all.iter().any(|c| c.code == "US"));
        assert!(all.iter().any(|c| c.code == "JP"));
    }

    #[test]
    fn cascades_country_to_state_to_city() {
        let us_states = states("US");
        assert!(us_states.iter().any(|s| s.code == "CA"));

        let ca_cities = cities("US", "CA");
        assert!(ca_cities.iter().any(|c| c.name == "San Francisco"));
    }

    #[test]
    fn unknown_codes_yield_empty_lists() {
        assert!(states("ZZ").is_empty());
        assert!(cities("US", "ZZ").is_empty());
    }

    #[test]
    fn resolves_coordinates_to_nearest_city() {
        // A point in central London.
        let location = resolve(51.5, -0.12).unwrap();
        assert_eq!(location.country_code, "GB");
        assert_eq!(location.city.as_deref(), Some("London"));
    }

    #[test]
    fn open_ocean_resolves_to_nothing() {
        assert!(resolve(0.0, 0.0).is_none());
    }

    #[test]
    fn haversine_is_roughly_right() {
        // London to Paris is about 344 km.
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((330.0..360.0).contains(&d));
    }
}
