use serde::{Deserialize, Serialize};

/// One entry of the ranked city catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    /// ISO 3166-1 alpha-2 code.
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl CityRecord {
    /// Label shown in the dropdown, e.g. `"London, GB"`.
    pub fn dropdown_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }

    /// Text placed in the input once the city is picked, e.g. `"London GB"`.
    pub fn selection_text(&self) -> String {
        format!("{} {}", self.city, self.country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindData {
    /// Metres per second.
    pub wind_speed: f64,
    /// Degrees; any real value, meaningful mod 360.
    pub wind_direction: f64,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindDataParams {
    pub latitude: f64,
    pub longitude: f64,
}

/// A persisted favourite. Identity is `(city_name, country)`, compared exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteLocation {
    pub city_name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub wind_data: WindData,
    /// Epoch milliseconds.
    pub added_at: i64,
}

impl FavouriteLocation {
    pub fn matches(&self, city_name: &str, country: &str) -> bool {
        self.city_name == city_name && self.country == country
    }
}

/// A favourite as handed to the store, before it is stamped with `added_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFavourite {
    pub city_name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub wind_data: WindData,
}

impl NewFavourite {
    pub fn into_favourite(self, added_at: i64) -> FavouriteLocation {
        FavouriteLocation {
            city_name: self.city_name,
            country: self.country,
            latitude: self.latitude,
            longitude: self.longitude,
            wind_data: self.wind_data,
            added_at,
        }
    }
}

/// Payload of a successful confirm: what the `on_search` callback receives.
#[derive(Debug, Clone, PartialEq)]
pub struct WindReport {
    pub wind_data: WindData,
    pub city_name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<WindReport> for NewFavourite {
    fn from(report: WindReport) -> Self {
        Self {
            city_name: report.city_name,
            country: report.country,
            latitude: report.latitude,
            longitude: report.longitude,
            wind_data: report.wind_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favourite_uses_camel_case_on_disk() {
        let fav = FavouriteLocation {
            city_name: "London".into(),
            country: "GB".into(),
            latitude: 51.5074,
            longitude: -0.1278,
            wind_data: WindData {
                wind_speed: 4.2,
                wind_direction: 270.0,
                timestamp: 1_700_000_000_000,
            },
            added_at: 1_700_000_000_500,
        };

        let json = serde_json::to_value(&fav).unwrap();
        assert_eq!(json["cityName"], "London");
        assert_eq!(json["addedAt"], 1_700_000_000_500_i64);
        assert_eq!(json["windData"]["windSpeed"], 4.2);
        assert_eq!(json["windData"]["windDirection"], 270.0);
    }

    #[test]
    fn labels_differ_in_comma() {
        let city = CityRecord { city: "London".into(), country: "GB".into(), lat: 51.5, lon: -0.1 };
        assert_eq!(city.dropdown_label(), "London, GB");
        assert_eq!(city.selection_text(), "London GB");
    }
}
