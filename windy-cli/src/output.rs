use chrono::{DateTime, Local, TimeZone};
use std::cell::RefCell;
use windy_core::{
    FavouriteLocation, SearchEvents, WindData, WindReport,
    beaufort::WindLabelCache,
};

/// Prints search callbacks and keeps the last report for the caller.
#[derive(Default)]
pub struct ConsoleEvents {
    labels: RefCell<WindLabelCache>,
    report: RefCell<Option<WindReport>>,
}

impl ConsoleEvents {
    pub fn take_report(&self) -> Option<WindReport> {
        self.report.borrow_mut().take()
    }
}

impl SearchEvents for ConsoleEvents {
    fn on_search(&self, report: &WindReport) {
        let mut labels = self.labels.borrow_mut();
        println!("{}, {}", report.city_name, report.country);
        println!("{}", wind_summary(&report.wind_data, &mut labels));
        *self.report.borrow_mut() = Some(report.clone());
    }

    fn on_loading_change(&self, is_loading: bool) {
        if is_loading {
            eprintln!("Fetching wind data...");
        }
    }

    fn on_error(&self, message: &str) {
        // Reported once through the command's error result.
        tracing::debug!("Wind lookup failed: {message}");
    }
}

pub fn wind_summary(wind: &WindData, labels: &mut WindLabelCache) -> String {
    let scale = labels.beaufort(wind.wind_speed);
    format!(
        "  Wind:      {:.1} m/s (Force {}, {})\n  Direction: {:.0}° {}\n  Observed:  {}",
        wind.wind_speed,
        scale.force,
        scale.description,
        wind.wind_direction.rem_euclid(360.0),
        labels.cardinal_direction(wind.wind_direction),
        format_millis(wind.timestamp),
    )
}

pub fn print_favourites(favourites: &[FavouriteLocation]) {
    if favourites.is_empty() {
        println!("No favourites saved yet.");
        return;
    }

    let mut labels = WindLabelCache::new();
    for fav in favourites {
        println!(
            "{}, {} ({:.4}, {:.4}) added {}",
            fav.city_name,
            fav.country,
            fav.latitude,
            fav.longitude,
            format_millis(fav.added_at)
        );
        println!("{}", wind_summary(&fav.wind_data, &mut labels));
    }
}

fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => format_local(dt),
        None => format!("{millis} ms"),
    }
}

fn format_local(dt: DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}
