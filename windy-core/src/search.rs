//! City autocomplete: keystroke sanitizing, catalog filtering, selection and
//! the confirm action that fetches wind data for the picked city.

use std::sync::Arc;

use crate::{
    catalog::CatalogLoader,
    model::{CityRecord, WindDataParams, WindReport},
    provider::WindFetcher,
};

/// Queries shorter than this (after sanitizing) produce no candidates.
pub const MIN_QUERY_LEN: usize = 3;
pub const MAX_CANDIDATES: usize = 10;
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch wind data";

/// Keep ASCII letters and whitespace, drop everything else.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphabetic() || c.is_whitespace()).collect()
}

/// First [`MAX_CANDIDATES`] cities whose `"city, country"` label contains
/// `query`, ignoring case, in catalog order.
pub fn filter_cities(cities: &[CityRecord], query: &str) -> Vec<CityRecord> {
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    cities
        .iter()
        .filter(|city| city.dropdown_label().to_lowercase().contains(&needle))
        .take(MAX_CANDIDATES)
        .cloned()
        .collect()
}

/// Text shown to the user for a failed fetch.
pub fn error_message(err: &anyhow::Error) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        FETCH_FAILED_MESSAGE.to_string()
    } else {
        message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Filtering,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
}

/// Callbacks towards the presentation layer.
pub trait SearchEvents {
    fn on_search(&self, report: &WindReport);
    fn on_loading_change(&self, _is_loading: bool) {}
    fn on_error(&self, _message: &str) {}
}

/// Marks the engine busy for as long as it is alive.
struct LoadingGuard<'a> {
    loading: &'a mut bool,
    events: &'a dyn SearchEvents,
}

impl<'a> LoadingGuard<'a> {
    fn engage(loading: &'a mut bool, events: &'a dyn SearchEvents) -> Self {
        *loading = true;
        events.on_loading_change(true);
        Self { loading, events }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.loading = false;
        self.events.on_loading_change(false);
    }
}

#[derive(Debug)]
pub struct SearchEngine<F> {
    cities: Arc<[CityRecord]>,
    fetcher: F,
    phase: SearchPhase,
    input: String,
    candidates: Vec<CityRecord>,
    highlighted: Option<usize>,
    selected: Option<CityRecord>,
    loading: bool,
    last_result: Option<WindReport>,
    last_error: Option<String>,
}

impl<F: WindFetcher> SearchEngine<F> {
    pub fn new(cities: Arc<[CityRecord]>, fetcher: F) -> Self {
        Self {
            cities,
            fetcher,
            phase: SearchPhase::Idle,
            input: String::new(),
            candidates: Vec::new(),
            highlighted: None,
            selected: None,
            loading: false,
            last_result: None,
            last_error: None,
        }
    }

    /// Build an engine over the session catalog, loading it if needed.
    pub async fn with_catalog(loader: &CatalogLoader, fetcher: F) -> Self {
        Self::new(loader.cities().await, fetcher)
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Current (sanitized) input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn candidates(&self) -> &[CityRecord] {
        &self.candidates
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn selected(&self) -> Option<&CityRecord> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_result(&self) -> Option<&WindReport> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The confirm affordance is enabled only with a selection and no fetch in flight.
    pub fn can_confirm(&self) -> bool {
        self.selected.is_some() && !self.loading
    }

    /// Whether to show a "No results found" row.
    pub fn no_results(&self) -> bool {
        self.phase == SearchPhase::Filtering
            && self.input.chars().count() >= MIN_QUERY_LEN
            && self.candidates.is_empty()
    }

    /// Handle a change of the raw input text.
    ///
    /// Characters other than letters and whitespace are dropped. If nothing
    /// is left to change (e.g. only a digit was typed) the state is kept.
    pub fn input_changed(&mut self, raw: &str) {
        let sanitized = sanitize(raw);
        if sanitized == self.input && self.phase != SearchPhase::Idle {
            return;
        }

        self.input = sanitized;
        self.selected = None;
        self.phase = SearchPhase::Filtering;
        self.candidates = filter_cities(&self.cities, &self.input);
        self.highlighted = None;
        tracing::debug!(query = %self.input, matches = self.candidates.len(), "Filtered cities");
    }

    /// Pick the candidate at `index`. Returns the picked city, if any.
    pub fn select(&mut self, index: usize) -> Option<&CityRecord> {
        let city = self.candidates.get(index)?.clone();

        self.input = city.selection_text();
        self.candidates.clear();
        self.highlighted = None;
        self.phase = SearchPhase::Selected;
        self.selected = Some(city);
        self.selected.as_ref()
    }

    pub fn select_highlighted(&mut self) -> Option<&CityRecord> {
        let index = self.highlighted?;
        self.select(index)
    }

    pub fn highlight_next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % self.candidates.len(),
            None => 0,
        });
    }

    pub fn highlight_previous(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let last = self.candidates.len() - 1;
        self.highlighted = Some(match self.highlighted {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    /// Close the dropdown, keeping text and selection.
    pub fn dismiss(&mut self) {
        self.candidates.clear();
        self.highlighted = None;
    }

    /// Back to an empty, idle search box.
    pub fn reset(&mut self) {
        self.phase = SearchPhase::Idle;
        self.input.clear();
        self.candidates.clear();
        self.highlighted = None;
        self.selected = None;
    }

    /// Keyboard handling for the input box.
    ///
    /// Enter confirms when a city is selected, picks the highlighted
    /// candidate otherwise, and does nothing when neither applies.
    pub async fn key_down(&mut self, key: Key, events: &dyn SearchEvents) {
        match key {
            Key::Down => self.highlight_next(),
            Key::Up => self.highlight_previous(),
            Key::Escape => self.dismiss(),
            Key::Enter => {
                if self.selected.is_some() {
                    self.confirm(events).await;
                } else {
                    self.select_highlighted();
                }
            }
        }
    }

    /// Fetch wind data for the selected city.
    ///
    /// Returns `false` without doing anything when there is no selection or a
    /// fetch is already running.
    pub async fn confirm(&mut self, events: &dyn SearchEvents) -> bool {
        if self.loading {
            tracing::debug!("Ignoring confirm while a fetch is in flight");
            return false;
        }
        let Some(city) = self.selected.clone() else {
            return false;
        };

        let params = WindDataParams { latitude: city.lat, longitude: city.lon };
        let _busy = LoadingGuard::engage(&mut self.loading, events);

        match self.fetcher.fetch_wind_data(params).await {
            Ok(wind_data) => {
                let report = WindReport {
                    wind_data,
                    city_name: city.city,
                    country: city.country,
                    latitude: params.latitude,
                    longitude: params.longitude,
                };
                self.last_error = None;
                events.on_search(&report);
                self.last_result = Some(report);
            }
            Err(e) => {
                tracing::error!("Failed to fetch wind data: {e:#}");
                let message = error_message(&e);
                self.last_result = None;
                events.on_error(&message);
                self.last_error = Some(message);
            }
        }

        true
    }
}
