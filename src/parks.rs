//! POTA park location lookup.
//!
//! The POTA ADIF export fans one QSO out per `MY_STATE` locator of the
//! activated park. Locators come from the park database; the HTTP
//! resolver memoizes per park so a log with hundreds of QSOs costs one
//! request per distinct reference.

use hashbrown::HashMap;
use std::cell::RefCell;
use tracing::warn;

/// Default park database endpoint.
pub const DEFAULT_PARKS_BASE: &str = "https://sotaapp2.sotalive.net/api/v2/pota";

/// Placeholder locator when a park cannot be resolved.
pub const UNKNOWN_LOC: &str = "UNKNOWN";

/// Maps a POTA park reference to its location identifiers
/// (e.g. `JA-0014` to `["JA-KN", "JA-TK"]` for a park spanning two
/// prefectures).
pub trait ParkResolver {
    /// Location identifiers for one park. Never fails; an unresolvable
    /// park yields `["UNKNOWN"]`.
    fn locations(&self, park: &str) -> Vec<String>;
}

/// HTTP resolver against the park database, memoized per reference.
pub struct HttpParkResolver {
    base: String,
    cache: RefCell<HashMap<String, Vec<String>>>,
}

impl HttpParkResolver {
    /// Resolver against the default park database endpoint.
    pub fn new() -> Self {
        Self::with_base(DEFAULT_PARKS_BASE)
    }

    /// Resolver against a custom endpoint, mainly for tests.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn fetch(&self, park: &str) -> Vec<String> {
        let url = format!("{}/parks/{}", self.base, park);
        let locs = ureq::get(&url)
            .call()
            .ok()
            .and_then(|resp| resp.into_json::<serde_json::Value>().ok())
            .and_then(|js| {
                js.get("parkLocid")
                    .and_then(|v| v.as_str())
                    .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
            });
        match locs {
            Some(locs) => locs,
            None => {
                warn!(park, "park lookup failed");
                vec![UNKNOWN_LOC.to_string()]
            }
        }
    }
}

impl Default for HttpParkResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ParkResolver for HttpParkResolver {
    fn locations(&self, park: &str) -> Vec<String> {
        if let Some(hit) = self.cache.borrow().get(park) {
            return hit.clone();
        }
        let locs = self.fetch(park);
        self.cache
            .borrow_mut()
            .insert(park.to_string(), locs.clone());
        locs
    }
}

/// Fixed-table resolver for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct TableParkResolver {
    table: HashMap<String, Vec<String>>,
}

impl TableParkResolver {
    /// Empty table; unknown parks degrade to [`UNKNOWN_LOC`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the locators of one park.
    pub fn insert(&mut self, park: &str, locs: &[&str]) {
        self.table.insert(
            park.to_string(),
            locs.iter().map(|s| s.to_string()).collect(),
        );
    }
}

impl ParkResolver for TableParkResolver {
    fn locations(&self, park: &str) -> Vec<String> {
        self.table
            .get(park)
            .cloned()
            .unwrap_or_else(|| vec![UNKNOWN_LOC.to_string()])
    }
}
