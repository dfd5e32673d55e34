use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Mutex};

use crate::model::WeatherSnapshot;

/// Store for the last successfully resolved lookup.
///
/// Implementations persist a city name and the full snapshot it resolved
/// to. The two are written by both the query pipeline and the location flow;
/// last writer wins, which is acceptable because each write is a complete,
/// self-consistent pair.
pub trait LookupCache: Send + Sync {
    /// The last searched city name, if any. Empty names count as absent.
    fn city_name(&self) -> Result<Option<String>>;

    fn save_city_name(&self, name: &str) -> Result<()>;

    fn snapshot(&self) -> Result<Option<WeatherSnapshot>>;

    fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> Result<()>;

    /// Persist a successful lookup: the snapshot plus its location name.
    fn save_lookup(&self, snapshot: &WeatherSnapshot) -> Result<()> {
        self.save_city_name(&snapshot.name)?;
        self.save_snapshot(snapshot)
    }

    /// The cached snapshot, but only while it is still consistent with the
    /// cached city name; a mismatch means the cache is stale and ignored.
    fn hydrate(&self) -> Result<Option<WeatherSnapshot>> {
        let Some(city) = self.city_name()? else {
            return Ok(None);
        };

        match self.snapshot()? {
            Some(snapshot) if snapshot.name == city => Ok(Some(snapshot)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    city_name: Option<String>,
    snapshot: Option<WeatherSnapshot>,
}

/// Single-document JSON cache under the platform data directory.
///
/// The snapshot is stored in the same shape it arrived in off the wire, so
/// a cache written by one version stays readable as long as the payload
/// schema is stable.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self {
            path: dirs.data_dir().join("last_lookup.json"),
        })
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<CacheDocument> {
        if !self.path.exists() {
            return Ok(CacheDocument::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read cache file: {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", self.path.display()))
    }

    fn write(&self, document: &CacheDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(document).context("Failed to serialize lookup cache")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))
    }
}

impl LookupCache for FileCache {
    fn city_name(&self) -> Result<Option<String>> {
        Ok(self.read()?.city_name.filter(|name| !name.is_empty()))
    }

    fn save_city_name(&self, name: &str) -> Result<()> {
        let mut document = self.read()?;
        document.city_name = Some(name.to_owned());
        self.write(&document)
    }

    fn snapshot(&self) -> Result<Option<WeatherSnapshot>> {
        Ok(self.read()?.snapshot)
    }

    fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> Result<()> {
        let mut document = self.read()?;
        document.snapshot = Some(snapshot.clone());
        self.write(&document)
    }
}

/// In-process cache for tests and hosts that do not want disk state.
#[derive(Debug, Default)]
pub struct MemoryCache {
    inner: Mutex<CacheDocument>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CacheDocument>> {
        self.inner.lock().map_err(|_| anyhow!("lookup cache mutex poisoned"))
    }
}

impl LookupCache for MemoryCache {
    fn city_name(&self) -> Result<Option<String>> {
        Ok(self.lock()?.city_name.clone().filter(|name| !name.is_empty()))
    }

    fn save_city_name(&self, name: &str) -> Result<()> {
        self.lock()?.city_name = Some(name.to_owned());
        Ok(())
    }

    fn snapshot(&self) -> Result<Option<WeatherSnapshot>> {
        Ok(self.lock()?.snapshot.clone())
    }

    fn save_snapshot(&self, snapshot: &WeatherSnapshot) -> Result<()> {
        self.lock()?.snapshot = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Clouds, Coord, Measurements, Sys, Wind};

    fn snapshot(name: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            coord: Coord { lon: -0.13, lat: 51.51 },
            conditions: Vec::new(),
            base: "stations".to_string(),
            measurements: Measurements {
                temp: 280.32,
                pressure: 1012,
                humidity: 81,
                temp_min: 279.15,
                temp_max: 281.15,
            },
            visibility: 10000,
            wind: Wind { speed: 4.1, deg: 80 },
            clouds: Clouds { all: 90 },
            dt: 1485789600,
            sys: Sys {
                kind: Some(1),
                id: Some(5091),
                country: "GB".to_string(),
                sunrise: 1485762037,
                sunset: 1485794875,
            },
            id: 2643743,
            name: name.to_string(),
            cod: 200,
        }
    }

    #[test]
    fn memory_cache_round_trips_a_lookup() {
        let cache = MemoryCache::new();
        cache.save_lookup(&snapshot("London")).expect("save must succeed");

        assert_eq!(cache.city_name().expect("read"), Some("London".to_string()));
        let hydrated = cache.hydrate().expect("hydrate").expect("must be present");
        assert_eq!(hydrated.name, "London");
    }

    #[test]
    fn hydrate_ignores_stale_snapshot() {
        let cache = MemoryCache::new();
        cache.save_snapshot(&snapshot("London")).expect("save");
        cache.save_city_name("Paris").expect("save");

        assert_eq!(cache.hydrate().expect("hydrate"), None);
    }

    #[test]
    fn hydrate_without_city_name_is_absent() {
        let cache = MemoryCache::new();
        cache.save_snapshot(&snapshot("London")).expect("save");

        assert_eq!(cache.hydrate().expect("hydrate"), None);
    }

    #[test]
    fn empty_city_name_counts_as_absent() {
        let cache = MemoryCache::new();
        cache.save_city_name("").expect("save");

        assert_eq!(cache.city_name().expect("read"), None);
    }

    #[test]
    fn file_cache_round_trips_a_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCache::at_path(dir.path().join("last_lookup.json"));

        cache.save_lookup(&snapshot("London")).expect("save must succeed");

        let reopened = FileCache::at_path(dir.path().join("last_lookup.json"));
        let hydrated = reopened.hydrate().expect("hydrate").expect("must be present");
        assert_eq!(hydrated.name, "London");
    }

    #[test]
    fn file_cache_is_empty_before_first_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCache::at_path(dir.path().join("last_lookup.json"));

        assert_eq!(cache.city_name().expect("read"), None);
        assert_eq!(cache.snapshot().expect("read"), None);
    }
}
