//! Persisted operator preferences.
//!
//! Single source of truth for the theme, threshold display mode, per-type
//! display units, and the sensor display order. Every field is written
//! through to durable key/value storage on mutation and reloaded at
//! construction, so preferences survive restarts.
//!
//! Change notification uses `tokio::sync::watch`: a subscriber observes
//! the current value immediately and every subsequent change. Mutations
//! are synchronous; there is one logical thread of mutation, so a plain
//! mutex around the storage backend is enough.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use aquadash_types::{Sensor, SensorType, ThresholdDisplay};

use crate::error::Result;
use crate::theme::Theme;
use crate::units;

/// Storage keys, fixed for compatibility with previously persisted state.
pub mod keys {
    use aquadash_types::SensorType;

    /// Persisted theme name.
    pub const THEME: &str = "theme";
    /// Persisted threshold display mode (numeric, stringified).
    pub const THRESHOLD_DISPLAY: &str = "thresholdDisplay";
    /// Persisted sensor display order (JSON array of type identifiers).
    pub const SENSOR_ORDER: &str = "sensor_order";

    /// Per-type display unit key.
    pub fn sensor_unit(sensor_type: SensorType) -> String {
        format!("sensor_unit_{}", sensor_type.as_str())
    }
}

/// Durable key/value storage for preferences.
pub trait Storage: Send {
    /// Read a stored value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value through to durable storage.
    fn set(&mut self, key: &str, value: &str);
}

impl std::fmt::Debug for Box<dyn Storage> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Storage")
    }
}

/// In-memory storage, used in tests and as a fallback when no config
/// directory is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// File-backed storage: a single JSON object persisted under the user
/// config directory. The whole map is rewritten on every set; preference
/// writes are rare and tiny.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStorage {
    /// Open (or create) the preference file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// The default preference file location
    /// (`<config_dir>/aquadash/preferences.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aquadash").join("preferences.json"))
    }

    /// The file this storage persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let write = || -> Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&self.values)?;
            fs::write(&self.path, json)?;
            Ok(())
        };
        if let Err(e) = write() {
            warn!(path = %self.path.display(), error = %e, "failed to persist preferences");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

/// Process-wide preference state with persistence and change streams.
///
/// Cheap to clone; clones share state and notify the same subscribers.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    storage: Arc<Mutex<Box<dyn Storage>>>,
    theme_tx: watch::Sender<Theme>,
    display_tx: watch::Sender<ThresholdDisplay>,
    units_tx: watch::Sender<HashMap<SensorType, String>>,
}

impl PreferenceStore {
    /// Create a store over the given backend, reloading any persisted
    /// state.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        let theme = storage
            .get(keys::THEME)
            .map(|name| Theme::from_name(&name))
            .unwrap_or_default();

        let display = storage
            .get(keys::THRESHOLD_DISPLAY)
            .and_then(|raw| raw.parse::<u8>().ok())
            .and_then(|n| ThresholdDisplay::try_from(n).ok())
            .unwrap_or_default();

        let mut unit_map = HashMap::new();
        for sensor_type in SensorType::ALL {
            if let Some(unit) = storage.get(&keys::sensor_unit(sensor_type)) {
                if units::is_valid_unit(sensor_type, &unit) {
                    unit_map.insert(sensor_type, unit);
                } else {
                    warn!(%sensor_type, unit, "ignoring persisted unit not valid for type");
                }
            }
        }

        let (theme_tx, _) = watch::channel(theme);
        let (display_tx, _) = watch::channel(display);
        let (units_tx, _) = watch::channel(unit_map);

        Self {
            storage: Arc::new(Mutex::new(storage)),
            theme_tx,
            display_tx,
            units_tx,
        }
    }

    /// A store backed by the default preference file, falling back to
    /// in-memory storage when the file cannot be opened.
    pub fn open_default() -> Self {
        let storage: Box<dyn Storage> = match FileStorage::default_path() {
            Some(path) => match FileStorage::open(&path) {
                Ok(file) => Box::new(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "using in-memory preferences");
                    Box::new(MemoryStorage::default())
                }
            },
            None => Box::new(MemoryStorage::default()),
        };
        Self::new(storage)
    }

    /// An ephemeral in-memory store, mainly for tests.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::default()))
    }

    fn persist(&self, key: &str, value: &str) {
        let mut storage = self
            .storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        storage.set(key, value);
    }

    // ----- theme -----

    /// Whether dark mode is active.
    pub fn dark_mode(&self) -> bool {
        *self.theme_tx.borrow() == Theme::Dark
    }

    /// The active theme.
    pub fn theme(&self) -> Theme {
        *self.theme_tx.borrow()
    }

    /// The persisted name of the active theme.
    pub fn theme_name(&self) -> &'static str {
        self.theme().name()
    }

    /// Flip dark mode, persist the new theme name, and notify subscribers.
    pub fn toggle_dark_mode(&self) {
        let next = self.theme().toggled();
        self.persist(keys::THEME, next.name());
        self.theme_tx.send_replace(next);
        debug!(theme = next.name(), "theme toggled");
    }

    /// Observe the theme: current value now, every change afterwards.
    pub fn watch_theme(&self) -> watch::Receiver<Theme> {
        self.theme_tx.subscribe()
    }

    // ----- threshold display mode -----

    /// The active threshold display mode.
    pub fn threshold_display(&self) -> ThresholdDisplay {
        *self.display_tx.borrow()
    }

    /// Set the threshold display mode, persist it, notify subscribers.
    pub fn set_threshold_display(&self, mode: ThresholdDisplay) {
        self.persist(keys::THRESHOLD_DISPLAY, &mode.as_u8().to_string());
        self.display_tx.send_replace(mode);
    }

    /// Observe the threshold display mode.
    pub fn watch_threshold_display(&self) -> watch::Receiver<ThresholdDisplay> {
        self.display_tx.subscribe()
    }

    // ----- per-type display units -----

    /// The preferred display unit for a sensor type, if one was chosen.
    pub fn sensor_unit(&self, sensor_type: SensorType) -> Option<String> {
        self.units_tx.borrow().get(&sensor_type).cloned()
    }

    /// Choose a display unit for a sensor type.
    ///
    /// The unit must be valid for the type per the conversion table;
    /// invalid units are rejected with a warning and the prior choice is
    /// retained.
    pub fn set_sensor_unit(&self, sensor_type: SensorType, unit: &str) {
        if !units::is_valid_unit(sensor_type, unit) {
            warn!(%sensor_type, unit, "rejecting invalid sensor unit");
            return;
        }
        self.persist(&keys::sensor_unit(sensor_type), unit);
        self.units_tx.send_modify(|map| {
            map.insert(sensor_type, unit.to_string());
        });
    }

    /// Observe the unit preference map.
    pub fn watch_sensor_units(&self) -> watch::Receiver<HashMap<SensorType, String>> {
        self.units_tx.subscribe()
    }

    // ----- sensor order -----

    /// The persisted display order, empty when never saved.
    pub fn sensor_order(&self) -> Vec<SensorType> {
        let storage = self
            .storage
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(raw) = storage.get(keys::SENSOR_ORDER) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "discarding unreadable sensor order");
                Vec::new()
            }
        }
    }

    /// Persist a new display order.
    pub fn save_sensor_order(&self, order: &[SensorType]) {
        match serde_json::to_string(order) {
            Ok(json) => self.persist(keys::SENSOR_ORDER, &json),
            Err(e) => warn!(error = %e, "failed to encode sensor order"),
        }
    }

    /// Stable-sort sensors by the persisted order; types not in the order
    /// sort last, keeping their relative order.
    pub fn sort_sensors(&self, sensors: &mut [Sensor]) {
        let order = self.sensor_order();
        let index = |t: SensorType| {
            order
                .iter()
                .position(|&o| o == t)
                .unwrap_or(usize::MAX)
        };
        sensors.sort_by_key(|s| index(s.sensor_type));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(sensor_type: SensorType) -> Sensor {
        Sensor {
            sensor_id: sensor_type as i64,
            sensor_type,
            prototype_id: 0,
            sensor_unit: units::default_unit(sensor_type).unwrap_or_default().to_string(),
            threshold_critically_low: 0.0,
            threshold_low: 1.0,
            threshold_high: 2.0,
            threshold_critically_high: 3.0,
        }
    }

    #[test]
    fn toggling_theme_twice_returns_to_original_and_notifies_twice() {
        let prefs = PreferenceStore::in_memory();
        let original = prefs.theme_name();
        let mut rx = prefs.watch_theme();
        rx.borrow_and_update();

        prefs.toggle_dark_mode();
        assert!(rx.has_changed().unwrap());
        assert_ne!(prefs.theme_name(), original);
        rx.borrow_and_update();

        prefs.toggle_dark_mode();
        assert!(rx.has_changed().unwrap());
        assert_eq!(prefs.theme_name(), original);
    }

    #[test]
    fn invalid_unit_is_rejected_and_prior_value_kept() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_sensor_unit(SensorType::Ec, units::MILLI_SIEMENS);
        assert_eq!(
            prefs.sensor_unit(SensorType::Ec).as_deref(),
            Some(units::MILLI_SIEMENS)
        );

        prefs.set_sensor_unit(SensorType::Ec, "bogus");
        assert_eq!(
            prefs.sensor_unit(SensorType::Ec).as_deref(),
            Some(units::MILLI_SIEMENS)
        );
    }

    #[test]
    fn sensor_order_round_trips() {
        let prefs = PreferenceStore::in_memory();
        assert!(prefs.sensor_order().is_empty());

        prefs.save_sensor_order(&[SensorType::Ph, SensorType::Ec]);
        assert_eq!(prefs.sensor_order(), vec![SensorType::Ph, SensorType::Ec]);
    }

    #[test]
    fn sort_sensors_puts_unlisted_types_last() {
        let prefs = PreferenceStore::in_memory();
        prefs.save_sensor_order(&[SensorType::Humidity, SensorType::Ph]);

        let mut sensors = vec![
            sensor(SensorType::Ec),
            sensor(SensorType::Ph),
            sensor(SensorType::Temperature),
            sensor(SensorType::Humidity),
        ];
        prefs.sort_sensors(&mut sensors);

        let order: Vec<_> = sensors.iter().map(|s| s.sensor_type).collect();
        assert_eq!(
            order,
            vec![
                SensorType::Humidity,
                SensorType::Ph,
                SensorType::Ec,
                SensorType::Temperature,
            ]
        );
    }

    #[test]
    fn threshold_display_mode_persists_and_notifies() {
        let prefs = PreferenceStore::in_memory();
        let mut rx = prefs.watch_threshold_display();
        assert_eq!(
            *rx.borrow_and_update(),
            ThresholdDisplay::ColoredBackgroundWithLine
        );

        prefs.set_threshold_display(ThresholdDisplay::ColoredLine);
        assert!(rx.has_changed().unwrap());
        assert_eq!(prefs.threshold_display(), ThresholdDisplay::ColoredLine);
    }

    #[test]
    fn preferences_survive_reload_through_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        {
            let prefs =
                PreferenceStore::new(Box::new(FileStorage::open(&path).unwrap()));
            prefs.toggle_dark_mode();
            prefs.set_threshold_display(ThresholdDisplay::ColoredBackground);
            prefs.set_sensor_unit(SensorType::Temperature, units::FAHRENHEIT);
            prefs.save_sensor_order(&[SensorType::Oxygen, SensorType::Ec]);
        }

        let reloaded = PreferenceStore::new(Box::new(FileStorage::open(&path).unwrap()));
        assert!(reloaded.dark_mode());
        assert_eq!(
            reloaded.threshold_display(),
            ThresholdDisplay::ColoredBackground
        );
        assert_eq!(
            reloaded.sensor_unit(SensorType::Temperature).as_deref(),
            Some(units::FAHRENHEIT)
        );
        assert_eq!(
            reloaded.sensor_order(),
            vec![SensorType::Oxygen, SensorType::Ec]
        );
    }

    #[test]
    fn watch_subscribers_see_current_value_at_subscription() {
        let prefs = PreferenceStore::in_memory();
        prefs.set_sensor_unit(SensorType::Temperature, units::FAHRENHEIT);

        let rx = prefs.watch_sensor_units();
        assert_eq!(
            rx.borrow().get(&SensorType::Temperature).map(String::as_str),
            Some(units::FAHRENHEIT)
        );
    }
}
