use crate::config::atomic_rename;
use crate::model::{PetState, Stats};
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub(crate) const KEY_STATS: &str = "petStats";
pub(crate) const KEY_BIRTH: &str = "birthDate";
pub(crate) const KEY_ACHIEVEMENTS: &str = "achievements";

/// Flat key/value persistence. Writes are fire-and-forget from the
/// session's point of view; a missing or unreadable value is simply
/// absent.
pub(crate) trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One file per key under the project data dir, replaced atomically.
pub(crate) struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub(crate) fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        atomic_rename(&tmp, &path)?;
        Ok(())
    }
}

/// The persisted birth timestamp, or `None` when it is missing or does
/// not parse. Callers treat both the same way: mint a fresh one and
/// persist it.
pub(crate) fn load_birth(store: &dyn Store) -> Option<DateTime<Utc>> {
    store
        .get(KEY_BIRTH)
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// The store keeps unix-millis, so a freshly minted birth drops its
/// sub-millisecond part up front; memory and disk always agree.
fn to_millis_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(t.timestamp_millis()).single().unwrap_or(t)
}

/// Loads a pet from the store, falling back to documented defaults for
/// anything missing or corrupt. `now` becomes the birth timestamp when
/// no usable one was persisted; the caller persists it right away.
pub(crate) fn load_state(store: &dyn Store, now: DateTime<Utc>) -> PetState {
    let stats = store
        .get(KEY_STATS)
        .and_then(|s| serde_json::from_str::<Stats>(&s).ok())
        .map(Stats::clamped)
        .unwrap_or_default();

    let birth = load_birth(store).unwrap_or_else(|| to_millis_precision(now));

    let unlocked: Vec<String> = store
        .get(KEY_ACHIEVEMENTS)
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    PetState {
        stats,
        birth,
        sleeping: false,
        unlocked,
    }
}

pub(crate) fn save_stats(store: &mut dyn Store, stats: &Stats) -> Result<()> {
    store.set(KEY_STATS, &serde_json::to_string(stats)?)
}

pub(crate) fn save_birth(store: &mut dyn Store, birth: DateTime<Utc>) -> Result<()> {
    store.set(KEY_BIRTH, &birth.timestamp_millis().to_string())
}

pub(crate) fn save_achievements(store: &mut dyn Store, unlocked: &[String]) -> Result<()> {
    store.set(KEY_ACHIEVEMENTS, &serde_json::to_string(unlocked)?)
}

#[cfg(test)]
pub(crate) struct MemStore(pub(crate) std::collections::BTreeMap<String, String>);

#[cfg(test)]
impl MemStore {
    pub(crate) fn new() -> Self {
        Self(std::collections::BTreeMap::new())
    }
}

#[cfg(test)]
impl Store for MemStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_three_keys() {
        let mut store = MemStore::new();
        let stats = Stats {
            hunger: 12,
            energy: 34,
            happiness: 56,
            health: 78,
            cleanliness: 90,
        };
        let birth = Utc.timestamp_millis_opt(1_700_000_000_000).single().unwrap();
        let unlocked = vec!["feed1".to_string(), "survivor5".to_string()];

        save_stats(&mut store, &stats).unwrap();
        save_birth(&mut store, birth).unwrap();
        save_achievements(&mut store, &unlocked).unwrap();

        let state = load_state(&store, Utc::now());
        assert_eq!(state.stats, stats);
        assert_eq!(state.birth, birth);
        assert_eq!(state.unlocked, unlocked);
        assert!(!state.sleeping);
    }

    #[test]
    fn missing_data_falls_back_to_defaults() {
        let now = Utc::now();
        let state = load_state(&MemStore::new(), now);
        assert_eq!(state.stats, Stats::default());
        assert_eq!(state.birth.timestamp_millis(), now.timestamp_millis());
        assert!(state.unlocked.is_empty());
    }

    #[test]
    fn fresh_birth_round_trips_at_store_precision() {
        // a minted birth carries no sub-millisecond part, so saving and
        // reloading it reproduces the exact same instant
        let state = load_state(&MemStore::new(), Utc::now());
        let mut store = MemStore::new();
        save_birth(&mut store, state.birth).unwrap();
        assert_eq!(load_birth(&store), Some(state.birth));
    }

    #[test]
    fn out_of_range_stats_are_clamped_on_load() {
        let mut store = MemStore::new();
        store
            .set(
                KEY_STATS,
                r#"{"hunger":250,"energy":101,"happiness":0,"health":55,"cleanliness":200}"#,
            )
            .unwrap();

        let state = load_state(&store, Utc::now());
        for (name, v) in state.stats.fields() {
            assert!(v <= 100, "{name} out of range after load: {v}");
        }
        assert_eq!(state.stats.hunger, 100);
        assert_eq!(state.stats.health, 55);

        // and the restored invariant keeps the operations total
        let fed = state.stats.fed();
        assert_eq!(fed.hunger, 100);
    }

    #[test]
    fn unparseable_birth_reads_as_absent() {
        let mut store = MemStore::new();
        store.set(KEY_BIRTH, "not-a-timestamp").unwrap();
        assert_eq!(load_birth(&store), None);
    }

    #[test]
    fn corrupt_data_reads_as_absent() {
        let mut store = MemStore::new();
        store.set(KEY_STATS, "{not json").unwrap();
        store.set(KEY_BIRTH, "yesterday").unwrap();
        store.set(KEY_ACHIEVEMENTS, "42").unwrap();

        let now = Utc::now();
        let state = load_state(&store, now);
        assert_eq!(state.stats, Stats::default());
        assert_eq!(state.birth, now);
        assert!(state.unlocked.is_empty());
    }

    #[test]
    fn file_store_replaces_values() {
        let dir = std::env::temp_dir().join(format!("termpet-test-{}", std::process::id()));
        let mut store = FileStore::open(&dir).unwrap();
        assert!(store.get(KEY_BIRTH).is_none());

        store.set(KEY_BIRTH, "123").unwrap();
        assert_eq!(store.get(KEY_BIRTH).as_deref(), Some("123"));
        store.set(KEY_BIRTH, "456").unwrap();
        assert_eq!(store.get(KEY_BIRTH).as_deref(), Some("456"));

        let _ = fs::remove_dir_all(&dir);
    }
}
