//! The user's favourite shows, kept unique by id and mirrored to the store
//! after every mutation.
use crate::models::ShowRecord;
use crate::store::{KeyValueStore, FAVOURITES_KEY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavouritesList(Vec<ShowRecord>);

impl FavouritesList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.iter().any(|r| r.id == id)
    }

    pub fn get(&self, id: u32) -> Option<&ShowRecord> {
        self.0.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[ShowRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reads the list from the store. Missing or unparsable data yields an empty list.
pub fn load(store: &dyn KeyValueStore) -> FavouritesList {
    let Some(raw) = store.get(FAVOURITES_KEY) else {
        debug!("No stored favourites");
        return FavouritesList::new();
    };
    match serde_json::from_str::<Vec<ShowRecord>>(&raw) {
        Ok(records) => {
            // Older files may hold duplicates; keep the first occurrence.
            let mut list = FavouritesList::new();
            for record in records {
                if !list.contains(record.id) {
                    list.0.push(record);
                }
            }
            info!("Loaded {} favourites", list.len());
            list
        }
        Err(e) => {
            warn!("Stored favourites failed to parse, starting empty: {}", e);
            FavouritesList::new()
        }
    }
}

pub fn persist(store: &dyn KeyValueStore, list: &FavouritesList) -> Result<()> {
    let body = serde_json::to_string(list).context("serializing favourites")?;
    store
        .set(FAVOURITES_KEY, &body)
        .context("writing favourites to store")
}

/// Appends `record` unless its id is already present. A duplicate leaves the
/// store untouched.
pub fn add(
    store: &dyn KeyValueStore,
    list: &FavouritesList,
    record: ShowRecord,
) -> Result<FavouritesList> {
    if list.contains(record.id) {
        debug!(show_id = record.id, "Already a favourite");
        return Ok(list.clone());
    }
    let mut next = list.clone();
    info!(show_id = record.id, name = %record.name, "Adding favourite");
    next.0.push(record);
    persist(store, &next)?;
    Ok(next)
}

/// Drops the record with `id`. The list is persisted whether or not a record
/// was found.
pub fn remove(store: &dyn KeyValueStore, list: &FavouritesList, id: u32) -> Result<FavouritesList> {
    let mut next = list.clone();
    match next.0.iter().position(|r| r.id == id) {
        Some(idx) => {
            next.0.remove(idx);
            info!(show_id = id, "Removed favourite");
        }
        None => debug!(show_id = id, "Remove requested for a show that is not a favourite"),
    }
    persist(store, &next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShowImage;
    use crate::store::MemoryStore;

    fn record(id: u32, name: &str) -> ShowRecord {
        ShowRecord {
            id,
            name: name.to_string(),
            image: Some(ShowImage {
                medium: format!("https://img/{id}/medium.jpg"),
                original: format!("https://img/{id}/original.jpg"),
            }),
            summary: Some("<p>Summary</p>".to_string()),
            cast: vec!["Actor A".to_string()],
        }
    }

    #[test]
    fn adding_twice_is_idempotent_and_writes_once() {
        let store = MemoryStore::new();
        let once = add(&store, &FavouritesList::new(), record(1, "One")).unwrap();
        let twice = add(&store, &once, record(1, "One")).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn remove_after_add_restores_length() {
        let store = MemoryStore::new();
        let base = add(&store, &FavouritesList::new(), record(1, "One")).unwrap();
        let grown = add(&store, &base, record(2, "Two")).unwrap();
        let shrunk = remove(&store, &grown, 2).unwrap();
        assert!(!shrunk.contains(2));
        assert_eq!(shrunk.len(), base.len());
        assert_eq!(load(&store), base);
    }

    #[test]
    fn removing_absent_id_still_persists() {
        let store = MemoryStore::new();
        let list = add(&store, &FavouritesList::new(), record(7, "Seven")).unwrap();
        let after = remove(&store, &list, 99).unwrap();
        assert_eq!(after, list);
        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn load_roundtrips_persisted_list() {
        let store = MemoryStore::new();
        let list = add(&store, &FavouritesList::new(), record(3, "Three")).unwrap();
        let list = add(&store, &list, record(1, "One")).unwrap();
        let loaded = load(&store);
        assert_eq!(loaded, list);
        let ids: Vec<u32> = loaded.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn load_degrades_to_empty() {
        let store = MemoryStore::new();
        assert!(load(&store).is_empty());
        store.set(FAVOURITES_KEY, "{\"oops\": true}").unwrap();
        assert!(load(&store).is_empty());
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let store = MemoryStore::new();
        let raw = serde_json::to_string(&vec![record(5, "A"), record(5, "B")]).unwrap();
        store.set(FAVOURITES_KEY, &raw).unwrap();
        let list = load(&store);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(5).map(|r| r.name.as_str()), Some("A"));
    }

    #[test]
    fn add_then_remove_42_leaves_store_empty() {
        let store = MemoryStore::new();
        let list = add(&store, &FavouritesList::new(), record(42, "Answer")).unwrap();
        let list = remove(&store, &list, 42).unwrap();
        assert!(list.is_empty());
        assert_eq!(store.get(FAVOURITES_KEY).as_deref(), Some("[]"));
    }
}
