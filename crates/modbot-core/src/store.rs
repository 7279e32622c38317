use std::{fs, path::PathBuf};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    domain::ProposalId,
    errors::Error,
    proposal::Proposal,
    Result,
};

/// The full in-memory proposal collection, ordered by insertion.
///
/// Lookups are by structured id; the encoded `"<sender>_<origin>"` string
/// only appears as the JSON object key. The collection is small (a chat
/// suggestion inbox), so linear id scans are fine and keep insertion order
/// without pulling in an ordered-map dependency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProposalBook {
    entries: Vec<Proposal>,
}

impl ProposalBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ProposalId) -> Option<&Proposal> {
        self.entries.iter().find(|p| p.id == *id)
    }

    pub fn get_mut(&mut self, id: &ProposalId) -> Option<&mut Proposal> {
        self.entries.iter_mut().find(|p| p.id == *id)
    }

    /// Insert or overwrite in place; a replaced entry keeps its original
    /// position so the persisted key order stays stable.
    pub fn insert(&mut self, proposal: Proposal) {
        match self.get_mut(&proposal.id) {
            Some(slot) => *slot = proposal,
            None => self.entries.push(proposal),
        }
    }

    /// Only used to roll back a failed insert; resolved proposals are never
    /// deleted (audit trail).
    pub fn remove(&mut self, id: &ProposalId) -> Option<Proposal> {
        let idx = self.entries.iter().position(|p| p.id == *id)?;
        Some(self.entries.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.entries.iter()
    }

    /// Audit-trail view, newest first (RFC3339 sorts lexicographically).
    pub fn newest_first(&self) -> Vec<&Proposal> {
        let mut out: Vec<&Proposal> = self.entries.iter().collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        out
    }
}

impl Serialize for ProposalBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for p in &self.entries {
            map.serialize_entry(&p.id.encode(), p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProposalBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BookVisitor;

        impl<'de> Visitor<'de> for BookVisitor {
            type Value = ProposalBook;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a JSON object keyed by proposal id")
            }

            // Streaming MapAccess preserves document order, so a reloaded
            // book keeps the insertion order it was saved with.
            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut book = ProposalBook::new();
                while let Some((_key, proposal)) = access.next_entry::<String, Proposal>()? {
                    book.insert(proposal);
                }
                Ok(book)
            }
        }

        deserializer.deserialize_map(BookVisitor)
    }
}

/// Disk-backed proposal persistence: load wholesale at startup, rewrite
/// wholesale on every mutation. No partial updates are exposed.
#[derive(Clone, Debug)]
pub struct ProposalStore {
    path: PathBuf,
}

impl ProposalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Fail-soft load: a missing or malformed backing file means "no prior
    /// state", never a startup error.
    pub fn load(&self) -> ProposalBook {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return ProposalBook::new();
        };

        match serde_json::from_str(&contents) {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "proposal store is malformed; starting from an empty book"
                );
                ProposalBook::new()
            }
        }
    }

    /// Atomic full rewrite: serialize to `<path>.tmp`, then rename over the
    /// backing file so a crash mid-write never truncates prior state.
    pub fn save(&self, book: &ProposalBook) -> Result<()> {
        let txt = serde_json::to_string_pretty(book)
            .map_err(|e| Error::Persistence(format!("serialize proposals: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, txt)
            .map_err(|e| Error::Persistence(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Persistence(format!("rename {}: {e}", self.path.display())))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId};

    fn proposal(sender: i64, origin: i32, text: &str) -> Proposal {
        Proposal::new(
            ProposalId::new(ChatId(sender), MessageId(origin)),
            Some(text.to_string()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn save_then_load_round_trips_the_book() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::new(dir.path().join("proposals.json"));

        let mut book = ProposalBook::new();
        book.insert(proposal(100, 55, "Hello"));
        let mut rejected = proposal(100, 56, "Nope");
        rejected.reject("too short".into()).unwrap();
        book.insert(rejected);
        book.insert(Proposal::new(
            ProposalId::new(ChatId(200), MessageId(1)),
            Some("caption".into()),
            Some("file-abc".into()),
        )
        .unwrap());

        store.save(&book).unwrap();
        assert_eq!(store.load(), book);

        // The temp file must not linger after a successful save.
        assert!(!dir.path().join("proposals.json.tmp").exists());
    }

    #[test]
    fn load_preserves_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::new(dir.path().join("proposals.json"));

        let mut book = ProposalBook::new();
        // Keys that would re-order under lexicographic sorting.
        book.insert(proposal(9, 1, "first"));
        book.insert(proposal(10, 1, "second"));
        book.insert(proposal(1, 1, "third"));
        store.save(&book).unwrap();

        let loaded = store.load();
        let ids: Vec<String> = loaded.iter().map(|p| p.id.encode()).collect();
        assert_eq!(ids, vec!["9_1", "10_1", "1_1"]);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProposalStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ProposalStore::new(&path).load().is_empty());
    }

    #[test]
    fn reloads_the_original_javascript_store_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.json");
        fs::write(
            &path,
            r#"{
              "100_55": {
                "id": "100_55",
                "senderId": 100,
                "text": "Hello",
                "status": "rejected",
                "timestamp": "2026-08-01T10:00:00.000Z",
                "rejectedAt": "2026-08-01T11:00:00.000Z",
                "rejectionReason": "too short"
              }
            }"#,
        )
        .unwrap();

        let book = ProposalStore::new(&path).load();
        let p = book
            .get(&ProposalId::new(ChatId(100), MessageId(55)))
            .unwrap();
        assert_eq!(p.status, crate::proposal::ProposalStatus::Rejected);
        assert_eq!(p.rejection_reason.as_deref(), Some("too short"));
        assert!(p.file_id.is_none());
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut book = ProposalBook::new();
        book.insert(proposal(100, 55, "v1"));
        book.insert(proposal(200, 1, "other"));
        book.insert(proposal(100, 55, "v2"));

        assert_eq!(book.len(), 2);
        let ids: Vec<String> = book.iter().map(|p| p.id.encode()).collect();
        assert_eq!(ids, vec!["100_55", "200_1"]);
        assert_eq!(
            book.get(&ProposalId::new(ChatId(100), MessageId(55)))
                .unwrap()
                .text
                .as_deref(),
            Some("v2")
        );
    }
}
