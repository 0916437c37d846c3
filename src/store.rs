use crate::error::StoreError;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Index of all known class role ids, in creation order.
const CLASS_INDEX: &str = "class.list";
/// Index of all known subject role ids.
const SUBJECT_INDEX: &str = "subject.list";

fn class_key(role_id: u64) -> String {
    format!("class:{role_id}")
}

fn subject_key(role_id: u64) -> String {
    format!("subject:{role_id}")
}

/// Stored metadata for one class channel, keyed by the class role id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Channel the class role gates access to
    pub channel: u64,
    pub subject: String,
    pub course: String,
    pub title: String,
    pub instructor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ClassRecord {
    /// Short identifier students use to refer to the class, e.g. `cs301`.
    pub fn class_id(&self) -> String {
        format!("{}{}", self.subject, self.course).to_lowercase()
    }

    /// Human-facing slug used in confirmation prompts, e.g. `CS-301-F01`.
    pub fn slug(&self) -> String {
        match &self.section {
            Some(section) => format!("{}-{}-{}", self.subject, self.course, section),
            None => format!("{}-{}", self.subject, self.course),
        }
    }
}

/// Redis-backed record store for classes and subjects.
///
/// Index appends and record writes go through a single MULTI/EXEC pipeline,
/// so the index and the record never disagree on what exists.
#[derive(Clone)]
pub struct ClassStore {
    con: ConnectionManager,
}

impl ClassStore {
    /// Connect to Redis and hand back a clonable store handle.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!("Connecting to Redis at {url}");
        let client = redis::Client::open(url).map_err(|source| StoreError::ConnectionFailed {
            url: url.to_string(),
            source,
        })?;
        let con = client
            .get_connection_manager()
            .await
            .map_err(|source| StoreError::ConnectionFailed {
                url: url.to_string(),
                source,
            })?;
        debug!("Redis connection established");
        Ok(Self { con })
    }

    /// Write a class record and append its id to the index.
    pub async fn add(&self, role_id: u64, record: &ClassRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record).map_err(|source| StoreError::CorruptRecord {
            key: class_key(role_id),
            source,
        })?;
        let mut con = self.con.clone();
        redis::pipe()
            .atomic()
            .rpush(CLASS_INDEX, role_id)
            .ignore()
            .set(class_key(role_id), json)
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await
            .map_err(|source| StoreError::CommandFailed {
                context: format!("add class {role_id}"),
                source,
            })
    }

    /// Fetch one class record; `None` when the id is unknown.
    pub async fn get(&self, role_id: u64) -> Result<Option<ClassRecord>, StoreError> {
        let mut con = self.con.clone();
        let raw: Option<String> =
            con.get(class_key(role_id))
                .await
                .map_err(|source| StoreError::CommandFailed {
                    context: format!("get class {role_id}"),
                    source,
                })?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|source| StoreError::CorruptRecord {
                key: class_key(role_id),
                source,
            })
        })
        .transpose()
    }

    /// Remove a class record and its index entry.
    pub async fn remove(&self, role_id: u64) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        redis::pipe()
            .atomic()
            .lrem(CLASS_INDEX, 0, role_id)
            .ignore()
            .del(class_key(role_id))
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await
            .map_err(|source| StoreError::CommandFailed {
                context: format!("remove class {role_id}"),
                source,
            })
    }

    /// All known class role ids, in index order.
    pub async fn list(&self) -> Result<Vec<u64>, StoreError> {
        let mut con = self.con.clone();
        con.lrange(CLASS_INDEX, 0, -1)
            .await
            .map_err(|source| StoreError::CommandFailed {
                context: "list classes".to_string(),
                source,
            })
    }

    /// The index joined with its records. A `None` record is a stale index
    /// entry whose class key has gone missing.
    pub async fn list_records(&self) -> Result<Vec<(u64, Option<ClassRecord>)>, StoreError> {
        let ids = self.list().await?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push((id, self.get(id).await?));
        }
        Ok(records)
    }

    /// Register a subject role.
    pub async fn add_subject(&self, role_id: u64, code: &str) -> Result<(), StoreError> {
        let mut con = self.con.clone();
        redis::pipe()
            .atomic()
            .rpush(SUBJECT_INDEX, role_id)
            .ignore()
            .set(subject_key(role_id), code)
            .ignore()
            .query_async::<_, ()>(&mut con)
            .await
            .map_err(|source| StoreError::CommandFailed {
                context: format!("add subject {role_id}"),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_construction() {
        assert_eq!(class_key(42), "class:42");
        assert_eq!(subject_key(42), "subject:42");
    }

    fn record() -> ClassRecord {
        ClassRecord {
            channel: 478815208035581999,
            subject: "CS".to_string(),
            course: "301".to_string(),
            title: "Algorithms".to_string(),
            instructor: "Dr. Smith".to_string(),
            section: None,
        }
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_string(&record()).unwrap();
        assert_eq!(
            json,
            r#"{"channel":478815208035581999,"subject":"CS","course":"301","title":"Algorithms","instructor":"Dr. Smith"}"#
        );
        let back: ClassRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn test_record_json_with_section() {
        let mut with_section = record();
        with_section.section = Some("F01".to_string());
        let json = serde_json::to_string(&with_section).unwrap();
        let back: ClassRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.section.as_deref(), Some("F01"));
    }

    #[test]
    fn test_class_id_is_lowercase() {
        assert_eq!(record().class_id(), "cs301");
    }

    #[test]
    fn test_slug_with_and_without_section() {
        assert_eq!(record().slug(), "CS-301");
        let mut with_section = record();
        with_section.section = Some("F01".to_string());
        assert_eq!(with_section.slug(), "CS-301-F01");
    }
}
