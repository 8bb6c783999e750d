use std::collections::HashMap;
use std::num::NonZeroU8;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::{default_family_size, AssessmentAnswers, ImmigrationStatus};

/// Key holding the submitted assessment snapshot.
pub const ASSESSMENT_KEY: &str = "assessmentData";
/// Key holding the preferred interface language.
pub const LANGUAGE_KEY: &str = "healthbridge-language";

/// Ephemeral key/value store standing in for browser local storage, so the
/// core can be exercised without any global state.
pub trait AssessmentStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored snapshot could not be encoded or decoded: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("storage mutex poisoned".to_string()))
    }
}

impl AssessmentStorage for InMemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// Abbreviated record written when a waiving agreement short-circuits the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BilateralRecord {
    pub country_of_origin: String,
    pub immigration_status: ImmigrationStatus,
    #[serde(default = "default_family_size")]
    pub family_size: NonZeroU8,
    pub bilateral_agreement: bool,
}

impl BilateralRecord {
    pub fn new(country_of_origin: impl Into<String>, immigration_status: ImmigrationStatus) -> Self {
        Self {
            country_of_origin: country_of_origin.into(),
            immigration_status,
            family_size: default_family_size(),
            bilateral_agreement: true,
        }
    }
}

/// What the results view finds under [`ASSESSMENT_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssessmentSnapshot {
    Bilateral(BilateralRecord),
    Full(AssessmentAnswers),
}

impl AssessmentSnapshot {
    pub fn country_of_origin(&self) -> &str {
        match self {
            Self::Bilateral(record) => &record.country_of_origin,
            Self::Full(answers) => &answers.country_of_origin,
        }
    }

    pub fn immigration_status(&self) -> ImmigrationStatus {
        match self {
            Self::Bilateral(record) => record.immigration_status,
            Self::Full(answers) => answers.immigration_status,
        }
    }

    pub fn family_size(&self) -> NonZeroU8 {
        match self {
            Self::Bilateral(record) => record.family_size,
            Self::Full(answers) => answers.family_size,
        }
    }

    pub fn save<S: AssessmentStorage + ?Sized>(&self, storage: &S) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(self)?;
        storage.write(ASSESSMENT_KEY, encoded)
    }

    pub fn load<S: AssessmentStorage + ?Sized>(storage: &S) -> Result<Option<Self>, StorageError> {
        match storage.read(ASSESSMENT_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilateral_record_round_trips_through_storage() {
        let storage = InMemoryStorage::default();
        let snapshot = AssessmentSnapshot::Bilateral(BilateralRecord::new(
            "France",
            ImmigrationStatus::PermanentResident,
        ));

        snapshot.save(&storage).expect("snapshot saved");
        let raw = storage
            .read(ASSESSMENT_KEY)
            .expect("read succeeds")
            .expect("value stored");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["bilateralAgreement"], serde_json::json!(true));
        assert_eq!(value["familySize"], serde_json::json!(1));
        assert_eq!(value["immigrationStatus"], serde_json::json!("permanent_resident"));

        let loaded = AssessmentSnapshot::load(&storage)
            .expect("load succeeds")
            .expect("snapshot present");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn full_answers_do_not_decode_as_bilateral_records() {
        let storage = InMemoryStorage::default();
        let answers = AssessmentAnswers {
            immigration_status: ImmigrationStatus::Visitor,
            country_of_origin: "Brazil".to_string(),
            ..AssessmentAnswers::default()
        };

        AssessmentSnapshot::Full(answers.clone())
            .save(&storage)
            .expect("snapshot saved");

        match AssessmentSnapshot::load(&storage).expect("load succeeds") {
            Some(AssessmentSnapshot::Full(loaded)) => assert_eq!(loaded, answers),
            other => panic!("expected full snapshot, got {other:?}"),
        }
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let storage = InMemoryStorage::default();
        storage
            .write(ASSESSMENT_KEY, "{}".to_string())
            .expect("write succeeds");
        storage.clear(ASSESSMENT_KEY).expect("clear succeeds");

        assert!(AssessmentSnapshot::load(&storage)
            .expect("load succeeds")
            .is_none());
    }
}
