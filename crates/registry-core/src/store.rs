use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::crypto::Credential;
use crate::error::{LoadError, NotFoundError, SaveError, ValidationError};
use crate::models::{EditField, LibraryRecord, StoreDocument};
use crate::storage::{read_document, write_document};

/// In-memory library records plus the administrator credential.
///
/// Every operation either applies completely or leaves the store as it was.
/// Listing hands out owned copies; nothing outside the store can reach into
/// its records.
#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    libraries: Vec<LibraryRecord>,
    credential: Credential,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store straight from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let mut store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    /// Replace records and credential with the contents of `path`.
    ///
    /// On failure the store keeps exactly what it held before the call.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading library store");
        let document = read_document(path).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to load library store");
        })?;
        validate_records(&document.libraries).map_err(|err| {
            warn!(path = %path.display(), error = %err, "library store violates invariants");
            LoadError::SchemaInvalid {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        })?;
        self.libraries = document.libraries;
        self.credential = document.credential;
        info!(
            records = self.libraries.len(),
            credential_set = self.credential.is_set(),
            "library store loaded"
        );
        Ok(())
    }

    /// Write the full store to `path`, replacing the file atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        info!(path = %path.display(), records = self.libraries.len(), "saving library store");
        let document = StoreDocument {
            libraries: self.libraries.clone(),
            credential: self.credential.clone(),
        };
        write_document(path, &document).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to save library store");
        })
    }

    pub fn add_library(
        &mut self,
        name: &str,
        city: &str,
        address: &str,
    ) -> Result<(), ValidationError> {
        let record = LibraryRecord::new(name, city, address);
        check_record(&record, &self.libraries).inspect_err(|err| {
            warn!(error = %err, "rejected new library");
        })?;
        debug!(name, city, address, "library added");
        self.libraries.push(record);
        Ok(())
    }

    /// Remove the library called exactly `name`.
    pub fn delete_library(&mut self, name: &str) -> Result<(), NotFoundError> {
        let index = self
            .position(name)
            .ok_or_else(|| NotFoundError {
                name: name.to_string(),
            })
            .inspect_err(|err| warn!(error = %err, "delete of unknown library"))?;
        self.libraries.remove(index);
        debug!(name, "library deleted");
        Ok(())
    }

    /// Replace one field of the library currently called `name`.
    pub fn edit_library(
        &mut self,
        name: &str,
        field: EditField,
        new_value: &str,
    ) -> Result<(), ValidationError> {
        self.check_edit(name, field, new_value)
            .and_then(|index| {
                let record = &mut self.libraries[index];
                match field {
                    EditField::Name => record.name = new_value.to_string(),
                    EditField::City => record.city = new_value.to_string(),
                    EditField::Address => record.address = new_value.to_string(),
                }
                debug!(name, %field, new_value, "library edited");
                Ok(())
            })
            .inspect_err(|err| warn!(error = %err, "rejected library edit"))
    }

    /// Snapshot of every record in insertion order.
    pub fn list_libraries(&self) -> Vec<LibraryRecord> {
        self.libraries.clone()
    }

    pub fn get_library(&self, name: &str) -> Option<LibraryRecord> {
        self.libraries.iter().find(|lib| lib.name == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Hash and store a new administrator password, discarding the old one.
    pub fn set_credential(&mut self, new_password: &str) -> Result<(), ValidationError> {
        let credential = Credential::derive(new_password)
            .inspect_err(|err| warn!(error = %err, "rejected administrator password"))?;
        self.credential = credential;
        info!("administrator password updated");
        Ok(())
    }

    pub fn verify_credential(&self, candidate: &str) -> bool {
        self.credential.verify(candidate)
    }

    pub fn is_credential_set(&self) -> bool {
        self.credential.is_set()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.libraries.iter().position(|lib| lib.name == name)
    }

    fn check_edit(
        &self,
        name: &str,
        field: EditField,
        new_value: &str,
    ) -> Result<usize, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if new_value.is_empty() {
            return Err(ValidationError::EmptyField("new value"));
        }
        let index = self
            .position(name)
            .ok_or_else(|| ValidationError::LibraryNotFound(name.to_string()))?;
        let target = &self.libraries[index];
        let mut others = self
            .libraries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, lib)| lib);

        let clash = match field {
            EditField::Name => others.find(|lib| lib.name == new_value).map(|lib| {
                ValidationError::DuplicateName {
                    name: lib.name.clone(),
                    city: lib.city.clone(),
                    address: lib.address.clone(),
                }
            }),
            EditField::City => others
                .find(|lib| lib.city == new_value && lib.address == target.address)
                .map(duplicate_address),
            EditField::Address => others
                .find(|lib| lib.city == target.city && lib.address == new_value)
                .map(duplicate_address),
        };
        match clash {
            Some(err) => Err(err),
            None => Ok(index),
        }
    }
}

fn duplicate_address(lib: &LibraryRecord) -> ValidationError {
    ValidationError::DuplicateAddress {
        existing: lib.name.clone(),
        city: lib.city.clone(),
        address: lib.address.clone(),
    }
}

/// Check a prospective record against the ones already present.
fn check_record(record: &LibraryRecord, existing: &[LibraryRecord]) -> Result<(), ValidationError> {
    for (label, value) in [
        ("name", &record.name),
        ("city", &record.city),
        ("address", &record.address),
    ] {
        if value.is_empty() {
            return Err(ValidationError::EmptyField(label));
        }
    }
    for lib in existing {
        if lib.name == record.name {
            return Err(ValidationError::DuplicateName {
                name: lib.name.clone(),
                city: lib.city.clone(),
                address: lib.address.clone(),
            });
        }
        if lib.city == record.city && lib.address == record.address {
            return Err(duplicate_address(lib));
        }
    }
    Ok(())
}

/// The same invariants `add_library` enforces, applied to a loaded document.
fn validate_records(records: &[LibraryRecord]) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    let mut sites = HashSet::new();
    for record in records {
        check_record(record, &[])?;
        if !names.insert(record.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: record.name.clone(),
                city: record.city.clone(),
                address: record.address.clone(),
            });
        }
        if !sites.insert((record.city.as_str(), record.address.as_str())) {
            return Err(duplicate_address(record));
        }
    }
    Ok(())
}
