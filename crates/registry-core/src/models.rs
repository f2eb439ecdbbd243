use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::Credential;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub name: String,
    pub city: String,
    pub address: String,
}

impl LibraryRecord {
    pub fn new(name: impl Into<String>, city: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            address: address.into(),
        }
    }

    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.name, &self.city, &self.address)
    }
}

impl fmt::Display for LibraryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}, {}", self.name, self.city, self.address)
    }
}

/// Which field of a record an edit replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Name,
    City,
    Address,
}

impl EditField {
    pub const ALL: [EditField; 3] = [EditField::Name, EditField::City, EditField::Address];

    pub fn as_str(self) -> &'static str {
        match self {
            EditField::Name => "name",
            EditField::City => "city",
            EditField::Address => "address",
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("field"));
        }
        EditField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownField(trimmed.to_string()))
    }
}

/// On-disk layout of the store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoreDocument {
    #[serde(rename = "libraries_data")]
    pub libraries: Vec<LibraryRecord>,
    #[serde(rename = "administrator_password")]
    pub credential: Credential,
}
