//! Submission schema registry
//!
//! Single source of truth for what a valid submission looks like: the wire
//! key of each form field, whether it is mandatory, whether it may repeat,
//! and the setter that writes it onto [`SubmissionRecord`]. The table is a
//! process-wide constant; every target member is checked at compile time.

use crate::record::SubmissionRecord;
use std::fmt;

/// Wire key of the derived media field (files are uploaded under it)
pub const MEDIA_FIELD: &str = "photo[]";

/// Field that is declared mandatory but maps to `""` when absent
pub const DEFAULT_EMPTY_FIELD: &str = "description";

/// How many values a field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First submitted value, verbatim
    Single,
    /// All submitted values, comma-joined
    Multi,
}

/// Special handling of a field by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Ordinary submitted value
    Submitted,
    /// Populated from stored media paths, never read from form values
    Media,
    /// Absence yields an empty string instead of an error
    DefaultEmpty,
}

/// Writes a mapped value onto the record
pub type Setter = fn(&mut SubmissionRecord, String);

/// One declared form field
#[derive(Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    pub mandatory: bool,
    pub cardinality: Cardinality,
    pub role: FieldRole,
    pub setter: Setter,
}

impl fmt::Debug for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaField")
            .field("name", &self.name)
            .field("mandatory", &self.mandatory)
            .field("cardinality", &self.cardinality)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl SchemaField {
    pub fn is_media(&self) -> bool {
        self.role == FieldRole::Media
    }
}

// Order matters: the mapper reports the first missing field in this order
static FIELDS: [SchemaField; 13] = [
    SchemaField {
        name: MEDIA_FIELD,
        mandatory: true,
        cardinality: Cardinality::Multi,
        role: FieldRole::Media,
        setter: |r, v| r.photo = v,
    },
    SchemaField {
        name: "name",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.name = v,
    },
    SchemaField {
        name: "taxonomy",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.taxonomy = v,
    },
    SchemaField {
        name: "etymology",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.etymology = v,
    },
    SchemaField {
        name: "iucn[]",
        mandatory: true,
        cardinality: Cardinality::Multi,
        role: FieldRole::Submitted,
        setter: |r, v| r.iucn = v,
    },
    SchemaField {
        name: "geo",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.geo = v,
    },
    SchemaField {
        name: "migration",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.migration = v,
    },
    SchemaField {
        name: "habitat",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.habitat = v,
    },
    SchemaField {
        name: "dimensions",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.dimensions = v,
    },
    SchemaField {
        name: "ds",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.ds = v,
    },
    SchemaField {
        name: "diet",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.diet = v,
    },
    SchemaField {
        name: DEFAULT_EMPTY_FIELD,
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::DefaultEmpty,
        setter: |r, v| r.description = v,
    },
    SchemaField {
        name: "category",
        mandatory: true,
        cardinality: Cardinality::Single,
        role: FieldRole::Submitted,
        setter: |r, v| r.category = v,
    },
];

/// All declared fields, in registry order
pub fn fields() -> &'static [SchemaField] {
    &FIELDS
}
