//! Field mapper: raw multipart values onto a typed record
//!
//! Walks the schema registry in order and fails on the first missing
//! mandatory field. Client-visible error text depends on that order, so
//! errors are never accumulated.

use crate::record::{SubmissionRecord, LIST_SEPARATOR};
use crate::schema::{self, Cardinality, FieldRole, SchemaField};
use std::collections::HashMap;
use thiserror::Error;

/// Untyped form values: wire key to every value submitted under it
pub type RawValues = HashMap<String, Vec<String>>;

/// Mapping rejected the payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{name} is not present in provided data")]
    MissingField { name: String },
}

/// Map raw values using the process-wide registry
pub fn map(raw: &RawValues) -> Result<SubmissionRecord, MappingError> {
    map_fields(schema::fields(), raw)
}

/// Map raw values against an explicit field list
///
/// The media field is skipped; it is filled from stored paths afterwards.
/// Keys not declared in `fields` are ignored.
pub fn map_fields(
    fields: &[SchemaField],
    raw: &RawValues,
) -> Result<SubmissionRecord, MappingError> {
    let mut record = SubmissionRecord::default();

    for field in fields.iter().filter(|f| !f.is_media()) {
        // A key present with no values carries nothing to map
        let values = raw.get(field.name).filter(|v| !v.is_empty());

        let value = match (values, field.cardinality) {
            (Some(values), Cardinality::Multi) => values.join(LIST_SEPARATOR),
            (Some(values), Cardinality::Single) => values[0].clone(),
            (None, _) if field.role == FieldRole::DefaultEmpty => String::new(),
            (None, _) if field.mandatory => {
                return Err(MappingError::MissingField {
                    name: field.name.to_string(),
                });
            }
            (None, _) => String::new(),
        };

        (field.setter)(&mut record, value);
    }

    Ok(record)
}
