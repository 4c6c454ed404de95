//! JSON Schema export for resolved parameters.

use crate::params::ResolvedParameters;
use schemars::{Schema, schema_for};

/// JSON Schema for the serialized `ResolvedParameters`.
#[must_use]
pub fn resolved_parameters_schema() -> Schema {
    schema_for!(ResolvedParameters)
}
