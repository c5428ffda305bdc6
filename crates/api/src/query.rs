//! Shared query parameter types for API handlers.

use formkit_core::publication::PublicationFilter;
use serde::Deserialize;

/// Query parameters for the form listing (`?filter=`).
///
/// The raw string is kept so unknown values degrade to the unfiltered
/// listing instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct FormFilterParams {
    pub filter: Option<String>,
}

impl FormFilterParams {
    pub fn publication_filter(&self) -> PublicationFilter {
        PublicationFilter::parse(self.filter.as_deref())
    }
}
