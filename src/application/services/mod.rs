//! Application services

pub mod organization;

pub use organization::{
    JsonRecordsSource, JsonTreeSource, LoadedOrganization, NoSource, OrganizationService,
    OrganizationSource, Origin,
};
