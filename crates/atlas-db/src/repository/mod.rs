//! Repositories over the reference data tables.
//!
//! - [`Repository`]: the generic, configuration driven repository
//! - [`ContinentRepository`]: continent reads and seeding support
//! - [`CountryRepository`]: country lookups by code and continent

pub mod continent;
pub mod country;
pub mod generic;

pub use continent::ContinentRepository;
pub use country::CountryRepository;
pub use generic::{
    CreateBulkParams, Entity, GetParams, Page, Repository, RepositoryConfig, SortOrder,
    SortingParam, UpdateParams, DEFAULT_CHUNK_SIZE, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE,
};
