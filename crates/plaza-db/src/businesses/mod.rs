//! Database operations for `core.businesses` and their `core.addresses`.

mod read;
mod types;
mod write;

pub use read::{
    find_nearest_business, get_business_location, get_business_location_as_text,
    get_business_statistics, list_nearest_candidates,
};
pub use types::{
    AddressFields, BusinessCandidateRow, BusinessLocationRow, BusinessStatistics,
    CategoryCountRow, NearestBusinessRow, NewBusiness,
};
pub use write::{create_business, update_business_address};
