//! Domain types shared by every crate in the workspace: the `Advert` record
//! and the allow-listed payloads clients may write.

pub mod advert;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use advert::{
    Advert, AdvertChanges, NewAdvert, DESCRIPTION_MAX_LEN, HEADER_MAX_LEN, OWNER_MAX_LEN,
};
pub use error::ValidationError;
