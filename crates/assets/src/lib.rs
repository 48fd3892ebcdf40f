//! National assets: inventoried equipment owned by the institution.

pub mod asset;

pub use asset::{NationalAsset, NewNationalAsset};
