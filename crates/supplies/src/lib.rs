//! Medical-supply domain module.
//!
//! Records for supplies, suppliers and lots, the request structs used to
//! create/patch them, and the lot query builder. Pure domain logic (no IO,
//! no HTTP, no storage).

pub mod lot;
pub mod query;
pub mod supplier;
pub mod supply;

pub use lot::{Lot, LotPatch, NewLot, UnsavedLot};
pub use query::{
    LotField, LotFilter, LotQueryPlan, MatchMode, PaginationRequest, QualifiedColumn,
    SearchPredicate, SortOrder, Table,
};
pub use supplier::{NewSupplier, Supplier};
pub use supply::{NewSupply, Supply, SupplyPatch};
