use chrono::NaiveDate;
use serde::Deserialize;

use medsupply_core::{DomainError, SupplierId, SupplyId};
use medsupply_supplies::{LotField, LotPatch, NewLot, PaginationRequest, SortOrder};

// -------------------------
// Query strings
// -------------------------

/// Raw `GET /lots` query. Fields stay strings so malformed values produce
/// a JSON 400 instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LotsQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

impl TryFrom<LotsQuery> for PaginationRequest {
    type Error = DomainError;

    fn try_from(query: LotsQuery) -> Result<Self, Self::Error> {
        Ok(PaginationRequest {
            offset: query
                .offset
                .as_deref()
                .map(|v| parse_count("offset", v))
                .transpose()?,
            limit: query
                .limit
                .as_deref()
                .map(|v| parse_count("limit", v))
                .transpose()?,
            sort: query.sort.as_deref().map(str::parse::<LotField>).transpose()?,
            order: query.order.as_deref().map(str::parse::<SortOrder>).transpose()?,
            search: query.search,
        })
    }
}

fn parse_count(field: &str, value: &str) -> Result<u32, DomainError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("{field} must be a non-negative integer")))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateLotRequest {
    pub stock: i32,
    pub date_delivery: NaiveDate,
    pub due_date: NaiveDate,
    pub id_medical_supplies: i64,
    pub id_suppliers: Option<i64>,
}

impl CreateLotRequest {
    pub fn into_parts(self) -> Result<(NewLot, SupplyId, Option<SupplierId>), DomainError> {
        let supply_id = SupplyId::parse_positive(self.id_medical_supplies)?;
        let supplier_id = self.id_suppliers.map(SupplierId::parse_positive).transpose()?;
        let details = NewLot {
            stock: self.stock,
            date_delivery: self.date_delivery,
            due_date: self.due_date,
        };
        Ok((details, supply_id, supplier_id))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLotRequest {
    pub stock: Option<i32>,
    pub date_delivery: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub id_medical_supplies: Option<i64>,
    pub id_suppliers: Option<i64>,
}

impl UpdateLotRequest {
    pub fn into_parts(
        self,
    ) -> Result<(LotPatch, Option<SupplyId>, Option<SupplierId>), DomainError> {
        let supply_id = self
            .id_medical_supplies
            .map(SupplyId::parse_positive)
            .transpose()?;
        let supplier_id = self.id_suppliers.map(SupplierId::parse_positive).transpose()?;
        let patch = LotPatch {
            stock: self.stock,
            date_delivery: self.date_delivery,
            due_date: self.due_date,
        };
        Ok((patch, supply_id, supplier_id))
    }
}
