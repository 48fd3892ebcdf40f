use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{DomainResult, LotId, SupplierId};

use crate::supplier::Supplier;
use crate::supply::Supply;

/// A tracked batch of a medical supply, hydrated with its relations.
///
/// `medical_supply` is always present: a lot cannot be built without a
/// resolved supply. `supplier` is best-effort and may be `None` when the
/// referenced supplier did not exist at create/update time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id_lots: LotId,
    pub stock: i32,
    pub date_delivery: NaiveDate,
    pub due_date: NaiveDate,
    pub medical_supply: Supply,
    pub supplier: Option<Supplier>,
}

impl Lot {
    pub fn supplier_id(&self) -> Option<SupplierId> {
        self.supplier.as_ref().map(|s| s.id_suppliers)
    }
}

/// Scalar fields of a lot to create (relations are passed separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLot {
    pub stock: i32,
    pub date_delivery: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewLot {
    /// Attach resolved relations; the store assigns the id on insert.
    pub fn attach(self, medical_supply: Supply, supplier: Option<Supplier>) -> UnsavedLot {
        UnsavedLot {
            stock: self.stock,
            date_delivery: self.date_delivery,
            due_date: self.due_date,
            medical_supply,
            supplier,
        }
    }
}

impl Validate for NewLot {
    fn validate(&self) -> DomainResult<()> {
        validate::non_negative("stock", i64::from(self.stock))
    }
}

/// A lot with resolved relations that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedLot {
    pub stock: i32,
    pub date_delivery: NaiveDate,
    pub due_date: NaiveDate,
    pub medical_supply: Supply,
    pub supplier: Option<Supplier>,
}

impl UnsavedLot {
    pub fn with_id(self, id_lots: LotId) -> Lot {
        Lot {
            id_lots,
            stock: self.stock,
            date_delivery: self.date_delivery,
            due_date: self.due_date,
            medical_supply: self.medical_supply,
            supplier: self.supplier,
        }
    }
}

/// Partial update of a lot's scalar fields. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotPatch {
    pub stock: Option<i32>,
    pub date_delivery: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl LotPatch {
    /// Merge onto a stored lot. Relations are never touched here.
    pub fn apply(&self, lot: &mut Lot) {
        if let Some(stock) = self.stock {
            lot.stock = stock;
        }
        if let Some(date) = self.date_delivery {
            lot.date_delivery = date;
        }
        if let Some(date) = self.due_date {
            lot.due_date = date;
        }
    }
}

impl Validate for LotPatch {
    fn validate(&self) -> DomainResult<()> {
        match self.stock {
            Some(stock) => validate::non_negative("stock", i64::from(stock)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsupply_core::SupplyId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn syringe() -> Supply {
        Supply {
            id_medical_supplies: SupplyId::new(2),
            name_material: "Syringe 5ml".to_string(),
            description: "Disposable syringe".to_string(),
        }
    }

    fn stored_lot() -> Lot {
        NewLot {
            stock: 40,
            date_delivery: date(2024, 1, 10),
            due_date: date(2026, 1, 10),
        }
        .attach(syringe(), None)
        .with_id(LotId::new(9))
    }

    #[test]
    fn negative_stock_is_rejected() {
        let lot = NewLot {
            stock: -1,
            date_delivery: date(2024, 1, 1),
            due_date: date(2025, 1, 1),
        };
        assert!(lot.validate().is_err());

        let patch = LotPatch {
            stock: Some(-5),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_preserves_unspecified_fields_and_relations() {
        let mut lot = stored_lot();
        let before = lot.clone();

        LotPatch {
            stock: Some(12),
            ..Default::default()
        }
        .apply(&mut lot);

        assert_eq!(lot.stock, 12);
        assert_eq!(lot.date_delivery, before.date_delivery);
        assert_eq!(lot.due_date, before.due_date);
        assert_eq!(lot.medical_supply, before.medical_supply);
        assert_eq!(lot.supplier, before.supplier);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut lot = stored_lot();
        let patch = LotPatch::default();
        patch.apply(&mut lot);
        assert_eq!(lot, stored_lot());
    }

    #[test]
    fn lot_serializes_with_nested_relations() {
        let json = serde_json::to_value(stored_lot()).unwrap();
        assert_eq!(json["id_lots"], 9);
        assert_eq!(json["date_delivery"], "2024-01-10");
        assert_eq!(json["medical_supply"]["name_material"], "Syringe 5ml");
        assert!(json["supplier"].is_null());
    }
}
