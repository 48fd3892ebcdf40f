use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{AssetId, DomainResult};

/// A piece of equipment registered in the national asset inventory.
///
/// `serial_number` is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalAsset {
    pub id_national_assets: AssetId,
    pub name_asset: String,
    pub serial_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
}

/// Request: register an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNationalAsset {
    pub name_asset: String,
    pub serial_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
}

impl NewNationalAsset {
    pub fn into_asset(self, id: AssetId) -> NationalAsset {
        NationalAsset {
            id_national_assets: id,
            name_asset: self.name_asset,
            serial_number: self.serial_number,
            brand: self.brand,
            model: self.model,
            acquisition_date: self.acquisition_date,
        }
    }
}

impl Validate for NewNationalAsset {
    fn validate(&self) -> DomainResult<()> {
        validate::required_text("name_asset", &self.name_asset)?;
        validate::required_text("serial_number", &self.serial_number)?;
        validate::optional_text("brand", self.brand.as_deref())?;
        validate::optional_text("model", self.model.as_deref())
    }
}
