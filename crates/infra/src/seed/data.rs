//! Initial dataset loaded by the seed orchestrator.

use chrono::NaiveDate;

use medsupply_assets::NewNationalAsset;
use medsupply_departments::NewDepartment;
use medsupply_supplies::{NewLot, NewSupplier, NewSupply};

/// A lot to seed. Relations are named, not numbered, and resolved against
/// the catalog at seed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedLot {
    pub details: NewLot,
    pub name_material: String,
    /// `None` seeds the lot against the default supplier.
    pub name_supplier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedData {
    pub supplies: Vec<NewSupply>,
    pub suppliers: Vec<NewSupplier>,
    pub departments: Vec<NewDepartment>,
    pub assets: Vec<NewNationalAsset>,
    pub lots: Vec<SeedLot>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn supply(name: &str, description: &str) -> NewSupply {
    NewSupply {
        name_material: name.to_string(),
        description: description.to_string(),
    }
}

fn supplier(name: &str, phone: &str, address: &str) -> NewSupplier {
    NewSupplier {
        name_supplier: name.to_string(),
        phone: Some(phone.to_string()),
        address: Some(address.to_string()),
    }
}

fn department(name: &str, description: &str) -> NewDepartment {
    NewDepartment {
        name_department: name.to_string(),
        description: Some(description.to_string()),
    }
}

fn asset(name: &str, serial: &str, brand: &str, model: &str, acquired: NaiveDate) -> NewNationalAsset {
    NewNationalAsset {
        name_asset: name.to_string(),
        serial_number: serial.to_string(),
        brand: Some(brand.to_string()),
        model: Some(model.to_string()),
        acquisition_date: Some(acquired),
    }
}

fn lot(
    stock: i32,
    delivered: NaiveDate,
    due: NaiveDate,
    material: &str,
    supplier: Option<&str>,
) -> SeedLot {
    SeedLot {
        details: NewLot {
            stock,
            date_delivery: delivered,
            due_date: due,
        },
        name_material: material.to_string(),
        name_supplier: supplier.map(str::to_string),
    }
}

impl SeedData {
    pub fn initial() -> Self {
        Self {
            supplies: vec![
                supply("Gauze", "Sterile gauze pads 10x10 cm"),
                supply("Syringe", "Disposable syringe 5 ml"),
                supply("Surgical gloves", "Latex-free sterile gloves, size M"),
                supply("Alcohol swab", "Isopropyl alcohol prep pads"),
                supply("IV catheter", "Peripheral intravenous catheter 20G"),
                supply("Face mask", "Three-ply surgical face mask"),
            ],
            suppliers: vec![
                supplier("MedCorp Distribution", "+1 555 0100", "12 Harbor Rd"),
                supplier("HealthLine Supplies", "+1 555 0142", "4 Station Ave"),
                supplier("Andes Pharma", "+1 555 0199", "88 Hill St"),
            ],
            departments: vec![
                department("Emergency", "Triage and emergency care"),
                department("Surgery", "Operating theatres and recovery"),
                department("Pediatrics", "Care for infants and children"),
                department("Radiology", "Imaging and diagnostics"),
                department("Pharmacy", "Dispensing and stock control"),
            ],
            assets: vec![
                asset("Patient monitor", "PM-2021-0001", "Philips", "IntelliVue MX450", date(2021, 4, 12)),
                asset("Infusion pump", "IP-2020-0107", "B. Braun", "Infusomat Space", date(2020, 9, 3)),
                asset("Defibrillator", "DF-2019-0033", "Zoll", "R Series", date(2019, 11, 20)),
                asset("Ultrasound scanner", "US-2022-0008", "GE", "Logiq E10", date(2022, 2, 7)),
                asset("Ventilator", "VT-2020-0052", "Draeger", "Evita V500", date(2020, 6, 15)),
            ],
            lots: vec![
                lot(120, date(2024, 1, 15), date(2026, 1, 15), "Gauze", Some("MedCorp Distribution")),
                lot(300, date(2024, 2, 3), date(2027, 2, 3), "Syringe", Some("HealthLine Supplies")),
                lot(75, date(2024, 2, 20), date(2025, 8, 20), "Surgical gloves", None),
                lot(500, date(2024, 3, 11), date(2026, 3, 11), "Alcohol swab", Some("Andes Pharma")),
                lot(40, date(2024, 4, 2), date(2027, 4, 2), "IV catheter", Some("MedCorp Distribution")),
                lot(1000, date(2024, 4, 28), date(2025, 10, 28), "Face mask", Some("HealthLine Supplies")),
                lot(60, date(2024, 5, 9), date(2026, 5, 9), "Gauze", Some("Andes Pharma")),
                lot(250, date(2024, 6, 1), date(2027, 6, 1), "Syringe", None),
            ],
        }
    }
}
