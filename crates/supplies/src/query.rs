//! Lot query builder.
//!
//! Resolves a pagination/sort/search request into a [`LotQueryPlan`]: the
//! join shape, filter predicate, ordering and bounds of a lot listing. The
//! plan is storage-agnostic. The Postgres store renders it to SQL; the
//! in-memory store evaluates it with [`LotQueryPlan::execute`].
//!
//! ## Ordering
//!
//! Rows are ordered by the resolved sort column in the requested direction,
//! then by `lots.id_lots` ascending. The secondary key makes pagination
//! windows stable across requests when many lots share a sort value.
//!
//! Text columns compare case-folded first (`"apple" < "Banana"`), then by raw
//! bytes, matching a locale collation rather than `COLLATE "C"`.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use medsupply_core::validate::{self, Validate};
use medsupply_core::{DomainError, DomainResult};

use crate::lot::Lot;

pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_SORT: LotField = LotField::DateDelivery;
pub const DEFAULT_ORDER: SortOrder = SortOrder::Desc;

/// Tables joined onto `lots` for every listing, so each row comes back
/// hydrated with its supply and supplier.
pub const LOT_JOINS: [Table; 2] = [Table::MedicalSupply, Table::Supplier];

/// Sort direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn orient(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortOrder::Desc)
        } else {
            Err(DomainError::validation("order must be one of: ASC, DESC"))
        }
    }
}

/// Tables taking part in a lot listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Table {
    Lots,
    MedicalSupply,
    Supplier,
}

impl Table {
    /// Physical table name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Lots => "lots",
            Table::MedicalSupply => "medical_supplies",
            Table::Supplier => "suppliers",
        }
    }

    /// Alias used inside the joined query.
    pub fn alias(self) -> &'static str {
        match self {
            Table::Lots => "lots",
            Table::MedicalSupply => "medical_supply",
            Table::Supplier => "supplier",
        }
    }
}

/// A column qualified by the alias of the table it lives on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedColumn {
    pub table: Table,
    pub column: &'static str,
}

impl fmt::Display for QualifiedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table.alias(), self.column)
    }
}

/// Fields of a hydrated lot row that can be sorted or searched on.
///
/// Callers name fields bare (`"stock"`, `"name_material"`); [`LotField::qualify`]
/// maps each one to the table that owns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotField {
    IdLots,
    Stock,
    DateDelivery,
    DueDate,
    NameMaterial,
    Description,
}

impl LotField {
    pub const ALL: [LotField; 6] = [
        LotField::IdLots,
        LotField::Stock,
        LotField::DateDelivery,
        LotField::DueDate,
        LotField::NameMaterial,
        LotField::Description,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LotField::IdLots => "id_lots",
            LotField::Stock => "stock",
            LotField::DateDelivery => "date_delivery",
            LotField::DueDate => "due_date",
            LotField::NameMaterial => "name_material",
            LotField::Description => "description",
        }
    }

    /// `name_material` and `description` live on the joined supply; every
    /// other field lives on the lot itself.
    pub fn qualify(self) -> QualifiedColumn {
        let table = match self {
            LotField::NameMaterial | LotField::Description => Table::MedicalSupply,
            LotField::IdLots | LotField::Stock | LotField::DateDelivery | LotField::DueDate => {
                Table::Lots
            }
        };
        QualifiedColumn {
            table,
            column: self.as_str(),
        }
    }

    /// Textual form of the field, as the store renders it with `::text`.
    pub fn text_of(self, lot: &Lot) -> String {
        match self {
            LotField::IdLots => lot.id_lots.to_string(),
            LotField::Stock => lot.stock.to_string(),
            LotField::DateDelivery => lot.date_delivery.to_string(),
            LotField::DueDate => lot.due_date.to_string(),
            LotField::NameMaterial => lot.medical_supply.name_material.clone(),
            LotField::Description => lot.medical_supply.description.clone(),
        }
    }

    fn sort_key(self, lot: &Lot) -> SortKey<'_> {
        match self {
            LotField::IdLots => SortKey::Int(i64::from(lot.id_lots.get())),
            LotField::Stock => SortKey::Int(i64::from(lot.stock)),
            LotField::DateDelivery => SortKey::Date(lot.date_delivery),
            LotField::DueDate => SortKey::Date(lot.due_date),
            LotField::NameMaterial => SortKey::text(&lot.medical_supply.name_material),
            LotField::Description => SortKey::text(&lot.medical_supply.description),
        }
    }
}

impl fmt::Display for LotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LotField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LotField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let allowed = LotField::ALL.map(LotField::as_str).join(", ");
                DomainError::validation(format!("sort must be one of: {allowed}"))
            })
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Int(i64),
    Date(NaiveDate),
    /// Case-folded form first, raw text as a tiebreak.
    Text(String, &'a str),
}

impl<'a> SortKey<'a> {
    fn text(raw: &'a str) -> Self {
        SortKey::Text(raw.to_lowercase(), raw)
    }
}

/// How a search predicate compares a column with the term.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchMode {
    /// Substring of the column's textual form, as-is.
    Text,
    /// Substring after upper-casing both the column and the term.
    CaseInsensitive,
}

/// One `column LIKE %term%` arm of the search disjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPredicate {
    pub field: LotField,
    pub mode: MatchMode,
    /// Term to look for; already upper-cased for `CaseInsensitive`.
    pub needle: String,
}

impl SearchPredicate {
    fn new(field: LotField, mode: MatchMode, term: &str) -> Self {
        let needle = match mode {
            MatchMode::Text => term.to_string(),
            MatchMode::CaseInsensitive => term.to_uppercase(),
        };
        Self { field, mode, needle }
    }

    /// `LIKE` pattern for the needle, with `\`, `%` and `_` escaped so the
    /// match is a plain substring test.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.needle.len() + 2);
        pattern.push('%');
        for c in self.needle.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    pub fn matches(&self, lot: &Lot) -> bool {
        let value = self.field.text_of(lot);
        match self.mode {
            MatchMode::Text => value.contains(&self.needle),
            MatchMode::CaseInsensitive => value.to_uppercase().contains(&self.needle),
        }
    }
}

/// Row filter of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotFilter {
    /// List mode: every lot.
    All,
    /// Search mode: lots matching at least one predicate.
    AnyOf(Vec<SearchPredicate>),
}

impl LotFilter {
    pub fn matches(&self, lot: &Lot) -> bool {
        match self {
            LotFilter::All => true,
            LotFilter::AnyOf(predicates) => predicates.iter().any(|p| p.matches(lot)),
        }
    }
}

/// Inbound listing request (`?offset=&limit=&sort=&order=&search=`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<LotField>,
    pub order: Option<SortOrder>,
    pub search: Option<String>,
}

impl PaginationRequest {
    /// The search term, if one was given. An empty term means list mode.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|t| !t.is_empty())
    }

    pub fn offset_or_default(&self) -> u32 {
        self.offset.unwrap_or(DEFAULT_OFFSET)
    }

    pub fn limit_or_default(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

impl Validate for PaginationRequest {
    fn validate(&self) -> DomainResult<()> {
        match self.limit {
            Some(limit) => validate::positive("limit", i64::from(limit)),
            None => Ok(()),
        }
    }
}

/// Fully resolved lot listing: joins, filter, ordering and bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotQueryPlan {
    pub joins: [Table; 2],
    pub filter: LotFilter,
    pub sort: LotField,
    pub order: SortOrder,
    pub offset: u32,
    pub limit: u32,
}

impl LotQueryPlan {
    /// Search mode when the request carries a non-empty term, list mode otherwise.
    pub fn from_request(request: &PaginationRequest) -> Self {
        match request.search_term() {
            Some(term) => Self::search(request, term),
            None => Self::list(request),
        }
    }

    pub fn list(request: &PaginationRequest) -> Self {
        Self {
            joins: LOT_JOINS,
            filter: LotFilter::All,
            sort: request.sort.unwrap_or(DEFAULT_SORT),
            order: request.order.unwrap_or(DEFAULT_ORDER),
            offset: request.offset_or_default(),
            limit: request.limit_or_default(),
        }
    }

    pub fn search(request: &PaginationRequest, term: &str) -> Self {
        let predicates = vec![
            SearchPredicate::new(LotField::Stock, MatchMode::Text, term),
            SearchPredicate::new(LotField::DateDelivery, MatchMode::Text, term),
            SearchPredicate::new(LotField::DueDate, MatchMode::Text, term),
            SearchPredicate::new(LotField::NameMaterial, MatchMode::CaseInsensitive, term),
            SearchPredicate::new(LotField::Description, MatchMode::CaseInsensitive, term),
        ];
        Self {
            filter: LotFilter::AnyOf(predicates),
            ..Self::list(request)
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self.filter, LotFilter::AnyOf(_))
    }

    pub fn order_by(&self) -> QualifiedColumn {
        self.sort.qualify()
    }

    /// Secondary ordering key, always ascending.
    pub fn tiebreaker(&self) -> QualifiedColumn {
        LotField::IdLots.qualify()
    }

    pub fn compare(&self, a: &Lot, b: &Lot) -> Ordering {
        self.order
            .orient(self.sort.sort_key(a).cmp(&self.sort.sort_key(b)))
            .then_with(|| a.id_lots.cmp(&b.id_lots))
    }

    /// Evaluate the plan over already-hydrated lots.
    pub fn execute<I>(&self, lots: I) -> Vec<Lot>
    where
        I: IntoIterator<Item = Lot>,
    {
        let mut rows: Vec<Lot> = lots.into_iter().filter(|l| self.filter.matches(l)).collect();
        rows.sort_by(|a, b| self.compare(a, b));
        rows.into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}
