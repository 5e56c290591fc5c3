use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::Serialize;

use partstock_core::{StockError, StockResult, ValueObject};

use crate::units;

/// Field whose filter matches by prefix instead of equality.
pub const NAME_FIELD: &str = "Name";

/// Attribute query: field name → expected value.
pub type Query = BTreeMap<String, String>;

/// Ordered field list of a category. The last field is the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<String>,
    format: String,
}

impl ValueObject for Schema {}

impl Schema {
    /// Parse a comma-separated format string such as `Value,Tolerance,Package,Qty`.
    pub fn parse(format: &str) -> StockResult<Self> {
        let format = format.trim();
        let fields: Vec<String> = format.split(',').map(str::to_string).collect();

        if fields.len() < 2 || fields.iter().any(|f| f.is_empty()) {
            return Err(StockError::InvalidSchema(format.to_string()));
        }

        Ok(Self {
            fields,
            format: format.to_string(),
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The verbatim format string this schema was parsed from.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn key_fields(&self) -> &[String] {
        &self.fields[..self.fields.len() - 1]
    }

    pub fn quantity_field(&self) -> &str {
        &self.fields[self.fields.len() - 1]
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.position(field).is_some()
    }
}

impl core::fmt::Display for Schema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.format)
    }
}

/// One component line: key fields plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    keys: Vec<String>,
    quantity: u64,
}

impl ValueObject for Record {}

impl Record {
    pub fn new(keys: Vec<String>, quantity: u64) -> Self {
        Self { keys, quantity }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Identity comparison: all key fields equal, quantity ignored.
    pub fn same_key(&self, other: &Record) -> bool {
        self.keys == other.keys
    }

    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            keys: self.keys.clone(),
            quantity,
        }
    }

    /// Value of the field at schema position `idx`, quantity included.
    pub fn value_at(&self, idx: usize) -> Option<String> {
        match idx.cmp(&self.keys.len()) {
            core::cmp::Ordering::Less => Some(self.keys[idx].clone()),
            core::cmp::Ordering::Equal => Some(self.quantity.to_string()),
            core::cmp::Ordering::Greater => None,
        }
    }
}

impl core::fmt::Display for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for key in &self.keys {
            write!(f, "{key},")?;
        }
        write!(f, "{}", self.quantity)
    }
}

/// Comparison used by [`CategoryStore::filter_from_bound`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoundOp {
    /// `>=`
    AtLeast,
    /// `<=`
    AtMost,
}

impl BoundOp {
    pub fn token(self) -> &'static str {
        match self {
            BoundOp::AtLeast => ">=",
            BoundOp::AtMost => "<=",
        }
    }

    fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            BoundOp::AtLeast => value >= bound,
            BoundOp::AtMost => value <= bound,
        }
    }
}

impl FromStr for BoundOp {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">=" => Ok(BoundOp::AtLeast),
            "<=" => Ok(BoundOp::AtMost),
            other => Err(StockError::UnknownOperator(other.to_string())),
        }
    }
}

impl core::fmt::Display for BoundOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.token())
    }
}

/// One category's schema and record set.
///
/// No two records share an identity key, and no record is kept at quantity zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStore {
    name: String,
    schema: Schema,
    records: Vec<Record>,
}

impl CategoryStore {
    /// Create an empty store.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            records: Vec::new(),
        }
    }

    /// Create a store pre-populated with `records`, aggregating duplicate keys.
    pub fn with_records(
        name: impl Into<String>,
        schema: Schema,
        records: impl IntoIterator<Item = Record>,
    ) -> StockResult<Self> {
        let mut store = Self::new(name, schema);
        for record in records {
            store.add_record(record)?;
        }
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.schema.has_field(field)
    }

    /// Records ordered ascending by quantity (stable for equal quantities).
    pub fn sorted_by_quantity(&self) -> Vec<&Record> {
        let mut sorted: Vec<&Record> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.quantity);
        sorted
    }

    /// Split a comma-separated record string into key fields and a quantity.
    pub fn parse_record(&self, record: &str) -> StockResult<Record> {
        let record = record.trim();
        let mut fields: Vec<String> = record.split(',').map(str::to_string).collect();

        if fields.len() != self.schema.len() {
            return Err(StockError::format_mismatch(record, self.schema.format()));
        }

        // Length checked above; the schema always has a quantity field.
        let raw_quantity = fields.pop().unwrap_or_default();
        let quantity = raw_quantity
            .trim()
            .parse::<u64>()
            .map_err(|_| StockError::InvalidQuantity(raw_quantity.clone()))?;

        Ok(Record::new(fields, quantity))
    }

    fn position_of(&self, record: &Record) -> Option<usize> {
        self.records.iter().position(|r| r.same_key(record))
    }

    /// First stored record with the same identity key as `record`.
    pub fn find_by_key(&self, record: &Record) -> Option<&Record> {
        self.position_of(record).map(|idx| &self.records[idx])
    }

    /// Parse and aggregate a record string.
    pub fn add(&mut self, record: &str) -> StockResult<()> {
        let record = self.parse_record(record)?;
        self.add_record(record)
    }

    /// Aggregate a record: increments an existing key or appends a new one.
    ///
    /// A zero quantity for an absent key leaves the store unchanged.
    pub fn add_record(&mut self, record: Record) -> StockResult<()> {
        self.ensure_arity(&record)?;

        match self.position_of(&record) {
            Some(idx) => {
                let existing = &mut self.records[idx];
                existing.quantity = existing
                    .quantity
                    .checked_add(record.quantity)
                    .ok_or_else(|| StockError::QuantityOverflow {
                        category: self.name.clone(),
                        record: record.to_string(),
                    })?;
                tracing::debug!(
                    category = %self.name,
                    record = %existing,
                    added = record.quantity,
                    "component quantity increased"
                );
            }
            None if record.quantity == 0 => {}
            None => {
                tracing::debug!(category = %self.name, record = %record, "component added");
                self.records.push(record);
            }
        }
        Ok(())
    }

    /// Parse a record string and remove its quantity from the store.
    pub fn subtract(&mut self, record: &str) -> StockResult<()> {
        let record = self.parse_record(record)?;
        self.subtract_record(&record)
    }

    /// Remove `record.quantity` from the matching record; drops it at zero.
    pub fn subtract_record(&mut self, record: &Record) -> StockResult<()> {
        self.ensure_arity(record)?;

        let idx = self
            .position_of(record)
            .ok_or_else(|| StockError::no_such_component(&self.name, record.to_string()))?;

        let available = self.records[idx].quantity;
        if record.quantity > available {
            return Err(StockError::InsufficientQuantity {
                category: self.name.clone(),
                record: record.to_string(),
                available,
            });
        }

        let remaining = available - record.quantity;
        if remaining == 0 {
            let removed = self.records.remove(idx);
            tracing::debug!(category = %self.name, record = %removed, "component removed");
        } else {
            self.records[idx].quantity = remaining;
            tracing::debug!(
                category = %self.name,
                record = %self.records[idx],
                subtracted = record.quantity,
                "component quantity decreased"
            );
        }
        Ok(())
    }

    /// Records matching every `field = value` pair of `query`.
    ///
    /// The `Name` field matches by prefix; all others by exact equality. An
    /// empty query matches everything.
    pub fn filter(&self, query: &Query) -> StockResult<CategoryStore> {
        let mut positions = Vec::with_capacity(query.len());
        for (field, expected) in query {
            let idx = self.field_position(field)?;
            positions.push((idx, field.as_str() == NAME_FIELD, expected.as_str()));
        }

        let matches = self.records.iter().filter(|record| {
            positions.iter().all(|(idx, prefix, expected)| {
                let actual = record.value_at(*idx).unwrap_or_default();
                if *prefix {
                    actual.starts_with(expected)
                } else {
                    actual == *expected
                }
            })
        });

        Ok(self.derived(format!("{} filtered", self.name), matches.cloned()))
    }

    /// Records whose normalized `field` value satisfies `op` against `bound`.
    pub fn filter_from_bound(&self, field: &str, bound: &str, op: BoundOp) -> StockResult<CategoryStore> {
        let idx = self.field_position(field)?;
        let bound = units::normalize(bound)?;

        let mut matches = Vec::new();
        for record in &self.records {
            let raw = record.value_at(idx).unwrap_or_default();
            if op.holds(units::normalize(&raw)?, bound) {
                matches.push(record.clone());
            }
        }

        Ok(self.derived(format!("{} filtered", self.name), matches))
    }

    /// Shortfall of `self` (what we have) against `other` (what is needed).
    ///
    /// Every record of `other` whose demand exceeds what `self` holds for the
    /// same key appears with the missing quantity; keys `self` lacks entirely
    /// appear with their full quantity.
    pub fn difference(&self, other: &CategoryStore) -> StockResult<CategoryStore> {
        if other.schema != self.schema {
            return Err(StockError::SchemaMismatch {
                left: format!("{}:{}", other.name, other.schema),
                right: format!("{}:{}", self.name, self.schema),
            });
        }

        let shortfall = other.records.iter().filter_map(|wanted| {
            let have = self.find_by_key(wanted).map(|r| r.quantity).unwrap_or(0);
            let missing = wanted.quantity.saturating_sub(have);
            (missing > 0).then(|| wanted.with_quantity(missing))
        });

        Ok(self.derived(format!("{} not in stock", self.name), shortfall))
    }

    /// Distinct values observed for `field` across all records.
    pub fn variants_of_field(&self, field: &str) -> StockResult<BTreeSet<String>> {
        let idx = self.field_position(field)?;
        Ok(self
            .records
            .iter()
            .filter_map(|r| r.value_at(idx))
            .collect())
    }

    fn field_position(&self, field: &str) -> StockResult<usize> {
        self.schema
            .position(field)
            .ok_or_else(|| StockError::unknown_field(&self.name, field))
    }

    fn ensure_arity(&self, record: &Record) -> StockResult<()> {
        if record.keys.len() + 1 != self.schema.len() {
            return Err(StockError::format_mismatch(record.to_string(), self.schema.format()));
        }
        Ok(())
    }

    /// Fresh store with this schema holding `records` sorted by quantity.
    ///
    /// Callers pass records that already have unique keys.
    fn derived(&self, name: String, records: impl IntoIterator<Item = Record>) -> CategoryStore {
        let mut records: Vec<Record> = records.into_iter().collect();
        records.sort_by_key(|r| r.quantity);
        CategoryStore {
            name,
            schema: self.schema.clone(),
            records,
        }
    }
}
