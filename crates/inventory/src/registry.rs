use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use partstock_core::{StockError, StockResult};

use crate::category::{BoundOp, CategoryStore, Query, Record, Schema};

/// A named collection of categories (e.g. "stock" or "project").
///
/// Categories are kept in name order so iteration and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    categories: BTreeMap<String, CategoryStore>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty category.
    pub fn add_category(&mut self, name: &str, format: &str) -> StockResult<()> {
        let name = name.trim();
        if name.is_empty() || name.contains(',') {
            return Err(StockError::InvalidCategoryName(name.to_string()));
        }
        if self.categories.contains_key(name) {
            return Err(StockError::duplicate_category(name));
        }

        let schema = Schema::parse(format)?;
        tracing::info!(category = %name, format = %schema, "category created");
        self.categories
            .insert(name.to_string(), CategoryStore::new(name, schema));
        Ok(())
    }

    pub fn add_component(&mut self, category: &str, record: &str) -> StockResult<()> {
        self.category_mut(category)?.add(record)
    }

    pub fn subtract_component(&mut self, category: &str, record: &str) -> StockResult<()> {
        self.category_mut(category)?.subtract(record)
    }

    pub fn filter_components(&self, category: &str, query: &Query) -> StockResult<CategoryStore> {
        self.category(category)?.filter(query)
    }

    pub fn filter_components_from_bound(
        &self,
        category: &str,
        field: &str,
        bound: &str,
        op: BoundOp,
    ) -> StockResult<CategoryStore> {
        self.category(category)?.filter_from_bound(field, bound, op)
    }

    pub fn variants_of_field(&self, category: &str, field: &str) -> StockResult<BTreeSet<String>> {
        self.category(category)?.variants_of_field(field)
    }

    pub fn category_schema(&self, category: &str) -> StockResult<&Schema> {
        Ok(self.category(category)?.schema())
    }

    pub fn category(&self, name: &str) -> StockResult<&CategoryStore> {
        let name = name.trim();
        self.categories
            .get(name)
            .ok_or_else(|| StockError::unknown_category(name))
    }

    fn category_mut(&mut self, name: &str) -> StockResult<&mut CategoryStore> {
        let name = name.trim();
        self.categories
            .get_mut(name)
            .ok_or_else(|| StockError::unknown_category(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name.trim())
    }

    pub fn categories(&self) -> btree_map::Values<'_, String, CategoryStore> {
        self.categories.values()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// `true` when the registry holds no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of records across all categories.
    pub fn record_count(&self) -> usize {
        self.categories.values().map(CategoryStore::len).sum()
    }

    pub fn clear(&mut self) {
        self.categories.clear();
    }

    /// Cross-inventory shortfall: what `other` needs that `self` cannot supply.
    ///
    /// Categories only `self` has are ignored; categories `self` lacks are
    /// copied whole. Categories without any shortfall are left out, so an
    /// empty result means `self` covers `other` completely. This includes a
    /// category `self` lacks when `other` holds no records in it.
    pub fn difference(&self, other: &Registry) -> StockResult<Registry> {
        let mut shortfall = Registry::new();

        for (name, wanted) in &other.categories {
            let missing = match self.categories.get(name) {
                Some(have) => have.difference(wanted)?,
                None => wanted.clone(),
            };
            if missing.is_empty() {
                continue;
            }

            let store = CategoryStore::with_records(
                name.as_str(),
                wanted.schema().clone(),
                missing.records().iter().cloned(),
            )?;
            shortfall.categories.insert(name.clone(), store);
        }

        Ok(shortfall)
    }

    /// Subtract every record of `other` from `self`, all or nothing.
    ///
    /// The full difference is computed first; any shortfall fails the call with
    /// `InsufficientStock` before a single record is touched.
    pub fn subtract_other(&mut self, other: &Registry) -> StockResult<()> {
        let plan = self.plan_subtraction(other)?;

        let records = plan.len();
        for (category, record) in plan {
            self.category_mut(category)?.subtract_record(record)?;
        }

        tracing::info!(
            categories = other.categories.len(),
            records,
            "bulk subtraction applied"
        );
        Ok(())
    }

    /// Read-only validation pass for [`Registry::subtract_other`].
    fn plan_subtraction<'a>(&self, other: &'a Registry) -> StockResult<Vec<(&'a str, &'a Record)>> {
        let shortfall = self.difference(other)?;
        if !shortfall.is_empty() {
            let err = StockError::InsufficientStock {
                categories: shortfall.categories.len(),
                records: shortfall.record_count(),
            };
            tracing::warn!(error = %err, "bulk subtraction refused");
            return Err(err);
        }

        Ok(other
            .categories
            .iter()
            .flat_map(|(name, store)| store.records().iter().map(move |r| (name.as_str(), r)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESISTOR_FORMAT: &str = "Value,Tolerance,Package,Qty";

    fn registry(categories: &[(&str, &str, &[&str])]) -> Registry {
        let mut registry = Registry::new();
        for (name, format, records) in categories {
            registry.add_category(name, format).unwrap();
            for record in *records {
                registry.add_component(name, record).unwrap();
            }
        }
        registry
    }

    #[test]
    fn add_category_rejects_duplicates_and_bad_names() {
        let mut registry = Registry::new();
        registry.add_category("Resistors", RESISTOR_FORMAT).unwrap();

        assert_eq!(
            registry.add_category(" Resistors ", RESISTOR_FORMAT).unwrap_err(),
            StockError::duplicate_category("Resistors")
        );
        assert!(matches!(
            registry.add_category("Caps,Ceramic", "Value,Qty"),
            Err(StockError::InvalidCategoryName(_))
        ));
        assert!(matches!(
            registry.add_category("", "Value,Qty"),
            Err(StockError::InvalidCategoryName(_))
        ));
    }

    #[test]
    fn component_operations_require_known_category() {
        let mut registry = Registry::new();
        assert_eq!(
            registry.add_component("Diodes", "1N4148,SOD323,1").unwrap_err(),
            StockError::unknown_category("Diodes")
        );
        assert_eq!(
            registry.subtract_component("Diodes", "1N4148,SOD323,1").unwrap_err(),
            StockError::unknown_category("Diodes")
        );
        assert!(registry.filter_components("Diodes", &Query::new()).is_err());
    }

    #[test]
    fn filters_delegate_to_category() {
        let registry = registry(&[(
            "Resistors",
            RESISTOR_FORMAT,
            &["10k,5%,0805,3", "1k,5%,0805,8", "100k,1%,0603,2"],
        )]);

        let mut query = Query::new();
        query.insert("Tolerance".to_string(), "5%".to_string());
        let result = registry.filter_components("Resistors", &query).unwrap();
        assert_eq!(result.len(), 2);

        let result = registry
            .filter_components_from_bound("Resistors", "Value", "10k", BoundOp::AtLeast)
            .unwrap();
        let lines: Vec<String> = result.records().iter().map(Record::to_string).collect();
        assert_eq!(lines, vec!["100k,1%,0603,2", "10k,5%,0805,3"]);
    }

    #[test]
    fn difference_covers_missing_and_short_categories() {
        let stock = registry(&[
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,3"]),
            ("Capacitors", "Value,Voltage,Package,Qty", &["100n,16V,0603,50"]),
            ("Inductors", "Value,Package,Qty", &["10u,1210,4"]),
        ]);
        let project = registry(&[
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,5"]),
            ("Capacitors", "Value,Voltage,Package,Qty", &["100n,16V,0603,10"]),
            ("Diodes", "Name,Package,Qty", &["1N4148,SOD323,2"]),
        ]);

        let diff = stock.difference(&project).unwrap();
        let names: Vec<&str> = diff.category_names().collect();
        assert_eq!(names, vec!["Diodes", "Resistors"]);

        let resistors = diff.category("Resistors").unwrap();
        assert_eq!(resistors.records()[0].to_string(), "10k,5%,0805,2");
        assert_eq!(resistors.schema().format(), RESISTOR_FORMAT);

        let diodes = diff.category("Diodes").unwrap();
        assert_eq!(diodes.records()[0].to_string(), "1N4148,SOD323,2");
    }

    #[test]
    fn empty_category_missing_from_self_demands_nothing() {
        let mut stock = registry(&[("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,3"])]);
        let project = registry(&[
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,1"]),
            ("Diodes", "Name,Package,Qty", &[]),
        ]);

        assert!(stock.difference(&project).unwrap().is_empty());
        stock.subtract_other(&project).unwrap();
        assert!(!stock.contains("Diodes"));
    }

    #[test]
    fn difference_propagates_schema_mismatch() {
        let stock = registry(&[("Resistors", RESISTOR_FORMAT, &[])]);
        let project = registry(&[("Resistors", "Value,Package,Qty", &["10k,0805,1"])]);
        assert!(matches!(
            stock.difference(&project),
            Err(StockError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn subtract_other_applies_when_fully_covered() {
        let mut stock = registry(&[
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,5", "1k,5%,0805,2"]),
            ("Inductors", "Value,Package,Qty", &["10u,1210,4"]),
        ]);
        let project = registry(&[("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,3", "1k,5%,0805,2"])]);

        stock.subtract_other(&project).unwrap();

        let resistors = stock.category("Resistors").unwrap();
        assert_eq!(resistors.len(), 1);
        assert_eq!(resistors.records()[0].to_string(), "10k,5%,0805,2");
        assert_eq!(stock.category("Inductors").unwrap().len(), 1);
    }

    #[test]
    fn subtract_other_is_all_or_nothing() {
        let mut stock = registry(&[
            ("Capacitors", "Value,Voltage,Package,Qty", &["100n,16V,0603,50"]),
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,3"]),
        ]);
        let project = registry(&[
            ("Capacitors", "Value,Voltage,Package,Qty", &["100n,16V,0603,10"]),
            ("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,5"]),
        ]);
        let before = stock.clone();

        let err = stock.subtract_other(&project).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                categories: 1,
                records: 1
            }
        );
        assert_eq!(stock, before);
    }

    #[test]
    fn clear_discards_everything() {
        let mut stock = registry(&[("Resistors", RESISTOR_FORMAT, &["10k,5%,0805,3"])]);
        assert!(!stock.is_empty());
        stock.clear();
        assert!(stock.is_empty());
        assert_eq!(stock.record_count(), 0);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn lines() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec(
                (
                    prop::sample::select(vec!["1k", "10k", "100k"]),
                    prop::sample::select(vec!["0603", "0805"]),
                    1u64..20,
                )
                    .prop_map(|(v, p, q)| format!("{v},5%,{p},{q}")),
                0..12,
            )
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: a refused bulk subtraction leaves stock untouched, an
            /// accepted one removes exactly the demanded quantities.
            #[test]
            fn bulk_subtract_is_atomic(have in lines(), want in lines()) {
                let mut stock = Registry::new();
                stock.add_category("Resistors", RESISTOR_FORMAT).unwrap();
                for line in &have {
                    stock.add_component("Resistors", line).unwrap();
                }
                let mut project = Registry::new();
                project.add_category("Resistors", RESISTOR_FORMAT).unwrap();
                for line in &want {
                    project.add_component("Resistors", line).unwrap();
                }

                let before = stock.clone();
                let short = !stock.difference(&project).unwrap().is_empty();

                match stock.subtract_other(&project) {
                    Err(StockError::InsufficientStock { .. }) => {
                        prop_assert!(short);
                        prop_assert_eq!(&stock, &before);
                    }
                    Ok(()) => {
                        prop_assert!(!short);
                        let total = |r: &Registry| -> u64 {
                            r.categories().flat_map(|c| c.records()).map(Record::quantity).sum()
                        };
                        prop_assert_eq!(total(&stock) + total(&project), total(&before));
                    }
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
            }
        }
    }
}
