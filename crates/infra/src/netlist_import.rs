//! Build a project bill of materials from schematic netlist entries.
//!
//! Entries are classified against the stock inventory: the reference
//! designator picks the obvious passive categories, stock vocabularies pick
//! the rest, and missing key fields are guessed from what stock holds.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use partstock_core::StockResult;
use partstock_inventory::{Query, Registry, Schema};

use crate::persistence::{PersistenceError, file_store};

/// Category for entries nothing in stock resembles.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Format of categories created for entries stock has no category for.
pub const FALLBACK_FORMAT: &str = "Value,Extra,Package,Qty";

/// A field that could not be determined.
pub const UNDETERMINED: &str = "?";

/// A field stock offers several candidates for.
pub const AMBIGUOUS: &str = "!";

/// Value suffix marking an entry that is placed in the schematic but not fitted.
const NOT_FITTED: char = '*';

const REFERENCE_PREFIXES: &[(&str, &str)] = &[
    ("R", "Resistors"),
    ("C", "Capacitors"),
    ("L", "Inductors"),
    ("FB", "FerriteBeads"),
];

const KNOWN_UNITS: &[(&str, char)] = &[
    ("Tolerance", '%'),
    ("Voltage", 'V'),
    ("Current", 'A'),
    ("Wattage", 'W'),
];

/// One component of a parsed schematic netlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetlistComponent {
    pub reference: String,
    pub value: String,
    pub footprint: String,
}

impl NetlistComponent {
    pub fn new(reference: impl Into<String>, value: impl Into<String>, footprint: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            value: value.into(),
            footprint: footprint.into(),
        }
    }
}

/// Result of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedProject {
    /// Fitted components only.
    pub bom: Registry,
    /// Every component, fitted or not.
    pub full: Registry,
}

impl ImportedProject {
    /// Write the BOM to `<base>.csv` and the full list to `<base>_full.csv`.
    pub fn save(&self, base: impl AsRef<Path>) -> Result<(PathBuf, PathBuf), PersistenceError> {
        let base = base.as_ref();
        let bom_path = with_suffix(base, ".csv");
        let full_path = with_suffix(base, "_full.csv");

        file_store::save(&bom_path, &self.bom)?;
        file_store::save(&full_path, &self.full)?;
        Ok((bom_path, full_path))
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Parse a component list, one `reference,value,footprint` entry per line.
///
/// The reference ends at the first comma and the footprint starts after the
/// last one, so values such as `10k,1%` need no quoting. Blank lines and
/// lines starting with `#` are skipped.
pub fn parse_components(text: &str) -> Result<Vec<NetlistComponent>, PersistenceError> {
    let mut components = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let entry = line.split_once(',').and_then(|(reference, rest)| {
            rest.rsplit_once(',')
                .map(|(value, footprint)| (reference.trim(), value.trim(), footprint.trim()))
        });
        match entry {
            Some((reference, value, footprint)) if !reference.is_empty() && !value.is_empty() => {
                components.push(NetlistComponent::new(reference, value, footprint));
            }
            _ => return Err(PersistenceError::MalformedEntry { line: idx + 1 }),
        }
    }

    Ok(components)
}

/// Read and parse the component list at `path`.
pub fn read_components(path: impl AsRef<Path>) -> Result<Vec<NetlistComponent>, PersistenceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| file_store::io_error(path, source))?;
    let components = parse_components(&text)?;

    tracing::info!(path = %path.display(), components = components.len(), "component list read");
    Ok(components)
}

/// Classify `components` against `stock` into project registries.
pub fn import(components: &[NetlistComponent], stock: &Registry) -> StockResult<ImportedProject> {
    let packages = known_packages(stock)?;
    let mut project = ImportedProject::default();

    for component in components {
        let (raw_value, fitted) = match component.value.strip_suffix(NOT_FITTED) {
            Some(value) => (value, false),
            None => (component.value.as_str(), true),
        };

        let category = classify(&component.reference, raw_value, stock)?;
        let package = guess_package(&component.footprint, &packages);
        let params = split_value(raw_value);

        let (format, record) = if stock.contains(&category) {
            let schema = stock.category_schema(&category)?;
            let record = known_record(stock, &category, schema, &params, package)?;
            (schema.format().to_string(), record)
        } else {
            let extra = params[1..].join("|").replace(',', "|");
            (FALLBACK_FORMAT.to_string(), format!("{},{extra},{package},1", params[0]))
        };

        tracing::debug!(
            reference = %component.reference,
            category = %category,
            record = %record,
            fitted,
            "netlist entry classified"
        );

        add(&mut project.full, &category, &format, &record)?;
        if fitted {
            add(&mut project.bom, &category, &format, &record)?;
        }
    }

    Ok(project)
}

fn add(registry: &mut Registry, category: &str, format: &str, record: &str) -> StockResult<()> {
    if !registry.contains(category) {
        registry.add_category(category, format)?;
    }
    registry.add_component(category, record)
}

/// Category by reference designator, then by stock `Name`/`Value` vocabulary.
fn classify(reference: &str, value: &str, stock: &Registry) -> StockResult<String> {
    for (prefix, category) in REFERENCE_PREFIXES {
        let numbered = reference
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit());
        if numbered {
            return Ok((*category).to_string());
        }
    }

    for store in stock.categories() {
        let field = if store.has_field("Name") {
            "Name"
        } else if store.has_field("Value") {
            "Value"
        } else {
            continue;
        };
        if store.variants_of_field(field)?.contains(value) {
            return Ok(store.name().to_string());
        }
    }

    Ok(UNKNOWN_CATEGORY.to_string())
}

fn known_packages(stock: &Registry) -> StockResult<BTreeSet<String>> {
    let mut packages = BTreeSet::new();
    for store in stock.categories().filter(|s| s.has_field("Package")) {
        packages.extend(store.variants_of_field("Package")?);
    }
    Ok(packages)
}

/// Longest known package name contained in the footprint.
fn guess_package<'a>(footprint: &str, packages: &'a BTreeSet<String>) -> &'a str {
    let mut best: &'a str = UNDETERMINED;
    for package in packages {
        if footprint.contains(package.as_str()) && (best == UNDETERMINED || package.len() > best.len()) {
            best = package.as_str();
        }
    }
    best
}

/// `10k,1%/0.25W` → `["10k", "0.25W", "1%"]`.
fn split_value(raw: &str) -> Vec<String> {
    let mut params: Vec<String> = raw.split('/').map(str::to_string).collect();
    if let Some((value, tolerance)) = params[0].split_once(',') {
        let (value, tolerance) = (value.to_string(), tolerance.to_string());
        params[0] = value;
        params.push(tolerance);
    }
    params
}

fn has_known_unit(field: &str, value: &str) -> bool {
    KNOWN_UNITS
        .iter()
        .any(|(f, unit)| *f == field && value.ends_with(*unit))
}

/// Record line for a stock category: value first, package second to last,
/// middle key fields from the extra parameters or from matching stock.
fn known_record(
    stock: &Registry,
    category: &str,
    schema: &Schema,
    params: &[String],
    package: &str,
) -> StockResult<String> {
    let fields = schema.fields();
    let middle = 1..fields.len().saturating_sub(2).max(1);

    let mut record = vec![params[0].clone()];
    for field in &fields[middle.clone()] {
        let variants = stock.variants_of_field(category, field)?;
        let found = params[1..]
            .iter()
            .find(|p| variants.contains(p.as_str()) || has_known_unit(field, p));
        record.push(found.map_or(UNDETERMINED.to_string(), String::clone));
    }
    if fields.len() > 2 {
        record.push(package.to_string());
    }

    if record.iter().any(|f| f == UNDETERMINED) {
        let query: Query = fields
            .iter()
            .zip(&record)
            .filter(|(_, value)| value.as_str() != UNDETERMINED)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        let candidates = stock.filter_components(category, &query)?;

        for idx in middle {
            if record[idx] != UNDETERMINED {
                continue;
            }
            let seen: BTreeSet<&str> = candidates
                .records()
                .iter()
                .map(|r| r.keys()[idx].as_str())
                .collect();
            record[idx] = match seen.len() {
                0 => UNDETERMINED.to_string(),
                1 => seen.into_iter().next().unwrap_or(UNDETERMINED).to_string(),
                _ => AMBIGUOUS.to_string(),
            };
        }
    }

    record.push("1".to_string());
    Ok(record.join(","))
}
