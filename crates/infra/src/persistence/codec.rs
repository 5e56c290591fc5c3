use partstock_core::StockError;
use partstock_inventory::{Registry, Schema};

use super::PersistenceError;

/// Serialize a registry: per category a name line, the verbatim format line,
/// then one comma-joined line per record.
pub fn encode(registry: &Registry) -> String {
    let mut out = String::new();
    for store in registry.categories() {
        out.push_str(store.name());
        out.push('\n');
        out.push_str(store.schema().format());
        out.push('\n');
        for record in store.records() {
            out.push_str(&record.to_string());
            out.push('\n');
        }
    }
    out
}

/// Parse `text` and append its categories and records into `registry`.
///
/// A line without a comma starts a category block and the following line is
/// its format. Blocks for categories `registry` already holds append to them
/// when the format is identical. Nothing is applied unless every line parses.
pub fn decode_into(registry: &mut Registry, text: &str) -> Result<(), PersistenceError> {
    let mut scratch = registry.clone();
    let mut current: Option<String> = None;
    let mut lines = text.lines().enumerate().map(|(idx, line)| (idx + 1, line));

    while let Some((line_no, line)) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }

        if !line.contains(',') {
            let name = line.trim().to_string();
            let (format_no, format) = lines.next().ok_or_else(|| PersistenceError::MissingSchema {
                category: name.clone(),
            })?;
            open_category(&mut scratch, &name, format)
                .map_err(|source| PersistenceError::Invalid { line: format_no, source })?;
            current = Some(name);
            continue;
        }

        let category = current
            .as_deref()
            .ok_or(PersistenceError::OrphanRecord { line: line_no })?;
        scratch
            .add_component(category, line)
            .map_err(|source| PersistenceError::Invalid { line: line_no, source })?;
    }

    *registry = scratch;
    Ok(())
}

fn open_category(registry: &mut Registry, name: &str, format: &str) -> Result<(), StockError> {
    if !registry.contains(name) {
        return registry.add_category(name, format);
    }

    let incoming = Schema::parse(format)?;
    let existing = registry.category_schema(name)?;
    if existing != &incoming {
        return Err(StockError::SchemaMismatch {
            left: format!("{name}:{incoming}"),
            right: format!("{name}:{existing}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOCK: &str = "Capacitors\n\
        Value,Voltage,Package,Qty\n\
        100n,16V,0603,50\n\
        10u,10V,0805,4\n\
        Resistors\n\
        Value,Tolerance,Package,Qty\n\
        10k,5%,0805,3\n";

    #[test]
    fn decode_reads_category_blocks() {
        let mut registry = Registry::new();
        decode_into(&mut registry, STOCK).unwrap();

        let names: Vec<&str> = registry.category_names().collect();
        assert_eq!(names, vec!["Capacitors", "Resistors"]);
        assert_eq!(registry.category("Capacitors").unwrap().len(), 2);
        assert_eq!(
            registry.category_schema("Resistors").unwrap().format(),
            "Value,Tolerance,Package,Qty"
        );
    }

    #[test]
    fn decode_accepts_crlf_and_blank_lines() {
        let text = "Resistors\r\nValue,Tolerance,Package,Qty\r\n\r\n10k,5%,0805,3\r\n";
        let mut registry = Registry::new();
        decode_into(&mut registry, text).unwrap();
        let resistors = registry.category("Resistors").unwrap();
        assert_eq!(resistors.records()[0].to_string(), "10k,5%,0805,3");
    }

    #[test]
    fn encode_then_decode_reproduces_registry() {
        let mut registry = Registry::new();
        decode_into(&mut registry, STOCK).unwrap();

        let text = encode(&registry);
        assert_eq!(text, STOCK);

        let mut again = Registry::new();
        decode_into(&mut again, &text).unwrap();
        assert_eq!(again, registry);
    }

    #[test]
    fn decode_appends_to_existing_category() {
        let mut registry = Registry::new();
        decode_into(&mut registry, STOCK).unwrap();
        decode_into(&mut registry, "Resistors\nValue,Tolerance,Package,Qty\n10k,5%,0805,2\n").unwrap();

        let resistors = registry.category("Resistors").unwrap();
        assert_eq!(resistors.records()[0].quantity(), 5);
    }

    #[test]
    fn decode_rejects_schema_change() {
        let mut registry = Registry::new();
        decode_into(&mut registry, STOCK).unwrap();

        let err = decode_into(&mut registry, "Resistors\nValue,Package,Qty\n10k,0805,2\n").unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Invalid {
                line: 2,
                source: StockError::SchemaMismatch { .. }
            }
        ));
    }

    #[test]
    fn decode_is_all_or_nothing() {
        let mut registry = Registry::new();
        let text = "Resistors\nValue,Tolerance,Package,Qty\n10k,5%,0805,3\n22k,0805,1\n";

        let err = decode_into(&mut registry, text).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Invalid {
                line: 4,
                source: StockError::FormatMismatch { .. }
            }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn decode_reports_structural_errors() {
        let mut registry = Registry::new();
        assert!(matches!(
            decode_into(&mut registry, "10k,5%,0805,3\n"),
            Err(PersistenceError::OrphanRecord { line: 1 })
        ));
        assert!(matches!(
            decode_into(&mut registry, "Resistors\n"),
            Err(PersistenceError::MissingSchema { .. })
        ));
    }
}
