use std::fs;
use std::path::Path;

use partstock_inventory::Registry;

use super::{PersistenceError, codec};

/// Read the file at `path` and append its contents into `registry`.
pub fn load(path: impl AsRef<Path>, registry: &mut Registry) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    codec::decode_into(registry, &text)?;

    tracing::info!(
        path = %path.display(),
        categories = registry.category_names().count(),
        records = registry.record_count(),
        "registry loaded"
    );
    Ok(())
}

/// Write `registry` to `path`, replacing the file.
pub fn save(path: impl AsRef<Path>, registry: &Registry) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    fs::write(path, codec::encode(registry)).map_err(|source| io_error(path, source))?;

    tracing::info!(
        path = %path.display(),
        records = registry.record_count(),
        "registry saved"
    );
    Ok(())
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}
