pub mod file;
pub mod stdin;

use bizval_core::assumptions::EngineAssumptions;
use serde::de::DeserializeOwned;

/// Load engine assumptions from `--assumptions`, or the defaults.
pub fn load_assumptions(path: Option<&str>) -> Result<EngineAssumptions, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let assumptions: EngineAssumptions = file::read_document(p)?;
            tracing::debug!(path = p, "loaded assumptions");
            Ok(assumptions)
        }
        None => Ok(EngineAssumptions::default()),
    }
}

/// Structured input from `--input`, else piped stdin, else `None` so the
/// caller can fall back to flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(p) = path {
        return Ok(Some(file::read_document(p)?));
    }
    stdin::read_stdin()
}
