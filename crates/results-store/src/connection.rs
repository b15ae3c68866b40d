use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the directory saved results live in.
pub const RESULTS_DIR_ENV: &str = "OPTIMIZATION_RESULTS_DIR";

/// Directory used when neither configuration nor environment names one.
pub const DEFAULT_RESULTS_DIR: &str = "optimization_results";

/// Resolves the results directory.
///
/// An explicitly configured directory wins. Otherwise `OPTIMIZATION_RESULTS_DIR`
/// is read, after loading a `.env` file if one is present, and finally
/// `./optimization_results` is used.
pub fn resolve_results_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    // A missing .env file is normal; only the variable itself matters.
    if let Err(e) = dotenvy::dotenv() {
        tracing::trace!(error = %e, "No .env file loaded.");
    }
    env::var_os(RESULTS_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR), PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directory_wins() {
        let dir = resolve_results_dir(Some(Path::new("/srv/results")));
        assert_eq!(dir, PathBuf::from("/srv/results"));
    }
}
