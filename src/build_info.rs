//! Version and build metadata shown by `/version`.
//!
//! `BUILD_NUMBER` and `BUILD_DATE` are picked up from the environment at
//! compile time, so a CI job can stamp them without touching the source.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUILD_NUMBER: &str = match option_env!("BUILD_NUMBER") {
    Some(number) => number,
    None => "0",
};

pub const BUILD_DATE: &str = match option_env!("BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// Version and build number on one line, e.g. `v0.1.0 (build 19)`.
pub fn summary() -> String {
    format!("v{} (build {})", VERSION, BUILD_NUMBER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_package() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert!(!BUILD_NUMBER.is_empty());
        assert!(!BUILD_DATE.is_empty());
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(), format!("v{} (build {})", VERSION, BUILD_NUMBER));
    }
}
