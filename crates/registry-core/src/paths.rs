use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "org";
pub const APP_ORG: &str = "library-registry";
pub const APP_NAME: &str = "registry";

pub const STORE_FILE_NAME: &str = "libs_data.json";
pub const STORE_PATH_ENV: &str = "LIBRARY_REGISTRY_STORE";

pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Where the store lives unless the caller names a path explicitly.
///
/// `$LIBRARY_REGISTRY_STORE` wins over the per-user data directory.
pub fn default_store_path() -> Option<PathBuf> {
    if let Ok(override_path) = std::env::var(STORE_PATH_ENV) {
        if !override_path.is_empty() {
            return Some(PathBuf::from(override_path));
        }
    }
    data_dir().map(|dir| dir.join(STORE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_override_and_empty_fallback() {
        let fallback = data_dir().map(|dir| dir.join(STORE_FILE_NAME));

        std::env::set_var(STORE_PATH_ENV, "/srv/registry/custom.json");
        assert_eq!(
            default_store_path(),
            Some(PathBuf::from("/srv/registry/custom.json"))
        );

        std::env::set_var(STORE_PATH_ENV, "");
        assert_eq!(default_store_path(), fallback);

        std::env::remove_var(STORE_PATH_ENV);
        assert_eq!(default_store_path(), fallback);
    }
}
