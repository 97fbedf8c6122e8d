use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vanity_core::ConnectionProfile;
use vanity_engine::AtomicFileWriter;
use vanity_logging::{vanity_error, vanity_info, vanity_warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedProfile {
    host: String,
    port: u16,
    username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    connection_profile: Option<PersistedProfile>,
}

pub(crate) fn load_profile(path: &Path) -> Option<ConnectionProfile> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            vanity_warn!("Failed to read saved profile from {:?}: {}", path, err);
            return None;
        }
    };

    let state: PersistedState = match ron::from_str(&content) {
        Ok(state) => state,
        Err(err) => {
            vanity_warn!("Failed to parse saved profile from {:?}: {}", path, err);
            return None;
        }
    };

    let profile = state.connection_profile?;
    vanity_info!("Loaded connection profile from {:?}", path);
    Some(ConnectionProfile {
        host: profile.host,
        port: profile.port,
        username: profile.username,
    })
}

pub(crate) fn save_profile(path: &Path, profile: &ConnectionProfile) {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        vanity_error!("Profile path {:?} has no usable file name", path);
        return;
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let state = PersistedState {
        connection_profile: Some(PersistedProfile {
            host: profile.host.clone(),
            port: profile.port,
            username: profile.username.clone(),
        }),
    };

    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(&state, pretty) {
        Ok(text) => text,
        Err(err) => {
            vanity_error!("Failed to serialize connection profile: {}", err);
            return;
        }
    };

    let writer = AtomicFileWriter::new(dir);
    if let Err(err) = writer.write(file_name, &content) {
        vanity_error!("Failed to write connection profile to {:?}: {}", path, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> ConnectionProfile {
        ConnectionProfile {
            host: "10.0.0.5".to_string(),
            port: 2222,
            username: "miner".to_string(),
        }
    }

    #[test]
    fn saved_profile_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".vanity_profile.ron");

        save_profile(&path, &profile());

        assert_eq!(load_profile(&path), Some(profile()));
    }

    #[test]
    fn saved_file_never_mentions_a_password() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("profile.ron");

        save_profile(&path, &profile());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("connection_profile"));
        assert!(!text.contains("password"));
    }

    #[test]
    fn missing_or_garbled_file_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profile.ron");
        assert_eq!(load_profile(&path), None);

        fs::write(&path, "not ron at all {").unwrap();
        assert_eq!(load_profile(&path), None);

        fs::write(&path, "(connection_profile: None)").unwrap();
        assert_eq!(load_profile(&path), None);
    }
}
