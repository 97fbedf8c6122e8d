use vanity_protocol::{ConnectionRequest, GenerationRequest};

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_USERNAME: &str = "root";

/// Non-secret connection fields that survive restarts. Never carries the
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub username: String,
}

/// A single input edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Host(String),
    Port(String),
    Username(String),
    Password(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    CaseSensitive(bool),
    WalletCount(String),
    CpuCores(u32),
}

/// CPU-core selector. Disabled until a connection test reports the core count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSlider {
    pub max: u32,
    pub value: u32,
    pub enabled: bool,
}

impl Default for CpuSlider {
    fn default() -> Self {
        Self {
            max: 1,
            value: 1,
            enabled: false,
        }
    }
}

impl CpuSlider {
    /// Bounds the slider to `cores` and selects all but one core.
    pub(crate) fn configure(&mut self, cores: u32) {
        self.max = cores.max(1);
        self.value = cores.saturating_sub(1).max(1);
        self.enabled = true;
    }

    pub(crate) fn select(&mut self, value: u32) {
        if self.enabled {
            self.value = value.clamp(1, self.max);
        }
    }
}

/// Raw input values as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    pub prefix: String,
    pub suffix: String,
    pub contains: String,
    pub case_sensitive: bool,
    pub wallet_count: String,
    pub cpu: CpuSlider,
}

impl FormState {
    pub(crate) fn apply(&mut self, field: FormField) {
        match field {
            FormField::Host(value) => self.host = value,
            FormField::Port(value) => self.port = value,
            FormField::Username(value) => self.username = value,
            FormField::Password(value) => self.password = value,
            FormField::Prefix(value) => self.prefix = value,
            FormField::Suffix(value) => self.suffix = value,
            FormField::Contains(value) => self.contains = value,
            FormField::CaseSensitive(value) => self.case_sensitive = value,
            FormField::WalletCount(value) => self.wallet_count = value,
            FormField::CpuCores(value) => self.cpu.select(value),
        }
    }

    pub(crate) fn restore(&mut self, profile: ConnectionProfile) {
        if !profile.host.is_empty() {
            self.host = profile.host;
        }
        if profile.port != 0 {
            self.port = profile.port.to_string();
        }
        if !profile.username.is_empty() {
            self.username = profile.username;
        }
    }

    pub fn host(&self) -> &str {
        self.host.trim()
    }

    /// Port as sent on the wire; anything unparsable or zero means 22.
    pub fn port(&self) -> u16 {
        parse_positive(&self.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn username(&self) -> &str {
        match self.username.trim() {
            "" => DEFAULT_USERNAME,
            name => name,
        }
    }

    pub fn wallet_count(&self) -> u32 {
        parse_positive(&self.wallet_count).unwrap_or(1)
    }

    pub fn has_filter(&self) -> bool {
        !(self.prefix.trim().is_empty()
            && self.suffix.trim().is_empty()
            && self.contains.trim().is_empty())
    }

    pub fn connection_request(&self) -> ConnectionRequest {
        ConnectionRequest {
            host: self.host().to_string(),
            port: self.port(),
            username: self.username().to_string(),
            password: self.password.clone(),
        }
    }

    pub fn generation_request(&self) -> GenerationRequest {
        GenerationRequest {
            host: self.host().to_string(),
            port: self.port(),
            username: self.username().to_string(),
            password: self.password.clone(),
            prefix: self.prefix.trim().to_string(),
            suffix: self.suffix.trim().to_string(),
            contains: self.contains.trim().to_string(),
            case_sensitive: self.case_sensitive,
            wallet_count: self.wallet_count(),
            cpu_cores: self.cpu.value,
        }
    }

    pub fn profile(&self) -> ConnectionProfile {
        ConnectionProfile {
            host: self.host().to_string(),
            port: self.port(),
            username: self.username.trim().to_string(),
        }
    }
}

fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialEq + Default,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value != T::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_when_unparsable_or_zero() {
        let mut form = FormState::default();
        assert_eq!(form.port(), 22);
        form.port = "abc".to_string();
        assert_eq!(form.port(), 22);
        form.port = "0".to_string();
        assert_eq!(form.port(), 22);
        form.port = " 2222 ".to_string();
        assert_eq!(form.port(), 2222);
    }

    #[test]
    fn blank_username_means_root() {
        let mut form = FormState::default();
        form.username = "   ".to_string();
        assert_eq!(form.username(), "root");
        form.username = " admin ".to_string();
        assert_eq!(form.username(), "admin");
    }

    #[test]
    fn wallet_count_defaults_to_one() {
        let mut form = FormState::default();
        assert_eq!(form.wallet_count(), 1);
        form.wallet_count = "5".to_string();
        assert_eq!(form.wallet_count(), 5);
        form.wallet_count = "-3".to_string();
        assert_eq!(form.wallet_count(), 1);
    }

    #[test]
    fn slider_clamps_selection_to_bounds() {
        let mut slider = CpuSlider::default();
        slider.select(4);
        assert_eq!(slider.value, 1, "disabled slider ignores input");

        slider.configure(8);
        slider.select(20);
        assert_eq!(slider.value, 8);
        slider.select(0);
        assert_eq!(slider.value, 1);
    }

    #[test]
    fn whitespace_only_filters_do_not_count() {
        let mut form = FormState::default();
        form.prefix = "  ".to_string();
        assert!(!form.has_filter());
        form.contains = "beef".to_string();
        assert!(form.has_filter());
    }
}
