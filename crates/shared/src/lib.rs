pub mod analysis;
pub mod config;
pub mod credential;
pub mod error;

pub use analysis::{AnalysisOutcome, AnalysisRequest, AnalysisResult, CompressedImage};
pub use credential::Credential;
pub use error::AnalysisError;

pub mod settings {
    use serde::{Deserialize, Serialize};

    /// Which backend answers analysis requests
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ApiProvider {
        #[default]
        Gemini,
        /// Gemini-compatible endpoint configured by the user
        Custom,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Theme {
        Light,
        Dark,
        #[default]
        System,
    }

    /// Persisted user settings. Missing fields read as defaults.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AppSettings {
        #[serde(default)]
        pub api_provider: ApiProvider,
        #[serde(default)]
        pub theme: Theme,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub custom_endpoint: Option<String>, // Custom without an endpoint stays on Gemini
    }

    /// Partial update applied on top of the stored settings
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct SettingsPatch {
        pub api_provider: Option<ApiProvider>,
        pub theme: Option<Theme>,
        pub custom_endpoint: Option<String>,
    }

    impl AppSettings {
        pub fn merge(&mut self, patch: SettingsPatch) {
            if let Some(provider) = patch.api_provider {
                self.api_provider = provider;
            }
            if let Some(theme) = patch.theme {
                self.theme = theme;
            }
            if let Some(endpoint) = patch.custom_endpoint {
                let endpoint = endpoint.trim().to_string();
                self.custom_endpoint = if endpoint.is_empty() {
                    None
                } else {
                    Some(endpoint)
                };
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_settings_wire_names() {
            let settings = AppSettings {
                api_provider: ApiProvider::Custom,
                theme: Theme::Dark,
                custom_endpoint: None,
            };
            let json = serde_json::to_string(&settings).unwrap();
            assert_eq!(json, r#"{"apiProvider":"custom","theme":"dark"}"#);
        }

        #[test]
        fn test_partial_blob_uses_defaults() {
            let settings: AppSettings = serde_json::from_str(r#"{"theme":"light"}"#).unwrap();
            assert_eq!(settings.api_provider, ApiProvider::Gemini);
            assert_eq!(settings.theme, Theme::Light);
        }

        #[test]
        fn test_merge_keeps_untouched_fields() {
            let mut settings = AppSettings {
                api_provider: ApiProvider::Custom,
                theme: Theme::Dark,
                custom_endpoint: Some("http://localhost:8080/generate".into()),
            };
            settings.merge(SettingsPatch {
                theme: Some(Theme::Light),
                ..Default::default()
            });
            assert_eq!(settings.api_provider, ApiProvider::Custom);
            assert_eq!(settings.theme, Theme::Light);
            assert!(settings.custom_endpoint.is_some());

            settings.merge(SettingsPatch {
                custom_endpoint: Some("  ".into()),
                ..Default::default()
            });
            assert_eq!(settings.custom_endpoint, None);
        }
    }
}
