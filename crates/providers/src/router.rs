use crate::gemini::GeminiVisionClient;
use crate::{VisionProvider, VisionRequest};
use reqwest::Client;
use shared::config::LensConfig;
use shared::settings::{ApiProvider, AppSettings};
use shared::{AnalysisError, Credential};
use tokio::sync::watch;

/// Picks the backend from the live settings on every request.
///
/// Settings are read once at the start of a call, so a change made while a
/// request is in flight only affects the next one.
pub struct ProviderRouter {
    http: Client,
    gemini_endpoint: String,
    settings: watch::Receiver<AppSettings>,
}

impl ProviderRouter {
    pub fn new(
        config: &LensConfig,
        settings: watch::Receiver<AppSettings>,
    ) -> Result<Self, AnalysisError> {
        let http = Client::builder()
            .timeout(config.analysis_timeout)
            .build()
            .map_err(|e| AnalysisError::Unknown(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            gemini_endpoint: config.gemini_endpoint.clone(),
            settings,
        })
    }

    /// Provider the current settings select
    pub fn active_provider(&self) -> ApiProvider {
        self.settings.borrow().api_provider
    }

    /// Endpoint for the next request. `custom` without a configured
    /// endpoint stays on Gemini.
    fn resolve(&self) -> GeminiVisionClient {
        let settings = self.settings.borrow();
        let endpoint = match (settings.api_provider, settings.custom_endpoint.as_deref()) {
            (ApiProvider::Custom, Some(endpoint)) => endpoint.to_string(),
            _ => self.gemini_endpoint.clone(),
        };
        GeminiVisionClient::with_client(self.http.clone(), endpoint)
    }
}

#[async_trait::async_trait]
impl VisionProvider for ProviderRouter {
    fn id(&self) -> &'static str {
        match self.active_provider() {
            ApiProvider::Gemini => "gemini",
            ApiProvider::Custom => "custom",
        }
    }

    async fn describe(
        &self,
        request: VisionRequest<'_>,
        credential: &Credential,
    ) -> Result<String, AnalysisError> {
        let client = self.resolve();
        tracing::debug!(
            provider = self.id(),
            endpoint = client.endpoint(),
            "routing vision request"
        );
        client.describe(request, credential).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, tiny_image};

    #[test]
    fn test_default_routes_to_gemini() {
        let (_tx, rx) = watch::channel(AppSettings::default());
        let router = ProviderRouter::new(&LensConfig::default(), rx).unwrap();
        assert_eq!(router.active_provider(), ApiProvider::Gemini);
        assert_eq!(
            router.resolve().endpoint(),
            shared::config::GEMINI_API_ENDPOINT
        );
    }

    #[test]
    fn test_custom_without_endpoint_uses_gemini() {
        let (tx, rx) = watch::channel(AppSettings::default());
        let router = ProviderRouter::new(&LensConfig::default(), rx).unwrap();
        tx.send_replace(AppSettings {
            api_provider: ApiProvider::Custom,
            ..Default::default()
        });
        assert_eq!(router.id(), "custom");
        assert_eq!(
            router.resolve().endpoint(),
            shared::config::GEMINI_API_ENDPOINT
        );
    }

    #[tokio::test]
    async fn test_legacy_custom_blob_reaches_gemini_endpoint() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"from gemini"}]}}]}"#,
        )
        .await;
        // Settings written by older clients pick "custom" but never set an endpoint
        let settings: AppSettings =
            serde_json::from_str(r#"{"apiProvider":"custom","theme":"dark"}"#).unwrap();
        let (_tx, rx) = watch::channel(settings);
        let config = LensConfig {
            gemini_endpoint: endpoint,
            ..Default::default()
        };
        let router = ProviderRouter::new(&config, rx).unwrap();
        let image = tiny_image();
        let key = Credential::new("k").unwrap();

        let text = router
            .describe(
                VisionRequest {
                    prompt: "p",
                    image: &image,
                    temperature: 0.4,
                    max_output_tokens: 500,
                },
                &key,
            )
            .await
            .unwrap();
        assert_eq!(text, "from gemini");
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/models/test:generateContent?key=k "));
    }

    #[tokio::test]
    async fn test_custom_endpoint_is_used() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"from custom"}]}}]}"#,
        )
        .await;
        let (_tx, rx) = watch::channel(AppSettings {
            api_provider: ApiProvider::Custom,
            custom_endpoint: Some(endpoint),
            ..Default::default()
        });
        let router = ProviderRouter::new(&LensConfig::default(), rx).unwrap();
        let image = tiny_image();
        let key = Credential::new("k").unwrap();

        let text = router
            .describe(
                VisionRequest {
                    prompt: "p",
                    image: &image,
                    temperature: 0.4,
                    max_output_tokens: 500,
                },
                &key,
            )
            .await
            .unwrap();
        assert_eq!(text, "from custom");
        server.await.unwrap();
    }
}
