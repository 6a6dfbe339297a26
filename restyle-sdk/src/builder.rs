// ABOUTME: Builder pattern implementation for ProviderClient configuration
// ABOUTME: Provides typed configuration with defaults for timeout, base URL and user agent

use crate::constants::timeouts;
use crate::error::ProviderError;
use crate::ProviderClient;
use secrecy::SecretString;
use std::time::Duration;
use typed_builder::TypedBuilder;

#[derive(Debug, TypedBuilder)]
pub struct ProviderClientConfig {
    pub auth_token: SecretString,

    #[builder(default = timeouts::HTTP_REQUEST_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default = None)]
    pub base_url: Option<String>,

    #[builder(default = format!("restyle/{}", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,
}

impl ProviderClient {
    pub fn builder() -> ProviderClientConfigBuilder<((), (), (), ())> {
        ProviderClientConfig::builder()
    }
}

impl TryFrom<ProviderClientConfig> for ProviderClient {
    type Error = ProviderError;

    fn try_from(config: ProviderClientConfig) -> Result<Self, Self::Error> {
        ProviderClient::from_config(config)
    }
}
