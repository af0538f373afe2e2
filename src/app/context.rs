use std::sync::Arc;

use crate::api::{HttpPostsApi, PostalLookup, PostsApi, ViaCepLookup};
use crate::app::error::{Result, SosError};
use crate::config::Config;
use crate::form::{AddressResolver, StaticGeolocator, SubmissionPipeline};
use crate::normalizer::Normalizer;

pub struct AppContext {
    pub config: Config,
    pub posts_api: Arc<dyn PostsApi + Send + Sync>,
    pub normalizer: Normalizer,
    pub resolver: AddressResolver,
    pub pipeline: SubmissionPipeline,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let posts_api: Arc<dyn PostsApi + Send + Sync> =
            Arc::new(HttpPostsApi::new(&config.api.base_url, config.api_timeout())?);
        let postal_lookup: Arc<dyn PostalLookup + Send + Sync> =
            Arc::new(ViaCepLookup::new(&config.postal.base_url, config.postal_timeout())?);

        Self::with_collaborators(config, posts_api, postal_lookup)
    }

    /// Wire the context around already-built collaborators.
    pub fn with_collaborators(
        config: Config,
        posts_api: Arc<dyn PostsApi + Send + Sync>,
        postal_lookup: Arc<dyn PostalLookup + Send + Sync>,
    ) -> Result<Self> {
        check_timeouts(&config)?;
        let normalizer = Normalizer::new(&config.api.base_url)?;

        let mut resolver = AddressResolver::new(postal_lookup)
            .with_timeouts(config.postal_timeout(), config.geolocation_timeout());
        if let Some((latitude, longitude)) = config.geolocation.position() {
            resolver = resolver.with_geolocator(Arc::new(StaticGeolocator::new(latitude, longitude)));
        }

        let pipeline = SubmissionPipeline::new(posts_api.clone()).with_timeout(config.api_timeout());

        Ok(Self {
            config,
            posts_api,
            normalizer,
            resolver,
            pipeline,
        })
    }
}

// Every timeout must be positive.
fn check_timeouts(config: &Config) -> Result<()> {
    for (key, secs) in [
        ("api.timeout_secs", config.api.timeout_secs),
        ("postal.timeout_secs", config.postal.timeout_secs),
        ("geolocation.timeout_secs", config.geolocation.timeout_secs),
    ] {
        if secs == 0 {
            return Err(SosError::Config(format!("{key} must be greater than zero")));
        }
    }
    Ok(())
}
