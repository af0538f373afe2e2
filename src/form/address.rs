use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{PostalLookup, PostalLookupOutcome, ResolvedAddress};
use crate::app::{Result, SosError};
use crate::form::compose::{ComposeForm, LocateFailure, LookupTicket};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("User denied Geolocation")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout expired")]
    Timeout,
}

/// Platform location capability.
#[async_trait]
pub trait Geolocator {
    async fn current_position(&self) -> std::result::Result<Coordinates, GeolocationError>;
}

/// Turns coordinates into a postal address.
#[async_trait]
pub trait ReverseGeocoder {
    async fn resolve(&self, at: Coordinates) -> Result<ResolvedAddress>;
}

/// Always reports the configured coordinates.
pub struct StaticGeolocator {
    position: Coordinates,
}

impl StaticGeolocator {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            position: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    async fn current_position(&self) -> std::result::Result<Coordinates, GeolocationError> {
        Ok(self.position)
    }
}

/// Stand-in until a reverse-geocoding service is integrated: every position
/// resolves to a fixed reference address on Avenida Paulista.
pub struct ReferenceGeocoder;

impl ReferenceGeocoder {
    pub fn reference_address() -> ResolvedAddress {
        ResolvedAddress {
            cep: "01310-100".to_string(),
            street: "Av. Paulista".to_string(),
            number: Some("1000".to_string()),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for ReferenceGeocoder {
    async fn resolve(&self, at: Coordinates) -> Result<ResolvedAddress> {
        tracing::debug!(
            "Resolving {:.5},{:.5} to the reference address",
            at.latitude,
            at.longitude
        );
        Ok(Self::reference_address())
    }
}

/// Fills address fields from a postal code or from the device position.
pub struct AddressResolver {
    postal: Arc<dyn PostalLookup + Send + Sync>,
    geolocator: Option<Arc<dyn Geolocator + Send + Sync>>,
    geocoder: Arc<dyn ReverseGeocoder + Send + Sync>,
    lookup_timeout: Duration,
    locate_timeout: Duration,
}

impl AddressResolver {
    pub fn new(postal: Arc<dyn PostalLookup + Send + Sync>) -> Self {
        Self {
            postal,
            geolocator: None,
            geocoder: Arc::new(ReferenceGeocoder),
            lookup_timeout: Duration::from_secs(10),
            locate_timeout: Duration::from_secs(15),
        }
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator + Send + Sync>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder + Send + Sync>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn with_timeouts(mut self, lookup: Duration, locate: Duration) -> Self {
        self.lookup_timeout = lookup;
        self.locate_timeout = locate;
        self
    }

    pub fn supports_geolocation(&self) -> bool {
        self.geolocator.is_some()
    }

    /// Run the request behind a lookup ticket without touching any form.
    pub async fn lookup_postal_code(&self, ticket: &LookupTicket) -> Result<PostalLookupOutcome> {
        match tokio::time::timeout(self.lookup_timeout, self.postal.lookup(ticket.digits())).await {
            Ok(result) => result,
            Err(_) => Err(SosError::Timeout(format!(
                "postal lookup for {}",
                ticket.digits()
            ))),
        }
    }

    /// Look up and apply in one step. Returns whether the address changed.
    pub async fn resolve_postal_code(&self, form: &mut ComposeForm, ticket: LookupTicket) -> bool {
        let outcome = self.lookup_postal_code(&ticket).await;
        form.apply_postal_lookup(ticket, outcome)
    }

    /// Fill the address from the device position.
    pub async fn locate(&self, form: &mut ComposeForm) {
        if !self.supports_geolocation() {
            form.report_geolocation_unsupported();
            return;
        }
        let Some(ticket) = form.begin_locate() else {
            tracing::debug!("Geolocation already in progress");
            return;
        };

        let outcome = self.locate_address().await;
        form.finish_locate(ticket, outcome);
    }

    /// Position the device and reverse-geocode it without touching any form;
    /// hand the result to [`ComposeForm::finish_locate`].
    pub async fn locate_address(&self) -> std::result::Result<ResolvedAddress, LocateFailure> {
        let Some(geolocator) = self.geolocator.as_ref() else {
            return Err(LocateFailure::Unsupported);
        };

        let position =
            match tokio::time::timeout(self.locate_timeout, geolocator.current_position()).await {
                Ok(Ok(position)) => position,
                Ok(Err(e)) => {
                    tracing::warn!("Geolocation failed: {}", e);
                    return Err(LocateFailure::Position(e.to_string()));
                }
                Err(_) => {
                    tracing::warn!("Geolocation timed out");
                    return Err(LocateFailure::Position(GeolocationError::Timeout.to_string()));
                }
            };

        match tokio::time::timeout(self.locate_timeout, self.geocoder.resolve(position)).await {
            Ok(Ok(address)) => Ok(address),
            Ok(Err(e)) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                Err(LocateFailure::Address)
            }
            Err(_) => {
                tracing::warn!("Reverse geocoding timed out");
                Err(LocateFailure::Address)
            }
        }
    }
}
