pub mod address;
pub mod compose;
pub mod format;
pub mod preview;
pub mod submit;
pub mod validate;

pub use address::{
    AddressResolver, Coordinates, GeolocationError, Geolocator, ReferenceGeocoder,
    ReverseGeocoder, StaticGeolocator,
};
pub use compose::{
    ComposeForm, LocateFailure, LocateTicket, LookupTicket, Notice, SubmissionPhase,
    SubmitRejected,
};
pub use format::{format_phone, format_postal_code};
pub use preview::ImagePreview;
pub use submit::{SubmissionPipeline, SubmitOutcome};
pub use validate::{validate, FieldErrors};
