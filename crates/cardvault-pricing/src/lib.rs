pub mod client;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod retry;
pub mod types;

pub use client::{ClientOptions, PricingClient};
pub use error::PricingError;
pub use matcher::{find_match, NoMatchReason};
pub use normalize::{extract_variant, normalize_variant};
pub use retry::{classify_status, StatusClass};
pub use types::{RemoteProduct, SearchResponse};
