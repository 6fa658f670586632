// Adapters layer: concrete implementations for external systems (storage, HTTP APIs).

pub mod http;
pub mod mapbox;
pub mod revalidate;
pub mod sanity;
pub mod storage;

pub use mapbox::{GeocodeQuery, MapboxClient};
pub use revalidate::RevalidateClient;
pub use sanity::{Perspective, SanityClient};
pub use storage::LocalStorage;
