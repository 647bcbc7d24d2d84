//! Services for UF lookup, caching and formatting

pub mod cache;
pub mod clock;
pub mod http;
pub mod lookup;
pub mod normalizer;
pub mod report;

pub use cache::{FileCache, MemoryCache, RateCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use lookup::{LookupSettings, RateLookupService};
