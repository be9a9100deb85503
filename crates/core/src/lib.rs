#[cfg(feature = "clients")]
pub mod caption;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod instagram;
pub mod metadata;
#[doc(hidden)]
pub mod patterns;
pub mod store;

#[cfg(feature = "clients")]
pub use caption::{CaptionOptions, CaptionRequest, CaptionResponse, OpenRouterClient};
pub use error::{PostprepError, Result};
pub use extract::{MAX_CONTENT_LEN, PageExtract, extract_page};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_page};
pub use instagram::InstagramAccount;
#[cfg(feature = "clients")]
pub use instagram::InstagramClient;
pub use metadata::UNTITLED;
pub use store::{AccountStore, JsonFileStore, MemoryStore};
