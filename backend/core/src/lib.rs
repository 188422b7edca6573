pub mod cache;
pub mod error;
pub mod message;
pub mod quality;
pub mod traits;
pub mod types;

pub use cache::{ChatCache, DEFAULT_TTL_SECS};
pub use error::BotError;
pub use message::{IncomingMessage, PhotoVariant, DEFAULT_TRIGGER_PHRASE};
pub use quality::{next_quality, NextQuality, QualitySchedule, BASELINE_QUALITY, MIN_QUALITY};
pub use traits::ChatTransport;
pub use types::{ChatId, MediaOrigin, MediaRecord};
