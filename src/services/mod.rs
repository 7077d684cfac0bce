pub mod elevenlabs;
pub mod feedback;
pub mod gemini;
pub mod history;
pub mod rate_limit;
pub mod session;
pub mod speech;
pub mod translation;
pub mod usage;
pub mod user;

pub use elevenlabs::ElevenLabsService;
pub use feedback::FeedbackService;
pub use gemini::GeminiClient;
pub use history::{HistoryService, NewTranslation};
pub use rate_limit::{RateLimitRule, RateLimiter};
pub use session::{SessionData, SessionService, SESSION_COOKIE};
pub use speech::SpeechService;
pub use translation::TranslationService;
pub use usage::{MemoryUsageStore, RedisUsageStore, UsageService, UsageStore};
pub use user::UserService;
