pub mod feedback;
pub mod translation;
pub mod usage;
pub mod user;

pub use feedback::{Feedback, SubmitFeedbackRequest};
pub use translation::{
    SelectedLanguages, TranslateRequest, TranslateResponse, TranslationRecord,
    TranslationSettings, TranslationStats,
};
pub use usage::{Identity, UsageLimit};
pub use user::{
    ChangePasswordRequest, LoginRequest, SignupRequest, UpdateProfileRequest, User, UserResponse,
};
