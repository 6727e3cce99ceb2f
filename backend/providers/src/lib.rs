pub mod adapter;
pub mod backends;
pub mod profile;
pub mod prompts;
pub mod registry;

pub use adapter::{DateFormats, OcrAdapter};
pub use backends::chat_completions::ChatCompletionsBackend;
pub use backends::gemini::GeminiBackend;
pub use backends::mock::MockBackend;
pub use profile::{ApiFlavor, ImageStyle, LicenseSchema, PromptLocale, ProviderProfile, BUILTIN_PLATFORMS};
pub use prompts::PromptSet;
pub use registry::ProviderRegistry;
