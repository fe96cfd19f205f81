//! Error kind to display text

use freshseed_core::SeedError;

/// Maps an error kind to the text shown to the user
pub trait ErrorMessages: Send + Sync {
    fn message(&self, error: SeedError) -> String;
}

/// Built-in English messages
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl ErrorMessages for EnglishMessages {
    fn message(&self, error: SeedError) -> String {
        match error {
            SeedError::NoInternetConnection => "No internet connection",
            SeedError::ServerError => "Server error, please try again later",
            SeedError::ExpiredToken => "This code has expired",
            SeedError::InvalidQrGeneration => "invalid QR generation",
            SeedError::Unknown => "Something went wrong",
        }
        .to_string()
    }
}
