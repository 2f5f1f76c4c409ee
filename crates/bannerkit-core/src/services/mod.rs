//! Ports to the image-generation and background-removal services.
//!
//! The editor never talks to a network itself. Callers implement
//! [`ImageGenerator`] and [`BackgroundRemover`] (or drive the requests from
//! JavaScript and use the [`response`] decoders), and the editor applies the
//! results through its request tokens.

pub mod prompt;
pub mod response;

use thiserror::Error;
use tracing::{info, warn};

use crate::composition::ImageRef;

pub use prompt::{render_prompt, PROMPT_TOKEN};
pub use response::{parse_generation_response, parse_removal_response, removal_bytes_to_image};

/// Errors reported by the collaborator services.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// The request never reached the service or the connection failed
    #[error("Network error: {0}")]
    Network(String),

    /// The service refused because of rate limits or exhausted credits
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// The response could not be decoded into an image
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    /// Credentials or endpoint are missing
    #[error("Service not configured: {0}")]
    NotConfigured(String),

    /// The service answered with an error of its own
    #[error("Service rejected the request: {0}")]
    Rejected(String),

    /// Nothing to generate from
    #[error("Prompt is empty")]
    EmptyPrompt,
}

impl ServiceError {
    /// Classify an error message returned in a response body.
    pub fn from_remote_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if ["quota", "exhausted", "rate limit", "credits"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            ServiceError::Quota(message.to_string())
        } else if lower.contains("not configured") || lower.contains("api key") {
            ServiceError::NotConfigured(message.to_string())
        } else {
            ServiceError::Rejected(message.to_string())
        }
    }
}

/// Text-to-image generation.
pub trait ImageGenerator {
    /// Generate an image for a fully rendered prompt.
    fn generate(&self, prompt: &str) -> Result<ImageRef, ServiceError>;
}

/// Background removal.
pub trait BackgroundRemover {
    /// Return a copy of `image` with the background made transparent.
    fn remove_background(&self, image: &ImageRef) -> Result<ImageRef, ServiceError>;
}

impl<F> ImageGenerator for F
where
    F: Fn(&str) -> Result<ImageRef, ServiceError>,
{
    fn generate(&self, prompt: &str) -> Result<ImageRef, ServiceError> {
        self(prompt)
    }
}

impl<F> BackgroundRemover for F
where
    F: Fn(&ImageRef) -> Result<ImageRef, ServiceError>,
{
    fn remove_background(&self, image: &ImageRef) -> Result<ImageRef, ServiceError> {
        self(image)
    }
}

/// Outcome of a background removal that never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundRemoval {
    pub image: ImageRef,
    /// Set when removal failed and `image` is the original.
    pub warning: Option<ServiceError>,
}

/// Remove the background, keeping the original image if the service fails.
pub fn remove_background_or_original<R>(remover: &R, image: ImageRef) -> BackgroundRemoval
where
    R: BackgroundRemover + ?Sized,
{
    match remover.remove_background(&image) {
        Ok(cleaned) => BackgroundRemoval {
            image: cleaned,
            warning: None,
        },
        Err(err) => {
            warn!(error = %err, "Background removal failed, keeping original image");
            BackgroundRemoval {
                image,
                warning: Some(err),
            }
        }
    }
}

/// Generate an image from a theme template and strip its background.
///
/// Generation errors are returned; a removal failure only produces a
/// warning on the result.
pub fn generate_with_background_removal<G, R>(
    generator: &G,
    remover: &R,
    template: &str,
    user_text: &str,
) -> Result<BackgroundRemoval, ServiceError>
where
    G: ImageGenerator + ?Sized,
    R: BackgroundRemover + ?Sized,
{
    let prompt = render_prompt(template, user_text)?;
    let generated = generator.generate(&prompt)?;
    info!(
        width = generated.natural_width,
        height = generated.natural_height,
        "Generated image"
    );
    Ok(remove_background_or_original(remover, generated))
}
