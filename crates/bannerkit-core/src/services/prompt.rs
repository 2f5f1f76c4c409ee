//! Prompt templating for image generation.

use super::ServiceError;

/// Token replaced by the user's text in a theme prompt template.
pub const PROMPT_TOKEN: &str = "{prompt}";

/// Fill `template` with the user's subject text.
///
/// Every `{prompt}` token is replaced. A template without the token gets
/// the text appended after a space.
pub fn render_prompt(template: &str, user_text: &str) -> Result<String, ServiceError> {
    let subject = user_text.trim();
    if subject.is_empty() {
        return Err(ServiceError::EmptyPrompt);
    }

    let template = template.trim();
    if template.contains(PROMPT_TOKEN) {
        Ok(template.replace(PROMPT_TOKEN, subject))
    } else if template.is_empty() {
        Ok(subject.to_string())
    } else {
        Ok(format!("{template} {subject}"))
    }
}
