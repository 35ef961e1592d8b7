use serde::{Deserialize, Serialize};

/// Payload of the contact form. All three fields are required; the
/// email must look like an address (contains `@`). Name and email end
/// up in mail headers, so line breaks in them are rejected outright.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Returns the first validation problem, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required.".to_string());
        }
        if self.name.contains(['\r', '\n']) {
            return Err("Name must not contain line breaks.".to_string());
        }
        if self.email.trim().is_empty()
            || !self.email.contains('@')
            || self.email.contains(['\r', '\n'])
        {
            return Err("A valid email is required.".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("Message is required.".to_string());
        }
        Ok(())
    }
}
