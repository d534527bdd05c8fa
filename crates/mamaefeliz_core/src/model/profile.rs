//! Caller profile used to personalize assistant prompts.

use serde::{Deserialize, Serialize};

/// Onboarding data the chat flow may prepend to prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub mom_name: String,
    pub baby_name: String,
    /// Free-form date text exactly as typed during onboarding.
    pub baby_birth_date: String,
}

impl UserProfile {
    /// Context sentence prepended to prompts; never shown to the user.
    pub fn context_prefix(&self) -> String {
        format!(
            "(Contexto: Sou a mãe {}, meu bebê se chama {} e nasceu em {}). ",
            self.mom_name, self.baby_name, self.baby_birth_date
        )
    }
}
