// Narration of ranked moves: Claude streaming client, prompts, localized
// templates, and the composer that chooses between them.

pub mod client;
pub mod compose;
pub mod prompt;
pub mod template;
