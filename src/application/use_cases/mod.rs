mod submit_prompt;

pub use submit_prompt::*;
