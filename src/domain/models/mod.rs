mod completion;
mod endpoint;
mod prompt;
mod session;

pub use completion::*;
pub use endpoint::*;
pub use prompt::*;
pub use session::*;
