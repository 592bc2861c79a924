mod console_observer;
mod gemini_dispatcher;
mod mock_dispatcher;
mod session_store;

pub use console_observer::*;
pub use gemini_dispatcher::*;
pub use mock_dispatcher::*;
pub use session_store::*;
