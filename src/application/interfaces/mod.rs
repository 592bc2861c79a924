mod completion_dispatcher;
mod session_observer;

pub use completion_dispatcher::*;
pub use session_observer::*;
