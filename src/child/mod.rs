//! Emulator child process: launch, output draining, and signalling.

mod reader;
mod signal;
mod supervisor;


pub use reader::{spawn_line_reader, strip_sentinel, FLUSH_SENTINEL};
pub use signal::{realtime_range, send_signal};
pub use supervisor::{
    augmented_env, ChildState, ChildStreams, ChildSupervisor, MODULE_PATH_VAR, PATH_VAR,
};
