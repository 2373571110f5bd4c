//! Poll-driven daemon runtime: the fetch + reconcile loop and status socket.

mod error;
pub mod paths;
pub mod protocol;
mod runtime;
pub mod state;

pub use error::DaemonError;
pub use protocol::{
    request_panel, request_status, request_stop, send_request, DaemonRequest, DaemonResponse,
};
pub use runtime::{run, start_blocking, SharedState};
