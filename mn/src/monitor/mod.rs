//! Status checks and the reconnection supervisor

mod backoff;
mod check;
mod connector;
mod supervisor;

pub use backoff::{ConnectOutcome, Connection, RetryPolicy, connect_once, connect_with_retry};
pub use check::{CheckReport, Monitor};
pub use connector::{Connector, TcpConnector};
pub use supervisor::{Supervisor, SupervisorError, SupervisorSettings, connect_initial};
