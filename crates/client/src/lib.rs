// eden-console client library
// Session and transport layer of the Eden ops console

// Configuration
pub mod config;

// Errors and user notifications
pub mod error;
pub mod notify;

// Credential and durable client-side storage
pub mod credential;
pub mod prefs;
pub mod store;

// HTTP transport and session lifecycle
pub mod session;
pub mod transport;

// Navigation guard and route permissions
pub mod guard;

// Endpoint wrappers
pub mod api;

// Wiring
pub mod console;

pub use config::ClientConfig;
pub use console::Console;
pub use credential::{password_digest, Credential};
pub use error::{ErrorKind, RequestError};
pub use guard::{GuardDecision, NavigationGuard, RouteRecord};
pub use session::{SessionController, SessionState, SessionView};
pub use transport::{ApiRequest, Transport};

// Wire types
pub use eden_console_protocol as protocol;
