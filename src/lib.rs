// Community Portal - Core Library
// Exposes the catalog, registration workflow and surfaces for the CLI,
// the terminal UI, the API server and tests

pub mod event;
pub mod catalog;
pub mod registration;
pub mod form;
pub mod fetch;
pub mod config;
pub mod logging;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
pub mod ui;

// Only compile the HTTP API when server feature is enabled
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use event::{category_icon, EventDraft, EventRecord};
pub use catalog::{is_valid, Catalog, CatalogError, ALL_CATEGORIES};
pub use registration::{register, Registrar, RegistrationError};
pub use form::{
    complete_submission, submit_direct, submit_simulated, Confirmation, FormError,
    RegistrationBackend, RegistrationForm, SimulatedBackend, Submission, SubmitError, SubmitFlow,
};
pub use fetch::{
    fetch_events, EventSource, FetchError, FetchResponse, FileSource, LoadingFlag,
    LoadingIndicator, FETCH_ERROR_MESSAGE,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
