//! Control plane API: endpoint discovery and the launch client.

mod client;
pub mod discovery;
mod types;

pub use client::{ApiClient, ControlPlane};
pub use discovery::{EndpointDescriptor, SESSION_DESCRIPTOR_PATH, resolve_base_url};
pub use types::{
    ApiErrorBody, HEALTH_PATH, LaunchTicketRequest, LaunchTicketResponse, WRAPPER_ID, launch_path,
};
