mod lattice;

pub type HubReplyMessage = lattice::hub_reply::Message;

pub use lattice::agent_client::AgentClient;
pub use lattice::agent_server::{Agent, AgentServer};
pub use lattice::hub_client::HubClient;
pub use lattice::hub_server::{Hub, HubServer};
pub use lattice::*;
