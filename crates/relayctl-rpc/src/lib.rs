// relayctl-rpc: raw HTTP clients for both device RPC generations.
//
// Gen1 devices expose a REST-style GET API (`/shelly`, `/settings`,
// `/status`, `/relay/{id}`); Gen2+ devices speak JSON-RPC over HTTP
// POST `/rpc`. relayctl-core decides which client to use per device.

pub mod error;
pub mod gen1;
pub mod gen2;
pub mod transport;

pub use error::Error;
pub use gen1::{Gen1Client, Gen1DeviceIdent, Gen1RelayState};
pub use gen2::{Gen2Client, Gen2DeviceInfo, SwitchSetResult};
pub use transport::TransportConfig;
