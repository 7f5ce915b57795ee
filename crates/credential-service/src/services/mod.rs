//! Business logic for the Credential Service.

pub mod credential_signer;
pub mod local_address;

pub use credential_signer::{CredentialSigner, JwtCredentialSigner};
pub use local_address::{
    resolve_local_address, AddressProbe, InterfaceProbe, SystemAddressProbe, UdpRouteProbe,
};
