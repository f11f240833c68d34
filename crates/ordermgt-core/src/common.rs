//! Shared protocol bindings, error type and domain constants.
//!
//! ## Submodules
//!
//! - [`error`] - The service-wide [`Error`] enum and its `tonic::Status`
//!   mapping.
//! - [`types`] - Sentinel values, shipment naming and the demonstration
//!   dataset.
//! - [`proto`] - Generated `ecommerce` and `helloworld` bindings plus the
//!   encoded descriptor set used by server reflection.

pub mod error;
pub mod types;

pub use error::{Error, Result};

pub mod proto {
    pub mod ecommerce {
        tonic::include_proto!("ecommerce");
    }

    pub mod helloworld {
        tonic::include_proto!("helloworld");
    }

    pub use ecommerce::{
        CombinedShipment, Order, order_management_client, order_management_server,
    };
    pub use helloworld::{HelloReply, HelloRequest, greeter_client, greeter_server};

    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("ordermgt_descriptor");
}
