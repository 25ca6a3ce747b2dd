pub mod connection;
pub mod error;
pub mod eval;
pub mod network;
pub mod node;
pub mod port;
pub mod schema;
pub mod topo;
pub mod types;

pub use connection::Connection;
pub use error::{GraphError, RenderError};
pub use eval::{NodeContext, RenderOptions};
pub use node::Node;
pub use plexus_api_core::{PortRange, Value, ValueType};
pub use port::{ChildReference, Port};
pub use topo::topo_order;
pub use types::NodePath;
