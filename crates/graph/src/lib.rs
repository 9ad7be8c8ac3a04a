//! # Atlas Graph
//!
//! Cross-channel reference graph: load a mention dump, resolve channel
//! names, find the shortest reference chain between two channels.
//!
//! ## Architecture
//!
//! ```text
//! channel-links.jsonl
//!     │
//!     ├──> Loader (one record per line)
//!     │      ├─ Drop private channels (name == id)
//!     │      ├─ Register channels (first seen name wins)
//!     │      ├─ Append references + pair metadata
//!     │      └─ Build name + adjacency indexes
//!     │
//!     ├──> Channel Graph (petgraph)
//!     │      ├─ Nodes: channels (id, display name, connection count)
//!     │      └─ Edges: references (message link, message date)
//!     │
//!     └──> Path Finder
//!            ├─ Breadth-first search over the adjacency index
//!            ├─ Shortest chain by hop count
//!            └─ Hop metadata from the pair index
//! ```

mod types;
mod loader;
mod path;
mod error;

pub use types::{Channel, ChannelGraph, LinkInfo};
pub use loader::{load_path, load_reader, load_str, LoadStats};
pub use path::ChannelPath;
pub use error::{Result, GraphError};
