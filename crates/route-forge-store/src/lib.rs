pub mod atomic;
pub mod error;
pub mod fs;
pub mod state;
pub mod traits;

pub use atomic::{write_atomic, StagedFile};
pub use error::StoreError;
pub use fs::FsRouteStore;
pub use state::StateStore;
pub use traits::{MemoryRouteStore, RouteStore};
