pub mod bitfield;
pub mod converter;
pub mod light;
pub mod manager;
pub mod pool;
pub mod portal;
pub mod room;
pub mod sob;

pub use bitfield::BitField;
pub use light::Light;
pub use manager::RoomManager;
pub use pool::{PlanePool, PoolSlot, PLANE_POOL_SIZE};
pub use portal::Portal;
pub use room::Room;
pub use sob::Sob;

/// Portal hops a single trace will follow before pruning the branch.
pub const MAX_TRACE_DEPTH: usize = 8;
