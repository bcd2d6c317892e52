//! Domain models for the stress engine

pub mod context;
pub mod event;
pub mod pool;
pub mod protocol;

// Re-exports
pub use context::{SimulationContext, StateMap};
pub use event::{EngineEvent, EventLog};
pub use pool::{InMemoryLendingPool, InMemoryOracle, PoolPosition};
pub use protocol::{
    LendingProtocol, LiquidationOutcome, PositionView, PriceOracle, ProtocolClone, ProtocolError,
};
