pub mod event;
pub mod reactor;
pub mod session;
pub mod telemetry;

pub use event::{Event, MountId, UserInput};
pub use reactor::{MountedView, Reactor, ReactorConfig, Screen, SideEffect};
pub use session::{route, Route, RouteDecision, SessionGate, SessionKind, SessionStatus, View};
