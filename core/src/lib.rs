// core/src/lib.rs

//! Tiffin core: the rules of a multi-role food-delivery platform and the
//! small step-pipeline engine the server builds its workflows on.
//!
//!  - `domain`: roles and approval gating, the order lifecycle state machine,
//!    checkout pricing, cart and rating rules, dashboard aggregation.
//!  - `flow`: named, traceable steps sharing one lock-guarded context, and a
//!    registry that picks a pipeline by the type of data it runs over.

pub mod domain;
pub mod flow;

pub use crate::domain::{
  AccountStanding, DomainError, FeeSchedule, LoginRefusal, OrderStatus, PriceBreakdown, RiderStatus, Role, RoleSet,
};
pub use crate::flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult, Registry};
