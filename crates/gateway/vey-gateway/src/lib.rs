//! The shipping-validation and PID-resolution gateway: translates a
//! shipping request into a structure+membership+policy check with a
//! waybill, and gates clear-text address release behind signed policies
//! with a full audit trail.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod gateway;
pub mod resolver;
pub mod shipping;
pub mod waybill;

pub use collaborators::{
    AuditSink, Clock, CollaboratorError, FixedClock, MemoryAuditSink, MemoryVcStore,
    SystemClock, VcStore,
};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use gateway::Gateway;
pub use resolver::{ResolveRequest, ResolveResponse};
pub use shipping::{
    CompositeShippingProof, ParcelInfo, ShippingConditions, ShippingRequest,
    ShippingValidation,
};
pub use waybill::{TrackingEvent, TrackingStatus, WaybillMetadata, ZkpWaybill};
