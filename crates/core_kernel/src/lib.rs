//! Core Kernel - Foundational types for the brokerage system
//!
//! This crate provides the building blocks shared by every domain module:
//! - Strongly-typed identifiers
//! - Human-readable reference numbers for policies, invoices and claims
//! - Port infrastructure for swappable storage adapters

pub mod identifiers;
pub mod numbering;
pub mod ports;
pub mod error;

pub use identifiers::{
    UserId, ClientId, AgentId, PolicyId, BeneficiaryId,
    InvoiceId, PaymentId, ClaimId, NoteId,
};
pub use numbering::ReferenceNumber;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
