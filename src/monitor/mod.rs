//! Utilization computation and aggregation.
//!
//! - [`cidr`] - CIDR parsing and address counting
//! - [`utilization`] - Per-subnet capacity and the attachment average
//! - [`record`] - The exported record and its nine cells
//! - [`discovery`] - Attachment discovery and subnet resolution per project
//! - [`pipeline`] - The sequential run over a folder hierarchy

pub mod cidr;
pub mod discovery;
pub mod pipeline;
pub mod record;
pub mod utilization;

pub use pipeline::{run, Report, RunSummary};
pub use record::{UtilizationRecord, HEADER};
pub use utilization::{Measure, SubnetCapacity, SubnetUsage, RESERVED_IPS, UNAVAILABLE};
