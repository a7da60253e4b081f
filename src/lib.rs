//! psc-subnet-monitor
//!
//! Reports how much of each Private Service Connect NAT subnet is in use,
//! for every service attachment below a set of GCP folders.

pub mod config;
pub mod export;
pub mod gcp;
pub mod monitor;

/// Version injected at compile time via PSC_MONITOR_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("PSC_MONITOR_VERSION") {
    Some(v) => v,
    None => "dev",
};
