pub mod audit;
pub mod kmz;

pub use audit::{cleanup_old_audit_files, write_audit_csv, AuditRecord};
pub use kmz::write_kmz;
