//! Data models for employees and attendance records.

pub mod attendance;
pub mod employee;

pub use attendance::{AttendanceRecord, compute_hours, partition_key, worked_hours};
pub use employee::{Employee, NewEmployee};
