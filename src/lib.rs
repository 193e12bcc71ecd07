//! # TMS Rust Backend
//!
//! Multi-tenant school timetable scheduling engine.
//!
//! This crate provides a Rust-based backend for the Timetable Management
//! System (TMS): master timetables with generated period grids, class and
//! teacher bindings onto those grids, schedule entry placement with
//! advisory conflict detection, and weekly/daily views with workload and
//! utilization analytics on top.
//!
//! ## Features
//!
//! - **Period Grids**: Generate daily period grids from school hours,
//!   period length, and break/lunch configuration
//! - **Bindings**: Attach classes and teachers to a master timetable per
//!   academic year and term, one active binding per entity
//! - **Placement**: Atomic placement of schedule entries with referential
//!   checks and reject/replace cell policies
//! - **Conflict Detection**: Teacher and room double-bookings recorded as
//!   advisory conflict records, never blocking the write
//! - **Bulk Operations**: Per-row isolated bulk placement for imports
//! - **Views & Analytics**: Weekly and daily schedule views, teacher
//!   workload, and tenant-level utilization statistics
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier newtypes and Data Transfer Objects (DTOs)
//! - [`models`]: Domain entities shared by every backend
//! - [`db`]: Repository traits, backends, and the service layer
//! - [`services`]: Grid generation, conflict records, views, analytics

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod services;
