//! gRPC API for the calendar service.
//!
//! Serves `event.EventService` (see `proto/event_service.proto`) over
//! tonic. The crate is split into:
//!
//! - [`pb`] -- protobuf messages, server and client, generated at build time
//! - [`convert`] -- validation and conversion between wire and core types
//! - [`service`] -- [`CalendarGrpcService`], the RPC handlers
//! - [`error`] -- storage error to `tonic::Status` mapping
//! - [`logging`] -- per-call logging layer
//! - [`server`] -- [`GrpcServer`] bind and serve with graceful shutdown
//!
//! Storage errors map onto distinct codes: a busy slot is
//! `FailedPrecondition`, a missing ID is `NotFound`, a duplicate ID is
//! `AlreadyExists`, and backend failures are an opaque `Internal`.

// Handlers and validators return `tonic::Status`, which is larger than
// the lint threshold.
#![allow(clippy::result_large_err)]

pub mod convert;
pub mod error;
pub mod logging;
pub mod pb;
pub mod server;
pub mod service;

// Re-export primary types for convenience.
pub use error::GrpcServerError;
pub use logging::GrpcLogLayer;
pub use server::GrpcServer;
pub use service::CalendarGrpcService;
