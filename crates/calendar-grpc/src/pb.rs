//! Protobuf messages and tonic glue generated from `proto/event_service.proto`.

#![allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::restriction
)]

tonic::include_proto!("event");
