//! Protobuf types and gRPC service definitions for Roster.
//!
//! This crate provides the generated `roster.v1` message types along with
//! the tonic client and server traits for the user and post services. It is
//! kept separate from the server crate so that consumers needing only the
//! wire-format types (e.g. test harnesses or future SDKs) can avoid pulling
//! in the storage stack.

#![deny(unsafe_code)]
// gRPC services return tonic::Status - standard practice for gRPC error handling
#![allow(clippy::result_large_err)]

/// Generated protobuf types and service traits.
pub mod proto {
    #![allow(clippy::all)]
    #![allow(missing_docs)]

    // Use pre-generated code when proto files or protoc aren't available
    #[cfg(use_pregenerated_proto)]
    include!("generated/roster.v1.rs");

    // Use build-time generated code in development
    #[cfg(not(use_pregenerated_proto))]
    tonic::include_proto!("roster.v1");
}
