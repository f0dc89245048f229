//! An unofficial Rust client for the MonsterAPI text-to-image service.
//!
//! A generation job is submitted with [`MonsterClient::submit`], which returns
//! a [`JobHandle`]. The handle is then polled with
//! [`MonsterClient::poll_until_complete`] until the service reports
//! `COMPLETED`, and the final body can be printed with [`report`].
//!
//! ## Features
//! - Text-to-image, image-to-image and image-editing tasks.
//! - Configurable polling interval, attempt cap and cancellation.
//! - Helpers for downloading the generated images.
//! - Typed error handling.

pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use client::MonsterClient;
pub use config::{Credentials, PollConfig};
pub use error::MonsterError;
pub use report::{report, COMPLETION_MARKER};
pub use types::{
    AspectRatio, GenerationRequest, JobHandle, Model, StatusResponse, TaskResult, TaskState,
    TaskStatusData, TaskStatusMessage,
};
pub use tokio_util::sync::CancellationToken;
