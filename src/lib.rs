//! Dubber - Video Dubbing Workflow
//!
//! Uploads a local or YouTube-sourced video to the ElevenLabs dubbing API,
//! waits for the job to finish, and downloads the dubbed media.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod dubbing;
pub mod source;
pub mod poll;
pub mod fetch;
pub mod media;
pub mod console;
pub mod error;
