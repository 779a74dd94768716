//! Moodshift - client for a remote audio effects service
//!
//! The library drives one processing job at a time from submission to its
//! terminal outcome: it builds the effects chain, uploads the audio, polls
//! the job's status and renders every step through a [`session::StatusView`].

pub mod client;
pub mod config;
pub mod effects;
pub mod job;
pub mod poller;
pub mod render;
pub mod session;
pub mod status;
pub mod terminal;
