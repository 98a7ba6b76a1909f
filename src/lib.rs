//! # SIoT Playground
//!
//! Console demos for the [siot.net](https://siot.net) IoT platform: publish
//! and subscribe Sense HAT sensor values over MQTT, and decode the JSON
//! documents the platform serves.
//!
//! The reusable parts are the typed payload codecs in [`codec`] and the
//! wire timestamp conversion in [`timestamp`].

pub mod actions;
pub mod codec;
pub mod config;
pub mod menu;
pub mod mq;
pub mod sensehat;
pub mod siot;
pub mod timestamp;
pub mod topic;
