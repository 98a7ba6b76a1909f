//! JSON documents served by the SIoT platform.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// A SIoT center, as listed by center discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    /// The center's licence, also the center id used in topics.
    #[serde(rename = "licence")]
    pub guid: String,
    pub name: String,
    pub url: String,
    pub port: String,
    #[serde(rename = "webSocketPort")]
    pub web_socket_port: String,
}

/// Description of a sensor or actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorActorManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub zone: Option<Zone>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "valueType")]
    pub value_type: String,
    #[serde(rename = "jsonMapping", default)]
    pub json_mapping: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub guid: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterConfiguration {
    pub storage: String,
}

/// One entry of a sensor's value history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryValue<T> {
    pub data: T,
    #[serde(with = "timestamp::epoch_millis")]
    pub time: DateTime<Local>,
}
