//! SIoT data topics, `siot/DAT/{center}/{sensor}`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

const PREFIX: &str = "siot/DAT";

/// Identifier of a sensor or actor. Always a GUID, either hyphenated or in
/// the 32-digit simple form; the text is kept as given since the broker
/// matches topics byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SensorId(String);

impl SensorId {
    pub fn new<T: AsRef<str>>(id: T) -> Result<SensorId, Error> {
        let id = id.as_ref();
        uuid::Uuid::try_parse(id).map_err(|_| Error::InvalidSensorId(id.to_string()))?;
        Ok(SensorId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SensorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The data topic of one sensor in one center.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataTopic {
    center_id: String,
    sensor_id: SensorId,
}

impl DataTopic {
    pub fn new<T: AsRef<str>>(center_id: T, sensor_id: SensorId) -> Result<DataTopic, Error> {
        let center_id = center_id.as_ref();
        if center_id.is_empty() || center_id.contains(['/', '+', '#']) {
            return Err(Error::InvalidCenterId(center_id.to_string()));
        }

        Ok(DataTopic {
            center_id: center_id.to_string(),
            sensor_id,
        })
    }

    pub fn center_id(&self) -> &str {
        &self.center_id
    }

    pub fn sensor_id(&self) -> &SensorId {
        &self.sensor_id
    }
}

impl Display for DataTopic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", PREFIX, self.center_id, self.sensor_id)
    }
}

impl FromStr for DataTopic {
    type Err = Error;

    fn from_str(topic: &str) -> Result<Self, Self::Err> {
        let rest = topic
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| Error::NotADataTopic(topic.to_string()))?;

        let (center_id, sensor_id) = rest
            .split_once('/')
            .ok_or_else(|| Error::NotADataTopic(topic.to_string()))?;

        DataTopic::new(center_id, SensorId::new(sensor_id)?)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("not a SIoT data topic: {0:?}")]
    NotADataTopic(String),

    #[error("invalid center id: {0:?}")]
    InvalidCenterId(String),

    #[error("invalid sensor id: {0:?}")]
    InvalidSensorId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: &str = "F386-09CA-1F9F-9A1F-BAD3-F573-64A0-2A22";

    #[test]
    fn renders_data_topic() {
        let sensor = SensorId::new("31B0E939B27C45229CB75A06B1E47919").unwrap();
        let topic = DataTopic::new(CENTER, sensor).unwrap();
        assert_eq!(
            topic.to_string(),
            "siot/DAT/F386-09CA-1F9F-9A1F-BAD3-F573-64A0-2A22/31B0E939B27C45229CB75A06B1E47919"
        );
    }

    #[test]
    fn parses_topic_and_keeps_sensor_text() {
        let raw = "siot/DAT/F386-09CA-1F9F-9A1F-BAD3-F573-64A0-2A22/14760cc8-4cea-c63c-a825-cef162c16146";
        let topic: DataTopic = raw.parse().unwrap();
        assert_eq!(topic.center_id(), CENTER);
        assert_eq!(topic.sensor_id().as_str(), "14760cc8-4cea-c63c-a825-cef162c16146");
        assert_eq!(topic.to_string(), raw);
    }

    #[test]
    fn rejects_foreign_topics() {
        assert!(matches!("siot/CFG/x/y".parse::<DataTopic>(), Err(Error::NotADataTopic(_))));
        assert!(matches!("siot/DAT/only-center".parse::<DataTopic>(), Err(Error::NotADataTopic(_))));
        assert!(matches!(
            format!("siot/DAT/{CENTER}/not-a-guid").parse::<DataTopic>(),
            Err(Error::InvalidSensorId(_))
        ));
    }

    #[test]
    fn rejects_wildcards_in_center() {
        let sensor = SensorId::new("52AF61E9-CDE0-480F-A7C4-7E0F01D23C93").unwrap();
        assert!(DataTopic::new("+", sensor.clone()).is_err());
        assert!(DataTopic::new("", sensor).is_err());
    }
}
