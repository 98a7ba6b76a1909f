//! Console demos against the SIoT broker.
//!
//! Every action connects, subscribes or publishes a handful of messages and
//! returns; the connection is closed when its client goes out of scope.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Write};

use futures::executor::block_on;
use rand::Rng;

use crate::codec;
use crate::config::SiotConfig;
use crate::mq::{self, SiotClient};
use crate::sensehat::{self, LedMatrix, Rgb};
use crate::topic::{self, DataTopic, SensorId};

const TEMPERATURE_SENSOR: &str = "31B0E939B27C45229CB75A06B1E47919";
const HUMIDITY_SENSOR: &str = "EB5E6260F83E4118A919C226CAC1E82B";
const PRESSURE_SENSOR: &str = "CF8EB59A961B4C58A075A822485708FB";
const MESSAGE_ACTOR: &str = "14760cc8-4cea-c63c-a825-cef162c16146";
const TEST_SENSOR: &str = "52AF61E9-CDE0-480F-A7C4-7E0F01D23C93";

/// Messages published per sensor by the publishing demos.
const PUBLISH_ROUNDS: usize = 5;

pub struct Action {
    pub name: &'static str,
    pub run: fn(&SiotConfig) -> Result<(), Error>,
}

pub const ACTIONS: &[Action] = &[
    Action {
        name: "SenseHatEnvironment",
        run: sense_hat_environment,
    },
    Action {
        name: "SenseHatMessage",
        run: sense_hat_message,
    },
    Action {
        name: "SenseHatLedArray",
        run: sense_hat_led_array,
    },
    Action {
        name: "MqttTest",
        run: mqtt_test,
    },
];

fn data_topic(config: &SiotConfig, sensor: &str) -> Result<DataTopic, Error> {
    Ok(DataTopic::new(&config.center_id, SensorId::new(sensor)?)?)
}

/// Write one line with stdout locked, so lines from concurrent deliveries
/// never interleave.
fn print_line(line: fmt::Arguments<'_>) {
    let mut out = io::stdout().lock();
    if let Err(e) = writeln!(out, "{line}") {
        tracing::warn!(error = %e, "failed to write to the console");
    }
}

fn read_line(prompt: Option<&str>) -> Result<String, Error> {
    if let Some(prompt) = prompt {
        let mut out = io::stdout().lock();
        write!(out, "{prompt}")?;
        out.flush()?;
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print the environment sensors as they arrive, then publish random
/// readings once Enter is pressed.
fn sense_hat_environment(config: &SiotConfig) -> Result<(), Error> {
    let temperature = data_topic(config, TEMPERATURE_SENSOR)?;
    let humidity = data_topic(config, HUMIDITY_SENSOR)?;
    let pressure = data_topic(config, PRESSURE_SENSOR)?;

    let labels: HashMap<String, &'static str> = HashMap::from([
        (temperature.to_string(), "Temperature (°C)"),
        (humidity.to_string(), "Humidity (% rel)"),
        (pressure.to_string(), "Pressure (mbar)"),
    ]);

    let client = SiotClient::from_config(config)?;
    client.on_message(move |delivery| {
        let label = labels.get(delivery.topic()).copied().unwrap_or(delivery.topic());
        if let Some(value) = delivery.value::<f64>() {
            print_line(format_args!("{label:<20}: {value:.2}"));
        }
    });

    let reading = codec::double();
    block_on(async {
        client.connect().await?;
        for topic in [&temperature, &humidity, &pressure] {
            client.subscribe(topic, codec::double()).await?;
        }

        read_line(None)?;

        let mut rng = rand::rng();
        for _ in 0..PUBLISH_ROUNDS {
            client
                .publish(&temperature, &reading, &(rng.random::<f64>() * 20.0 + 20.0))
                .await?;
            client
                .publish(&humidity, &reading, &(rng.random::<f64>() * 20.0 + 20.0))
                .await?;
            client
                .publish(&pressure, &reading, &(1000.0 + (rng.random::<f64>() - 0.5) * 100.0))
                .await?;
        }
        Ok(())
    })
}

/// Send one line of text to the Sense HAT display.
fn sense_hat_message(config: &SiotConfig) -> Result<(), Error> {
    let topic = data_topic(config, MESSAGE_ACTOR)?;
    let message = read_line(Some("Enter message: "))?;

    let client = SiotClient::from_config(config)?;
    block_on(async {
        client.connect().await?;
        client.publish(&topic, &codec::string(), &message).await?;
        Ok(())
    })
}

/// Light four pixels of the LED matrix.
fn sense_hat_led_array(config: &SiotConfig) -> Result<(), Error> {
    let topic = data_topic(config, MESSAGE_ACTOR)?;

    let mut leds = LedMatrix::new();
    leds.set(0, 0, Rgb::RED)?;
    leds.set(2, 7, Rgb::BLUE_VIOLET)?;
    leds.set(5, 5, Rgb::NAVY)?;
    leds.set(4, 3, Rgb::PEACH_PUFF)?;

    let client = SiotClient::from_config(config)?;
    block_on(async {
        client.connect().await?;
        client.publish(&topic, &codec::string(), &leds.to_payload()).await?;
        Ok(())
    })
}

/// Echo a single test sensor, then publish random values to it.
fn mqtt_test(config: &SiotConfig) -> Result<(), Error> {
    let topic = data_topic(config, TEST_SENSOR)?;

    let client = SiotClient::from_config(config)?;
    client.on_message(|delivery| {
        if let Some(value) = delivery.value::<f64>() {
            print_line(format_args!("{value:.2}"));
        }
    });

    let codec = codec::double();
    block_on(async {
        client.connect().await?;
        client.subscribe(&topic, codec.clone()).await?;

        read_line(None)?;

        let mut rng = rand::rng();
        for _ in 0..PUBLISH_ROUNDS {
            client.publish(&topic, &codec, &(rng.random::<f64>() * 50.0 + 50.0)).await?;
        }
        Ok(())
    })
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("console i/o: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Mqtt(#[from] mq::Error),

    #[error(transparent)]
    Topic(#[from] topic::Error),

    #[error(transparent)]
    LedMatrix(#[from] sensehat::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_are_unique() {
        let mut names: Vec<&str> = ACTIONS.iter().map(|a| a.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ACTIONS.len());
    }

    #[test]
    fn fixed_sensors_make_valid_topics() {
        let config = SiotConfig::default();
        for sensor in [TEMPERATURE_SENSOR, HUMIDITY_SENSOR, PRESSURE_SENSOR, MESSAGE_ACTOR, TEST_SENSOR] {
            let topic = data_topic(&config, sensor).unwrap();
            assert_eq!(topic.to_string().parse::<DataTopic>().unwrap(), topic);
        }
    }

    #[test]
    fn invalid_center_is_reported() {
        let config = SiotConfig {
            center_id: "a/b".to_string(),
            ..SiotConfig::default()
        };
        assert!(matches!(data_topic(&config, TEST_SENSOR), Err(Error::Topic(_))));
    }
}
