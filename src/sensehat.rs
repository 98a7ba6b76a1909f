//! Payloads understood by the Raspberry Pi Sense HAT bridge.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::codec::{self, TextPayloadCodec};

/// One reading of the Sense HAT environment sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SenseHatEnvironment {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent relative humidity.
    pub humidity: f64,
    /// Millibar.
    pub pressure: f64,
}

impl SenseHatEnvironment {
    /// The environment is published as one JSON document.
    pub fn codec() -> TextPayloadCodec<SenseHatEnvironment> {
        codec::json()
    }
}

impl Display for SenseHatEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temperature={:.2}, Humidity={:.2}, Pressure={}",
            self.temperature,
            self.humidity,
            group_thousands(self.pressure)
        )
    }
}

/// Two decimals with `,` between groups of thousands.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", fixed.as_str()),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{fraction}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLUE_VIOLET: Rgb = Rgb::new(138, 43, 226);
    pub const NAVY: Rgb = Rgb::new(0, 0, 128);
    pub const PEACH_PUFF: Rgb = Rgb::new(255, 218, 185);

    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }
}

pub const LED_MATRIX_SIZE: usize = 8;

/// The 8x8 LED matrix, all pixels off by default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedMatrix {
    pixels: [[Rgb; LED_MATRIX_SIZE]; LED_MATRIX_SIZE],
}

impl LedMatrix {
    pub fn new() -> LedMatrix {
        LedMatrix::default()
    }

    /// Returns `None` if the coordinate is off the matrix.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        self.pixels.get(x)?.get(y).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, color: Rgb) -> Result<(), Error> {
        let pixel = self
            .pixels
            .get_mut(x)
            .and_then(|column| column.get_mut(y))
            .ok_or(Error::OutOfMatrix { x, y })?;
        *pixel = color;
        Ok(())
    }

    /// The frame as the bridge expects it: `x,y,r,g,b` for every pixel,
    /// x-major, all comma separated.
    pub fn to_payload(&self) -> String {
        let mut fields = Vec::with_capacity(LED_MATRIX_SIZE * LED_MATRIX_SIZE * 5);
        for (x, column) in self.pixels.iter().enumerate() {
            for (y, pixel) in column.iter().enumerate() {
                fields.extend([
                    x.to_string(),
                    y.to_string(),
                    pixel.r.to_string(),
                    pixel.g.to_string(),
                    pixel.b.to_string(),
                ]);
            }
        }
        fields.join(",")
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("pixel ({x}, {y}) is outside the LED matrix")]
    OutOfMatrix { x: usize, y: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_display() {
        let env = SenseHatEnvironment {
            temperature: 23.456,
            humidity: 45.0,
            pressure: 1013.254,
        };
        assert_eq!(env.to_string(), "Temperature=23.46, Humidity=45.00, Pressure=1,013.25");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(1234567.8), "1,234,567.80");
        assert_eq!(group_thousands(-98765.4), "-98,765.40");
    }

    #[test]
    fn environment_json_round_trip() {
        let codec = SenseHatEnvironment::codec();
        let env: SenseHatEnvironment = codec
            .decode(br#"{"temperature":21.5,"humidity":40.25,"pressure":1002.0}"#)
            .unwrap();
        assert_eq!(env.pressure, 1002.0);

        let bytes = codec.encode(&env).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), env);
    }

    #[test]
    fn non_finite_reading_does_not_encode() {
        let env = SenseHatEnvironment {
            temperature: f64::NAN,
            humidity: 1.0,
            pressure: f64::INFINITY,
        };
        assert!(matches!(
            SenseHatEnvironment::codec().encode(&env),
            Err(codec::Error::Encode { .. })
        ));
    }

    #[test]
    fn led_payload_layout() {
        let mut leds = LedMatrix::new();
        leds.set(0, 0, Rgb::RED).unwrap();
        leds.set(2, 7, Rgb::BLUE_VIOLET).unwrap();

        let payload = leds.to_payload();
        let fields: Vec<&str> = payload.split(',').collect();
        assert_eq!(fields.len(), 64 * 5);
        assert_eq!(&fields[..10], ["0", "0", "255", "0", "0", "0", "1", "0", "0", "0"]);

        // pixel (2, 7) is the 24th entry
        let start = (2 * 8 + 7) * 5;
        assert_eq!(&fields[start..start + 5], ["2", "7", "138", "43", "226"]);
    }

    #[test]
    fn led_bounds() {
        let mut leds = LedMatrix::new();
        assert_eq!(leds.set(8, 0, Rgb::NAVY), Err(Error::OutOfMatrix { x: 8, y: 0 }));
        assert_eq!(leds.get(0, 8), None);
        assert_eq!(leds.get(7, 7), Some(Rgb::BLACK));
    }
}
