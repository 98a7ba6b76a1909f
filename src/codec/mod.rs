//! Typed payload codecs.
//!
//! MQTT only moves bytes. A [`PayloadCodec`] turns a typed value into the
//! payload bytes and back, using a pair of plain functions; a new payload
//! type only needs a new pair of functions, never a new type.
//!
//! Most SIoT payloads are short ASCII strings, so the usual way to build a
//! codec is [`TextPayloadCodec`]: its byte form is always its text form run
//! through the ASCII mapping, so the two views cannot diverge.
//!
//! ```
//! use siot_playground_rs::codec;
//!
//! let celsius = codec::double();
//! assert_eq!(celsius.decode(b"23.5").unwrap(), 23.5);
//! assert_eq!(celsius.encode(&21.25).unwrap(), b"21.25");
//! ```
//!
//! The MQTT client keeps codecs of different value types in one registry,
//! so every codec is also usable through [`ErasedCodec`].

mod ascii;
mod text;

pub use text::TextPayloadCodec;

use std::any::{type_name, Any};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

type EncodeFn<T> = Arc<dyn Fn(&T) -> Result<Vec<u8>, Error> + Send + Sync>;
type DecodeFn<T> = Arc<dyn Fn(&[u8]) -> Result<T, Error> + Send + Sync>;

/// Converts values of `T` to payload bytes and back.
///
/// Immutable after construction. Cloning only bumps reference counts, so a
/// codec can be handed to the MQTT client and kept by the caller at the same
/// time.
pub struct PayloadCodec<T> {
    encoder: EncodeFn<T>,
    decoder: DecodeFn<T>,
}

impl<T: 'static> PayloadCodec<T> {
    pub fn new<E, D>(encoder: E, decoder: D) -> Self
    where
        E: Fn(&T) -> Result<Vec<u8>, Error> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<T, Error> + Send + Sync + 'static,
    {
        PayloadCodec {
            encoder: Arc::new(encoder),
            decoder: Arc::new(decoder),
        }
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, Error> {
        (self.encoder)(value)
    }

    pub fn decode(&self, data: &[u8]) -> Result<T, Error> {
        (self.decoder)(data)
    }
}

impl<T> AsRef<PayloadCodec<T>> for PayloadCodec<T> {
    fn as_ref(&self) -> &PayloadCodec<T> {
        self
    }
}

impl<T> Clone for PayloadCodec<T> {
    fn clone(&self) -> Self {
        PayloadCodec {
            encoder: Arc::clone(&self.encoder),
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl<T> Debug for PayloadCodec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadCodec")
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

/// A codec seen without its value type.
///
/// Values cross this boundary as [`Any`]; handing in a value of another type
/// is reported as [`Error::InvalidArgument`].
pub trait ErasedCodec: Send + Sync {
    /// Name of the value type this codec handles.
    fn value_type(&self) -> &'static str;

    fn encode_any(&self, value: &dyn Any) -> Result<Vec<u8>, Error>;

    fn decode_any(&self, data: &[u8]) -> Result<Box<dyn Any + Send>, Error>;
}

impl<T: Send + 'static> ErasedCodec for PayloadCodec<T> {
    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn encode_any(&self, value: &dyn Any) -> Result<Vec<u8>, Error> {
        let value = value.downcast_ref::<T>().ok_or(Error::InvalidArgument {
            expected: type_name::<T>(),
        })?;
        self.encode(value)
    }

    fn decode_any(&self, data: &[u8]) -> Result<Box<dyn Any + Send>, Error> {
        Ok(Box::new(self.decode(data)?))
    }
}

/// Identity codec for free-text messages.
pub fn string() -> TextPayloadCodec<String> {
    TextPayloadCodec::new(|text: &String| Ok(text.clone()), |text: String| Ok(text))
}

/// Magnitudes outside `[1e-5, 1e16)` are written in exponent form.
const PLAIN_DECIMAL_RANGE: std::ops::Range<f64> = 1e-5..1e16;

/// Codec for numeric sensor values.
///
/// Formatting and parsing do not depend on the locale: the text is the
/// shortest decimal that parses back to the same `f64`, switching to
/// exponent form (`1e300`, `5e-324`) for very large or very small
/// magnitudes. Parsing also takes forms such as `1E+300` and ignores
/// surrounding whitespace.
pub fn double() -> TextPayloadCodec<f64> {
    TextPayloadCodec::new(
        |value: &f64| Ok(format_double(*value)),
        |text: String| {
            text.trim()
                .parse::<f64>()
                .map_err(|e| Error::parse::<f64>(&text, e))
        },
    )
}

fn format_double(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 || !magnitude.is_finite() || PLAIN_DECIMAL_RANGE.contains(&magnitude) {
        value.to_string()
    } else {
        format!("{value:e}")
    }
}

/// Codec for structured payloads sent as JSON text.
///
/// Encoding fails if the document would not decode back into `T`, e.g. a
/// non-finite float that JSON can only write as `null`.
pub fn json<T>() -> TextPayloadCodec<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    TextPayloadCodec::new(
        |value: &T| {
            let encode_error = |reason: String| Error::Encode {
                target: type_name::<T>(),
                reason,
            };
            let text = serde_json::to_string(value).map_err(|e| encode_error(e.to_string()))?;
            serde_json::from_str::<T>(&text)
                .map_err(|e| encode_error(format!("{text} does not decode back: {e}")))?;
            Ok(text)
        },
        |text: String| serde_json::from_str(&text).map_err(|e| Error::parse::<T>(&text, e)),
    )
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid type, can only handle '{expected}'")]
    InvalidArgument { expected: &'static str },

    #[error("parse {target} from {input:?}: {reason}")]
    Parse {
        target: &'static str,
        input: String,
        reason: String,
    },

    #[error("encode {target}: {reason}")]
    Encode { target: &'static str, reason: String },
}

impl Error {
    fn parse<T>(input: &str, reason: impl Display) -> Self {
        Error::Parse {
            target: type_name::<T>(),
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
