use std::any::{type_name, Any};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use super::{ascii, Error, ErasedCodec, PayloadCodec};

type TextEncodeFn<T> = Arc<dyn Fn(&T) -> Result<String, Error> + Send + Sync>;
type TextDecodeFn<T> = Arc<dyn Fn(String) -> Result<T, Error> + Send + Sync>;

/// A [`PayloadCodec`] defined by its text form.
///
/// The byte encoding is the text encoding passed through the ASCII mapping,
/// and byte decoding maps back to text before calling the text decoder.
pub struct TextPayloadCodec<T> {
    text_encoder: TextEncodeFn<T>,
    text_decoder: TextDecodeFn<T>,
    binary: PayloadCodec<T>,
}

impl<T: 'static> TextPayloadCodec<T> {
    pub fn new<E, D>(encoder: E, decoder: D) -> Self
    where
        E: Fn(&T) -> Result<String, Error> + Send + Sync + 'static,
        D: Fn(String) -> Result<T, Error> + Send + Sync + 'static,
    {
        let text_encoder: TextEncodeFn<T> = Arc::new(encoder);
        let text_decoder: TextDecodeFn<T> = Arc::new(decoder);

        let binary = {
            let encoder = Arc::clone(&text_encoder);
            let decoder = Arc::clone(&text_decoder);
            PayloadCodec::new(
                move |value: &T| encoder(value).map(|text| ascii::encode(&text)),
                move |data: &[u8]| decoder(ascii::decode(data)),
            )
        };

        TextPayloadCodec {
            text_encoder,
            text_decoder,
            binary,
        }
    }

    pub fn encode_text(&self, value: &T) -> Result<String, Error> {
        (self.text_encoder)(value)
    }

    pub fn decode_text(&self, text: impl Into<String>) -> Result<T, Error> {
        (self.text_decoder)(text.into())
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, Error> {
        self.binary.encode(value)
    }

    pub fn decode(&self, data: &[u8]) -> Result<T, Error> {
        self.binary.decode(data)
    }

    /// The byte-level view of this codec.
    pub fn binary(&self) -> &PayloadCodec<T> {
        &self.binary
    }
}

impl<T> AsRef<PayloadCodec<T>> for TextPayloadCodec<T> {
    fn as_ref(&self) -> &PayloadCodec<T> {
        &self.binary
    }
}

impl<T> From<TextPayloadCodec<T>> for PayloadCodec<T> {
    fn from(codec: TextPayloadCodec<T>) -> Self {
        codec.binary
    }
}

impl<T: Send + 'static> ErasedCodec for TextPayloadCodec<T> {
    fn value_type(&self) -> &'static str {
        self.binary.value_type()
    }

    fn encode_any(&self, value: &dyn Any) -> Result<Vec<u8>, Error> {
        self.binary.encode_any(value)
    }

    fn decode_any(&self, data: &[u8]) -> Result<Box<dyn Any + Send>, Error> {
        self.binary.decode_any(data)
    }
}

impl<T> Clone for TextPayloadCodec<T> {
    fn clone(&self) -> Self {
        TextPayloadCodec {
            text_encoder: Arc::clone(&self.text_encoder),
            text_decoder: Arc::clone(&self.text_decoder),
            binary: self.binary.clone(),
        }
    }
}

impl<T> Debug for TextPayloadCodec<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPayloadCodec")
            .field("value_type", &type_name::<T>())
            .finish()
    }
}
