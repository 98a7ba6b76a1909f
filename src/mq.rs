//! MQTT client for the SIoT broker.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

use paho_mqtt::async_client::AsyncClient as MqttClient;
use paho_mqtt::MessageBuilder as MqttMessageBuilder;

use crate::codec::{self, ErasedCodec, PayloadCodec};
use crate::config::SiotConfig;
use crate::topic::DataTopic;

type MessageHandler = Arc<dyn Fn(Delivery) + Send + Sync>;

/// A decoded message on a subscribed topic.
pub struct Delivery {
    topic: String,
    value: Box<dyn Any + Send>,
}

impl Delivery {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The decoded value, if it is a `T`.
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl Debug for Delivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

/// Routes incoming payloads to the codec registered for their topic, then to
/// the message handler.
#[derive(Default)]
struct Dispatcher {
    codecs: RwLock<HashMap<String, Arc<dyn ErasedCodec>>>,
    handler: RwLock<Option<MessageHandler>>,
}

impl Dispatcher {
    fn register(&self, topic: String, codec: Arc<dyn ErasedCodec>) {
        self.codecs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic, codec);
    }

    fn set_handler(&self, handler: MessageHandler) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn topic_count(&self) -> usize {
        self.codecs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn dispatch(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        let codec = self
            .codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
            .ok_or_else(|| Error::UnregisteredTopic(topic.to_string()))?;

        let value = codec.decode_any(payload)?;

        // released before the call, so a handler may replace itself
        let handler = self.handler.read().unwrap_or_else(PoisonError::into_inner).clone();
        match handler {
            Some(handler) => handler(Delivery {
                topic: topic.to_string(),
                value,
            }),
            None => tracing::debug!(topic, "no message handler, delivery dropped"),
        }
        Ok(())
    }
}

/// A connection to the SIoT broker.
///
/// The connection is closed when the client is dropped.
pub struct SiotClient {
    client: MqttClient,
    client_id: String,
    dispatcher: Arc<Dispatcher>,
}

impl SiotClient {
    pub fn new<T: AsRef<str>>(server_uri: &str, client_id: T) -> Result<SiotClient, Error> {
        let client = MqttClient::new(
            paho_mqtt::CreateOptionsBuilder::new()
                .server_uri(server_uri)
                .client_id(client_id.as_ref())
                .finalize(),
        )?;

        let dispatcher = Arc::new(Dispatcher::default());

        // runs on the paho-mqtt callback thread
        let callback_dispatcher = Arc::clone(&dispatcher);
        client.set_message_callback(move |_client, message| {
            let Some(message) = message else {
                return;
            };
            if let Err(e) = callback_dispatcher.dispatch(message.topic(), message.payload()) {
                tracing::warn!(error = %e, topic = message.topic(), "dropping delivery");
            }
        });
        client.set_connection_lost_callback(|_client| {
            tracing::warn!("connection to the MQTT broker lost");
        });

        Ok(SiotClient {
            client,
            client_id: client_id.as_ref().to_string(),
            dispatcher,
        })
    }

    pub fn from_config(config: &SiotConfig) -> Result<SiotClient, Error> {
        SiotClient::new(&config.server_uri, &config.client_id)
    }

    /// Connect to the MQTT broker.
    ///
    /// You must call this method before subscribing or publishing.
    #[tracing::instrument(err)]
    pub async fn connect(&self) -> Result<(), Error> {
        tracing::info!("connect to the MQTT broker");

        let connection_info = self.client.connect(None).await;
        if let Err(e) = connection_info {
            tracing::error!(error = ?e, "failed to connect to the MQTT broker");
            return Err(e.into());
        }

        tracing::info!(info = ?connection_info, "connected to the MQTT broker");
        Ok(())
    }

    /// Set the callback for decoded deliveries, replacing any previous one.
    ///
    /// The callback runs on the MQTT client's thread, not the caller's.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(Delivery) + Send + Sync + 'static,
    {
        self.dispatcher.set_handler(Arc::new(handler));
    }

    /// Subscribe to `topic` with QoS 1, decoding its messages with `codec`.
    #[tracing::instrument(skip(codec), fields(value_type = codec.value_type()), err)]
    pub async fn subscribe<C>(&self, topic: &DataTopic, codec: C) -> Result<(), Error>
    where
        C: ErasedCodec + 'static,
    {
        let topic = topic.to_string();
        self.dispatcher.register(topic.clone(), Arc::new(codec));

        self.client.subscribe(topic, paho_mqtt::QOS_1).await?;
        tracing::info!("subscribed");
        Ok(())
    }

    /// Encode `value` with `codec` and publish it to `topic`.
    #[tracing::instrument(skip(codec, value), err)]
    pub async fn publish<T, C>(&self, topic: &DataTopic, codec: &C, value: &T) -> Result<(), Error>
    where
        T: 'static,
        C: AsRef<PayloadCodec<T>>,
    {
        let payload = codec.as_ref().encode(value)?;

        let message = MqttMessageBuilder::new()
            .topic(topic.to_string())
            .payload(payload)
            .qos(paho_mqtt::QOS_0)
            .finalize();

        tracing::debug!(?message, "publishing to the MQTT broker");
        self.client.publish(message).await?;
        Ok(())
    }
}

impl Drop for SiotClient {
    fn drop(&mut self) {
        if !self.client.is_connected() {
            return;
        }

        tracing::info!("disconnect from the MQTT broker");
        if let Err(e) = self.client.disconnect(None).wait() {
            tracing::warn!(error = ?e, "failed to disconnect from the MQTT broker");
        }
    }
}

impl Debug for SiotClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiotClient")
            .field("client_id", &self.client_id)
            .field("subscriptions", &self.dispatcher.topic_count())
            .finish()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("MQTT client: {0}")]
    Mqtt(#[from] paho_mqtt::Error),

    #[error("payload: {0}")]
    Codec(#[from] codec::Error),

    #[error("no codec registered for topic {0}")]
    UnregisteredTopic(String),
}
