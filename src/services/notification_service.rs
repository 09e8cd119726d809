//! Notificaciones de creación de clientes
//!
//! Publicación fire-and-forget hacia sistemas downstream. Ningún fallo aquí
//! afecta a la operación que la originó.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::models::customer::Customer;

pub trait NotificationSink: Send + Sync {
    fn publish(&self, customer: &Customer);
}

/// Sink que sólo registra el evento en el log
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn publish(&self, customer: &Customer) {
        info!(
            "📣 Evento customer.created: {} (id: {:?})",
            customer.identifier, customer.id
        );
    }
}

/// Sink que envía el registro creado a un webhook HTTP
#[derive(Debug, Clone)]
pub struct WebhookNotificationSink {
    client: Client,
    url: String,
}

impl WebhookNotificationSink {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

impl NotificationSink for WebhookNotificationSink {
    fn publish(&self, customer: &Customer) {
        let client = self.client.clone();
        let url = self.url.clone();
        let identifier = customer.identifier.to_string();
        let payload = json!({
            "event": "customer.created",
            "customer": customer,
        });

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("📣 Notificación enviada para {}", identifier);
                }
                Ok(response) => {
                    warn!(
                        "⚠️ Webhook respondió {} al notificar {}",
                        response.status(),
                        identifier
                    );
                }
                Err(e) => {
                    warn!("⚠️ No se pudo notificar la creación de {}: {}", identifier, e);
                }
            }
        });
    }
}
