use std::sync::Arc;

use futures::{pin_mut, stream::FuturesUnordered, Stream, StreamExt};
use shared::protocol::MessageResponse;
use tracing::{debug, error, info, warn};
use url::Url;

pub mod config;
pub mod document;
pub mod error;
pub mod transport;

pub use config::{load_settings, EndpointAddress, FetcherSettings};
pub use document::{
    DisplaySurface, Document, ElementBinding, ElementId, MemoryDisplay, MemoryDocument,
};
pub use error::FetchError;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    PageLoaded,
    Activated(ElementId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Displayed(String),
    ErrorDisplayed(String),
}

impl FetchOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Displayed(text) | Self::ErrorDisplayed(text) => text,
        }
    }
}

pub struct MessageFetcher {
    endpoint: Url,
    transport: Arc<dyn HttpTransport>,
}

impl MessageFetcher {
    pub fn new(endpoint: Url, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn from_settings(settings: &FetcherSettings) -> anyhow::Result<Self> {
        let endpoint = settings.endpoint_url()?;
        let transport = ReqwestTransport::with_timeout(settings.timeout())?;
        Ok(Self::new(endpoint, Arc::new(transport)))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn fetch_message(&self) -> Result<String, FetchError> {
        let response = self.transport.get(&self.endpoint).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        let body: MessageResponse = serde_json::from_slice(&response.body)?;
        Ok(body.message)
    }

    pub async fn fetch_and_display(&self, display: &dyn DisplaySurface) -> FetchOutcome {
        debug!(endpoint = %self.endpoint, "fetching message");
        match self.fetch_message().await {
            Ok(message) => {
                display.set_text(&message);
                FetchOutcome::Displayed(message)
            }
            Err(err) => {
                error!(endpoint = %self.endpoint, error = %err, "error fetching message");
                let text = err.display_text();
                display.set_text(&text);
                FetchOutcome::ErrorDisplayed(text)
            }
        }
    }

    /// Activations before `PageLoaded` are dropped. Fetches are never
    /// cancelled, so the display holds whichever one finished last.
    pub async fn attach<S>(&self, document: &dyn Document, binding: &ElementBinding, events: S)
    where
        S: Stream<Item = TriggerEvent>,
    {
        pin_mut!(events);

        loop {
            match events.next().await {
                Some(TriggerEvent::PageLoaded) => break,
                Some(TriggerEvent::Activated(id)) => {
                    debug!(element = %id, "activation before page load ignored");
                }
                None => {
                    debug!("event source closed before page load");
                    return;
                }
            }
        }

        let Some(display) = document.display_surface(&binding.display) else {
            warn!(element = %binding.display, "display surface not found; fetcher not bound");
            return;
        };
        if !document.has_trigger(&binding.trigger) {
            warn!(element = %binding.trigger, "trigger control not found; fetcher not bound");
            return;
        }
        info!(
            endpoint = %self.endpoint,
            trigger = %binding.trigger,
            display = %binding.display,
            "message fetcher bound"
        );

        let display = display.as_ref();
        let mut in_flight = FuturesUnordered::new();
        in_flight.push(self.fetch_and_display(display));

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(TriggerEvent::Activated(id)) if id == binding.trigger => {
                        in_flight.push(self.fetch_and_display(display));
                    }
                    Some(TriggerEvent::Activated(id)) => {
                        debug!(element = %id, "activation of unbound element ignored");
                    }
                    Some(TriggerEvent::PageLoaded) => {
                        debug!("repeated page load event ignored");
                    }
                    None => break,
                },
                Some(_) = in_flight.next(), if !in_flight.is_empty() => {}
            }
        }

        while in_flight.next().await.is_some() {}
        debug!("event source closed; message fetcher detached");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
