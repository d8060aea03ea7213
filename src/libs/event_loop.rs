use crate::libs::config::ChatConfig;
use crate::libs::core::chat_client::{ChatClient, ChatDeps};
use crate::libs::core::models::{AuthStateChange, ClientEvent, PhotoOutcome, SignInOutcome};
use crate::{ChatError, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Cheap, cloneable way for any boundary to queue work for the chat client.
#[derive(Clone, Debug)]
pub struct ClientHandle {
    tx: UnboundedSender<ClientEvent>,
}

impl ClientHandle {
    pub fn send(&self, event: ClientEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| ChatError::EventLoopClosed)
    }

    pub fn input_changed(&self, text: impl Into<String>) -> Result<()> {
        self.send(ClientEvent::InputChanged(text.into()))
    }

    pub fn send_pressed(&self) -> Result<()> {
        self.send(ClientEvent::SendPressed)
    }

    pub fn pick_photo_pressed(&self) -> Result<()> {
        self.send(ClientEvent::PickPhotoPressed)
    }

    pub fn sign_out_pressed(&self) -> Result<()> {
        self.send(ClientEvent::SignOutPressed)
    }

    pub fn paused(&self) -> Result<()> {
        self.send(ClientEvent::Paused)
    }

    pub fn resumed(&self) -> Result<()> {
        self.send(ClientEvent::Resumed)
    }

    pub fn auth_changed(&self, change: AuthStateChange) -> Result<()> {
        self.send(ClientEvent::AuthChanged(change))
    }

    pub fn sign_in_finished(&self, outcome: SignInOutcome) -> Result<()> {
        self.send(ClientEvent::SignInFinished(outcome))
    }

    pub fn photo_finished(&self, outcome: PhotoOutcome) -> Result<()> {
        self.send(ClientEvent::Photo(outcome))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(ClientEvent::Shutdown)
    }
}

/// Single consumer of the event channel. Everything the client does happens here, in order.
pub struct ChatEventLoop {
    client: ChatClient,
    rx: UnboundedReceiver<ClientEvent>,
}

impl ChatEventLoop {
    pub fn new(config: ChatConfig, deps: ChatDeps) -> Result<(Self, ClientHandle)> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let client = ChatClient::new(config, deps, tx.downgrade());
        Ok((Self { client, rx }, ClientHandle { tx }))
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Handle whatever is queued right now without waiting. Returns how many events ran.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.client.handle(event);
            processed += 1;
        }
        processed
    }

    /// Run until a `Shutdown` event is handled or every [`ClientHandle`] is dropped,
    /// then hand the client back.
    pub async fn run(mut self) -> ChatClient {
        info!("chat event loop started");
        loop {
            let Some(event) = self.rx.recv().await else {
                debug!("all client handles dropped");
                self.client.handle(ClientEvent::Shutdown);
                break;
            };
            let stop = matches!(event, ClientEvent::Shutdown);
            debug!(?event, "handling event");
            self.client.handle(event);
            if stop {
                break;
            }
        }
        info!("chat event loop stopped");
        self.client
    }
}
