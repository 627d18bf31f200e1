use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::{oneshot, Mutex};
use tokio_stream::wrappers::UnboundedReceiverStream;
use url::Url;

use crate::combat::definitions::{AdjudicationError, DecisionSource};
use crate::oracle::definitions::*;

type Pending = Arc<Mutex<HashMap<Uuid, oneshot::Sender<Result<String, String>>>>>;

/// Decision source behind a websocket; many prompts share one connection.
pub struct RemoteOracle {
    requests: UnboundedSender<OracleRequest>,
    pending: Pending,
    connected: Arc<AtomicBool>,
}

impl RemoteOracle {
    pub async fn connect(url: Url) -> Result<Self, tungstenite::Error> {
        let (websocket, _) = tokio_tungstenite::connect_async(url.clone()).await?;
        info!("Connected to oracle at {}", url);
        let (write, read) = websocket.split();
        let (requests, requests_rx) = mpsc::unbounded_channel::<OracleRequest>();
        let pending: Pending = Default::default();
        let connected = Arc::new(AtomicBool::new(true));

        tokio::spawn(
            UnboundedReceiverStream::new(requests_rx)
                .map(|request| Ok(request.into()))
                .forward(write)
                .map(|result| {
                    if let Err(err) = result {
                        error!("Failed sending prompt to oracle! Err: {}", err);
                    }
                }),
        );

        let pending_cp = Arc::clone(&pending);
        let connected_cp = Arc::clone(&connected);
        tokio::spawn(async move {
            read.for_each(|msg| {
                let pending = Arc::clone(&pending_cp);
                async move {
                    let msg = match msg {
                        Ok(msg) => msg,
                        Err(err) => {
                            info!("Something went wrong with oracle connection! Err: {}", err);
                            return;
                        }
                    };
                    if !msg.is_binary() {
                        trace!("Skipping non-binary frame from oracle: {:?}", msg);
                        return;
                    }
                    match OracleReply::try_from(msg) {
                        Ok(reply) => match pending.lock().await.remove(&reply.id) {
                            Some(waiter) => {
                                let _ = waiter.send(reply.result);
                            }
                            None => debug!("Reply {} has nobody waiting for it", reply.id),
                        },
                        Err(err) => error!("Oracle sent a malformed reply! Err: {}", err),
                    }
                }
            })
            .await;
            connected_cp.store(false, Ordering::SeqCst);
            // Dropping the senders wakes every waiter with an error.
            pending_cp.lock().await.clear();
            warn!("Oracle connection closed");
        });

        Ok(RemoteOracle {
            requests,
            pending,
            connected,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl DecisionSource for RemoteOracle {
    fn prompt(&self, text: String) -> BoxFuture<'_, Result<String, AdjudicationError>> {
        async move {
            if !self.is_connected() {
                return Err(AdjudicationError::Disconnected);
            }
            let id = Uuid::new_v4();
            let (waiter, reply) = oneshot::channel();
            self.pending.lock().await.insert(id, waiter);
            trace!("Prompt {}: {:?}", id, text);
            if self.requests.send(OracleRequest { id, prompt: text }).is_err() {
                self.pending.lock().await.remove(&id);
                return Err(AdjudicationError::Disconnected);
            }
            match reply.await {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(reason)) => Err(AdjudicationError::Source(reason)),
                Err(_) => Err(AdjudicationError::Disconnected),
            }
        }
        .boxed()
    }
}
