use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use warp::filters::ws::WebSocket;

use crate::combat::definitions::DecisionSource;
use crate::oracle::definitions::*;

pub type Model = Arc<dyn DecisionSource>;

pub async fn client_connection(ws: WebSocket, model: Model) {
    let (client_ws_sender, client_ws_receiver) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel::<OracleReply>();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(
        client_rcv
            .map(|reply| Ok(reply.into()))
            .forward(client_ws_sender)
            .map(|result| {
                if let Err(e) = result {
                    error!("Failed sending websocket msg: {}", e);
                }
            }),
    );

    let id = Uuid::new_v4();
    trace!("Oracle client {} connected", id);
    client_ws_receiver
        .for_each(|msg| {
            let model = Arc::clone(&model);
            let sender = client_sender.clone();
            async move {
                let msg = match msg {
                    Ok(msg) => msg,
                    Err(err) => {
                        error!("Failed receiving message from client {}! Err: {}", id, err);
                        return;
                    }
                };
                if !msg.is_binary() {
                    trace!("Client {} sent non-binary frame: {:?}", id, msg);
                    return;
                }
                let request = match OracleRequest::try_from(msg) {
                    Ok(request) => request,
                    Err(err) => {
                        error!("Failed to parse client {} request! Err: {}", id, err);
                        return;
                    }
                };
                // Answer concurrently, a slow model must not block the socket.
                tokio::task::spawn(answer(model, sender, request));
            }
        })
        .await;
    trace!("Oracle client {} was disconnected...", id);
}

async fn answer(model: Model, sender: mpsc::UnboundedSender<OracleReply>, request: OracleRequest) {
    debug!("Prompt {}: {:?}", request.id, request.prompt);
    let result = model
        .prompt(request.prompt)
        .await
        .map_err(|err| err.to_string());
    if let Err(reason) = &result {
        warn!("Prompt {} failed: {}", request.id, reason);
    }
    let _ = sender.send(OracleReply {
        id: request.id,
        result,
    });
}
