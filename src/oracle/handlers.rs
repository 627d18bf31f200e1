use warp::{reject::Rejection, reply::Reply, Filter};

use crate::oracle::definitions::*;
use crate::oracle::logic::{client_connection, Model};

/// `GET /oracle` upgraded to a websocket answered by `model`.
pub fn oracle_route(model: Model) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("oracle")
        .and(warp::ws())
        .and(with(model))
        .and_then(oracle_handler)
}

pub async fn oracle_handler(ws: warp::ws::Ws, model: Model) -> Result<impl Reply, Rejection> {
    info!("Get new connection to oracle websocket!");
    Ok(ws.on_upgrade(move |ws| client_connection(ws, model)))
}

fn with<T>(value: T) -> impl Filter<Extract = (T,), Error = std::convert::Infallible> + Clone
where
    T: Clone + std::marker::Send,
{
    warp::any().map(move || value.clone())
}
