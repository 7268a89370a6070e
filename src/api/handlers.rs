use super::protocol::*;
use crate::broker::SignalBroker;
use crate::directory::types::PeerId;
use crate::node::types::NodeAddress;

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::Path,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

pub fn router(broker: Arc<SignalBroker>) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(
            ENDPOINT_PEER,
            get(handle_resolve_peer)
                .post(handle_attach_peer)
                .delete(handle_detach_peer),
        )
        .route(ENDPOINT_NODE_CLIENTS, get(handle_node_clients))
        .route(ENDPOINT_QUEUE_LEN, get(handle_queue_len))
        .route(ENDPOINT_QUEUE_PUSH, post(handle_queue_push))
        .route(ENDPOINT_QUEUE_CLEAR, post(handle_queue_clear))
        .route(ENDPOINT_QUEUE_TRUNCATE, post(handle_queue_truncate))
        .route(ENDPOINT_DELIVER, post(handle_deliver))
        .layer(Extension(broker))
}

pub async fn handle_health(
    Extension(broker): Extension<Arc<SignalBroker>>,
) -> (StatusCode, Json<HealthResponse>) {
    let store_available = broker.is_store_available();
    let status = if store_available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            address: broker.address().clone(),
            store_available,
            local_peers: broker.local_peers().len(),
        }),
    )
}

pub async fn handle_resolve_peer(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(peer_id): Path<String>,
) -> (StatusCode, Json<ResolveResponse>) {
    let node = broker.resolve_peer_address(&PeerId::from(peer_id.as_str())).await;
    let status = if node.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    (status, Json(ResolveResponse { peer_id, node }))
}

pub async fn handle_attach_peer(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(peer_id): Path<String>,
) -> (StatusCode, Json<AttachResponse>) {
    broker.local_peers().attach(PeerId::from(peer_id.as_str())).await;
    tracing::info!("Peer {} attached via admin API", peer_id);

    (
        StatusCode::OK,
        Json(AttachResponse {
            peer_id,
            node: broker.address().clone(),
        }),
    )
}

pub async fn handle_detach_peer(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(peer_id): Path<String>,
) -> (StatusCode, Json<DetachResponse>) {
    let detached = broker
        .local_peers()
        .detach(&PeerId::from(peer_id.as_str()))
        .await;

    if detached {
        (StatusCode::OK, Json(DetachResponse { detached }))
    } else {
        (StatusCode::NOT_FOUND, Json(DetachResponse { detached }))
    }
}

pub async fn handle_node_clients(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(addr): Path<String>,
) -> (StatusCode, Json<ClientCountResponse>) {
    let node = NodeAddress::from(addr);
    let count = broker.query_node_client_count(&node).await;

    (StatusCode::OK, Json(ClientCountResponse { node, count }))
}

pub async fn handle_queue_len(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(addr): Path<String>,
) -> (StatusCode, Json<QueueLengthResponse>) {
    let node = NodeAddress::from(addr);
    let length = broker.length(&node).await;

    (StatusCode::OK, Json(QueueLengthResponse { node, length }))
}

pub async fn handle_queue_push(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(addr): Path<String>,
    body: Bytes,
) -> StatusCode {
    broker.enqueue(&NodeAddress::from(addr), &body).await;
    StatusCode::ACCEPTED
}

pub async fn handle_queue_clear(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(addr): Path<String>,
) -> StatusCode {
    broker.clear(&NodeAddress::from(addr)).await;
    StatusCode::NO_CONTENT
}

pub async fn handle_queue_truncate(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(addr): Path<String>,
    Json(req): Json<TruncateRequest>,
) -> StatusCode {
    broker.truncate(&NodeAddress::from(addr), req.max_len).await;
    StatusCode::NO_CONTENT
}

pub async fn handle_deliver(
    Extension(broker): Extension<Arc<SignalBroker>>,
    Path(peer_id): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<DeliverResponse>) {
    match broker.deliver(&PeerId::from(peer_id.as_str()), &body).await {
        Some(node) => (
            StatusCode::ACCEPTED,
            Json(DeliverResponse {
                delivered: true,
                node: Some(node),
            }),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(DeliverResponse {
                delivered: false,
                node: None,
            }),
        ),
    }
}
