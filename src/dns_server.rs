//! DNS server subsystem.
//!
//! This module exposes the [`QueryResolver`] over the network using the
//! [hickory-dns](https://crates.io/crates/hickory-server) server library.
//! The server listens on a configurable UDP/TCP socket; each request is
//! decoded by hickory, turned into a [`Message`], answered by
//! [`QueryResolver::handle_query`] and encoded back onto the wire.

use std::net::SocketAddr;

use async_trait::async_trait;
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::proto::op::{Header, Message, Query, ResponseCode};
use hickory_server::proto::rr::Name;
use hickory_server::server::{
    Request, RequestHandler, ResponseHandler, ResponseInfo, ServerFuture,
};
use log::{error, info};
use tokio::net::{TcpListener, UdpSocket};
use tokio::time::Duration;

use crate::error::Result;
use crate::resolver::QueryResolver;

/// Timeout for idle TCP connections.
const TCP_TIMEOUT: Duration = Duration::from_secs(10);

/// Bind UDP and TCP on `bind_addr` and serve until the future is dropped.
pub async fn run_dns_server(bind_addr: SocketAddr, resolver: QueryResolver) -> Result<()> {
    let udp = UdpSocket::bind(bind_addr).await?;
    let tcp = TcpListener::bind(bind_addr).await?;
    info!(
        "DNS server listening on {} for zone {}",
        bind_addr,
        resolver.zone()
    );
    serve(udp, tcp, resolver).await
}

/// Serve queries on already bound sockets.
pub async fn serve(udp: UdpSocket, tcp: TcpListener, resolver: QueryResolver) -> Result<()> {
    let mut server = ServerFuture::new(ResolverHandler { resolver });
    server.register_socket(udp);
    server.register_listener(tcp, TCP_TIMEOUT);

    // Run the server until future resolves.
    server.block_until_done().await?;
    Ok(())
}

struct ResolverHandler {
    resolver: QueryResolver,
}

/// Rebuild the decoded query hickory handed us as a plain message.
fn decoded_query(request: &Request) -> Message {
    let question = request.query();
    let mut query = Query::query(Name::from(question.name().clone()), question.query_type());
    query.set_query_class(question.query_class());

    let mut message = Message::new();
    message.set_header(*request.header());
    message.add_query(query);
    message
}

#[async_trait]
impl RequestHandler for ResolverHandler {
    async fn handle_request<R>(&self, request: &Request, mut response_handle: R) -> ResponseInfo
    where
        R: ResponseHandler + Send,
    {
        let reply = self.resolver.handle_query(&decoded_query(request)).await;

        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(
            *reply.header(),
            reply.answers().iter(),
            std::iter::empty(),
            std::iter::empty(),
            std::iter::empty(),
        );
        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(e) => {
                error!("Failed to send DNS response to {}: {}", request.src(), e);
                let mut header = Header::new();
                header.set_response_code(ResponseCode::ServFail);
                header.into()
            }
        }
    }
}
