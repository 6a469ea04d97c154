//! Shared helpers for the end-to-end resolver tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hickory_server::proto::op::{Message, MessageType, OpCode, Query};
use hickory_server::proto::rr::{DNSClass, Name, RData, RecordType};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

use dnsresolve::dns_server::serve;
use dnsresolve::{
    ContainerInventory, ContainerSnapshot, InventoryError, NetworkAttachment, QueryResolver,
};

pub const LABEL: &str = "dnsresolve";

// --- Inventory ---

/// Inventory whose container list can be swapped between polls.
#[derive(Clone, Default)]
pub struct StaticInventory {
    containers: Arc<Mutex<Vec<ContainerSnapshot>>>,
}

impl StaticInventory {
    pub fn set(&self, containers: Vec<ContainerSnapshot>) {
        *self.containers.lock().unwrap() = containers;
    }
}

#[async_trait]
impl ContainerInventory for StaticInventory {
    async fn list_containers(&self, label: &str) -> Result<Vec<ContainerSnapshot>, InventoryError> {
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.labels.contains_key(label))
            .cloned()
            .collect())
    }
}

/// A labelled container with one attachment per address.
pub fn container(id: &str, hostname: &str, ips: &[&str]) -> ContainerSnapshot {
    ContainerSnapshot {
        id: id.to_string(),
        labels: HashMap::from([(LABEL.to_string(), hostname.to_string())]),
        networks: ips
            .iter()
            .enumerate()
            .map(|(i, ip)| NetworkAttachment {
                network: format!("net{}", i),
                ip_address: ip.to_string(),
            })
            .collect(),
    }
}

// --- Server ---

/// Start the DNS server on ephemeral loopback ports.
pub async fn start_server(resolver: QueryResolver) -> (SocketAddr, JoinHandle<()>) {
    let udp = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = udp.local_addr().unwrap();
    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let handle = tokio::spawn(async move {
        serve(udp, tcp, resolver).await.unwrap();
    });
    (addr, handle)
}

/// Send one query over UDP and parse the reply.
pub async fn query_udp(server: SocketAddr, name: &str, record_type: RecordType, id: u16) -> Message {
    let mut msg = Message::new();
    msg.set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    let mut query = Query::query(Name::from_ascii(name).unwrap(), record_type);
    query.set_query_class(DNSClass::IN);
    msg.add_query(query);

    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(&msg.to_vec().unwrap(), server).await.unwrap();

    let mut buf = vec![0u8; 4096];
    let (len, _) = tokio::time::timeout(Duration::from_secs(5), socket.recv_from(&mut buf))
        .await
        .expect("no reply within 5s")
        .unwrap();
    Message::from_vec(&buf[..len]).expect("failed to parse DNS reply")
}

/// A addresses in the answer section, in order.
pub fn a_records(msg: &Message) -> Vec<Ipv4Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            Some(RData::A(a)) => Some(a.0),
            _ => None,
        })
        .collect()
}
