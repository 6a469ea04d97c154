//! End-to-end resolution over a real UDP socket on loopback.

mod common;

use std::net::Ipv4Addr;
use std::time::Duration;

use hickory_server::proto::op::ResponseCode;
use hickory_server::proto::rr::{Name, RecordType};

use dnsresolve::table::Records;
use dnsresolve::{InventoryErrorPolicy, InventoryPoller, QueryResolver, ResolutionTable};

use common::*;

fn service_resolver(table: ResolutionTable) -> QueryResolver {
    QueryResolver::new(table, Name::from_ascii("service.").unwrap())
}

#[tokio::test]
async fn a_query_returns_every_address_in_order() {
    let table = ResolutionTable::new();
    table
        .replace(Records::from([(
            "web.service.".to_string(),
            vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 6)],
        )]))
        .await;
    let (addr, server) = start_server(service_resolver(table)).await;

    let reply = query_udp(addr, "web.service.", RecordType::A, 100).await;
    assert_eq!(reply.id(), 100);
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert_eq!(
        a_records(&reply),
        vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 6)]
    );
    for record in reply.answers() {
        assert_eq!(record.name(), &Name::from_ascii("web.service.").unwrap());
    }

    server.abort();
}

#[tokio::test]
async fn unsupported_type_and_unknown_name_get_empty_answers() {
    let table = ResolutionTable::new();
    table
        .replace(Records::from([(
            "web.service.".to_string(),
            vec![Ipv4Addr::new(10, 0, 0, 5)],
        )]))
        .await;
    let (addr, server) = start_server(service_resolver(table)).await;

    let reply = query_udp(addr, "web.service.", RecordType::MX, 1).await;
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert!(reply.answers().is_empty());

    let reply = query_udp(addr, "missing.service.", RecordType::A, 2).await;
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert!(reply.answers().is_empty());

    server.abort();
}

#[tokio::test]
async fn names_outside_service_zone_are_refused() {
    let (addr, server) = start_server(service_resolver(ResolutionTable::new())).await;

    let reply = query_udp(addr, "example.com.", RecordType::A, 3).await;
    assert_eq!(reply.response_code(), ResponseCode::Refused);
    assert!(reply.answers().is_empty());

    server.abort();
}

#[tokio::test]
async fn poll_cycles_add_and_remove_containers() {
    let inventory = StaticInventory::default();
    let table = ResolutionTable::new();
    let poller = InventoryPoller::new(
        inventory.clone(),
        table.clone(),
        LABEL,
        Duration::from_secs(1),
        InventoryErrorPolicy::Exit,
    );
    let (addr, server) = start_server(service_resolver(table)).await;

    inventory.set(vec![
        container("c1", "api.service", &["172.18.0.2"]),
        container("c2", "api.service", &["172.18.0.3", "172.19.0.3"]),
        container("c3", "api.service", &["172.18.0.4"]),
    ]);
    poller.poll_once().await.unwrap();

    let reply = query_udp(addr, "api.service.", RecordType::A, 10).await;
    assert_eq!(
        a_records(&reply),
        vec![Ipv4Addr::new(172, 18, 0, 2), Ipv4Addr::new(172, 18, 0, 4)]
    );

    inventory.set(Vec::new());
    poller.poll_once().await.unwrap();

    let reply = query_udp(addr, "api.service.", RecordType::A, 11).await;
    assert_eq!(reply.response_code(), ResponseCode::NoError);
    assert!(reply.answers().is_empty());

    server.abort();
}
