//! Query resolver.
//!
//! Turns a decoded DNS query into a decoded reply using the current
//! resolution table.  Only `A` questions are answered; every other type is
//! logged and left without records.  The resolver keeps no state between
//! queries.

use hickory_server::proto::op::{Header, Message, OpCode, ResponseCode};
use hickory_server::proto::rr::rdata::A;
use hickory_server::proto::rr::{Name, RData, Record, RecordType};
use log::{debug, info};

use crate::table::{ResolutionTable, Snapshot};

/// TTL attached to every answer.
pub const RECORD_TTL: u32 = 3600;

#[derive(Debug, Clone)]
pub struct QueryResolver {
    table: ResolutionTable,
    zone: Name,
}

impl QueryResolver {
    /// Resolver answering for names inside `zone` (for example `service.`).
    pub fn new(table: ResolutionTable, zone: Name) -> Self {
        Self { table, zone }
    }

    pub fn zone(&self) -> &Name {
        &self.zone
    }

    /// Records answering a single question, in table order.
    pub async fn answers(&self, name: &Name, query_type: RecordType) -> Vec<Record> {
        let snapshot = self.table.snapshot().await;
        answers_from(&snapshot, name, query_type)
    }

    /// Build the reply to `query`.
    ///
    /// The reply echoes the query's id, opcode and questions.  Queries whose
    /// first question lies outside the served zone are refused; everything
    /// else gets `NoError`, with an empty answer section when nothing
    /// matches.
    pub async fn handle_query(&self, query: &Message) -> Message {
        let mut header = Header::response_from_request(query.header());
        header.set_response_code(ResponseCode::NoError);

        let mut reply = Message::new();
        reply.add_queries(query.queries().iter().cloned());

        if let Some(first) = query.queries().first() {
            if !self.zone.zone_of(first.name()) {
                debug!("Refusing {} outside zone {}", first.name(), self.zone);
                header.set_response_code(ResponseCode::Refused);
                reply.set_header(header);
                return reply;
            }
        }

        if query.op_code() != OpCode::Query {
            debug!("Ignoring {:?} request {}", query.op_code(), query.id());
            reply.set_header(header);
            return reply;
        }

        // One table for the whole message, even if a poll lands mid-way.
        let snapshot = self.table.snapshot().await;
        for question in query.queries() {
            reply.add_answers(answers_from(
                &snapshot,
                question.name(),
                question.query_type(),
            ));
        }

        reply.set_header(header);
        reply
    }
}

fn answers_from(snapshot: &Snapshot, name: &Name, query_type: RecordType) -> Vec<Record> {
    match query_type {
        RecordType::A => {
            info!("A query for {}", name);
            snapshot
                .lookup(&table_key(name))
                .iter()
                .map(|ip| Record::from_rdata(name.clone(), RECORD_TTL, RData::A(A(*ip))))
                .collect()
        }
        other => {
            info!("Unhandled {} query for {}", other, name);
            Vec::new()
        }
    }
}

/// Table keys always end with the root dot.
fn table_key(name: &Name) -> String {
    let mut key = name.to_string();
    if !key.ends_with('.') {
        key.push('.');
    }
    key
}
