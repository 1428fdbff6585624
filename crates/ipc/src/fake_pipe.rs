use std::collections::VecDeque;

use crate::error::IpcError;
use crate::transport::{PipeConnection, PipeListener, ReadOutcome};

/// A scripted connection: a fixed sequence of incoming messages, then
/// disconnect. Every outgoing write is recorded for assertions.
pub struct FakeConnection {
    incoming: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
}

impl FakeConnection {
    pub fn new(incoming: Vec<Vec<u8>>) -> Self {
        Self {
            incoming: incoming.into(),
            written: Vec::new(),
        }
    }
}

impl PipeConnection for FakeConnection {
    fn read_message(&mut self) -> Result<ReadOutcome, IpcError> {
        match self.incoming.pop_front() {
            Some(msg) => Ok(ReadOutcome::Message(msg)),
            None => Ok(ReadOutcome::Disconnected),
        }
    }

    fn write_message(&mut self, body: &[u8]) -> Result<(), IpcError> {
        self.written.push(body.to_vec());
        Ok(())
    }
}

/// Hands out a pre-built sequence of connections, one per `accept` call,
/// enough to exercise reconnect behavior (P10) without a real pipe.
pub struct FakeListener {
    connections: VecDeque<FakeConnection>,
}

impl FakeListener {
    pub fn new(connections: Vec<FakeConnection>) -> Self {
        Self {
            connections: connections.into(),
        }
    }
}

impl PipeListener for FakeListener {
    type Connection = FakeConnection;

    fn accept(&mut self) -> Result<Self::Connection, IpcError> {
        self.connections
            .pop_front()
            .ok_or_else(|| IpcError::ConnectFailed("no more scripted connections".to_string()))
    }
}
