//! In-process stand-in for the backup service.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::client::{RemoteClient, Route};
use crate::entity::Record;
use crate::error::{NotizError, Result};

#[derive(Default)]
struct State {
    saves: Vec<String>,
    pushes: usize,
    beacons: Vec<(Route, String)>,
}

pub struct FakeRemote {
    payload: Option<Value>,
    beacon: bool,
    state: Mutex<State>,
}

impl FakeRemote {
    /// Service that answers `load` with `payload` and accepts every save.
    pub fn with_payload(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            beacon: false,
            state: Mutex::default(),
        }
    }

    /// Service that fails every request.
    pub fn offline() -> Self {
        Self {
            payload: None,
            beacon: false,
            state: Mutex::default(),
        }
    }

    pub fn with_beacon(mut self) -> Self {
        self.beacon = true;
        self
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves.len()
    }

    pub fn push_count(&self) -> usize {
        self.state.lock().unwrap().pushes
    }

    pub fn beacon_count(&self) -> usize {
        self.state.lock().unwrap().beacons.len()
    }

    pub fn last_saved(&self) -> Option<Vec<Record>> {
        let state = self.state.lock().unwrap();
        state
            .saves
            .last()
            .map(|body| serde_json::from_str(body).unwrap())
    }

    fn check_online(&self) -> Result<()> {
        match self.payload {
            Some(_) => Ok(()),
            None => Err(NotizError::RemoteUnavailable("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn load(&self) -> Result<Value> {
        self.check_online()?;
        Ok(self.payload.clone().unwrap_or(Value::Null))
    }

    async fn save(&self, body: String) -> Result<()> {
        self.check_online()?;
        self.state.lock().unwrap().saves.push(body);
        Ok(())
    }

    async fn push(&self) -> Result<()> {
        self.check_online()?;
        self.state.lock().unwrap().pushes += 1;
        Ok(())
    }

    fn beacon(&self, route: Route, body: String) -> bool {
        if !self.beacon {
            return false;
        }
        self.state.lock().unwrap().beacons.push((route, body));
        true
    }
}
