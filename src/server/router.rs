//! Session router
//!
//! Maps each inbound request on the MCP endpoint to a session, creating
//! sessions on demand and dropping them on `DELETE`, explicit close or idle
//! expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{body::Bytes, http::Method, response::Response};
use thiserror::Error;
use tracing::{debug, error, info};

use super::metrics;
use super::transport::{session_not_found_response, SessionTransport, TransportError};
use crate::mcp::{McpRegistry, McpServer};
use crate::websets::WebsetsApi;

/// A live session: its protocol server and the transport feeding it.
pub struct SessionEntry {
    pub server: Arc<McpServer>,
    pub transport: Arc<SessionTransport>,
}

pub type SessionTable = Arc<Mutex<HashMap<String, Arc<SessionEntry>>>>;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("session table lock poisoned")]
    Poisoned,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Clone)]
pub struct SessionRouter {
    sessions: SessionTable,
    registry: Arc<McpRegistry>,
    api: Arc<dyn WebsetsApi>,
    idle_timeout: Option<Duration>,
}

impl SessionRouter {
    /// `idle_timeout` of `None` keeps sessions until they are deleted.
    pub fn new(
        registry: Arc<McpRegistry>,
        api: Arc<dyn WebsetsApi>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self::with_sessions(SessionTable::default(), registry, api, idle_timeout)
    }

    pub fn with_sessions(
        sessions: SessionTable,
        registry: Arc<McpRegistry>,
        api: Arc<dyn WebsetsApi>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sessions,
            registry,
            api,
            idle_timeout,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|table| table.len()).unwrap_or(0)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .map(|table| table.contains_key(session_id))
            .unwrap_or(false)
    }

    pub async fn route(
        &self,
        method: &Method,
        session_id: Option<&str>,
        body: Bytes,
    ) -> Result<Response, RouterError> {
        let session_id = session_id.map(str::trim).filter(|id| !id.is_empty());

        if let Some(id) = session_id {
            if let Some(entry) = self.lookup(id)? {
                let response = entry.transport.handle_request(method, body).await?;
                if method == Method::DELETE {
                    self.remove_if_current(id, &entry)?;
                    entry.transport.close();
                    info!("Session {} terminated by client", id);
                }
                return Ok(response);
            }
        }

        if method == Method::DELETE {
            debug!("DELETE for unknown session {:?}", session_id);
            return Ok(session_not_found_response());
        }

        let entry = self.create_session(session_id)?;
        Ok(entry.transport.handle_request(method, body).await?)
    }

    fn lookup(&self, session_id: &str) -> Result<Option<Arc<SessionEntry>>, RouterError> {
        let table = self.sessions.lock().map_err(|_| RouterError::Poisoned)?;
        Ok(table.get(session_id).cloned())
    }

    fn create_session(&self, requested_id: Option<&str>) -> Result<Arc<SessionEntry>, RouterError> {
        let session_id = requested_id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let server = Arc::new(McpServer::new(
            session_id.as_str(),
            self.registry.clone(),
            self.api.clone(),
        ));
        let transport = Arc::new(SessionTransport::new(session_id.as_str()));
        transport.connect(server.clone())?;
        let entry = Arc::new(SessionEntry { server, transport });

        let (replaced, count) = {
            let mut table = self.sessions.lock().map_err(|_| RouterError::Poisoned)?;
            let replaced = table.insert(session_id.clone(), entry.clone());
            (replaced, table.len())
        };

        if let Some(replaced) = replaced {
            info!("Session {} replaced by a new one with the same id", session_id);
            replaced.transport.close();
        }

        metrics::record_session_created();
        metrics::set_active_sessions(count);
        info!("Session {} created", session_id);

        self.spawn_watcher(session_id, entry.clone());
        Ok(entry)
    }

    /// Removes the entry unless the id has since been taken by another session.
    fn remove_if_current(&self, session_id: &str, entry: &Arc<SessionEntry>) -> Result<bool, RouterError> {
        let mut table = self.sessions.lock().map_err(|_| RouterError::Poisoned)?;
        let removed = match table.get(session_id) {
            Some(current) if Arc::ptr_eq(current, entry) => {
                table.remove(session_id);
                true
            }
            _ => false,
        };
        metrics::set_active_sessions(table.len());
        Ok(removed)
    }

    fn spawn_watcher(&self, session_id: String, entry: Arc<SessionEntry>) {
        let router = self.clone();
        tokio::spawn(async move {
            let transport = entry.transport.clone();
            match router.idle_timeout {
                None => transport.closed().await,
                Some(timeout) => loop {
                    let remaining = timeout.saturating_sub(transport.idle_for());
                    if remaining.is_zero() {
                        info!("Session {} expired after {:?} idle", session_id, timeout);
                        transport.close();
                        break;
                    }
                    tokio::select! {
                        _ = transport.closed() => break,
                        _ = tokio::time::sleep(remaining) => {}
                    }
                },
            }

            match router.remove_if_current(&session_id, &entry) {
                Ok(true) => info!("Session {} closed", session_id),
                Ok(false) => {}
                Err(e) => error!("Failed to remove session {}: {}", session_id, e),
            }
        });
    }
}
