use std::{
    ops::{Deref, DerefMut},
    sync::{Arc, Mutex},
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::TransactionManager,
    r2d2::{ConnectionManager, Pool, PooledConnection},
};
use tokio::task::spawn_blocking;

use crate::util_resp::FailureResponse;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Slot the commit middleware places in the request extensions. The
/// `ThreadSafeConn<true>` extractor stores the request's connection here so
/// that the middleware can finish the transaction once the response status is
/// known.
#[derive(Clone, Default)]
pub struct TxSlot(
    #[allow(clippy::type_complexity)]
    Arc<
        Mutex<
            Option<
                Arc<
                    tokio::sync::Mutex<
                        PooledConnection<ConnectionManager<SqliteConnection>>,
                    >,
                >,
            >,
        >,
    >,
);

/// This middleware commits opened transactions after each request has been
/// handled, or rolls them back when the handler produced an error status.
pub async fn tx_commit_layer(mut req: Request, next: Next) -> Response {
    let slot = TxSlot::default();
    req.extensions_mut().insert(slot.clone());

    let res = next.run(req).await;

    let conn = slot.0.lock().unwrap().take();

    if let Some(conn) = conn {
        let mut conn = conn.try_lock().unwrap();

        if res.status().is_success() || res.status().is_redirection() {
            <PooledConnection<ConnectionManager<SqliteConnection>> as diesel::Connection>
                ::TransactionManager
                ::commit_transaction(&mut conn).unwrap();
        } else {
            <PooledConnection<ConnectionManager<SqliteConnection>> as diesel::Connection>
                ::TransactionManager
                ::rollback_transaction(&mut conn).unwrap();
        }
    }

    res
}

pub struct Conn<const TX: bool> {
    inner: tokio::sync::OwnedMutexGuard<
        PooledConnection<ConnectionManager<SqliteConnection>>,
    >,
}

impl<const TX: bool> Deref for Conn<TX> {
    type Target = PooledConnection<ConnectionManager<SqliteConnection>>;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl<const TX: bool> DerefMut for Conn<TX> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for Conn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let wrapper =
            ThreadSafeConn::<TX>::from_request_parts(parts, state).await?;

        Ok(Conn {
            inner: wrapper
                .inner
                .try_lock_owned()
                .map_err(|_| FailureResponse::ServerError(()))?,
        })
    }
}

#[derive(Clone)]
pub struct ThreadSafeConn<const TX: bool> {
    pub inner: Arc<
        tokio::sync::Mutex<
            PooledConnection<ConnectionManager<SqliteConnection>>,
        >,
    >,
}

#[async_trait]
impl<S, const TX: bool> FromRequestParts<S> for ThreadSafeConn<TX>
where
    S: Send + Sync,
    DbPool: FromRef<S>,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<ThreadSafeConn<TX>>() {
            return Ok(existing.clone());
        }

        let pool = DbPool::from_ref(state);

        let mut conn = spawn_blocking(move || pool.get())
            .await
            .map_err(|_| FailureResponse::ServerError(()))?
            .map_err(|_| FailureResponse::ServerError(()))?;

        if TX {
            <PooledConnection<ConnectionManager<SqliteConnection>> as diesel::Connection>
                ::TransactionManager
                ::begin_transaction(&mut conn)
                .map_err(|_| FailureResponse::ServerError(()))?;
        }

        let wrapper = ThreadSafeConn {
            inner: Arc::new(tokio::sync::Mutex::new(conn)),
        };

        parts.extensions.insert(wrapper.clone());

        if TX {
            if let Some(slot) = parts.extensions.get::<TxSlot>() {
                *slot.0.lock().unwrap() = Some(wrapper.inner.clone());
            }
        }

        Ok(wrapper)
    }
}
