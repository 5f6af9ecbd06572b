//! Services is a core layer for the app business logic like
//! validation, authorization, etc.

pub mod businesses;
pub mod categories;
pub mod types;

pub use self::businesses::*;
pub use self::categories::*;
pub use self::types::*;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use failure::Fail;
use futures_cpupool::CpuPool;
use r2d2::{ManageConnection, PooledConnection};

use config::Config;
use controller::context::{DynamicContext, StaticContext};
use errors::Error;
use models::UserId;
use repos::ReposFactory;

/// Service
pub struct Service<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
    pub dynamic_context: DynamicContext,
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > Service<T, M, F>
{
    /// Create a new service
    pub fn new(static_context: StaticContext<T, M, F>, dynamic_context: DynamicContext) -> Self {
        Self {
            static_context,
            dynamic_context,
        }
    }

    /// Runs `f` with a pooled connection on the cpu pool
    pub fn spawn_on_pool<R, Func>(&self, f: Func) -> ServiceFuture<R>
    where
        Func: FnOnce(PooledConnection<M>) -> Result<R, FailureError> + Send + 'static,
        R: Send + 'static,
    {
        let db_pool = self.static_context.db_pool.clone();
        let cpu_pool: CpuPool = self.static_context.cpu_pool.clone();
        Box::new(cpu_pool.spawn_fn(move || db_pool.get().map_err(|e| e.context(Error::Connection).into()).and_then(f)))
    }
}

/// Current user, or `Forbidden` for anonymous requests
pub fn require_user(user_id: Option<UserId>) -> Result<UserId, FailureError> {
    user_id.ok_or_else(|| format_err!("Request is not authorized").context(Error::Forbidden).into())
}

/// Allows only users listed as admins in the config
pub fn require_admin(config: &Config, user_id: Option<UserId>) -> Result<UserId, FailureError> {
    let user_id = require_user(user_id)?;
    if config.is_admin(user_id) {
        Ok(user_id)
    } else {
        Err(format_err!("User {} is not allowed to manage categories", user_id)
            .context(Error::Forbidden)
            .into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use config::Config;
    use errors::{classify, Error};
    use models::UserId;

    use super::*;

    #[test]
    fn anonymous_user_is_forbidden() {
        let err = require_user(None).unwrap_err();
        match classify(&err) {
            Some(Error::Forbidden) => {}
            other => panic!("unexpected classification {:?}", other),
        }
    }

    #[test]
    fn only_configured_admins_pass() {
        let config = Arc::new(Config::new().unwrap());
        assert_eq!(require_admin(&config, Some(UserId(1))).unwrap(), UserId(1));
        assert!(require_admin(&config, Some(UserId(2))).is_err());
    }
}
