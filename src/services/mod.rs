pub mod accounts;
pub mod tasks;

use std::sync::Arc;

use actix_web::web;

use crate::auth::{CredentialManager, IdentityGate};
use crate::store::{MemoryTaskStore, MemoryUserStore, TaskStore, UserStore};

pub use accounts::AccountService;
pub use tasks::TaskService;

/// Every service a request may need, constructed once and handed to actix as app data.
#[derive(Clone)]
pub struct AppServices {
    pub tasks: web::Data<TaskService>,
    pub accounts: web::Data<AccountService>,
    pub gate: web::Data<IdentityGate>,
}

impl AppServices {
    pub fn new(
        task_store: Arc<dyn TaskStore>,
        user_store: Arc<dyn UserStore>,
        credentials: Arc<CredentialManager>,
    ) -> Self {
        Self {
            tasks: web::Data::new(TaskService::new(task_store)),
            accounts: web::Data::new(AccountService::new(
                user_store.clone(),
                credentials.clone(),
            )),
            gate: web::Data::new(IdentityGate::new(credentials, user_store)),
        }
    }

    /// Services over fresh in-memory stores.
    pub fn in_memory(credentials: Arc<CredentialManager>) -> Self {
        Self::new(
            Arc::new(MemoryTaskStore::new()),
            Arc::new(MemoryUserStore::new()),
            credentials,
        )
    }

    /// Registers the services as application data.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.tasks.clone())
            .app_data(self.accounts.clone())
            .app_data(self.gate.clone());
    }
}
