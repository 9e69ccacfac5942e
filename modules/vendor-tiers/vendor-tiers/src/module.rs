//! Wiring for the vendor tiers module.

use std::sync::Arc;

use anyhow::ensure;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vendor_tiers_sdk::VendorTiersClientV1;

use crate::config::VendorTiersConfig;
use crate::domain::local_client::LocalClient;
use crate::domain::policy::TierPolicy;
use crate::domain::ports::TierMailer;
use crate::domain::repo::{TierRequestsRepository, VendorsRepository};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::RateLimitedClient;
use crate::infra::notify::{LogMailer, NotificationDispatcher, notification_channel};
use crate::infra::rate_limit::SubmitRateLimiter;
use crate::infra::storage::InMemoryTierStore;

/// A running vendor tiers module: the client plus its background tasks
/// (notification dispatcher, rate limit sweeper).
pub struct VendorTiersModule {
    client: Arc<dyn VendorTiersClientV1>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl VendorTiersModule {
    #[must_use]
    pub fn builder(config: VendorTiersConfig) -> VendorTiersModuleBuilder {
        VendorTiersModuleBuilder {
            config,
            policy: TierPolicy::standard(),
            vendors: None,
            requests: None,
            mailer: None,
            cancel: None,
        }
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn VendorTiersClientV1> {
        self.client.clone()
    }

    /// Stop background tasks. Notifications already queued are delivered
    /// first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "vendor_tiers background task failed");
            }
        }
        info!("vendor_tiers module stopped");
    }
}

pub struct VendorTiersModuleBuilder {
    config: VendorTiersConfig,
    policy: TierPolicy,
    vendors: Option<Arc<dyn VendorsRepository>>,
    requests: Option<Arc<dyn TierRequestsRepository>>,
    mailer: Option<Arc<dyn TierMailer>>,
    cancel: Option<CancellationToken>,
}

impl VendorTiersModuleBuilder {
    #[must_use]
    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use one backend for both vendors and requests.
    #[must_use]
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: VendorsRepository + TierRequestsRepository + 'static,
    {
        let vendors: Arc<dyn VendorsRepository> = store.clone();
        let requests: Arc<dyn TierRequestsRepository> = store;
        self.vendors = Some(vendors);
        self.requests = Some(requests);
        self
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn TierMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Tie background tasks to a parent token; they also stop on
    /// [`VendorTiersModule::shutdown`].
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the client and spawn background tasks. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the configuration is inconsistent.
    pub fn start(self) -> anyhow::Result<VendorTiersModule> {
        info!("Initializing vendor_tiers module");
        let cfg = self.config;
        ensure!(
            cfg.workflow.notes_min_len <= cfg.workflow.notes_max_len,
            "workflow.notes_min_len must not exceed workflow.notes_max_len"
        );
        ensure!(
            cfg.workflow.max_page_size > 0,
            "workflow.max_page_size must be positive"
        );
        let limiter = if cfg.rate_limit.enabled {
            Some(Arc::new(SubmitRateLimiter::new(&cfg.rate_limit)?))
        } else {
            None
        };
        debug!(
            rate_limit_enabled = cfg.rate_limit.enabled,
            notifications_enabled = cfg.notifications.enabled,
            "Loaded vendor_tiers config"
        );

        let cancel = self.cancel.map_or_else(CancellationToken::new, |parent| {
            parent.child_token()
        });
        let (vendors, requests) = match (self.vendors, self.requests) {
            (Some(vendors), Some(requests)) => (vendors, requests),
            _ => {
                let store = Arc::new(InMemoryTierStore::new());
                let vendors: Arc<dyn VendorsRepository> = store.clone();
                let requests: Arc<dyn TierRequestsRepository> = store;
                (vendors, requests)
            }
        };
        let mailer: Arc<dyn TierMailer> = match self.mailer {
            Some(mailer) => mailer,
            None => Arc::new(LogMailer::new(&cfg.notifications)),
        };

        let (publisher, events) = notification_channel();
        let service = Arc::new(Service::new(
            vendors,
            requests,
            Arc::new(publisher),
            Arc::new(self.policy),
            ServiceConfig::from(&cfg.workflow),
        ));

        let mut tasks = vec![
            NotificationDispatcher::new(mailer, cfg.notifications).spawn(events, cancel.clone()),
        ];

        let mut client: Arc<dyn VendorTiersClientV1> = Arc::new(LocalClient::new(service));
        if let Some(limiter) = limiter {
            tasks.push(limiter.clone().spawn_sweeper(cancel.clone()));
            client = Arc::new(RateLimitedClient::new(client, limiter));
        }

        info!("vendor_tiers module initialized");
        Ok(VendorTiersModule {
            client,
            cancel,
            tasks,
        })
    }
}
