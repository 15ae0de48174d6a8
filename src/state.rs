use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::services::api::rest::RestBookingApi;
use crate::services::api::BookingApi;
use crate::services::booking::BookingSubmitter;
use crate::services::events::HostEvents;
use crate::services::session::Session;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub session: Arc<Session>,
    pub api: Arc<dyn BookingApi>,
    pub submitter: BookingSubmitter,
    pub events: HostEvents,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let db = Arc::new(Mutex::new(db::init_db(&config.database_url)?));
        let session = Arc::new(Session::restore(Arc::clone(&db))?);
        let api: Arc<dyn BookingApi> = Arc::new(RestBookingApi::new(
            &config.api_base_url,
            Arc::clone(&session),
            Duration::from_secs(config.request_timeout_secs),
        )?);

        Ok(Self {
            db,
            submitter: BookingSubmitter::new(Arc::clone(&api)),
            config,
            session,
            api,
            events: HostEvents::default(),
        })
    }
}
