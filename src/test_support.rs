//! Shared fixtures for the HTTP tests.

use std::sync::Arc;

use actix_web::{test::TestRequest, web::Data};
use chrono::{TimeZone, Utc};

use crate::app_state::AppState;
use crate::auth::jwt::generate_token;
use crate::config::{Config, StorageBackend};
use crate::model::employee::{Employee, NewEmployee, Sector};
use crate::model::role::Role;
use crate::store::MemoryStore;
use crate::tracker::clock::FixedClock;

pub struct TestContext {
    pub state: Data<AppState>,
    pub config: Data<Config>,
    pub clock: Arc<FixedClock>,
}

pub fn context() -> TestContext {
    context_with(Config::for_tests())
}

pub fn context_with(config: Config) -> TestContext {
    // 09:00 in Madrid
    let clock = Arc::new(FixedClock::at(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()));
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        StorageBackend::Memory,
        &config,
        clock.clone(),
    );

    TestContext {
        state: Data::new(state),
        config: Data::new(config),
        clock,
    }
}

impl TestContext {
    pub async fn hire(&self, document_number: &str) -> Employee {
        let employee = self
            .state
            .directory
            .create(NewEmployee {
                full_name: "Juan Perez Gonzalez".to_string(),
                document_number: document_number.to_string(),
                social_security_number: "281234567890".to_string(),
                sector: Sector::Kitchen,
            })
            .await
            .unwrap();
        self.state.document_filter.insert(&employee.document_number);
        employee
    }

    pub fn employee_token(&self, employee: &Employee) -> String {
        generate_token(
            employee.id,
            employee.document_number.clone(),
            Role::Employee,
            Some(employee.id),
            &self.config.jwt_secret,
            self.config.employee_token_ttl,
        )
        .unwrap()
    }

    pub fn admin_token(&self) -> String {
        generate_token(
            1,
            self.config.admin_username.clone(),
            Role::Admin,
            None,
            &self.config.jwt_secret,
            self.config.admin_token_ttl,
        )
        .unwrap()
    }
}

/// The rate limiters key on the peer address.
pub fn with_peer(req: TestRequest) -> TestRequest {
    req.peer_addr("127.0.0.1:40000".parse().unwrap())
}

macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.config.clone())
                .configure(|cfg| crate::routes::configure(cfg, $ctx.config.get_ref().clone())),
        )
        .await
    };
}

pub(crate) use test_app;
