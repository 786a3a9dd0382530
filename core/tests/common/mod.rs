//! Shared setup for the scenario suite.
//!
//! By default every scenario gets its own mock server on an ephemeral port.
//! With `PETFRIENDS_LIVE=1` the suite targets the account configured through
//! `Settings::from_env()` instead; those scenarios share remote state, which
//! is why they all run under `#[serial]`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::thread::JoinHandle;

use log::{debug, info};
use petfriends_core::{AuthKey, NewPet, PetFilter, PetFriends, PetFriendsError, PetList, Settings};
use tokio::sync::oneshot;

pub const TEST_EMAIL: &str = "tester@example.com";
pub const TEST_PASSWORD: &str = "correct horse battery staple";

// Fields drop in order: the client releases its pooled connections before
// the mock server is asked to stop.
pub struct Suite {
    pub pf: PetFriends,
    pub settings: Settings,
    _mock: Option<MockServer>,
}

pub fn suite() -> Suite {
    let (settings, mock) = if live() {
        let settings =
            Settings::from_env().expect("live mode needs PETFRIENDS_EMAIL and PETFRIENDS_PASSWORD");
        (settings, None)
    } else {
        let mock = MockServer::start();
        let settings = Settings::new(mock.base_url.clone(), TEST_EMAIL, TEST_PASSWORD);
        (settings, Some(mock))
    };
    Suite {
        pf: PetFriends::new(&settings.base_url),
        settings,
        _mock: mock,
    }
}

fn live() -> bool {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded .env from: {}", path.display()),
        Err(e) => debug!("No .env applied: {e}"),
    }
    matches!(
        std::env::var("PETFRIENDS_LIVE").as_deref(),
        Ok("1") | Ok("true")
    )
}

/// A mock server on a random port, stopped and joined on drop.
pub struct MockServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start() -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run_until(
                    listener,
                    [mock_server::Account::new(TEST_EMAIL, TEST_PASSWORD)],
                    async {
                        let _ = rx.await;
                    },
                )
                .await
            })
            .unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
            thread: Some(thread),
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// The JPEG every upload scenario sends.
pub fn photo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/images/cat1.jpg")
}

impl Suite {
    /// Authenticate with the configured account.
    pub fn valid_key(&self) -> Result<AuthKey, PetFriendsError> {
        let response = self
            .pf
            .get_api_key(&self.settings.email, &self.settings.password)?;
        assert_eq!(response.status, 200, "login failed: {:?}", response.body);
        response.auth_key()
    }

    pub fn my_pets(&self, key: &AuthKey) -> Result<PetList, PetFriendsError> {
        let response = self.pf.list_pets(key, &PetFilter::MyPets)?;
        assert_eq!(response.status, 200, "my_pets failed: {:?}", response.body);
        response.pets()
    }

    /// Id of a pet owned by the account, creating one first if it has none.
    pub fn ensure_my_pet(&self, key: &AuthKey) -> Result<String, PetFriendsError> {
        let mut pets = self.my_pets(key)?;
        if pets.pets.is_empty() {
            let created = self
                .pf
                .create_pet_simple(key, &NewPet::new("Рекс", "собака", "2"))?;
            assert_eq!(created.status, 200, "fallback create failed: {:?}", created.body);
            pets = self.my_pets(key)?;
        }
        let first = pets.pets.first().expect("account still has no pets after create");
        Ok(first.id.clone())
    }
}
