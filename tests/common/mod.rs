use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::net::TcpListener;

use cafe_rs::create_app;
use cafe_rs::models::{Cafe, CreateCafeRequest, RepositoryError, RepositoryResult};
use cafe_rs::repositories::CafeRepository;
use cafe_rs::services::CafeService;

pub struct TestEnvironment {
    pub client: Client,
    pub base_url: String,
}

/// In-memory CafeRepository used to exercise the real router over HTTP
pub struct InMemoryCafeRepository {
    cafes: Mutex<Vec<Cafe>>,
    next_id: AtomicI64,
}

impl InMemoryCafeRepository {
    pub fn new() -> Self {
        Self {
            cafes: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl CafeRepository for InMemoryCafeRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Cafe>> {
        Ok(self.cafes.lock().unwrap().clone())
    }

    async fn find_by_location(&self, location: &str) -> RepositoryResult<Vec<Cafe>> {
        Ok(self
            .cafes
            .lock()
            .unwrap()
            .iter()
            .filter(|cafe| cafe.location == location)
            .cloned()
            .collect())
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Cafe>> {
        Ok(self
            .cafes
            .lock()
            .unwrap()
            .iter()
            .find(|cafe| cafe.name == name)
            .cloned())
    }

    async fn insert(&self, request: CreateCafeRequest) -> RepositoryResult<Cafe> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let cafe = Cafe::new(id, request);
        self.cafes.lock().unwrap().push(cafe.clone());
        Ok(cafe)
    }

    async fn update_price(&self, id: i64, new_price: Option<String>) -> RepositoryResult<()> {
        let mut cafes = self.cafes.lock().unwrap();
        match cafes.iter_mut().find(|cafe| cafe.id == id) {
            Some(cafe) => {
                cafe.coffee_price = new_price;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut cafes = self.cafes.lock().unwrap();
        let before = cafes.len();
        cafes.retain(|cafe| cafe.id != id);
        if cafes.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let repository = Arc::new(InMemoryCafeRepository::new());
        let cafe_service = Arc::new(CafeService::new(repository));
        let app = create_app(cafe_service);

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Failed to serve app");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { client, base_url }
    }

    /// Submit the add form and assert it was accepted
    pub async fn add_cafe(&self, form: &[(&str, &str)]) {
        let response = self
            .client
            .post(format!("{}/add", self.base_url))
            .form(form)
            .send()
            .await
            .expect("Failed to post add form");

        assert_eq!(response.status().as_u16(), 200);
    }

    /// Fetch /all and return the cafes array
    pub async fn all_cafes(&self) -> Vec<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/all", self.base_url))
            .send()
            .await
            .expect("Failed to get /all");

        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.expect("Failed to parse /all");
        body["cafes"]
            .as_array()
            .expect("Expected cafes array")
            .clone()
    }
}

/// A complete, valid add form for the cafe from the concrete scenario
pub fn joes_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Joe's"),
        ("map_url", "http://x"),
        ("img_url", "http://y"),
        ("loc", "Downtown"),
        ("sockets", "1"),
        ("toilet", "1"),
        ("wifi", ""),
        ("calls", "1"),
        ("seats", "10-20"),
        ("coffee_price", "£2.50"),
    ]
}

/// A second valid cafe, located elsewhere
pub fn moxies_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Moxie's"),
        ("map_url", "http://m"),
        ("img_url", "http://n"),
        ("loc", "Riverside"),
        ("sockets", ""),
        ("toilet", "1"),
        ("wifi", "yes"),
        ("calls", ""),
        ("seats", "30-40"),
        ("coffee_price", "£3.00"),
    ]
}
