//! In-memory stand-in for the PetFriends API.
//!
//! Serves the same paths, status codes and body shapes the live service
//! does, so the client scenario suite can run without network access.

pub mod error;
pub mod logger;

use std::{
    future::Future,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use error::ApiFailure;

/// Owner of the pet every fresh store starts with.
pub const SEED_OWNER: &str = "seed-owner";

/// Highest age the service accepts.
pub const MAX_AGE: i64 = 100;

const ACCEPTED_PHOTO_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKey {
    pub key: String,
}

/// Fields of the create and update forms. Absent fields read as empty so
/// they fail validation with 400 rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animal_type: String,
    #[serde(default)]
    pub age: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: String,
}

struct User {
    id: String,
    account: Account,
    key: String,
}

struct Photo {
    content_type: String,
    bytes: Vec<u8>,
}

impl Photo {
    fn into_data_url(self) -> Result<String, ApiFailure> {
        if !ACCEPTED_PHOTO_TYPES.contains(&self.content_type.as_str()) {
            return Err(ApiFailure::BadRequest(format!(
                "unsupported photo type {:?}",
                self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(ApiFailure::BadRequest("photo is empty".to_string()));
        }
        Ok(format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        ))
    }
}

pub struct Store {
    users: Vec<User>,
    /// Newest first, matching the live service's listing order.
    pets: Vec<Pet>,
}

impl Store {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let users = accounts
            .into_iter()
            .map(|account| User {
                id: Uuid::new_v4().simple().to_string(),
                key: Uuid::new_v4().simple().to_string(),
                account,
            })
            .collect();
        let seed = Pet {
            id: Uuid::new_v4().simple().to_string(),
            name: "Барсик".to_string(),
            animal_type: "кот".to_string(),
            age: "3".to_string(),
            pet_photo: String::new(),
            user_id: SEED_OWNER.to_string(),
            created_at: now(),
        };
        Self {
            users,
            pets: vec![seed],
        }
    }

    fn key_for(&self, email: &str, password: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|user| user.account.email == email && user.account.password == password)
            .map(|user| user.key.as_str())
    }

    fn user_for_key(&self, key: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|user| user.key == key)
            .map(|user| user.id.as_str())
    }

    fn owned_pet_mut(&mut self, user_id: &str, pet_id: &str) -> Result<&mut Pet, ApiFailure> {
        self.pets
            .iter_mut()
            .find(|pet| pet.id == pet_id && pet.user_id == user_id)
            .ok_or_else(|| ApiFailure::BadRequest(format!("no pet {pet_id} owned by caller")))
    }

    fn insert(&mut self, user_id: &str, form: PetForm, pet_photo: String) -> Pet {
        let pet = Pet {
            id: Uuid::new_v4().simple().to_string(),
            name: form.name,
            animal_type: form.animal_type,
            age: form.age,
            pet_photo,
            user_id: user_id.to_string(),
            created_at: now(),
        };
        self.pets.insert(0, pet.clone());
        info!("created pet {} for user {user_id}", pet.id);
        pet
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app(accounts: impl IntoIterator<Item = Account>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store::new(accounts)));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(add_new_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{pet_id}", post(set_pet_photo))
        .route("/api/pets/{pet_id}", put(update_pet_info).delete(delete_pet))
        .with_state(db)
}

pub async fn run(
    listener: TcpListener,
    accounts: impl IntoIterator<Item = Account>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(accounts)).await
}

/// Like `run`, but stops accepting connections once `shutdown` resolves and
/// returns after in-flight requests finish.
pub async fn run_until<F>(
    listener: TcpListener,
    accounts: impl IntoIterator<Item = Account>,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(accounts))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<ApiKey>, ApiFailure> {
    let email = header_str(&headers, "email").unwrap_or_default();
    let password = header_str(&headers, "password").unwrap_or_default();
    let store = db.read().await;
    let key = store.key_for(email, password).ok_or(ApiFailure::Forbidden)?;
    debug!("issued key for {email}");
    Ok(Json(ApiKey {
        key: key.to_string(),
    }))
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PetList>, ApiFailure> {
    let store = db.read().await;
    let user_id = authorize(&store, &headers)?;
    let pets = match query.filter.as_str() {
        "" => store.pets.clone(),
        "my_pets" => store
            .pets
            .iter()
            .filter(|pet| pet.user_id == user_id)
            .cloned()
            .collect(),
        other => {
            return Err(ApiFailure::Internal(format!("unknown filter {other:?}")));
        }
    };
    Ok(Json(PetList { pets }))
}

async fn add_new_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, ApiFailure> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let (form, photo) = read_multipart(multipart).await?;
    validate(&form)?;
    let photo = photo.ok_or_else(|| ApiFailure::BadRequest("pet_photo is required".to_string()))?;
    let pet_photo = photo.into_data_url()?;
    Ok(Json(db.write().await.insert(&user_id, form, pet_photo)))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, ApiFailure> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    validate(&form)?;
    Ok(Json(store.insert(&user_id, form, String::new())))
}

async fn set_pet_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, ApiFailure> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let (_, photo) = read_multipart(multipart).await?;
    let photo = photo.ok_or_else(|| ApiFailure::BadRequest("pet_photo is required".to_string()))?;
    let pet_photo = photo.into_data_url()?;

    let mut store = db.write().await;
    let pet = store.owned_pet_mut(&user_id, &pet_id)?;
    pet.pet_photo = pet_photo;
    debug!("set photo on pet {pet_id}");
    Ok(Json(pet.clone()))
}

async fn update_pet_info(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, ApiFailure> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    validate(&form)?;
    let pet = store.owned_pet_mut(&user_id, &pet_id)?;
    pet.name = form.name;
    pet.animal_type = form.animal_type;
    pet.age = form.age;
    info!("updated pet {pet_id}");
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    let index = store
        .pets
        .iter()
        .position(|pet| pet.id == pet_id && pet.user_id == user_id)
        .ok_or_else(|| ApiFailure::BadRequest(format!("no pet {pet_id} owned by caller")))?;
    store.pets.remove(index);
    info!("deleted pet {pet_id}");
    Ok(StatusCode::OK)
}

fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, ApiFailure> {
    header_str(headers, "auth_key")
        .and_then(|key| store.user_for_key(key))
        .map(str::to_string)
        .ok_or(ApiFailure::Forbidden)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// `name` and `animal_type` must contain a letter; `age` must be an integer
/// in `0..=MAX_AGE`.
pub fn validate(form: &PetForm) -> Result<(), ApiFailure> {
    for (field, value) in [("name", &form.name), ("animal_type", &form.animal_type)] {
        if !value.chars().any(char::is_alphabetic) {
            return Err(ApiFailure::BadRequest(format!("{field} must contain a letter")));
        }
    }
    match form.age.trim().parse::<i64>() {
        Ok(age) if (0..=MAX_AGE).contains(&age) => Ok(()),
        _ => Err(ApiFailure::BadRequest(format!(
            "age must be an integer between 0 and {MAX_AGE}"
        ))),
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<(PetForm, Option<Photo>), ApiFailure> {
    let mut form = PetForm::default();
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.map_err(malformed)?,
            "animal_type" => form.animal_type = field.text().await.map_err(malformed)?,
            "age" => form.age = field.text().await.map_err(malformed)?,
            "pet_photo" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                photo = Some(Photo {
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }
    Ok((form, photo))
}

fn malformed(error: MultipartError) -> ApiFailure {
    ApiFailure::BadRequest(format!("malformed multipart body: {}", error.body_text()))
}

fn now() -> String {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", elapsed.as_secs(), elapsed.subsec_micros())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, animal_type: &str, age: &str) -> PetForm {
        PetForm {
            name: name.to_string(),
            animal_type: animal_type.to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn accepts_reasonable_pet() {
        assert!(validate(&form("Рекс", "собака", "2")).is_ok());
        assert!(validate(&form("Rex", "dog", "0")).is_ok());
        assert!(validate(&form("Rex", "dog", "100")).is_ok());
    }

    #[test]
    fn rejects_negative_or_huge_age() {
        assert!(validate(&form("Барсик", "кот", "-5")).is_err());
        assert!(validate(&form("Барсик", "кот", "101")).is_err());
    }

    #[test]
    fn rejects_non_numeric_age() {
        assert!(validate(&form("Rex", "dog", "kjj")).is_err());
    }

    #[test]
    fn rejects_symbol_only_fields() {
        assert!(validate(&form("%&(", "dog", "3")).is_err());
        assert!(validate(&form("Rex", "525", "3")).is_err());
    }

    #[test]
    fn rejects_empty_fields() {
        assert!(validate(&PetForm::default()).is_err());
    }

    #[test]
    fn store_issues_stable_keys() {
        let store = Store::new([Account::new("a@b.c", "pw")]);
        let key = store.key_for("a@b.c", "pw").unwrap().to_string();
        assert_eq!(store.key_for("a@b.c", "pw"), Some(key.as_str()));
        assert!(store.key_for("a@b.c", "wrong").is_none());
        assert!(store.user_for_key(&key).is_some());
        assert!(store.user_for_key("bogus").is_none());
    }

    #[test]
    fn store_starts_with_one_foreign_pet() {
        let store = Store::new([Account::new("a@b.c", "pw")]);
        assert_eq!(store.pets.len(), 1);
        assert_eq!(store.pets[0].user_id, SEED_OWNER);
    }

    #[test]
    fn photo_must_be_an_image() {
        let photo = Photo {
            content_type: "text/plain".to_string(),
            bytes: b"hi".to_vec(),
        };
        assert!(photo.into_data_url().is_err());

        let photo = Photo {
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(photo.into_data_url().unwrap(), "data:image/png;base64,AQID");
    }

    #[test]
    fn pet_serializes_with_wire_names() {
        let pet = Pet {
            id: "p1".to_string(),
            name: "Rex".to_string(),
            animal_type: "dog".to_string(),
            age: "2".to_string(),
            pet_photo: String::new(),
            user_id: "u1".to_string(),
            created_at: "0.000000".to_string(),
        };
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["animal_type"], "dog");
        assert_eq!(json["age"], "2");
        assert_eq!(json["pet_photo"], "");
    }
}
