use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEMO_EMAIL: &str = "demo@petfriends.test";
pub const DEMO_PASSWORD: &str = "demo-password";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub key: String,
    pub user_id: String,
}

impl Account {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            key: Uuid::new_v4().simple().to_string(),
            user_id: Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Accounts plus pets, newest pet first.
#[derive(Debug, Default)]
pub struct Store {
    pub accounts: Vec<Account>,
    pub pets: Vec<Pet>,
}

impl Store {
    pub fn with_account(email: &str, password: &str) -> Self {
        Self {
            accounts: vec![Account::new(email, password)],
            pets: Vec::new(),
        }
    }

    fn user_for_key(&self, key: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.key == key)
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

/// Fields accepted by `PUT /api/pets/{id}`; absent fields stay unchanged.
#[derive(Deserialize)]
pub struct UpdatePet {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub age: Option<String>,
}

pub type Db = Arc<RwLock<Store>>;

/// Router with a single demo account.
pub fn app() -> Router {
    app_with(Store::with_account(DEMO_EMAIL, DEMO_PASSWORD))
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/key", get(get_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{pet_id}", post(set_photo))
        .route("/api/pets/{pet_id}", put(update_pet).delete(delete_pet))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(store)).await
}

/// Error page in the same `text/html` shape the real service uses.
pub struct Rejection(StatusCode, String);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let page = format!("<!doctype html><title>{0}</title><h1>{0}</h1><p>{1}</p>", self.0, self.1);
        (self.0, Html(page)).into_response()
    }
}

fn forbidden(msg: &str) -> Rejection {
    Rejection(StatusCode::FORBIDDEN, msg.to_string())
}

fn bad_request(msg: impl Into<String>) -> Rejection {
    Rejection(StatusCode::BAD_REQUEST, msg.into())
}

fn not_found() -> Rejection {
    Rejection(StatusCode::NOT_FOUND, "Pet with this id wasn't found".to_string())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Resolve the `auth_key` header to a user id.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    header(headers, "auth_key")
        .and_then(|key| store.user_for_key(key))
        .map(|account| account.user_id.clone())
        .ok_or_else(|| forbidden("Please provide 'auth_key' Header"))
}

fn validate_age(age: &str) -> Result<(), Rejection> {
    match age.trim().parse::<u32>() {
        Ok(_) => Ok(()),
        Err(_) => Err(bad_request(format!("Age must be a non-negative number, got '{age}'"))),
    }
}

fn photo_data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

fn owned_pet_mut<'a>(store: &'a mut Store, pet_id: &str, user_id: &str) -> Result<&'a mut Pet, Rejection> {
    let pet = store.pets.iter_mut().find(|p| p.id == pet_id).ok_or_else(not_found)?;
    if pet.user_id != user_id {
        return Err(forbidden("Only the owner can change this pet"));
    }
    Ok(pet)
}

/// Text fields and the optional `pet_photo` file part of a multipart form.
async fn read_form(mut multipart: Multipart) -> Result<(HashMap<String, String>, Option<String>), Rejection> {
    let mut fields = HashMap::new();
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| bad_request(e.to_string()))? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == "pet_photo" {
            let content_type = field.content_type().unwrap_or("image/jpeg").to_string();
            let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
            photo = Some(photo_data_uri(&content_type, &bytes));
        } else {
            let text = field.text().await.map_err(|e| bad_request(e.to_string()))?;
            fields.insert(name, text);
        }
    }
    Ok((fields, photo))
}

async fn get_key(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    let email = header(&headers, "email").unwrap_or("");
    let password = header(&headers, "password").unwrap_or("");
    store
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
        .map(|a| Json(json!({ "key": a.key })))
        .ok_or_else(|| forbidden("This user wasn't found in database"))
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, Rejection> {
    let store = db.read().await;
    let user_id = authorize(&store, &headers)?;
    let pets: Vec<&Pet> = match query.filter.as_deref().unwrap_or("") {
        "" => store.pets.iter().collect(),
        "my_pets" => store.pets.iter().filter(|p| p.user_id == user_id).collect(),
        other => {
            return Err(Rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Filter value is incorrect: '{other}'"),
            ))
        }
    };
    Ok(Json(json!({ "pets": pets })))
}

async fn create_pet(State(db): State<Db>, headers: HeaderMap, multipart: Multipart) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let (mut fields, photo) = read_form(multipart).await?;
    let mut take = |name: &str| fields.remove(name).ok_or_else(|| bad_request(format!("Field '{name}' is required")));
    let name = take("name")?;
    let animal_type = take("animal_type")?;
    let age = take("age")?;
    validate_age(&age)?;
    let pet_photo = photo.ok_or_else(|| bad_request("Field 'pet_photo' is required"))?;

    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        name,
        animal_type,
        age,
        pet_photo,
        user_id,
    };
    info!(pet_id = %pet.id, "pet created with photo");
    db.write().await.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let text = |name: &str| match input.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(bad_request(format!("Field '{name}' must be a string, got {other}"))),
        None => Err(bad_request(format!("Field '{name}' is required"))),
    };
    let name = text("name")?;
    let animal_type = text("animal_type")?;
    let age = text("age")?;
    validate_age(&age)?;

    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        name,
        animal_type,
        age,
        pet_photo: String::new(),
        user_id,
    };
    info!(pet_id = %pet.id, "pet created without photo");
    db.write().await.pets.insert(0, pet.clone());
    Ok(Json(pet))
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, Rejection> {
    let user_id = authorize(&*db.read().await, &headers)?;
    let (_, photo) = read_form(multipart).await?;

    let mut store = db.write().await;
    let pet = owned_pet_mut(&mut store, &pet_id, &user_id)?;
    pet.pet_photo = photo.ok_or_else(|| bad_request("Field 'pet_photo' is required"))?;
    info!(pet_id = %pet.id, "pet photo replaced");
    Ok(Json(pet.clone()))
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    Form(input): Form<UpdatePet>,
) -> Result<Json<Pet>, Rejection> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    if let Some(age) = &input.age {
        validate_age(age)?;
    }
    let pet = owned_pet_mut(&mut store, &pet_id, &user_id)?;
    if let Some(name) = input.name {
        pet.name = name;
    }
    if let Some(animal_type) = input.animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = input.age {
        pet.age = age;
    }
    info!(pet_id = %pet.id, "pet updated");
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<StatusCode, Rejection> {
    let mut store = db.write().await;
    let user_id = authorize(&store, &headers)?;
    owned_pet_mut(&mut store, &pet_id, &user_id)?;
    store.pets.retain(|p| p.id != pet_id);
    info!(%pet_id, "pet deleted");
    Ok(StatusCode::OK)
}
