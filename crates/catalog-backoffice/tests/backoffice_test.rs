use catalog_backoffice::resources::{character, planet, user};
use catalog_client::mock::MockTransport;
use catalog_client::session::MemoryStorage;
use catalog_client::{Mode, SessionStore, Verb};
use serde_json::json;
use std::sync::Arc;

/// Full end-to-end flow: authenticate, create a character, observe the
/// refreshed list, then delete it through the confirmation step.
#[tokio::test]
async fn test_full_backoffice_flow() {
    let mock = MockTransport::new();
    let store = SessionStore::open(MemoryStorage::new());

    mock.expect(Verb::Post, "/api/Usuarios/auth").return_json(json!({
        "jwt": "tok-abc",
        "user": { "_id": "u1", "nombre": "Admin", "email": "a@b.com", "role": "admin" }
    }));
    store
        .authenticate(&mock, "a@b.com", "secret")
        .await
        .expect("authentication should succeed");
    assert!(store.is_authenticated());
    assert!(store.is_admin());

    let characters = character::backoffice_controller(Arc::new(mock.clone()));

    mock.expect(Verb::Get, character::BACKOFFICE_PATH).return_json(json!([]));
    characters.load().await;
    assert!(characters.items().is_empty());

    // Create Goku; the numeric field goes out as a number.
    mock.expect(Verb::Post, character::BACKOFFICE_PATH)
        .return_json(json!({ "_id": "c1", "name": "Goku", "kiBase": 9001 }));
    mock.expect(Verb::Get, character::BACKOFFICE_PATH)
        .return_json(json!([{ "_id": "c1", "name": "Goku", "kiBase": 9001 }]));

    characters.start_create();
    characters.set_field("name", "Goku");
    characters.set_field("kiBase", "9001");
    characters.submit().await;

    let created = mock
        .requests()
        .into_iter()
        .find(|r| r.verb == Verb::Post && r.path == character::BACKOFFICE_PATH)
        .expect("create request was sent");
    assert_eq!(created.body.unwrap()["kiBase"], json!(9001));

    let items = characters.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].number("kiBase"), Some(9001.0));
    assert_eq!(items[0].text("name"), Some("Goku"));

    // Delete it, with confirmation, and end with an empty list.
    mock.expect(Verb::Delete, "/api/backoffice/personajes/c1")
        .return_json(json!({ "msg": "deleted" }));
    mock.expect(Verb::Get, character::BACKOFFICE_PATH).return_json(json!([]));

    characters.request_delete("c1");
    characters.confirm_delete().await;
    assert!(characters.items().is_empty());
    assert_eq!(characters.mode(), Mode::Browsing);

    mock.verify();
}

/// A population of 1000 goes out under the server's casing and comes
/// back readable under either casing.
#[tokio::test]
async fn test_planet_population_round_trip() {
    let mock = MockTransport::new();
    let planets = planet::backoffice_controller(Arc::new(mock.clone()));

    mock.expect(Verb::Post, planet::BACKOFFICE_PATH)
        .return_json(json!({ "_id": "p1" }));
    // The server answers with the internal casing this time; the value
    // must read the same either way.
    mock.expect(Verb::Get, planet::BACKOFFICE_PATH)
        .return_json(json!([{ "_id": "p1", "name": "Namek", "poblation": 1000 }]));

    planets.start_create();
    planets.set_field("name", "Namek");
    planets.set_field("poblation", "1000");
    planets.submit().await;

    let posted = &mock.requests()[0];
    let body = posted.body.as_ref().unwrap();
    assert_eq!(body["Poblation"], json!(1000));
    assert!(body.get("poblation").is_none());

    assert_eq!(planets.items()[0].number("poblation"), Some(1000.0));
    mock.verify();
}

/// Blank population is omitted from the payload, never coerced to zero.
#[tokio::test]
async fn test_blank_population_is_omitted() {
    let mock = MockTransport::new();
    let planets = planet::backoffice_controller(Arc::new(mock.clone()));

    mock.expect(Verb::Post, planet::BACKOFFICE_PATH)
        .return_json(json!({ "_id": "p2" }));
    mock.expect(Verb::Get, planet::BACKOFFICE_PATH)
        .return_json(json!([{ "_id": "p2", "name": "Vegeta" }]));

    planets.start_create();
    planets.set_field("name", "Vegeta");
    planets.submit().await;

    let body = mock.requests()[0].body.clone().unwrap();
    assert!(body.get("Poblation").is_none());
    assert!(body.get("poblation").is_none());
    mock.verify();
}

/// User creation goes through the admin endpoint without the role field;
/// editing with a blank password keeps the current one.
#[tokio::test]
async fn test_user_creation_and_password_handling() {
    let mock = MockTransport::new();
    let users = user::backoffice_controller(Arc::new(mock.clone()));

    // Creating without a password is rejected locally.
    users.start_create();
    users.set_field("nombre", "Krilin");
    users.set_field("email", "k@b.com");
    users.submit().await;
    assert_eq!(users.last_error().as_deref(), Some("password is required"));
    assert!(mock.requests().is_empty());

    mock.expect(Verb::Post, user::CREATE_PATH).return_json(json!({ "_id": "u2" }));
    mock.expect(Verb::Get, user::BACKOFFICE_PATH).return_json(json!([
        { "_id": "u2", "nombre": "Krilin", "email": "k@b.com", "role": "user" }
    ]));

    users.set_field("password", "secreto");
    users.submit().await;

    let created = &mock.requests()[0];
    assert_eq!(created.path, user::CREATE_PATH);
    let body = created.body.as_ref().unwrap();
    assert_eq!(body["nombre"], json!("Krilin"));
    assert_eq!(body["password"], json!("secreto"));
    assert!(body.get("role").is_none());

    // Edit without changing the password: the field is dropped.
    mock.expect(Verb::Put, "/api/backoffice/usuarios/u2")
        .return_json(json!({ "_id": "u2" }));
    mock.expect(Verb::Get, user::BACKOFFICE_PATH).return_json(json!([
        { "_id": "u2", "nombre": "Krilin", "email": "k@b.com", "role": "admin" }
    ]));

    users.start_edit("u2");
    assert_eq!(users.draft_value("password").as_deref(), Some(""));
    users.set_field("role", "admin");
    users.submit().await;

    let updated = mock
        .requests()
        .into_iter()
        .find(|r| r.verb == Verb::Put)
        .expect("update request was sent");
    let body = updated.body.unwrap();
    assert!(body.get("password").is_none());
    assert_eq!(body["role"], json!("admin"));

    mock.verify();
}
