//! Integration tests for the class administration session.

use std::sync::Arc;

use classadmin_config::ApiConfig;
use classadmin_directory::{
    ClassAdminSession, DirectoryError, DirectoryService, InMemoryPreferences, KeyTranslator,
    Operator, PreferenceStore, SessionEvent, SortColumn, TracingNotifier, UserType,
    SELECTED_CLASS_PREFERENCE,
};
use httpmock::prelude::*;
use serde_json::json;
use tokio::sync::broadcast::Receiver;

fn roster() -> serde_json::Value {
    json!([
        { "id": "s1", "type": "Student", "lastName": "Martin", "firstName": "Léa", "source": "AAF" },
        { "id": "s2", "type": "Student", "lastName": "Bernard", "firstName": "Tom", "source": "CSV" },
        { "id": "s3", "type": "Student", "lastName": "Dubois", "firstName": "Zoé", "source": "AAF",
          "activationCode": "ACT1" },
        { "id": "t1", "type": "Teacher", "lastName": "Petit", "firstName": "Marc", "source": "AAF" }
    ])
}

async fn mock_backend(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/userbook/structures");
            then.status(200)
                .json_body(json!([{ "id": "s-1", "name": "Jules Ferry" }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/userbook/structure/s-1");
            then.status(200).json_body(json!({
                "classes": [
                    { "id": "c1", "name": "CP" },
                    { "id": "c2", "name": "CE1" }
                ],
                "users": []
            }));
        })
        .await;
    for (id, name) in [("c1", "CP"), ("c2", "CE1")] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/directory/class/{id}"));
                then.status(200)
                    .json_body(json!({ "name": name, "externalId": format!("EXT-{id}") }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/directory/class/{id}/users"));
                then.status(200).json_body(roster());
            })
            .await;
    }
}

fn session(
    server: &MockServer,
    preferences: Arc<InMemoryPreferences>,
    operator: Operator,
) -> ClassAdminSession {
    let config = ApiConfig {
        base_url: server.base_url(),
        ..ApiConfig::default()
    };
    ClassAdminSession::new(
        DirectoryService::new(&config).unwrap(),
        preferences,
        Arc::new(TracingNotifier),
        Arc::new(KeyTranslator),
        operator,
    )
}

fn teacher() -> Operator {
    Operator {
        user_id: Some("t1".to_string()),
        email: Some("teacher@school.test".to_string()),
        mobile: None,
        classes: vec!["c1".to_string(), "c2".to_string()],
    }
}

fn drain(receiver: &mut Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn visible_ids(session: &ClassAdminSession) -> Vec<String> {
    session
        .visible_users()
        .into_iter()
        .map(|user| user.id.clone())
        .collect()
}

#[tokio::test]
async fn init_opens_preferred_class() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let preferences = Arc::new(InMemoryPreferences::with_value(SELECTED_CLASS_PREFERENCE, "c2"));
    let mut session = session(&server, preferences, teacher());
    let mut events = session.subscribe();

    let opened = session.init().await.unwrap();

    assert_eq!(opened.as_deref(), Some("c2"));
    assert_eq!(session.current_class().map(|c| c.name.as_str()), Some("CE1"));
    assert_eq!(session.menu().classrooms().len(), 2);
    assert_eq!(session.menu().selected_school("c2"), Some("Jules Ferry"));

    let events = drain(&mut events);
    assert_eq!(events[0], SessionEvent::NetworkLoaded { schools: 1 });
    assert!(events.contains(&SessionEvent::ClassLoaded {
        class_id: "c2".to_string()
    }));
}

#[tokio::test]
async fn init_falls_back_to_operator_first_class() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let preferences = Arc::new(InMemoryPreferences::with_value(SELECTED_CLASS_PREFERENCE, "gone"));
    let mut session = session(&server, preferences.clone(), teacher());

    assert_eq!(session.init().await.unwrap().as_deref(), Some("c1"));
    assert_eq!(
        preferences.get(SELECTED_CLASS_PREFERENCE).await.unwrap().as_deref(),
        Some("c1")
    );
}

#[tokio::test]
async fn init_without_classes_opens_nothing() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let operator = Operator {
        classes: Vec::new(),
        ..teacher()
    };
    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), operator);

    assert_eq!(session.init().await.unwrap(), None);
    assert!(session.current_class().is_none());
    assert!(session.visible_users().is_empty());
}

#[tokio::test]
async fn selecting_a_class_persists_preference() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let preferences = Arc::new(InMemoryPreferences::new());
    let mut session = session(&server, preferences.clone(), teacher());

    session.select_classroom("c2").await.unwrap();
    assert_eq!(
        preferences.get(SELECTED_CLASS_PREFERENCE).await.unwrap().as_deref(),
        Some("c2")
    );
    assert_eq!(session.current_class().map(|c| c.id.as_str()), Some("c2"));

    let err = session.select_classroom("").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NoActiveClassroom));
    assert!(session.current_class().is_none());
}

#[tokio::test]
async fn opening_a_class_keeps_stored_preference() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let preferences = Arc::new(InMemoryPreferences::with_value(SELECTED_CLASS_PREFERENCE, "c1"));
    let mut session = session(&server, preferences.clone(), teacher());
    let mut events = session.subscribe();

    let outcome = session.open_classroom("c2").await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(session.current_class().map(|c| c.id.as_str()), Some("c2"));
    assert_eq!(
        preferences.get(SELECTED_CLASS_PREFERENCE).await.unwrap().as_deref(),
        Some("c1")
    );
    assert!(drain(&mut events).contains(&SessionEvent::ClassLoaded {
        class_id: "c2".to_string()
    }));

    let err = session.open_classroom("").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NoActiveClassroom));
}

#[tokio::test]
async fn list_view_follows_tab_search_and_sort() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();

    assert_eq!(visible_ids(&session), vec!["s2", "s3", "s1"]);

    session.sort_desc(SortColumn::Name);
    assert_eq!(visible_ids(&session), vec!["s1", "s3", "s2"]);

    session.set_search("zoe");
    assert_eq!(visible_ids(&session), vec!["s3"]);

    session.select_tab(UserType::Teacher);
    assert_eq!(session.user_list().search(), "");
    assert_eq!(visible_ids(&session), vec!["t1"]);
}

#[tokio::test]
async fn selection_drives_action_predicates() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();
    let mut events = session.subscribe();

    assert!(!session.actions().has_selected_users());
    assert!(session.actions().can_remove_selection());

    assert_eq!(session.toggle_user("s1"), Some(true));
    assert!(session.actions().has_selected_users());
    assert!(session.actions().can_remove_selection());
    assert!(session.actions().selected_users_are_not_blocked());

    session.switch_all(Some(true));
    assert_eq!(session.actions().selection().len(), 3);
    assert!(!session.actions().can_remove_selection());
    assert!(!session.actions().selected_users_are_not_activated());

    let err = session.remove_selection().await.unwrap_err();
    assert!(matches!(err, DirectoryError::ProtectedSelection));

    let events = drain(&mut events);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::SelectionChanged {
            selected: vec!["s2".to_string(), "s3".to_string(), "s1".to_string()]
        })
    );
}

#[tokio::test]
async fn block_selection_updates_roster_and_broadcasts() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let block = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/auth/block/s1")
                .json_body(json!({ "block": true }));
            then.status(200);
        })
        .await;

    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();
    session.toggle_user("s1");
    let mut events = session.subscribe();

    session.block_selection(true).await.unwrap();

    block.assert_async().await;
    let blocked = session
        .current_class()
        .and_then(|c| c.user("s1"))
        .map(|u| u.blocked);
    assert_eq!(blocked, Some(true));
    assert!(session.actions().selected_users_are_blocked());
    assert!(drain(&mut events).contains(&SessionEvent::UsersBlocked {
        ids: vec!["s1".to_string()],
        blocked: true,
    }));
}

#[tokio::test]
async fn remove_selection_drops_users() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let delete = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/directory/user/delete")
                .json_body(json!({ "users": ["s1"] }));
            then.status(200);
        })
        .await;

    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();
    session.toggle_user("s1");

    let removed = session.remove_selection().await.unwrap();

    delete.assert_async().await;
    assert_eq!(removed, vec!["s1"]);
    assert!(session.current_class().and_then(|c| c.user("s1")).is_none());
    assert!(!session.actions().has_selected_users());
}

#[tokio::test]
async fn password_reset_needs_operator_email() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let reset = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/sendResetPassword")
                .json_body_partial(r#"{ "email": "teacher@school.test" }"#);
            then.status(200);
        })
        .await;

    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();
    session.toggle_user("s1");
    session.toggle_user("s2");
    assert_eq!(session.reset_selection_passwords().await.unwrap(), 2);
    reset.assert_hits_async(2).await;

    let operator = Operator {
        email: None,
        ..teacher()
    };
    let mut anonymous = self::session(&server, Arc::new(InMemoryPreferences::new()), operator);
    let err = anonymous.reset_selection_passwords().await.unwrap_err();
    assert!(matches!(err, DirectoryError::MissingResetDestination));
}

#[tokio::test]
async fn import_reloads_current_class() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/upload_file")
                .body_contains("name=\"Teacher\"")
                .body_contains("EXT-c1");
            then.status(500).body(r#"{"message":"broken file"}"#);
        })
        .await;

    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();
    let mut events = session.subscribe();

    session
        .import_file("teachers.csv", b"a;b\n".to_vec(), UserType::Teacher)
        .await
        .unwrap();

    upload.assert_async().await;
    assert!(drain(&mut events).contains(&SessionEvent::ClassLoaded {
        class_id: "c1".to_string()
    }));
}

#[tokio::test]
async fn save_class_infos_and_add_user() {
    let server = MockServer::start_async().await;
    mock_backend(&server).await;
    let save = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/directory/class/c1")
                .json_body(json!({ "name": "CP bis", "level": "CP" }));
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/directory/class/c1/user");
            then.status(200)
                .json_body(json!({ "id": "s9", "type": "Student", "lastName": "Roux" }));
        })
        .await;

    let mut session = session(&server, Arc::new(InMemoryPreferences::new()), teacher());
    session.select_classroom("c1").await.unwrap();

    session
        .save_class_infos(Some("CP bis".to_string()), Some("CP".to_string()))
        .await
        .unwrap();
    save.assert_async().await;

    let draft = classadmin_directory::User {
        last_name: Some("Roux".to_string()),
        first_name: Some("Ana".to_string()),
        user_type: Some(UserType::Student),
        ..Default::default()
    };
    let created = session.add_user(draft).await.unwrap();
    assert_eq!(created.id, "s9");
    assert!(session.current_class().and_then(|c| c.user("s9")).is_some());
}
