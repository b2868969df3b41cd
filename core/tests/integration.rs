//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HttpTodoApi` over
//! real HTTP with `UreqTransport`, both directly and through the list
//! controller.

use todo_client::{
    ApiError, ClientConfig, ControllerError, CreateTodo, ErrorKind, HttpTodoApi, ListQuery,
    ListView, TodoApi, TodoListController, UpdateTodo, UreqTransport,
};

/// Start a fresh mock server and return a config pointed at it.
fn start_server_config() -> ClientConfig {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    ClientConfig {
        api_url: format!("http://{addr}/api/v1"),
        ..ClientConfig::default()
    }
}

/// Start a fresh mock server and return an API client pointed at it.
fn start_server() -> HttpTodoApi<UreqTransport> {
    HttpTodoApi::from_config(&start_server_config())
}

#[test]
fn crud_lifecycle() {
    let api = start_server();

    // list: empty
    let list = api.list_items(&ListQuery::default()).unwrap();
    assert!(!list.is_paginated());
    assert!(list.into_items().is_empty());

    // create without description
    let created = api.create_item(&CreateTodo::new("Integration test")).unwrap();
    assert_eq!(created.title, "Integration test");
    assert!(created.description.is_none());
    assert!(!created.completed);
    let id = created.id;

    // get
    assert_eq!(api.get_item(id).unwrap(), created);

    // partial update: title only
    let updated = api
        .update_item(id, &UpdateTodo::edit("Updated title", None))
        .unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(!updated.completed);
    assert!(updated.updated_at.is_some());

    // partial update: completed only
    let updated = api.update_item(id, &UpdateTodo::completed(true)).unwrap();
    assert_eq!(updated.title, "Updated title");
    assert!(updated.completed);

    // paginated list
    let query = ListQuery {
        paginate: true,
        ..ListQuery::default()
    };
    let list = api.list_items(&query).unwrap();
    assert!(list.is_paginated());
    assert_eq!(list.into_items().len(), 1);

    // delete
    api.delete_item(id).unwrap();

    // get after delete: item-scoped load error carrying the server message
    let err = api.get_item(id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Load);
    assert!(matches!(err.source, ApiError::NotFound { .. }));
    assert_eq!(err.to_string(), format!("Error loading todo {id}: Todo not found"));

    // delete again
    let err = api.delete_item(id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Delete);
}

#[test]
fn server_validation_message_reaches_the_error() {
    let api = start_server();
    let err = api.create_item(&CreateTodo::new("")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Create);
    assert_eq!(err.source.status(), Some(422));
    assert_eq!(err.to_string(), "Error creating todo: title must not be empty");
}

#[test]
fn unreachable_server_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        api_url: format!("http://{addr}/api/v1"),
        ..ClientConfig::default()
    };
    let mut controller = TodoListController::new(HttpTodoApi::from_config(&config));
    let err = controller.load().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Api(ref e) if matches!(e.source, ApiError::Transport(_))
    ));
    assert_eq!(controller.error(), Some("Failed to load todos"));
    assert_eq!(controller.view(), ListView::Empty);
}

#[test]
fn controller_against_live_server() {
    let api = start_server();
    api.create_item(&CreateTodo::new("first")).unwrap();

    let mut controller = TodoListController::new(api);
    controller.load().unwrap();
    assert_eq!(controller.items().len(), 1);

    // create via the form: prepended
    controller.open_create_form().title = "second".to_string();
    controller.submit_create().unwrap();
    let titles: Vec<&str> = controller.items().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
    let second = controller.items()[0].id;

    // toggle: replaced in place
    controller.toggle_complete(second).unwrap();
    assert!(controller.items()[0].completed);

    // edit with description
    {
        let draft = controller.begin_edit(second).unwrap();
        draft.title = "second, edited".to_string();
        draft.description = "with notes".to_string();
    }
    controller.submit_edit(second).unwrap();
    let edited = controller.item(second).unwrap();
    assert_eq!(edited.title, "second, edited");
    assert_eq!(edited.description.as_deref(), Some("with notes"));
    assert!(edited.completed);

    // delete
    controller.delete(second).unwrap();
    assert!(controller.item(second).is_none());

    // reload matches server order
    controller.load().unwrap();
    let titles: Vec<&str> = controller.items().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["first"]);
    assert!(controller.error().is_none());
}

#[test]
fn controller_respects_configured_page_limit() {
    let config = ClientConfig {
        page_limit: 1,
        ..start_server_config()
    };
    let api = HttpTodoApi::from_config(&config);
    api.create_item(&CreateTodo::new("first")).unwrap();
    api.create_item(&CreateTodo::new("second")).unwrap();

    let mut controller = TodoListController::from_config(api, &config);
    controller.load().unwrap();
    let titles: Vec<&str> = controller.items().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["first"]);
}
