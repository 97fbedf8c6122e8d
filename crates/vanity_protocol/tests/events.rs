use pretty_assertions::assert_eq;
use serde_json::json;
use vanity_protocol::{
    ClientEvent, ConnectionRequest, ConnectionResult, GenerationRequest, ServerEvent, TaskId,
};

#[test]
fn stop_task_payload_carries_only_the_task_id() {
    let event = ClientEvent::StopTask {
        task_id: TaskId::new("task_1700000000"),
    };

    assert_eq!(event.name(), "stop_task");
    assert_eq!(
        event.payload().unwrap(),
        json!({ "task_id": "task_1700000000" })
    );
}

#[test]
fn start_generation_payload_uses_snake_case_fields() {
    let event = ClientEvent::StartGeneration(GenerationRequest {
        host: "10.0.0.5".to_string(),
        port: 2222,
        username: "root".to_string(),
        password: "hunter2".to_string(),
        prefix: "dead".to_string(),
        suffix: String::new(),
        contains: String::new(),
        case_sensitive: false,
        wallet_count: 3,
        cpu_cores: 7,
    });

    assert_eq!(event.name(), "start_generation");
    assert_eq!(
        event.payload().unwrap(),
        json!({
            "host": "10.0.0.5",
            "port": 2222,
            "username": "root",
            "password": "hunter2",
            "prefix": "dead",
            "suffix": "",
            "contains": "",
            "case_sensitive": false,
            "wallet_count": 3,
            "cpu_cores": 7
        })
    );
}

#[test]
fn test_connection_payload_includes_password() {
    let event = ClientEvent::TestConnection(ConnectionRequest {
        host: "1.2.3.4".to_string(),
        port: 22,
        username: "root".to_string(),
        password: "pw".to_string(),
    });
    let payload = event.payload().unwrap();
    assert_eq!(payload["password"], "pw");
    assert_eq!(payload["port"], 22);
}

#[test]
fn connection_result_decodes_machine_details() {
    let event = ServerEvent::from_named(
        "connection_result",
        Some(json!({
            "success": true,
            "message": "ok",
            "cpu_cores": 8,
            "memory_gb": 15.6,
            "python_version": "Python 3.11.2",
            "os_info": "Linux box 6.1.0"
        })),
    )
    .unwrap()
    .unwrap();

    assert_eq!(
        event,
        ServerEvent::ConnectionResult(ConnectionResult {
            success: true,
            message: Some("ok".to_string()),
            cpu_cores: Some(8),
            memory_gb: Some(15.6),
            python_version: Some("Python 3.11.2".to_string()),
            os_info: Some("Linux box 6.1.0".to_string()),
        })
    );
}

#[test]
fn failed_connection_result_only_needs_success_and_message() {
    let event = ServerEvent::from_named(
        "connection_result",
        Some(json!({ "success": false, "message": "auth failed" })),
    )
    .unwrap()
    .unwrap();

    match event {
        ServerEvent::ConnectionResult(result) => {
            assert!(!result.success);
            assert_eq!(result.message.as_deref(), Some("auth failed"));
            assert_eq!(result.cpu_cores, None);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn output_accepts_optional_task_id() {
    let with_id = ServerEvent::from_named(
        "generation_output",
        Some(json!({ "task_id": "t1", "output": "line" })),
    )
    .unwrap()
    .unwrap();
    let without_id =
        ServerEvent::from_named("generation_output", Some(json!({ "output": "line" })))
            .unwrap()
            .unwrap();

    assert_eq!(
        with_id,
        ServerEvent::GenerationOutput {
            output: "line".to_string(),
            task_id: Some(TaskId::new("t1")),
        }
    );
    assert_eq!(
        without_id,
        ServerEvent::GenerationOutput {
            output: "line".to_string(),
            task_id: None,
        }
    );
}

#[test]
fn unknown_event_names_are_skipped() {
    let decoded = ServerEvent::from_named("response", Some(json!({ "data": "hello" }))).unwrap();
    assert_eq!(decoded, None);
}

#[test]
fn malformed_payload_is_an_error() {
    let decoded = ServerEvent::from_named("task_started", Some(json!({ "id": 5 })));
    assert!(decoded.is_err());
}
