use fortios::FortiosProvider;
use fortiplug::provider::ConfigureProviderRequest;
use fortiplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest, UpdateResourceRequest,
};
use fortiplug::{Dynamic, DynamicValue, Provider};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::collections::HashMap;

const TOKEN: &str = "integration-token";

async fn configured_provider(server: &ServerGuard, vdom: Option<&str>) -> FortiosProvider {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    let mut config = HashMap::from([
        ("hostname".to_string(), Dynamic::string(server.url())),
        ("token".to_string(), Dynamic::string(TOKEN)),
        ("insecure".to_string(), Dynamic::Bool(true)),
        ("retries".to_string(), Dynamic::Int(0)),
    ]);
    if let Some(vdom) = vdom {
        config.insert("vdom".to_string(), Dynamic::string(vdom));
    }

    let mut provider = FortiosProvider::new();
    let response = provider
        .configure(ConfigureProviderRequest {
            config: DynamicValue::object(config),
        })
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    provider
}

async fn mock_status(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/api/v2/monitor/system/status")
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_body(r#"{"status":"success","version":"v7.2.4","serial":"FGVM01","build":1396,"results":{"hostname":"fgt"}}"#)
        .create_async()
        .await
}

fn object(pairs: Vec<(&str, Dynamic)>) -> DynamicValue {
    DynamicValue::object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[tokio::test(flavor = "multi_thread")]
async fn firewall_address_lifecycle() {
    let mut server = Server::new_async().await;
    let _status = mock_status(&mut server).await;

    let create = server
        .mock("POST", "/api/v2/cmdb/firewall/address")
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .match_body(Matcher::Json(json!({
            "name": "web",
            "subnet": "10.0.0.0/24",
            "comment": "frontend"
        })))
        .with_body(r#"{"http_method":"POST","status":"success","http_status":200,"mkey":"web","revision":"1"}"#)
        .create_async()
        .await;

    let _read = server
        .mock("GET", "/api/v2/cmdb/firewall/address/web")
        .with_body(
            r#"{"status":"success","results":[{
                "name":"web",
                "uuid":"2a4f8d36-0000-0000-0000-000000000000",
                "subnet":"10.0.0.0 255.255.255.0",
                "type":"ipmask",
                "comment":"frontend",
                "macaddr":[],
                "tagging":[]
            }]}"#,
        )
        .create_async()
        .await;

    let provider = configured_provider(&server, None).await;
    let resource = provider
        .create_resource("fortios_firewall_address")
        .await
        .unwrap();

    let planned = object(vec![
        ("name", Dynamic::string("web")),
        ("subnet", Dynamic::string("10.0.0.0/24")),
        ("comment", Dynamic::string("frontend")),
        ("uuid", Dynamic::Unknown),
        ("id", Dynamic::Unknown),
    ]);
    let created = resource
        .create(CreateResourceRequest {
            type_name: "fortios_firewall_address".to_string(),
            config: planned.clone(),
            planned_state: planned,
        })
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    create.assert_async().await;

    let state = created.new_state.fields().unwrap();
    assert_eq!(state.get("id"), Some(&Dynamic::string("web")));
    assert_eq!(state.get("subnet"), Some(&Dynamic::string("10.0.0.0/24")));
    assert_eq!(state.get("type"), Some(&Dynamic::string("ipmask")));
    assert!(!state.contains_key("macaddr"));

    let delete = server
        .mock("DELETE", "/api/v2/cmdb/firewall/address/web")
        .with_body(r#"{"http_method":"DELETE","status":"success","http_status":200,"mkey":"web"}"#)
        .create_async()
        .await;

    let deleted = resource
        .delete(DeleteResourceRequest {
            type_name: "fortios_firewall_address".to_string(),
            prior_state: created.new_state,
        })
        .await;

    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
    delete.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn singleton_create_falls_back_to_type_name_id() {
    let mut server = Server::new_async().await;
    let _status = mock_status(&mut server).await;

    let put = server
        .mock("PUT", "/api/v2/cmdb/log.fortianalyzer/override-setting")
        .match_query(Matcher::UrlEncoded("vdom".into(), "root".into()))
        .with_body(r#"{"http_method":"PUT","status":"success","http_status":200,"revision":"9"}"#)
        .create_async()
        .await;

    let _read = server
        .mock("GET", "/api/v2/cmdb/log.fortianalyzer/override-setting")
        .match_query(Matcher::UrlEncoded("vdom".into(), "root".into()))
        .with_body(
            r#"{"status":"success","results":{
                "override":"enable",
                "status":"enable",
                "server":"10.9.9.9",
                "preshared-key":"ENC 3fa9c0",
                "serial":[{"name":"FAZ-VM0000000001"}]
            }}"#,
        )
        .create_async()
        .await;

    let provider = configured_provider(&server, Some("root")).await;
    let resource = provider
        .create_resource("fortios_log_fortianalyzer_override_setting")
        .await
        .unwrap();

    let planned = object(vec![
        ("override", Dynamic::string("enable")),
        ("status", Dynamic::string("enable")),
        ("server", Dynamic::string("10.9.9.9")),
        ("preshared_key", Dynamic::string("hunter2")),
    ]);
    let created = resource
        .create(CreateResourceRequest {
            type_name: "fortios_log_fortianalyzer_override_setting".to_string(),
            config: planned.clone(),
            planned_state: planned,
        })
        .await;

    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    put.assert_async().await;

    let state = created.new_state.fields().unwrap();
    assert_eq!(
        state.get("id"),
        Some(&Dynamic::string("LogFortianalyzerOverrideSetting"))
    );
    assert_eq!(state.get("preshared_key"), Some(&Dynamic::string("hunter2")));
    assert!(!state.contains_key("serial"));
}

#[tokio::test(flavor = "multi_thread")]
async fn read_of_deleted_object_clears_state() {
    let mut server = Server::new_async().await;
    let _status = mock_status(&mut server).await;
    let _read = server
        .mock("GET", "/api/v2/cmdb/system/vxlan/vx1")
        .with_status(404)
        .with_body(r#"{"http_method":"GET","status":"error","http_status":404}"#)
        .create_async()
        .await;

    let provider = configured_provider(&server, None).await;
    let resource = provider.create_resource("fortios_system_vxlan").await.unwrap();

    let response = resource
        .read(ReadResourceRequest {
            type_name: "fortios_system_vxlan".to_string(),
            current_state: object(vec![
                ("id", Dynamic::string("vx1")),
                ("name", Dynamic::string("vx1")),
            ]),
        })
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert!(response.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn device_rejection_is_reported() {
    let mut server = Server::new_async().await;
    let _status = mock_status(&mut server).await;
    let _create = server
        .mock("POST", "/api/v2/cmdb/system/vxlan")
        .with_status(500)
        .with_body(r#"{"http_method":"POST","status":"error","http_status":500,"error":-5,"cli_error":"entry already exists"}"#)
        .create_async()
        .await;

    let provider = configured_provider(&server, None).await;
    let resource = provider.create_resource("fortios_system_vxlan").await.unwrap();

    let planned = object(vec![
        ("name", Dynamic::string("vx1")),
        ("interface", Dynamic::string("port1")),
        ("vni", Dynamic::Int(100)),
        ("ip_version", Dynamic::string("ipv4-unicast")),
    ]);
    let response = resource
        .create(CreateResourceRequest {
            type_name: "fortios_system_vxlan".to_string(),
            config: planned.clone(),
            planned_state: planned,
        })
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    let summary = &response.diagnostics[0].summary;
    assert!(summary.starts_with("Error creating SystemVxlan resource: "), "{}", summary);
    assert!(summary.contains("-5"), "{}", summary);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_sends_clear_markers_and_sorted_read() {
    let mut server = Server::new_async().await;
    let _status = mock_status(&mut server).await;

    let put = server
        .mock("PUT", "/api/v2/cmdb/emailfilter/bword/3")
        .match_body(Matcher::PartialJson(json!({
            "id": 3,
            "name": "spam-words",
            "comment": null,
            "entries": [{"id": 1, "pattern": "casino"}]
        })))
        .with_body(r#"{"http_method":"PUT","status":"success","http_status":200,"mkey":3}"#)
        .create_async()
        .await;

    let _read = server
        .mock("GET", "/api/v2/cmdb/emailfilter/bword/3")
        .with_body(
            r#"{"status":"success","results":[{
                "id":3,
                "name":"spam-words",
                "comment":"",
                "entries":[
                    {"id":12,"status":"enable","pattern":"lottery","pattern-type":"wildcard","score":10},
                    {"id":1,"status":"enable","pattern":"casino","pattern-type":"wildcard","score":10}
                ]
            }]}"#,
        )
        .create_async()
        .await;

    let provider = configured_provider(&server, None).await;
    let resource = provider.create_resource("fortios_emailfilter_bword").await.unwrap();

    let entry = |id: i64, pattern: &str| {
        Dynamic::object([
            ("id", Dynamic::Int(id)),
            ("pattern", Dynamic::string(pattern)),
        ])
    };

    let prior = object(vec![
        ("id", Dynamic::string("3")),
        ("fosid", Dynamic::Int(3)),
        ("name", Dynamic::string("spam-words")),
        ("comment", Dynamic::string("old list")),
        ("entries", Dynamic::List(vec![entry(1, "casino")])),
    ]);
    let planned = object(vec![
        ("id", Dynamic::string("3")),
        ("fosid", Dynamic::Int(3)),
        ("name", Dynamic::string("spam-words")),
        ("entries", Dynamic::List(vec![entry(1, "casino")])),
        ("dynamic_sort_subtable", Dynamic::string("true")),
    ]);

    let response = resource
        .update(UpdateResourceRequest {
            type_name: "fortios_emailfilter_bword".to_string(),
            prior_state: prior,
            config: planned.clone(),
            planned_state: planned,
        })
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    put.assert_async().await;

    let state = response.new_state.fields().unwrap();
    assert_eq!(state.get("id"), Some(&Dynamic::string("3")));
    let ids: Vec<i64> = state["entries"]
        .as_list()
        .unwrap()
        .iter()
        .filter_map(|e| e.as_map().and_then(|m| m.get("id")).and_then(Dynamic::as_i64))
        .collect();
    assert_eq!(ids, vec![1, 12]);
}
