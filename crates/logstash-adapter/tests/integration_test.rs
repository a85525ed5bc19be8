// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use logstash_adapter::{
    adapter::LogstashAdapter,
    container::{Container, LogMessage},
    route::Route,
    transport::TransportRegistry,
};
use serde_json::{json, Value};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::{TcpListener, UdpSocket},
    sync::mpsc,
    time::{timeout, Duration},
};

fn log_message(data: &str) -> LogMessage {
    LogMessage {
        container: Container {
            id: "c1".to_string(),
            name: "/web".to_string(),
            image: "nginx:1.25".to_string(),
            hostname: "web-1".to_string(),
            env: vec![
                "LOGSTASH_TAGS=prod,web".to_string(),
                "MARATHON_APP_ID=/svc".to_string(),
                "MARATHON_APP_VERSION=2016-10-20T13:25:13.627Z".to_string(),
                "MARATHON_APP_RESOURCE_MEM=128.0".to_string(),
                "MARATHON_APP_LABEL_TEAM=core".to_string(),
                "PATH=/usr/bin".to_string(),
            ],
        },
        data: data.to_string(),
        source: "stdout".to_string(),
    }
}

#[tokio::test]
async fn logstash_adapter_ships_udp_datagrams() {
    let collector = UdpSocket::bind("127.0.0.1:0")
        .await
        .expect("unable to bind UDP socket");
    let route = Route::parse(&format!(
        "logstash://{}",
        collector.local_addr().expect("no local address")
    ))
    .expect("invalid route");

    let adapter = LogstashAdapter::new(route, &TransportRegistry::with_defaults())
        .await
        .expect("failed to dial collector");

    let (tx, rx) = mpsc::channel(8);
    let forwarder = tokio::spawn(adapter.stream(rx));

    tx.send(log_message("hello")).await.expect("send failed");
    tx.send(log_message(r#"{"level":"info","msg":"ready"}"#))
        .await
        .expect("send failed");
    drop(tx);

    let mut buf = [0u8; 4096];
    let n = timeout(Duration::from_secs(1), collector.recv(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    assert_eq!(buf[n - 1], b'\n');
    let first: Value = serde_json::from_slice(&buf[..n]).expect("invalid JSON");
    assert_eq!(
        first,
        json!({
            "message": "hello",
            "docker": {"name": "/web", "id": "c1", "image": "nginx:1.25", "hostname": "web-1"},
            "marathon": {
                "version": "2016-10-20T13:25:13.627Z",
                "id": "/svc",
                "resources": {"mem": "128.0"},
                "labels": {"TEAM": "core"},
            },
            "stream": "stdout",
            "tags": ["prod", "web", "TEAM_core"],
        })
    );

    let n = timeout(Duration::from_secs(1), collector.recv(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .expect("recv failed");
    let second: Value = serde_json::from_slice(&buf[..n]).expect("invalid JSON");
    assert_eq!(second["level"], json!("info"));
    assert_eq!(second["msg"], json!("ready"));
    assert_eq!(second["tags"], json!(["prod", "web", "TEAM_core"]));
    assert!(second.get("message").is_none());

    forwarder
        .await
        .expect("forwarder panicked")
        .expect("forwarder failed");
}

#[tokio::test]
async fn logstash_adapter_ships_tcp_json_lines() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("unable to bind TCP listener");
    let route = Route::parse(&format!(
        "logstash+tcp://{}?nodelay=true",
        listener.local_addr().expect("no local address")
    ))
    .expect("invalid route");

    let collector = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("accept failed");
        let mut lines = BufReader::new(socket).lines();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.expect("read failed") {
            received.push(line);
        }
        received
    });

    let adapter = LogstashAdapter::new(route, &TransportRegistry::with_defaults())
        .await
        .expect("failed to dial collector");
    let (tx, rx) = mpsc::channel(4);
    let forwarder = tokio::spawn(adapter.stream(rx));

    for i in 0..10 {
        tx.send(log_message(&format!("line {i}\nwith a newline")))
            .await
            .expect("send failed");
    }
    drop(tx);

    forwarder
        .await
        .expect("forwarder panicked")
        .expect("forwarder failed");

    let received = timeout(Duration::from_secs(1), collector)
        .await
        .expect("timed out waiting for collector")
        .expect("collector panicked");
    assert_eq!(received.len(), 10);
    for (i, line) in received.iter().enumerate() {
        let record: Value = serde_json::from_str(line).expect("invalid JSON line");
        assert_eq!(record["message"], json!(format!("line {i}\nwith a newline")));
        assert_eq!(record["docker"]["id"], json!("c1"));
    }
}
