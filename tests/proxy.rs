use std::time::{Duration, Instant};

use async_std::net::TcpListener;
use async_std::prelude::*;
use async_std::task;
use relaynet::App;
use relaynet::net::proxy::ProxyServer;
use relaynet::proxy::balancer::LoadBalancer;
use relaynet::proxy::vhost::parse_virtual_hosts;

mod common;

async fn spawn_proxy(vhost_config: &str) -> std::net::SocketAddr {
    spawn_proxy_with(common::test_config(&std::env::temp_dir()), vhost_config).await
}

async fn spawn_proxy_with(config: relaynet::ServerConfig, vhost_config: &str) -> std::net::SocketAddr {
    let balancer = LoadBalancer::new(parse_virtual_hosts(vhost_config));
    let proxy = ProxyServer::new(config, balancer);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    task::spawn(proxy.serve(listener));
    addr
}

fn get(host: &str) -> String {
    format!("GET /hello HTTP/1.1\r\nHost: {}\r\n\r\n", host)
}

#[async_std::test]
async fn test_round_robin_across_backends() {
    let a = common::spawn_backend("A").await;
    let b = common::spawn_backend("B").await;
    let proxy = spawn_proxy(&format!(
        "host \"svc.local\" {{\n  proxy_pass http://{};\n  proxy_pass http://{};\n  dist_policy round-robin\n}}\n",
        a, b
    ))
    .await;

    let mut bodies = Vec::new();
    for _ in 0..4 {
        let response = common::send(proxy, &get("svc.local")).await;
        assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
        bodies.push(common::body(&response).to_string());
    }
    assert_eq!(bodies, vec!["A", "B", "A", "B"]);
}

#[async_std::test]
async fn test_unknown_host_is_bad_gateway() {
    let a = common::spawn_backend("A").await;
    let proxy = spawn_proxy(&format!(
        "host \"svc.local\" {{ proxy_pass http://{}; }}\nhost \"empty.local\" {{ }}",
        a
    ))
    .await;

    let response = common::send(proxy, &get("other.local")).await;
    assert_eq!(common::status_line(&response), "HTTP/1.1 502 Bad Gateway");

    let response = common::send(proxy, &get("empty.local")).await;
    assert_eq!(common::status_line(&response), "HTTP/1.1 502 Bad Gateway");

    let response = common::send(proxy, "GET /hello HTTP/1.1\r\n\r\n").await;
    assert_eq!(common::status_line(&response), "HTTP/1.1 502 Bad Gateway");
}

#[async_std::test]
async fn test_dead_backend_is_not_retried() {
    let dead = common::closed_addr().await;
    let live = common::spawn_backend("L").await;
    let proxy = spawn_proxy(&format!(
        "host \"svc.local\" {{ proxy_pass http://{}; proxy_pass http://{}; }}",
        dead, live
    ))
    .await;

    let first = common::send(proxy, &get("svc.local")).await;
    assert_eq!(common::status_line(&first), "HTTP/1.1 502 Bad Gateway");

    let second = common::send(proxy, &get("svc.local")).await;
    assert_eq!(common::body(&second), "L");
}

#[async_std::test]
async fn test_login_through_proxy() {
    let root = tempfile::tempdir().unwrap();
    let app = common::spawn_app(App::new(), common::test_config(root.path())).await;
    let proxy = spawn_proxy(&format!("host \"app.local\" {{ proxy_pass http://{}; }}", app)).await;

    let login = common::form_post("/login", "username=admin&password=password")
        .replace("Host: localhost", "Host: app.local:8080");
    let response = common::send(proxy, &login).await;

    assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
    assert!(response.contains("Set-Cookie: auth=true\r\n"));
}

#[async_std::test]
async fn test_backend_that_never_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = listener.local_addr().unwrap();
    task::spawn(async move {
        let mut held = Vec::new();
        for reply in ["HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nslow", ""] {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = vec![0; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(reply.as_bytes()).await;
            held.push(stream);
        }
        task::sleep(Duration::from_secs(30)).await;
    });

    let mut config = common::test_config(&std::env::temp_dir());
    config.proxy.backend_timeout = Some(Duration::from_millis(300));
    let proxy = spawn_proxy_with(config, &format!("host \"svc.local\" {{ proxy_pass http://{}; }}", backend)).await;

    let started = Instant::now();
    let replied = common::send(proxy, &get("svc.local")).await;
    assert_eq!(common::body(&replied), "slow");

    let silent = common::send(proxy, &get("svc.local")).await;
    assert_eq!(common::status_line(&silent), "HTTP/1.1 502 Bad Gateway");
    assert!(started.elapsed() < Duration::from_secs(10));
}
