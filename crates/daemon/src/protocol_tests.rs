// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use yare::parameterized;

#[parameterized(
    ping = { Request::Ping },
    hello = { Request::Hello { version: "0.1.0".to_string() } },
    get = { Request::Get { key: "k".to_string() } },
    put = { Request::Put { key: "k\tkey".to_string(), value: "line\nbreak".to_string() } },
    delete = { Request::Delete { key: "k".to_string() } },
    replicate = { Request::Replicate { payload: "0\nPUT\ta\t1".to_string() } },
    delta = { Request::Delta { from: -1 } },
    progress = { Request::Progress },
    shutdown = { Request::Shutdown },
)]
fn request_roundtrip(request: Request) {
    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");
    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Status {
        name: "leader-1".to_string(),
        role: RoleKind::Leader,
        last_applied: 12,
        commit_index: 10,
        keys: 4,
        uptime_secs: 3600,
        peers: vec!["127.0.0.1:7401".to_string()],
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn encode_returns_json_without_length_prefix() {
    let response = Response::Pong;
    let encoded = encode(&response).expect("encode failed");

    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert!(
        json_str.starts_with('{'),
        "should be JSON object: {}",
        json_str
    );
}

#[test]
fn messages_are_tagged_by_type() {
    let json = r#"{"type":"NotLeader","leader":"127.0.0.1:7400"}"#;
    let decoded: Response = decode(json.as_bytes()).expect("decode failed");
    assert_eq!(
        decoded,
        Response::NotLeader {
            leader: Some("127.0.0.1:7400".to_string())
        }
    );
}

#[test]
fn unknown_request_type_is_rejected() {
    let json = r#"{"type":"Compact"}"#;
    assert!(matches!(
        decode::<Request>(json.as_bytes()),
        Err(ProtocolError::Json(_))
    ));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_length_prefix() {
    let data = b"test data";

    let mut buffer = Vec::new();
    write_message(&mut buffer, data)
        .await
        .expect("write failed");

    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;

    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::new());
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn truncated_body_is_connection_closed() {
    let mut buffer = 10u32.to_be_bytes().to_vec();
    buffer.extend_from_slice(b"abc");

    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let buffer = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes().to_vec();

    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::TooLarge(_))
    ));
}

#[tokio::test]
async fn call_exchanges_one_request() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = stream.into_split();
        let request = read_request(&mut reader, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(request, Request::Ping);
        write_response(&mut writer, &Response::Pong, DEFAULT_TIMEOUT)
            .await
            .unwrap();
    });

    let response = call(&addr, &Request::Ping, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(response, Response::Pong);
    server.await.unwrap();
}
