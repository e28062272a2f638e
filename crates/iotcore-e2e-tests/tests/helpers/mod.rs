//! Shared test harness for E2E integration tests.
//!
//! `FakeBroker` accepts one MQTT 3.1.1 connection (plaintext or TLS with
//! a self-signed server certificate), answers CONNECT and QoS 1 PUBLISH,
//! and records what the client sent.

#![allow(dead_code)]

use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::tokio_rustls::TlsAcceptor;
use rumqttc::tokio_rustls::rustls::ServerConfig;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use iotcore_mqtt_channel::MqttConfig;
use iotcore_protocol::DeviceIdentity;

pub const PROJECT_ID: &str = "proj1";
pub const REGION: &str = "us-central1";
pub const REGISTRY_ID: &str = "reg1";
pub const DEVICE_ID: &str = "dev1";

/// CONNACK return code 5: not authorized.
pub const NOT_AUTHORIZED: u8 = 5;

pub fn fixture(name: &str) -> String {
    format!(
        "{}/../iotcore-mqtt-channel/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    )
}

pub fn public_key() -> Vec<u8> {
    std::fs::read(fixture("rsa_public.pem")).unwrap()
}

/// Identity for the sample device, signed with the fixture key and
/// pointed at `port` on localhost.
pub fn local_identity(port: u16) -> DeviceIdentity {
    DeviceIdentity::new(
        PROJECT_ID,
        REGION,
        REGISTRY_ID,
        DEVICE_ID,
        fixture("rsa_private.pem"),
    )
    .with_broker("127.0.0.1", port)
}

pub fn plaintext_config() -> MqttConfig {
    MqttConfig {
        use_tls: false,
        connect_timeout_secs: 5,
        ..Default::default()
    }
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A packet received by the fake broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Connect {
        client_id: String,
        username: Option<String>,
        password: Option<String>,
    },
    Publish {
        topic: String,
        qos: u8,
        payload: Vec<u8>,
        arrived_at: Instant,
    },
    Disconnect,
    Other(u8),
}

pub struct FakeBroker {
    pub port: u16,
    handle: JoinHandle<Vec<Received>>,
}

impl FakeBroker {
    /// Broker that accepts the connection.
    pub async fn start() -> Self {
        Self::with_connack_code(0).await
    }

    /// Broker that answers CONNECT with `code`.
    pub async fn with_connack_code(code: u8) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            serve(stream, code).await
        });
        Self { port, handle }
    }

    /// Broker behind TLS, presenting the self-signed `server_cert.pem`.
    /// A failed handshake yields no packets.
    pub async fn start_tls() -> Self {
        let acceptor = TlsAcceptor::from(Arc::new(server_tls_config()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            match acceptor.accept(stream).await {
                Ok(tls) => serve(tls, 0).await,
                Err(_) => Vec::new(),
            }
        });
        Self { port, handle }
    }

    /// Wait for the client to close the connection and return what it sent.
    pub async fn received(self) -> Vec<Received> {
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("client did not close the connection")
            .unwrap()
    }
}

fn server_tls_config() -> ServerConfig {
    let cert_pem = std::fs::read(fixture("server_cert.pem")).unwrap();
    let key_pem = std::fs::read(fixture("server_key.pem")).unwrap();

    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_pem.as_slice()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem.as_slice()))
        .unwrap()
        .unwrap();

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .unwrap()
}

async fn serve<S>(mut stream: S, connack_code: u8) -> Vec<Received>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut received = Vec::new();

    while let Some((header, body)) = read_packet(&mut stream).await {
        match header >> 4 {
            1 => {
                received.push(parse_connect(&body));
                let _ = stream.write_all(&[0x20, 0x02, 0x00, connack_code]).await;
                if connack_code != 0 {
                    break;
                }
            }
            3 => {
                let qos = (header >> 1) & 0x03;
                let (packet, pkid) = parse_publish(&body, qos);
                received.push(packet);
                if let Some(pkid) = pkid {
                    let [hi, lo] = pkid.to_be_bytes();
                    let _ = stream.write_all(&[0x40, 0x02, hi, lo]).await;
                }
            }
            12 => {
                received.push(Received::Other(header));
                let _ = stream.write_all(&[0xd0, 0x00]).await;
            }
            14 => {
                received.push(Received::Disconnect);
                break;
            }
            _ => received.push(Received::Other(header)),
        }
    }

    received
}

/// Read one packet as (fixed header byte, body). `None` on EOF.
async fn read_packet<S>(stream: &mut S) -> Option<(u8, Vec<u8>)>
where
    S: AsyncRead + Unpin,
{
    let header = stream.read_u8().await.ok()?;

    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let byte = stream.read_u8().await.ok()?;
        len |= usize::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 21 {
            return None;
        }
    }

    let mut body = vec![0; len];
    stream.read_exact(&mut body).await.ok()?;
    Some((header, body))
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let byte = self.buf[self.pos];
        self.pos += 1;
        byte
    }

    fn u16(&mut self) -> u16 {
        u16::from_be_bytes([self.u8(), self.u8()])
    }

    fn bytes(&mut self) -> Vec<u8> {
        let len = usize::from(self.u16());
        let out = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        out
    }

    fn string(&mut self) -> String {
        String::from_utf8(self.bytes()).unwrap()
    }

    fn rest(&self) -> Vec<u8> {
        self.buf[self.pos..].to_vec()
    }
}

fn parse_connect(body: &[u8]) -> Received {
    let mut cur = Cursor::new(body);
    assert_eq!(cur.string(), "MQTT");
    assert_eq!(cur.u8(), 4, "expected MQTT 3.1.1");
    let flags = cur.u8();
    let _keep_alive = cur.u16();

    let client_id = cur.string();
    if flags & 0x04 != 0 {
        let _will_topic = cur.bytes();
        let _will_payload = cur.bytes();
    }
    let username = (flags & 0x80 != 0).then(|| cur.string());
    let password = (flags & 0x40 != 0).then(|| cur.string());

    Received::Connect {
        client_id,
        username,
        password,
    }
}

fn parse_publish(body: &[u8], qos: u8) -> (Received, Option<u16>) {
    let mut cur = Cursor::new(body);
    let topic = cur.string();
    let pkid = (qos > 0).then(|| cur.u16());
    let payload = cur.rest();

    (
        Received::Publish {
            topic,
            qos,
            payload,
            arrived_at: Instant::now(),
        },
        pkid,
    )
}
