//! TLS configuration for connections to the Cloud IoT Core bridge.
//!
//! The device authenticates with a JWT, not a client certificate, so the
//! TLS session only needs the CA bundle that roots the bridge's chain.

use std::io::BufReader;
use std::sync::Arc;

use rumqttc::tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use rumqttc::tokio_rustls::rustls::crypto::{
    CryptoProvider, verify_tls12_signature, verify_tls13_signature,
};
use rumqttc::tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rumqttc::tokio_rustls::rustls::{
    self, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use rumqttc::{TlsConfiguration, Transport};

use crate::config::MqttConfig;
use crate::error::{MqttError, MqttResult};

/// Environment variable naming the CA bundle when the config has none.
pub const CA_CERT_PATH_ENV: &str = "CA_CERT_PATH";

/// Pick the CA bundle path: config first, then the environment value.
pub fn resolve_ca_path(config: &MqttConfig, env_value: Option<String>) -> MqttResult<String> {
    config
        .ca_cert_path
        .clone()
        .or(env_value)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| {
            MqttError::Tls(format!(
                "no CA bundle configured (set ca_cert_path or ${CA_CERT_PATH_ENV})"
            ))
        })
}

/// Read a PEM bundle into a root store.
pub fn load_ca_bundle(path: &str) -> MqttResult<RootCertStore> {
    let pem = std::fs::read(path)
        .map_err(|e| MqttError::Tls(format!("failed to read CA cert '{path}': {e}")))?;

    let mut roots = RootCertStore::empty();
    let mut reader = BufReader::new(pem.as_slice());
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert =
            cert.map_err(|e| MqttError::Tls(format!("invalid PEM in CA cert '{path}': {e}")))?;
        roots
            .add(cert)
            .map_err(|e| MqttError::Tls(format!("bad certificate in '{path}': {e}")))?;
    }

    if roots.is_empty() {
        return Err(MqttError::Tls(format!(
            "no certificates found in CA cert '{path}'"
        )));
    }
    Ok(roots)
}

/// Build a rustls client config trusting `roots`, with no client
/// certificate.
pub fn client_config(roots: RootCertStore, insecure_skip_verify: bool) -> ClientConfig {
    if insecure_skip_verify {
        tracing::warn!("TLS server verification disabled (insecure_skip_verify = true)");
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        return ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification(provider)))
            .with_no_client_auth();
    }

    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Build the TLS transport for the bridge from the CA bundle named in the
/// config or in `$CA_CERT_PATH`.
pub fn load_tls_transport(config: &MqttConfig) -> MqttResult<Transport> {
    let path = resolve_ca_path(config, std::env::var(CA_CERT_PATH_ENV).ok())?;
    let roots = load_ca_bundle(&path)?;
    tracing::debug!(ca_cert_path = %path, certs = roots.len(), "CA bundle loaded");

    let tls = client_config(roots, config.insecure_skip_verify);
    Ok(Transport::tls_with_config(TlsConfiguration::Rustls(
        Arc::new(tls),
    )))
}

/// Build MQTT options without TLS (for local testing / dev mode).
pub fn plaintext_transport() -> Transport {
    Transport::Tcp
}

/// Accepts any server certificate. Handshake signatures are still checked
/// so the session keys are bound to the presented certificate.
#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
