//! Signing certificate handling
//!
//! Casdoor signs access tokens with the private key of the certificate
//! attached to the application. The gateway receives that certificate (or
//! the bare public key) as PEM and turns it into a [`SigningKey`].

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::{debug, warn};

use super::OAuthError;

/// Clock skew tolerated on `exp`/`nbf`, in seconds.
const LEEWAY_SECS: u64 = 60;

const RSA_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

const EC_ALGORITHMS: &[Algorithm] = &[Algorithm::ES256, Algorithm::ES384];

/// Key family of the configured certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// RSA public key
    Rsa,
    /// Elliptic-curve public key
    Ec,
}

/// Public key used to verify access tokens, plus the algorithms it may verify.
#[derive(Clone)]
pub struct SigningKey {
    key: DecodingKey,
    kind: KeyKind,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").field("kind", &self.kind).finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Parse an X.509 `CERTIFICATE` or `PUBLIC KEY` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self, OAuthError> {
        if pem.trim().is_empty() {
            return Err(OAuthError::Certificate("no certificate configured".to_string()));
        }

        if let Ok(key) = DecodingKey::from_rsa_pem(pem.as_bytes()) {
            return Ok(Self {
                key,
                kind: KeyKind::Rsa,
            });
        }

        DecodingKey::from_ec_pem(pem.as_bytes())
            .map(|key| Self {
                key,
                kind: KeyKind::Ec,
            })
            .map_err(|e| OAuthError::Certificate(format!("unsupported or malformed PEM: {e}")))
    }

    /// Key family
    #[must_use]
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Decoding key for `jsonwebtoken::decode`
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    /// Algorithms this key can verify.
    #[must_use]
    pub fn algorithms(&self) -> &'static [Algorithm] {
        match self.kind {
            KeyKind::Rsa => RSA_ALGORITHMS,
            KeyKind::Ec => EC_ALGORITHMS,
        }
    }

    /// Validation rules for tokens issued to `audience`.
    ///
    /// `exp` is mandatory. An empty audience disables the `aud` check.
    #[must_use]
    pub fn validation(&self, audience: &str) -> Validation {
        let algorithms = self.algorithms();
        let mut v = Validation::new(algorithms[0]);
        v.algorithms = algorithms.to_vec();
        v.leeway = LEEWAY_SECS;
        v.set_required_spec_claims(&["exp"]);
        if audience.is_empty() {
            v.validate_aud = false;
        } else {
            v.set_audience(&[audience]);
        }
        v
    }
}

/// Summary of an X.509 signing certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Subject distinguished name
    pub subject: String,
    /// End of the validity window
    pub not_after: String,
    /// Whether the current time lies inside the validity window
    pub currently_valid: bool,
}

/// Inspect `pem` if it holds an X.509 certificate.
///
/// Returns `None` for bare public keys and for input that is not PEM.
#[must_use]
pub fn inspect_certificate(pem: &str) -> Option<CertificateInfo> {
    let (_, block) = x509_parser::pem::parse_x509_pem(pem.as_bytes()).ok()?;
    if block.label != "CERTIFICATE" {
        return None;
    }

    match block.parse_x509() {
        Ok(cert) => {
            let validity = cert.validity();
            Some(CertificateInfo {
                subject: cert.subject().to_string(),
                not_after: validity.not_after.to_string(),
                currently_valid: validity.is_valid(),
            })
        }
        Err(e) => {
            debug!(error = %e, "Signing certificate is not valid X.509");
            None
        }
    }
}

/// Log the certificate subject and warn when it is outside its validity window.
pub fn log_certificate_status(pem: &str) {
    if let Some(info) = inspect_certificate(pem) {
        if info.currently_valid {
            debug!(subject = %info.subject, not_after = %info.not_after, "Signing certificate loaded");
        } else {
            warn!(
                subject = %info.subject,
                not_after = %info.not_after,
                "Signing certificate is outside its validity window"
            );
        }
    }
}

#[cfg(test)]
pub(crate) mod test_keys {
    //! Runtime-generated EC key material for unit tests.

    use jsonwebtoken::{EncodingKey, Header};
    use rcgen::{CertificateParams, KeyPair};
    use serde_json::Value;

    /// A self-signed certificate and the key that signs tokens for it.
    pub struct TestSigner {
        pub certificate_pem: String,
        pub public_key_pem: String,
        encoding_key: EncodingKey,
    }

    impl TestSigner {
        pub fn generate() -> Self {
            let key_pair = KeyPair::generate().unwrap();
            let params = CertificateParams::new(vec!["casdoor.test".to_string()]).unwrap();
            let cert = params.self_signed(&key_pair).unwrap();
            let encoding_key = EncodingKey::from_ec_pem(key_pair.serialize_pem().as_bytes()).unwrap();

            Self {
                certificate_pem: cert.pem(),
                public_key_pem: key_pair.public_key_pem(),
                encoding_key,
            }
        }

        pub fn sign(&self, claims: &Value) -> String {
            jsonwebtoken::encode(
                &Header::new(jsonwebtoken::Algorithm::ES256),
                claims,
                &self.encoding_key,
            )
            .unwrap()
        }
    }

    pub fn unix_now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}
