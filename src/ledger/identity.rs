// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing identity and transport trust anchor.
//!
//! The identity is loaded once at startup from the member organization's
//! credential layout:
//!
//! ```text
//! msp/
//!   signcerts/User1@org1.example.com-cert.pem   # certificate (PEM)
//!   keystore/<hash>_sk                          # PKCS#8 private key (first file)
//! peers/peer0.org1.example.com/tls/ca.crt       # trust anchor (PEM)
//! ```
//!
//! Nothing here is mutated after load, so the loaded [`Identity`] is shared
//! freely behind an `Arc`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use sha2::{Digest, Sha256};

use super::error::IdentityError;
use super::types::SerializedIdentity;

const CERTIFICATE_TAG: &str = "CERTIFICATE";
const PKCS8_KEY_TAG: &str = "PRIVATE KEY";

/// Paths of the credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub msp_id: String,
    pub cert_path: PathBuf,
    pub key_dir: PathBuf,
    pub tls_ca_path: PathBuf,
}

/// A signing identity bound to a member organization.
pub struct Identity {
    msp_id: String,
    certificate_pem: String,
    /// Kept for the client side of mutual TLS.
    private_key_pem: String,
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("msp_id", &self.msp_id)
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Load the certificate and the first key file found in `key_dir`.
    pub fn load(msp_id: &str, cert_path: &Path, key_dir: &Path) -> Result<Self, IdentityError> {
        let certificate_pem = read_to_string(cert_path)?;
        let key_path = first_key_file(key_dir)?;
        let key_pem = read_to_string(&key_path)?;

        check_pem(cert_path, &certificate_pem, CERTIFICATE_TAG)?;
        check_pem(&key_path, &key_pem, PKCS8_KEY_TAG)?;

        Self::from_pem(msp_id, &certificate_pem, &key_pem)
    }

    /// Build an identity from in-memory PEM material.
    pub fn from_pem(
        msp_id: &str,
        certificate_pem: &str,
        private_key_pem: &str,
    ) -> Result<Self, IdentityError> {
        if msp_id.trim().is_empty() {
            return Err(IdentityError::MissingMspId);
        }

        let cert = pem::parse(certificate_pem)
            .map_err(|e| IdentityError::InvalidPem {
                path: PathBuf::from("<certificate>"),
                message: e.to_string(),
            })?;
        if cert.tag() != CERTIFICATE_TAG {
            return Err(IdentityError::InvalidPem {
                path: PathBuf::from("<certificate>"),
                message: format!("expected {CERTIFICATE_TAG}, found {}", cert.tag()),
            });
        }

        let key = pem::parse(private_key_pem)
            .map_err(|e| IdentityError::InvalidPrivateKey(format!("Invalid PEM: {e}")))?;
        if key.tag() != PKCS8_KEY_TAG {
            return Err(IdentityError::InvalidPrivateKey(format!(
                "expected PKCS#8 `{PKCS8_KEY_TAG}`, found `{}`",
                key.tag()
            )));
        }

        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, key.contents(), &rng)
            .map_err(|e| IdentityError::InvalidPrivateKey(e.to_string()))?;

        // The certificate's subject key must be the signing key.
        if !certifies(cert.contents(), key_pair.public_key().as_ref()) {
            return Err(IdentityError::InvalidPrivateKey(
                "key does not match certificate".to_string(),
            ));
        }

        Ok(Self {
            msp_id: msp_id.to_string(),
            certificate_pem: certificate_pem.to_string(),
            private_key_pem: private_key_pem.to_string(),
            key_pair,
            rng,
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    /// Uncompressed SEC1 public key.
    pub fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }

    /// Certificate followed by private key, as a TLS client identity.
    pub fn tls_identity_pem(&self) -> Vec<u8> {
        let mut bundle = self.certificate_pem.clone().into_bytes();
        if !bundle.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(self.private_key_pem.as_bytes());
        bundle
    }

    /// Creator identity as carried in proposals.
    pub fn serialized(&self) -> SerializedIdentity {
        SerializedIdentity {
            msp_id: self.msp_id.clone(),
            id_bytes: self.certificate_pem.clone(),
        }
    }

    /// Canonical creator bytes: msp id followed by the certificate PEM.
    pub fn creator_bytes(&self) -> Vec<u8> {
        let mut bytes = self.msp_id.as_bytes().to_vec();
        bytes.extend_from_slice(self.certificate_pem.as_bytes());
        bytes
    }

    /// ECDSA P-256 / SHA-256 signature (ASN.1 DER) over `message`.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, IdentityError> {
        self.key_pair
            .sign(&self.rng, message)
            .map(|sig| sig.as_ref().to_vec())
            .map_err(|_| IdentityError::Signing)
    }

    /// Fill `buf` from the system CSPRNG.
    pub fn fill_random(&self, buf: &mut [u8]) -> Result<(), IdentityError> {
        use ring::rand::SecureRandom;
        self.rng.fill(buf).map_err(|_| IdentityError::Signing)
    }
}

/// Transaction id for a nonce and creator: lower-hex SHA-256(nonce || creator).
pub fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

/// Certificate used to authenticate the peer's TLS endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    pem: String,
}

impl TrustAnchor {
    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let pem = read_to_string(path)?;
        check_pem(path, &pem, CERTIFICATE_TAG)?;
        Ok(Self { pem })
    }

    pub fn pem(&self) -> &str {
        &self.pem
    }
}

/// Everything loaded from disk at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identity: Arc<Identity>,
    pub trust_anchor: TrustAnchor,
}

impl Credentials {
    pub fn load(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let identity = Identity::load(&config.msp_id, &config.cert_path, &config.key_dir)?;
        let trust_anchor = TrustAnchor::load(&config.tls_ca_path)?;

        tracing::info!(
            msp_id = %identity.msp_id(),
            cert = %config.cert_path.display(),
            "Loaded signing identity"
        );

        Ok(Self {
            identity: Arc::new(identity),
            trust_anchor,
        })
    }
}

fn read_to_string(path: &Path) -> Result<String, IdentityError> {
    fs::read_to_string(path).map_err(|source| IdentityError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// First regular file of the keystore directory, by file name.
fn first_key_file(dir: &Path) -> Result<PathBuf, IdentityError> {
    let entries = fs::read_dir(dir).map_err(|source| IdentityError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    files
        .into_iter()
        .next()
        .ok_or_else(|| IdentityError::EmptyKeyDirectory(dir.to_path_buf()))
}

/// Whether `der` is a DER SEQUENCE embedding `public_key` (uncompressed SEC1).
fn certifies(der: &[u8], public_key: &[u8]) -> bool {
    der.first() == Some(&0x30)
        && !public_key.is_empty()
        && der.windows(public_key.len()).any(|w| w == public_key)
}

fn check_pem(path: &Path, contents: &str, tag: &str) -> Result<(), IdentityError> {
    let parsed = pem::parse(contents).map_err(|e| IdentityError::InvalidPem {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    if parsed.tag() != tag {
        return Err(IdentityError::InvalidPem {
            path: path.to_path_buf(),
            message: format!("expected {tag}, found {}", parsed.tag()),
        });
    }
    Ok(())
}
