use base64::engine::general_purpose::STANDARD as B64_STANDARD;
use base64::Engine;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;

use super::{AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel};

const PEM_HEADER: &str = "-----BEGIN";

enum KeyMaterial {
    Absent,
    Malformed(String),
    Ready(VerifyingKey),
}

/// ECDSA (P-256, SHA-256) verifier of webhook requests sent by payment
/// processor.
///
/// The public key can be given as PEM text, or base64-encoded PEM which
/// is the format some processors publish. Malformed key material is not
/// rejected at construction, every verification against it fails instead,
/// only absence of the key is reported as error.
pub struct WebhookSignatureVerifier {
    key: KeyMaterial,
}

fn decode_pem_text(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.starts_with(PEM_HEADER) {
        Ok(trimmed.to_string())
    } else {
        let decoded = B64_STANDARD.decode(trimmed).map_err(|e| e.to_string())?;
        String::from_utf8(decoded).map_err(|e| e.to_string())
    }
}

impl WebhookSignatureVerifier {
    pub fn new(public_key: Option<&str>) -> Self {
        let key = match public_key.map(str::trim) {
            None | Some("") => KeyMaterial::Absent,
            Some(raw) => match decode_pem_text(raw).and_then(|pem| {
                VerifyingKey::from_public_key_pem(pem.as_str()).map_err(|e| e.to_string())
            }) {
                Ok(k) => KeyMaterial::Ready(k),
                Err(detail) => KeyMaterial::Malformed(detail),
            },
        };
        Self { key }
    }

    /// key exists in confidential source but cannot be read as text
    pub fn malformed(detail: String) -> Self {
        Self {
            key: KeyMaterial::Malformed(detail),
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.key, KeyMaterial::Absent)
    }

    /// detail of key parsing failure, if any
    pub fn key_error(&self) -> Option<&str> {
        match &self.key {
            KeyMaterial::Malformed(d) => Some(d.as_str()),
            _others => None,
        }
    }

    /// Verify signature over the exact raw request body. The signature is
    /// base64-encoded, in ASN.1 DER or fixed-size (r || s) form.
    pub fn verify(&self, raw_body: &[u8], sign_b64: &str) -> Result<bool, AppProcessorError> {
        let pubkey = match &self.key {
            KeyMaterial::Ready(k) => k,
            KeyMaterial::Malformed(_) => return Ok(false),
            KeyMaterial::Absent => {
                return Err(AppProcessorError {
                    reason: AppProcessorErrorReason::MissingWebhookPublicKey,
                    fn_label: AppProcessorFnLabel::VerifyWebhookSignature,
                })
            }
        };
        let raw_sig = match B64_STANDARD.decode(sign_b64.trim()) {
            Ok(v) => v,
            Err(_e) => return Ok(false),
        };
        let sig = match Signature::from_der(&raw_sig).or_else(|_e| Signature::from_slice(&raw_sig)) {
            Ok(s) => s,
            Err(_e) => return Ok(false),
        };
        Ok(pubkey.verify(raw_body, &sig).is_ok())
    }
} // end of impl WebhookSignatureVerifier
