use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::error;

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

fn decode_public_key(public_key_hex: &str) -> Option<VerifyingKey> {
    let bytes = hex::decode(public_key_hex.trim()).ok()?;
    let key: [u8; 32] = bytes.as_slice().try_into().ok()?;
    VerifyingKey::from_bytes(&key).ok()
}

/// Check Discord's Ed25519 signature over `timestamp || body`.
pub fn verify_discord_signature(
    request_body: &str,
    timestamp: &str,
    signature_hex: &str,
    public_key_hex: &str,
) -> bool {
    let Some(key) = decode_public_key(public_key_hex) else {
        error!("DISCORD_PUBLIC_KEY is not a valid Ed25519 public key");
        return false;
    };

    let signature = match hex::decode(signature_hex.trim())
        .ok()
        .and_then(|bytes| Signature::from_slice(&bytes).ok())
    {
        Some(sig) => sig,
        None => {
            error!("Malformed signature header");
            return false;
        }
    };

    let message = format!("{timestamp}{request_body}");
    match key.verify(message.as_bytes(), &signature) {
        Ok(()) => true,
        Err(e) => {
            error!("Signature verification failed: {}", e);
            false
        }
    }
}
