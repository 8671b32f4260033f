//! Request signing and webhook digest computation for the DigiFlazz protocol.
//!
//! DigiFlazz signs outbound API commands with an MD5 over
//! `username + api_key + salt`, where the salt is a fixed string per command
//! (`"depo"`, `"pricelist"`, `"deposit"`) or the caller's `ref_id` for
//! transactions. Inbound webhooks carry an `X-Hub-Signature` header of the
//! form `sha1=<hex>`, an HMAC-SHA1 over the exact raw request body.
//!
//! MD5 and HMAC-SHA1 are weak by modern standards; they are kept here because
//! they are what the provider's wire protocol requires. Everything in this
//! module is a pure function of its inputs.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Prefix the provider puts in front of the hex digest in `X-Hub-Signature`.
pub const SIGNATURE_PREFIX: &str = "sha1=";

/// Computes the request signature for an API command.
///
/// The digest is the lowercase hex MD5 of `username + api_key + salt`. It is
/// fully deterministic: no timestamp or nonce enters the input, so identical
/// requests always produce identical signatures (a property of the provider
/// protocol).
pub fn sign(username: &str, api_key: &str, salt: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes the webhook digest: lowercase hex HMAC-SHA1 of the raw body.
///
/// The digest must be computed over the exact bytes received on the wire.
/// Re-serializing a parsed body can reorder keys or change whitespace and
/// invalidate the signature.
pub fn webhook_digest(secret: &str, raw_body: &[u8]) -> String {
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC key can be of any size, as per crate documentation"),
    };
    mac.update(raw_body);
    hex::encode(mac.finalize().into_bytes())
}

/// Formats a digest the way the provider sends it in `X-Hub-Signature`.
pub fn format_signature_header(digest: &str) -> String {
    format!("{SIGNATURE_PREFIX}{digest}")
}

/// Verifies an `X-Hub-Signature` header value against the raw body.
///
/// The expected header (`sha1=` + digest) is compared to the provided header
/// in constant time. Short-circuiting string equality would leak how many
/// leading bytes matched through timing.
pub fn verify_signature_header(secret: &str, raw_body: &[u8], header: &str) -> bool {
    let expected = format_signature_header(&webhook_digest(secret, raw_body));
    expected.as_bytes().ct_eq(header.as_bytes()).into()
}
