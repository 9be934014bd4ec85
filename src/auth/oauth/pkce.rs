use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub(crate) struct PkcePair {
    pub(crate) verifier: String,
    pub(crate) challenge: String,
}

pub(crate) fn generate_pkce_pair() -> PkcePair {
    let verifier = random_url_safe(32);
    let challenge = s256_challenge(&verifier);
    PkcePair {
        verifier,
        challenge,
    }
}

/// Random, URL-safe value of `len` bytes of entropy (used for `state` too).
pub(crate) fn random_url_safe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
