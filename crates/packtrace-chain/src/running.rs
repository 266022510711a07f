use packtrace_types::LogHash;

const DOMAIN_PREFIX: &[u8] = b"packtrace-chain-v1:";

/// Compute the running hash for an entry.
///
/// The combine is a domain-prefixed BLAKE3 over the prior running hash (if
/// any) and the entry's payload hash. The same (prior, payload) pair always
/// produces the same running hash, so validation can be replayed from any
/// known resume point.
pub fn running_hash(prior: Option<&LogHash>, payload: &LogHash) -> LogHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DOMAIN_PREFIX);
    if let Some(prior) = prior {
        hasher.update(prior.as_bytes());
    }
    hasher.update(payload.as_bytes());
    LogHash::from_raw(*hasher.finalize().as_bytes())
}
