//! Shared-secret credential verification.

/// Compare a submitted secret against the configured one.
///
/// Length mismatch returns false immediately (leaks length, nothing else).
/// Equal-length strings are folded byte-by-byte through XOR so the running
/// time does not depend on where the first mismatch sits. Best-effort
/// timing hardening for a single shared password, not a cryptographic
/// primitive.
pub fn verify(submitted: &str, expected: &str) -> bool {
    if submitted.len() != expected.len() {
        return false;
    }

    let mut acc: u8 = 0;
    for (a, b) in submitted.bytes().zip(expected.bytes()) {
        acc |= a ^ b;
    }
    acc == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match() {
        assert!(verify("hunter2", "hunter2"));
        assert!(verify("", ""));
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(!verify("hunter", "hunter2"));
        assert!(!verify("hunter22", "hunter2"));
        assert!(!verify("", "hunter2"));
        assert!(!verify("hunter2", ""));
    }

    #[test]
    fn rejects_equal_length_mismatch() {
        assert!(!verify("hunter3", "hunter2"));
        assert!(!verify("Hunter2", "hunter2"));
        // mismatch in the first byte and in the last byte alike
        assert!(!verify("aunter2", "hunter2"));
    }

    #[test]
    fn is_byte_exact_for_unicode() {
        assert!(verify("pässword", "pässword"));
        // same char count, different encoding length
        assert!(!verify("passwörd", "password"));
    }
}
