//! Property tests for the envelope API and its supporting primitives

use proptest::prelude::*;
use saltseal::constant_time::{compare, equals};
use saltseal::memory::{is_zero, zero};
use saltseal::secretbox::{
    self, KEY_SIZE, MAC_SIZE, NONCE_SIZE, decrypt, decrypt_detached, decrypt_split, encrypt,
    encrypt_detached, encrypt_split,
};
use saltseal::{ErrorKind, Key};
use std::cmp::Ordering;
use std::thread;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn roundtrip_every_shape(
        key in proptest::array::uniform32(any::<u8>()),
        message in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let combined = encrypt(&message, &key).unwrap();
        prop_assert_eq!(combined.len(), NONCE_SIZE + MAC_SIZE + message.len());
        prop_assert_eq!(&decrypt(&combined, &key).unwrap(), &message);

        let sealed = encrypt_split(&message, &key).unwrap();
        let opened = decrypt_split(&sealed.mac_ciphertext, &key, sealed.nonce.as_ref()).unwrap();
        prop_assert_eq!(&opened, &message);

        let detached = encrypt_detached(&message, &key).unwrap();
        prop_assert_eq!(detached.ciphertext.len(), message.len());
        let opened = decrypt_detached(
            &detached.ciphertext,
            &key,
            detached.nonce.as_ref(),
            detached.mac.as_ref(),
        )
        .unwrap();
        prop_assert_eq!(&opened, &message);

        // Cross-shape: detached output re-laid as combined.
        prop_assert_eq!(&decrypt(&detached.into_combined(), &key).unwrap(), &message);
    }

    #[test]
    fn single_bit_flip_is_rejected(
        message in proptest::collection::vec(any::<u8>(), 0..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = Key::generate().unwrap();
        let mut combined = encrypt(&message, key.as_ref()).unwrap();
        let i = position.index(combined.len());
        combined[i] ^= 1 << bit;

        let err = decrypt(&combined, key.as_ref()).unwrap_err();
        prop_assert_eq!(err.kind, Some(ErrorKind::DecryptFailed));
    }

    #[test]
    fn short_envelopes_are_invalid_size(
        short in proptest::collection::vec(any::<u8>(), 0..NONCE_SIZE + MAC_SIZE),
    ) {
        let err = decrypt(&short, &[0u8; KEY_SIZE]).unwrap_err();
        prop_assert_eq!(err.kind, Some(ErrorKind::InvalidSize));
    }

    #[test]
    fn compare_is_antisymmetric_and_agrees_with_equals(
        pair in (0usize..64).prop_flat_map(|len| (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        )),
    ) {
        let (a, b) = pair;
        let ab = compare(&a, &b).unwrap();
        let ba = compare(&b, &a).unwrap();
        prop_assert_eq!(ab, ba.reverse());
        prop_assert_eq!(ab == Ordering::Equal, equals(&a, &b));
        prop_assert_eq!(compare(&a, &a).unwrap(), Ordering::Equal);

        // Little-endian numeric order, same as comparing the reversed bytes.
        let mut ra = a.clone();
        let mut rb = b.clone();
        ra.reverse();
        rb.reverse();
        prop_assert_eq!(ab, ra.cmp(&rb));
    }

    #[test]
    fn compare_rejects_length_mismatch(
        a in proptest::collection::vec(any::<u8>(), 0..32),
        extra in 1usize..8,
    ) {
        let b = vec![0u8; a.len() + extra];
        let err = compare(&a, &b).unwrap_err();
        prop_assert_eq!(err.kind, Some(ErrorKind::SizeMismatch));
        prop_assert!(!equals(&a, &b));
    }

    #[test]
    fn zero_always_yields_zero(buf in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut buf = buf;
        zero(&mut buf);
        prop_assert!(is_zero(&buf));
    }
}

#[test]
fn concurrent_callers_share_nothing() {
    let key = Key::generate().unwrap();

    thread::scope(|s| {
        let handles: Vec<_> = (0..8u8)
            .map(|t| {
                let key = &key;
                s.spawn(move || {
                    for i in 0..50u8 {
                        let message = vec![t ^ i; usize::from(i)];
                        let combined = secretbox::encrypt(&message, key.as_ref()).unwrap();
                        assert_eq!(secretbox::decrypt(&combined, key.as_ref()).unwrap(), message);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}

#[test]
fn nonces_do_not_repeat() {
    let key = Key::generate().unwrap();
    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        let sealed = encrypt_split(b"same message", key.as_ref()).unwrap();
        assert!(seen.insert(*sealed.nonce.as_bytes()));
    }
}
