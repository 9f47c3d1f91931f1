use std::collections::HashSet;
use std::thread;

use mipc_crypto::Magic;
use mipc_proto::authentication::{self, Finished};
use mipc_proto::login::{self, LoginAck};
use mipc_proto::{Error, NidKind, NidParams, Session, SharedSession, format_nid};
use serde_json::json;

const SECRET: &str = "703713319380997337899942106288320558";

fn handshaken(lid: &str, secret: &str) -> Session {
    let mut s = Session::new();
    s.apply_handshake(Finished { shared_secret: secret.into(), tid: "1".into(), lid: lid.into() });
    s
}

fn logged_in(sid: &str, seq: u64) -> Session {
    let mut s = handshaken("0x4c", SECRET);
    s.apply_login(LoginAck { sid: sid.into(), seq, lid: "0x4c".into(), addr: None });
    s
}

// ── format_nid vectors ────────────────────────────────────────────────────────

#[test]
fn nid_vectors_with_extra_payload() {
    let cases = [
        ("\u{3}Z", "MPOL2S4EWHJMGgDnbmy.0mmlQgNaYQM"),
        ("\u{3}[", "MMFqdAf6h7hJUU2I2KEsf7WlQgNbYQM"),
        ("\u{3}\\", "MELTIskn44eG7hjSnP9ViEGlQgNcYQM"),
        ("\u{3}]", "MOp5oXUi.p5TtyTEuATEtaylQgNdYQM"),
    ];
    for (seq, expected) in cases {
        let c = &seq[1..];
        let secret = format!("B\u{3}{c}a\u{3}$575577999316286149171440385503499294");
        let extra = format!("B\u{3}{c}a\u{3}");
        let params = NidParams {
            seq: Magic::Text(seq),
            identifier: "",
            secret: &secret,
            kind: 0,
            extra: &extra,
            hash_input: "",
        };
        assert_eq!(format_nid(&params).unwrap(), expected, "seq {seq:?}");
    }
}

#[test]
fn nid_vectors_login_and_request() {
    let cases = [
        (1u64, "0x4c", SECRET, 2, "MJWmqRxu9aPNYxEC4eM2SIhBAWFMgQI"),
        (492, "0x1e", SECRET, 0, "MMIDV4iPq89YTLcaU7x.9XNCAexhHg"),
        (1, "0x56", "592275261678845367857716440229997215", 2, "MEzMeLwVc7uJmDkHM7jcZ_tBAWFWgQI"),
    ];
    for (seq, ident, secret, kind, expected) in cases {
        assert_eq!(format_nid(&NidParams::new(seq, ident, secret, kind)).unwrap(), expected);
    }
}

#[test]
fn nid_is_deterministic() {
    let p = NidParams::new(9u64, "0x1e", SECRET, 0);
    assert_eq!(format_nid(&p).unwrap(), format_nid(&p).unwrap());
}

// ── Session minting ───────────────────────────────────────────────────────────

#[test]
fn mint_requires_shared_secret() {
    let mut s = Session::new();
    assert_eq!(s.next_nid(), Err(Error::TokenMintFailure { missing: "shared secret" }));
    assert_eq!(s.seq(), 0, "failed mint must not consume a sequence value");
}

#[test]
fn login_token_matches_vector() {
    let mut s = handshaken("0x4c", SECRET);
    let nid = s.mint_nid(NidKind::Login, true).unwrap();
    assert_eq!(nid.seq, 1);
    assert_eq!(nid.value, "MJWmqRxu9aPNYxEC4eM2SIhBAWFMgQI");
}

#[test]
fn login_token_without_increment_keeps_seq() {
    let mut s = handshaken("0x4c", SECRET);
    let nid = s.mint_nid(NidKind::Login, false).unwrap();
    assert_eq!(nid.seq, 0);
    assert_eq!(s.seq(), 0);
}

#[test]
fn request_token_matches_vector() {
    let mut s = logged_in("0x1e", 491);
    let nid = s.next_nid().unwrap();
    assert_eq!(nid.seq, 492);
    assert_eq!(nid.to_string(), "MMIDV4iPq89YTLcaU7x.9XNCAexhHg");
}

#[test]
fn request_tokens_always_increment() {
    let mut s = logged_in("0x1e", 10);
    for expected in 11..20 {
        assert_eq!(s.mint_nid(NidKind::Request, false).unwrap().seq, expected);
    }
    assert_eq!(s.seq(), 19);
}

#[test]
fn exhausted_sequence_fails_without_wrapping() {
    let mut s = logged_in("0x1e", u64::MAX);
    assert_eq!(s.next_nid(), Err(Error::TokenMintFailure { missing: "sequence value after u64::MAX" }));
    assert_eq!(s.seq(), u64::MAX);
    assert!(s.mint_nid(NidKind::Login, true).is_err());

    // a login token that keeps the sequence still mints
    assert_eq!(s.mint_nid(NidKind::Login, false).unwrap().seq, u64::MAX);
}

#[test]
fn concurrent_mints_never_share_a_seq() {
    let shared = SharedSession::new(logged_in("0x1e", 0));
    let workers: Vec<_> = (0..2)
        .map(|_| {
            let s = shared.clone();
            thread::spawn(move || (0..500).map(|_| s.next_nid().unwrap().seq).collect::<Vec<_>>())
        })
        .collect();

    let mut seen = HashSet::new();
    for w in workers {
        for seq in w.join().unwrap() {
            assert!(seen.insert(seq), "sequence {seq} minted twice");
        }
    }
    assert_eq!(seen.len(), 1000);
    assert_eq!(shared.lock().seq(), 1000);
}

// ── Handshake + login ─────────────────────────────────────────────────────────

#[test]
fn handshake_then_login_request() {
    let client = mipc_crypto::KeyPair::from_private(42);
    let device = mipc_crypto::KeyPair::from_private(4242);
    let mut s = Session::new();

    let (req, s1) = authentication::step1(&client, s.tid());
    assert_eq!(req.get("dtid"), Some("0"));

    let ack = json!({"type": "cacs_dh_ack", "data": {"key_b2a": device.public().to_string(), "tid": 5, "lid": "0x4c"}});
    s.apply_handshake(authentication::finish(s1, &ack).unwrap());
    assert_eq!(s.tid(), "5");
    assert_eq!(s.lid(), "0x4c");

    let secret = s.shared_secret().unwrap().to_string();
    let req = login::request(&mut s, "admin", "hunter2", true).unwrap();
    assert_eq!(req.path(), "/ccm/cacs_login_req.js");
    assert_eq!(req.get("dlid"), Some("0x4c"));
    assert_eq!(req.get("duser"), Some("admin"));
    assert_eq!(req.get("dpass").unwrap(), mipc_crypto::prove_credential("hunter2", &secret).unwrap());
    let expected_nid = format_nid(&NidParams::new(1u64, "0x4c", &secret, 2)).unwrap();
    assert_eq!(req.get("dnid"), Some(expected_nid.as_str()));
    assert_eq!(req.get("dparam_name"), Some("spv"));
    assert_eq!(req.get("dparam_value"), Some("v1"));

    login::finish(&mut s, &json!({"data": {"result": "", "sid": "0x1e", "seq": 491, "lid": "0x4d", "addr": "1.2.3.4"}}))
        .unwrap();
    assert_eq!(s.sid(), "0x1e");
    assert_eq!(s.seq(), 491);
    assert_eq!(s.lid(), "0x4d");
    assert_eq!(s.client_addr(), Some("1.2.3.4"));
}

#[test]
fn rejected_login_leaves_session_alone() {
    let mut s = handshaken("0x4c", SECRET);
    let before = s.clone();
    let err = login::finish(&mut s, &json!({"data": {"result": "accounts.user.offline"}})).unwrap_err();
    assert!(matches!(err, Error::LoginRejected { .. }));
    assert_eq!(s, before);
}
