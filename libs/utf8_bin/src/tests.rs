use super::*;

#[test]
fn empty() {
    assert_eq!(to_string(&[]), "");
    assert_eq!(from_str("").expect("empty is valid"), &[] as &[u8]);
}

#[test]
fn ascii_passthrough() {
    let encoded = to_string(b"ABC");
    assert_eq!(encoded, "ABC");
    assert_eq!(encoded.chars().count(), 3);

    let back = from_str(&encoded).expect("decoding failed");
    assert_eq!(back.as_slice(), b"ABC");
}

#[test]
fn high_byte_preserved_individually() {
    let encoded = to_string(&[0x80]);
    assert_eq!(encoded, "\u{80}");

    let back = from_str(&encoded).expect("decoding failed");
    assert_eq!(back.as_slice(), &[0x80]);
}

#[test]
fn latin1_sequence_unwound() {
    // `C3 A9` is "é" as UTF-8, but decoding may only ever turn `U+00E9` into a
    // single byte. so the encoder must emit both bytes individually.
    let encoded = to_string(&[0xC3, 0xA9]);
    assert_eq!(encoded, "\u{C3}\u{A9}");
    assert_eq!(encoded.as_bytes(), &[0xC3, 0x83, 0xC2, 0xA9]);

    round_trip_core(&[0xC3, 0xA9]);
    round_trip_core(&[0xC2, 0x80]);
    round_trip_core(&[0xC3, 0xBF]);
}

#[test]
fn multi_byte_passthrough() {
    let emoji = "😀".as_bytes();
    let encoded = to_string(emoji);
    assert_eq!(encoded.chars().collect::<Vec<_>>(), ['\u{1F600}']);
    assert_eq!(encoded.as_bytes(), emoji);

    round_trip_core(emoji);
    round_trip_core("Ā – € 中文 𐍈".as_bytes());
}

#[test]
fn encoded_replacement_char_passthrough() {
    let encoded = to_string(&[0xEF, 0xBF, 0xBD]);
    assert_eq!(encoded, "\u{FFFD}");
    round_trip_core(&[0xEF, 0xBF, 0xBD]);
}

#[test]
fn invalid_sequences_byte_by_byte() {
    const CASES: &[(&[u8], &str)] = &[
        // truncated at the end
        (&[0x41, 0xE2, 0x82], "A\u{E2}\u{82}"),
        (&[0xF0, 0x9F, 0x98], "\u{F0}\u{9F}\u{98}"),
        // overlong
        (&[0xC0, 0x80], "\u{C0}\u{80}"),
        // surrogate
        (&[0xED, 0xA0, 0x80], "\u{ED}\u{A0}\u{80}"),
        // lead byte followed by a valid sequence
        (&[0xE2, 0xE2, 0x82, 0xAC], "\u{E2}\u{20AC}"),
    ];

    for (input, output) in CASES {
        let encoded = to_string(input);
        assert_eq!(encoded, *output, "encoding {input:02X?}");
        round_trip_core(input);
    }
}

#[test]
fn every_byte_alone() {
    for b in 0..=u8::MAX {
        let encoded = to_string(&[b]);
        assert_eq!(encoded.chars().collect::<Vec<_>>(), [char::from(b)]);
        round_trip_core(&[b]);
    }
}

#[test]
fn every_byte_pair() {
    let mut data = Vec::with_capacity(2 * 0x10000);
    for lead in 0..=u8::MAX {
        for next in 0..=u8::MAX {
            round_trip_core(&[lead, next]);
            data.extend([lead, next]);
        }
    }

    round_trip_core(&data);
    round_trip_core(&data[1..]);
}

#[test]
fn every_char() {
    let text: String = ('\0'..=char::MAX).collect();
    round_trip_core(text.as_bytes());
}

#[test]
fn streaming_matches_buffered() {
    let data = b"\x00\xFFtext\xC3\xA9\xE2\x82\xAC\x80";

    let mut text = String::new();
    encode(&mut text, data).expect("write to String cannot fail");
    assert_eq!(text, to_string(data));

    let mut bytes = Vec::new();
    decode(&mut bytes, text.as_bytes()).expect("decoding failed");
    assert_eq!(bytes.as_slice(), data);
}

#[test]
fn raw_text_need_not_be_utf8() {
    // only `C2`/`C3` leads are checked, everything else is copied
    let back = from_bytes(&[0x41, 0xFF, 0x80, 0xC2, 0x80, 0xE2]).expect("decoding failed");
    assert_eq!(back.as_slice(), &[0x41, 0xFF, 0x80, 0x80, 0xE2]);
}

#[test]
fn truncated_lead_fails() {
    let err = from_bytes(&[0x41, 0x42, 0xC2]).expect_err("lone C2 at the end");
    assert!(matches!(err, Error::Malformed { offset: 2 }), "{err:?}");

    let err = from_bytes(&[0xC3]).expect_err("lone C3");
    assert!(matches!(err, Error::Malformed { offset: 0 }), "{err:?}");
}

#[test]
fn invalid_continuation_fails() {
    let err = from_bytes(&[0xC2, 0x00]).expect_err("00 is no continuation byte");
    assert!(matches!(err, Error::Malformed { offset: 0 }), "{err:?}");

    let err = from_bytes(&[0xC2, 0x80, 0xC3, 0xC3, 0x80]).expect_err("C3 is no continuation byte");
    assert!(matches!(err, Error::Malformed { offset: 2 }), "{err:?}");
}

#[test]
fn malformed_message() {
    let err = from_bytes(&[0xC2]).expect_err("lone C2");
    assert_eq!(
        err.to_string(),
        "invalid encoded text: malformed sequence at byte offset 0"
    );
}

#[test]
fn text_round_trip() {
    // the inverse direction holds for any text produced by the encoder
    let text = to_string(b"mixed \x00\x7F\x80\xC2\xA0 \xF0\x9F\x98\x80 end\xFF");
    let back = from_str(&text).expect("decoding failed");

    assert_eq!(to_string(&back), text);
}

fn round_trip_core(bytes: &[u8]) {
    let encoded = to_string(bytes);
    let back = from_str(&encoded).expect("decoding failed");

    assert_eq!(back.as_slice(), bytes, "round trip of {bytes:02X?}");
}
