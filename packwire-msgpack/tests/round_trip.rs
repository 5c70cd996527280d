#![cfg(any(feature = "std", feature = "alloc"))]
use std::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};

use packwire_msgpack::*;
use packwire_msgpack::{encode, decode};
use packwire::SliceWriter;

/// A record handing its fields to the codec in a fixed order
#[derive(Debug, Default, PartialEq)]
struct Reading<'a> {
    sensor: &'a str,
    seq: u32,
    celsius: f32,
    offset: i16,
    raw: Bin<&'a [u8]>,
    note: Option<String>,
}

impl Pack for Reading<'_> {
    fn pack<W: PackWrite>(&self, encoder: &mut Encoder<W>) -> encode::Result<()> {
        encoder.encode_array_len(6)?;
        encoder.encode_sequence((self.sensor, &self.seq, &self.celsius, &self.offset, &self.raw, &self.note))
    }
}

impl<'de> Unpack<'de> for Reading<'de> {
    fn unpack(decoder: &mut Decoder<'de>) -> decode::Result<Self> {
        if decoder.decode_array_len()? != 6 {
            return Err(decode::Error::ExpectedArray)
        }
        let mut reading = Reading::default();
        decoder.decode_sequence((
            &mut reading.sensor,
            &mut reading.seq,
            &mut reading.celsius,
            &mut reading.offset,
            &mut reading.raw,
            &mut reading.note))?;
        Ok(reading)
    }
}

#[test]
fn record_round_trip() {
    let reading = Reading {
        sensor: "t1",
        seq: 70000,
        celsius: 21.5,
        offset: -1000,
        raw: Bin(&[1, 2]),
        note: None
    };
    let bytes = to_vec(&reading).unwrap();
    assert_eq!(bytes,
        b"\x96\xa2t1\xce\x00\x01\x11\x70\xca\x41\xac\x00\x00\xd1\xfc\x18\xc4\x02\x01\x02\xc0");
    assert_eq!(from_slice::<Reading>(&bytes), Ok((reading, bytes.len())));

    let reading = Reading {
        sensor: "",
        seq: 0,
        celsius: 20.0,
        offset: i16::MIN,
        raw: Bin(&[]),
        note: Some("ok".into())
    };
    let bytes = to_vec(&reading).unwrap();
    // an integral float is written as an integer
    assert_eq!(bytes, b"\x96\xa0\x00\x14\xd1\x80\x00\xc4\x00\xa2ok");
    assert_eq!(from_slice::<Reading>(&bytes), Ok((reading, bytes.len())));

    assert_eq!(from_slice::<Reading>(b"\x95\xa0\x00\x00\x00\xc4\x00"), Err(decode::Error::ExpectedArray));
    assert_eq!(from_slice::<Reading>(b"\x96\xa0\x00\x00\xcc\x80"), Err(decode::Error::TruncatedInput));
}

#[test]
fn signed_width_boundaries() {
    let cases: &[(i64, usize)] = &[
        (i64::MIN, 9), (i32::MIN as i64 - 1, 9), (i32::MIN as i64, 5),
        (-32769, 5), (-32768, 3), (-129, 3), (-128, 2), (-33, 2),
        (-32, 1), (-1, 1), (0, 1), (127, 1),
        (128, 3), (255, 3), (32767, 3), (32768, 5),
        (i32::MAX as i64, 5), (i32::MAX as i64 + 1, 9), (i64::MAX, 9),
    ];
    for &(value, len) in cases {
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes.len(), len, "{}", value);
        assert_eq!(from_slice::<i64>(&bytes), Ok((value, len)));
        assert_eq!(from_slice::<Value>(&bytes), Ok((Value::Int(value), len)));
    }
}

#[test]
fn unsigned_width_boundaries() {
    let cases: &[(u64, usize)] = &[
        (0, 1), (127, 1), (128, 2), (255, 2), (256, 3), (65535, 3),
        (65536, 5), (u32::MAX as u64, 5), (u32::MAX as u64 + 1, 9), (u64::MAX, 9),
    ];
    for &(value, len) in cases {
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes.len(), len, "{}", value);
        assert_eq!(from_slice::<u64>(&bytes), Ok((value, len)));
        assert_eq!(from_slice::<Value>(&bytes), Ok((Value::UInt(value), len)));
    }
}

#[test]
fn integers_widen_into_wider_targets() {
    let bytes = to_vec(&-100i8).unwrap();
    assert_eq!(bytes, b"\xd0\x9c");
    assert_eq!(from_slice::<i16>(&bytes), Ok((-100, 2)));
    assert_eq!(from_slice::<i32>(&bytes), Ok((-100, 2)));
    assert_eq!(from_slice::<i64>(&bytes), Ok((-100, 2)));
    assert_eq!(from_slice::<u64>(&bytes), Err(decode::Error::Narrowing));
    let bytes = to_vec(&200u8).unwrap();
    assert_eq!(from_slice::<u16>(&bytes), Ok((200, 2)));
    assert_eq!(from_slice::<i16>(&bytes), Ok((200, 2)));
    assert_eq!(from_slice::<i8>(&bytes), Err(decode::Error::Narrowing));
    let bytes = to_vec(&-1000i64).unwrap();
    assert_eq!(bytes, b"\xd1\xfc\x18");
    assert_eq!(from_slice::<i8>(&bytes), Err(decode::Error::Narrowing));
}

#[test]
fn floats_round_trip() {
    for value in [3.14f64, -2.5, 0.1, 1e-300, -1e300, f64::MAX, f64::MIN_POSITIVE, 0.5] {
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes[0], 0xcb);
        assert_eq!(from_slice::<f64>(&bytes), Ok((value, 9)));
    }
    for value in [3.14f32, -2.5, 0.1, f32::MAX, f32::MIN_POSITIVE] {
        let bytes = to_vec(&value).unwrap();
        assert_eq!(bytes[0], 0xca);
        assert_eq!(from_slice::<f32>(&bytes), Ok((value, 5)));
        assert_eq!(from_slice::<f64>(&bytes), Ok((value as f64, 5)));
    }
    // integral floats take the integer path and decode back numerically
    let bytes = to_vec(&4.0f64).unwrap();
    assert_eq!(bytes, b"\x04");
    assert_eq!(from_slice::<f64>(&bytes), Ok((4.0, 1)));
    assert_eq!(from_slice::<Value>(&bytes), Ok((Value::UInt(4), 1)));
    let bytes = to_vec(&-1.0e15f64).unwrap();
    assert_eq!(bytes[0], 0xd3);
    assert_eq!(from_slice::<f64>(&bytes), Ok((-1.0e15, 9)));
    assert_eq!(from_slice::<i64>(&bytes), Ok((-1_000_000_000_000_000, 9)));
}

#[test]
fn integers_into_floats_are_exact() {
    let bytes = to_vec(&16_777_217i32).unwrap();
    assert_eq!(from_slice::<f32>(&bytes), Err(decode::Error::Narrowing));
    assert_eq!(from_slice::<f64>(&bytes), Ok((16_777_217.0, 5)));
    let bytes = to_vec(&-16_777_216i32).unwrap();
    assert_eq!(from_slice::<f32>(&bytes), Ok((-16_777_216.0, 5)));
    let bytes = to_vec(&((1u64 << 53) + 1)).unwrap();
    assert_eq!(from_slice::<f64>(&bytes), Err(decode::Error::Narrowing));
    assert_eq!(from_slice::<u64>(&bytes), Ok(((1u64 << 53) + 1, 9)));
    // every integral float comes back as the same float
    for value in [(1u64 << 53) as f64, 1.0e18, -4.0e18, 18446744073709549568.0] {
        assert_eq!(from_slice::<f64>(&to_vec(&value).unwrap()), Ok((value, 9)));
    }
}

#[test]
fn strings_and_blobs_round_trip() {
    for len in [0usize, 1, 31, 32, 255, 256, 65535, 65536] {
        let text: String = "abcdefghij".chars().cycle().take(len).collect();
        let bytes = to_vec(text.as_str()).unwrap();
        let header = match len {
            0..=31 => 1,
            32..=255 => 2,
            256..=65535 => 3,
            _ => 5
        };
        assert_eq!(bytes.len(), header + len);
        assert_eq!(from_slice::<&str>(&bytes), Ok((text.as_str(), bytes.len())));

        let blob = text.into_bytes();
        let bytes = to_vec(&Bin(&blob)).unwrap();
        let header = match len {
            0..=255 => 2,
            256..=65535 => 3,
            _ => 5
        };
        assert_eq!(bytes.len(), header + len);
        assert_eq!(from_slice::<Bin<&[u8]>>(&bytes), Ok((Bin(&blob[..]), bytes.len())));
    }
}

#[test]
fn containers_round_trip() {
    for len in [0usize, 15, 16, 65535, 65536] {
        let items: Vec<bool> = (0..len).map(|i| i % 3 == 0).collect();
        let bytes = to_vec(&items).unwrap();
        let header = match len {
            0..=15 => 1,
            16..=65535 => 3,
            _ => 5
        };
        assert_eq!(bytes.len(), header + len);
        assert_eq!(from_slice::<Vec<bool>>(&bytes), Ok((items, bytes.len())));
    }
    for len in [0u16, 15, 16, 1000] {
        let map: BTreeMap<u16, ()> = (0..len).map(|k| (k, ())).collect();
        let bytes = to_vec(&map).unwrap();
        assert_eq!(bytes[0], if len <= 15 { 0x80 | len as u8 } else { 0xde });
        assert_eq!(from_slice::<BTreeMap<u16, ()>>(&bytes), Ok((map, bytes.len())));
    }
}

#[test]
fn sequence_containers_share_the_array_encoding() {
    let items = [3u32, 70000, 3, 1];
    let bytes = to_vec(&items).unwrap();
    assert_eq!(bytes, b"\x94\x03\xce\x00\x01\x11\x70\x03\x01");
    assert_eq!(to_vec(&items.to_vec()).unwrap(), bytes);
    assert_eq!(to_vec(&VecDeque::from(items.to_vec())).unwrap(), bytes);
    assert_eq!(to_vec(&items.iter().copied().collect::<LinkedList<_>>()).unwrap(), bytes);

    assert_eq!(from_slice::<[u32; 4]>(&bytes), Ok((items, bytes.len())));
    assert_eq!(from_slice::<VecDeque<u32>>(&bytes).map(|(v, _)| Vec::from(v)), Ok(items.to_vec()));
    let (list, _) = from_slice::<LinkedList<u32>>(&bytes).unwrap();
    assert!(list.iter().eq(items.iter()));
    // a set keeps one copy of the repeated 3 and sorts on the way back
    let (set, len) = from_slice::<BTreeSet<u32>>(&bytes).unwrap();
    assert_eq!(len, bytes.len());
    assert_eq!(to_vec(&set).unwrap(), b"\x93\x01\x03\xce\x00\x01\x11\x70");
}

#[test]
fn map_duplicate_keys() {
    let keys = ["a", "b", "a"];
    let values = [1u8, 2, 3];
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode_map(keys.iter().zip(values.iter())).unwrap();
    let bytes = encoder.into_inner();
    assert_eq!(bytes, b"\x83\xa1a\x01\xa1b\x02\xa1a\x03");
    // typed maps keep the last value
    let (map, _) = from_slice::<BTreeMap<String, u8>>(&bytes).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 3);
    // values keep every pair
    let (value, _) = from_slice::<Value>(&bytes).unwrap();
    let pairs = value.as_map().unwrap();
    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[0], (Value::from("a"), Value::from(1u8)));
    assert_eq!(pairs[2], (Value::from("a"), Value::from(3u8)));
}

#[test]
fn message_stream_cursor() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&Reading { sensor: "a", seq: 1, celsius: 0.5, ..Reading::default() }).unwrap();
    encoder.encode("between").unwrap();
    encoder.encode(&Reading { sensor: "b", seq: 2, celsius: -0.5, ..Reading::default() }).unwrap();
    encoder.encode_nil().unwrap();
    let stream = encoder.into_inner();

    let mut decoder = Decoder::from_slice(&stream);
    let first: Reading = decoder.decode().unwrap();
    assert_eq!(first.sensor, "a");
    let after_first = decoder.position();
    decoder.skip_value().unwrap();
    assert_eq!(decoder.position(), after_first + 8);
    let second: Reading = decoder.decode().unwrap();
    assert_eq!((second.sensor, second.seq, second.celsius), ("b", 2, -0.5));
    decoder.decode_nil().unwrap();
    assert_eq!(decoder.remaining_len(), 0);
    // repositioning replays a message
    decoder.set_position(after_first);
    assert_eq!(decoder.decode::<&str>(), Ok("between"));

    let (first_again, tail) = from_slice_split_tail::<Reading>(&stream).unwrap();
    assert_eq!(first_again, first);
    assert_eq!(tail.len(), stream.len() - after_first);
}

#[test]
fn encoder_leaves_bytes_past_output_alone() {
    let mut buf = [0xAAu8; 16];
    let mut writer = SliceWriter::new(&mut buf);
    to_writer(&mut writer, &(-1000i16)).unwrap();
    assert_eq!(writer.len(), 3);
    assert_eq!(buf, [0xD1, 0xFC, 0x18, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
                     0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA]);
    let mut decoder = Decoder::from_slice(&buf);
    assert_eq!(decoder.decode_int::<i32>(), Ok(-1000));
    assert_eq!(decoder.position(), 3);
    assert_eq!(decoder.peek(), Ok(0xAA));

    let mut small = [0u8; 2];
    assert_eq!(to_writer(SliceWriter::new(&mut small), &70000u32), Err(encode::Error::BufferFull));
}

#[test]
fn value_round_trip() {
    let value = Value::Array(vec![
        Value::Nil,
        Value::Bool(true),
        Value::Int(-1000),
        Value::UInt(u64::MAX),
        Value::Float32(1.5),
        Value::Float64(3.14),
        Value::Str("x".repeat(40)),
        Value::Bin(vec![0; 3]),
        Value::Array(vec![]),
        Value::Map(vec![(Value::Nil, Value::Array(vec![Value::Int(-1)]))]),
    ]);
    let bytes = to_vec(&value).unwrap();
    let mut decoder = Decoder::from_slice(&bytes);
    assert_eq!(decoder.decode_value(), Ok(value));
    assert_eq!(decoder.end(), Ok(0));
}
