//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashSet;
use std::sync::LazyLock as Lazy;

use bytes::{Bytes, BytesMut};
use const_addrs::ip4;
use holo_bgp_codec::packet::Encodable;
use holo_bgp_codec::packet::attribute::{
    AsPath, AsPathSegment, PathAttr, UnknownAttr,
};
use holo_bgp_codec::packet::consts::{
    AsPathSegmentType, AttrFlags, ErrorCode, Origin, UpdateMessageErrorSubcode,
};
use holo_bgp_codec::packet::error::{DecodeError, NotificationMsg};
use holo_bgp_codec::packet::mp_nlri::MpUnreachNlri;

use super::{
    test_decode_attr, test_decode_attr_err, test_encode_attr,
    test_truncated_attr, test_truncated_value,
};

static ORIGIN1: Lazy<(Vec<u8>, PathAttr)> =
    Lazy::new(|| (vec![0x40, 0x01, 0x01, 0x00], PathAttr::Origin(Origin::Igp)));

static AS_PATH1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![0x40, 0x02, 0x06, 0x02, 0x02, 0x00, 0x64, 0x00, 0xc8],
        PathAttr::AsPath(AsPath {
            segments: vec![AsPathSegment::new(
                AsPathSegmentType::Sequence,
                vec![100, 200],
            )],
        }),
    )
});

static AS_PATH2: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0x40, 0x02, 0x0a, 0x02, 0x01, 0x00, 0x64, 0x01, 0x02, 0x01, 0x2c,
            0x01, 0x90,
        ],
        PathAttr::AsPath(AsPath {
            segments: vec![
                AsPathSegment::new(AsPathSegmentType::Sequence, vec![100]),
                AsPathSegment::new(AsPathSegmentType::Set, vec![300, 400]),
            ],
        }),
    )
});

static AS4_PATH1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0xc0, 0x11, 0x0a, 0x02, 0x02, 0x00, 0x01, 0x00, 0x0e, 0x00, 0x00,
            0x00, 0xc8,
        ],
        PathAttr::As4Path(AsPath::from_sequence([65550, 200])),
    )
});

static NEXTHOP1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![0x40, 0x03, 0x04, 0x0a, 0x00, 0x00, 0x01],
        PathAttr::Nexthop(ip4!("10.0.0.1")),
    )
});

static MED1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![0x80, 0x04, 0x04, 0x00, 0x00, 0x00, 0x0a],
        PathAttr::Med(10),
    )
});

static LOCAL_PREF1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![0x40, 0x05, 0x04, 0x00, 0x00, 0x00, 0x64],
        PathAttr::LocalPref(100),
    )
});

static UNKNOWN1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![0xe0, 0x63, 0x02, 0xab, 0xcd],
        PathAttr::Unknown(UnknownAttr::new(
            0x63,
            AttrFlags::OPTIONAL | AttrFlags::TRANSITIVE | AttrFlags::PARTIAL,
            Bytes::from_static(&[0xab, 0xcd]),
        )),
    )
});

#[test]
fn test_encode_origin1() {
    let (ref bytes, ref attr) = *ORIGIN1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_origin1() {
    let (ref bytes, ref attr) = *ORIGIN1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
    test_truncated_value(bytes);
}

#[test]
fn test_decode_origin_invalid() {
    let error = test_decode_attr_err(&[0x40, 0x01, 0x01, 0x03]);
    assert_eq!(error.attr_type, Some(1));
    assert_eq!(error.error, DecodeError::InvalidOrigin(3));
    assert_eq!(&error.data[..], &[0x40, 0x01, 0x01, 0x03]);
}

#[test]
fn test_decode_origin_extended_length() {
    // The width of the length field is selected by the flags alone.
    let (ref bytes, ref attr) = *ORIGIN1;
    test_decode_attr(&[0x50, 0x01, 0x00, 0x01, 0x00], attr);

    // Re-encoding uses the short form.
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_flags_discrepancy() {
    // ORIGIN rejects only the Optional + Partial combination.
    let (_, ref attr) = *ORIGIN1;
    test_decode_attr(&[0x60, 0x01, 0x01, 0x00], attr);
    let error = test_decode_attr_err(&[0xa0, 0x01, 0x01, 0x00]);
    assert_eq!(error.error, DecodeError::AttributeFlags(0xa0));

    // AS_PATH rejects the Transitive + Partial combination.
    let error = test_decode_attr_err(&[
        0x60, 0x02, 0x06, 0x02, 0x02, 0x00, 0x64, 0x00, 0xc8,
    ]);
    assert_eq!(error.attr_type, Some(2));
    assert_eq!(error.error, DecodeError::AttributeFlags(0x60));
}

#[test]
fn test_encode_as_path1() {
    let (ref bytes, ref attr) = *AS_PATH1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_as_path1() {
    let (ref bytes, ref attr) = *AS_PATH1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);

    let as_path = attr.as_as_path().unwrap();
    assert_eq!(as_path.sequence().collect::<Vec<_>>(), vec![100, 200]);
    assert_eq!(as_path.set().count(), 0);
}

#[test]
fn test_encode_as_path2() {
    let (ref bytes, ref attr) = *AS_PATH2;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_as_path2() {
    let (ref bytes, ref attr) = *AS_PATH2;
    test_decode_attr(bytes, attr);

    let as_path = attr.as_as_path().unwrap();
    assert_eq!(as_path.sequence().collect::<Vec<_>>(), vec![100]);
    assert_eq!(as_path.set().collect::<Vec<_>>(), vec![300, 400]);
}

#[test]
fn test_decode_as_path_unknown_segment() {
    let (_, ref attr) = *AS_PATH1;
    test_decode_attr(
        &[
            0x40, 0x02, 0x0a, 0x05, 0x01, 0x00, 0x01, 0x02, 0x02, 0x00, 0x64,
            0x00, 0xc8,
        ],
        attr,
    );
}

#[test]
fn test_decode_as_path_overrun() {
    let error =
        test_decode_attr_err(&[0x40, 0x02, 0x04, 0x02, 0x02, 0x00, 0x64]);
    assert_eq!(error.error, DecodeError::MalformedAsPath);

    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg.error_subcode,
        UpdateMessageErrorSubcode::MalformedAsPath as u8
    );
}

#[test]
fn test_as_path_long_sequence() {
    // 300 ASNs are split into two segments, and the resulting value no
    // longer fits in a one-octet length.
    let attr = PathAttr::AsPath(AsPath::from_sequence(1..=300));
    assert_eq!(attr.as_as_path().unwrap().segments.len(), 2);

    let mut buf = BytesMut::new();
    let len = attr.encode(&mut buf);
    assert_eq!(len, 4 + 2 + 255 * 2 + 2 + 45 * 2);
    assert_eq!(&buf[..4], &[0x50, 0x02, 0x02, 0x5c]);
    assert_eq!(&buf[4..6], &[0x02, 0xff]);
    assert_eq!(&buf[516..518], &[0x02, 0x2d]);

    test_decode_attr(&buf, &attr);
}

#[test]
fn test_encode_as4_path1() {
    let (ref bytes, ref attr) = *AS4_PATH1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_as4_path1() {
    let (ref bytes, ref attr) = *AS4_PATH1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_encode_nexthop1() {
    let (ref bytes, ref attr) = *NEXTHOP1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_nexthop1() {
    let (ref bytes, ref attr) = *NEXTHOP1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
    test_truncated_value(bytes);
}

#[test]
fn test_decode_nexthop_multicast() {
    let error =
        test_decode_attr_err(&[0x40, 0x03, 0x04, 0xe0, 0x00, 0x00, 0x05]);
    assert_eq!(error.error, DecodeError::InvalidNexthop(ip4!("224.0.0.5")));

    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg.error_subcode,
        UpdateMessageErrorSubcode::InvalidNexthopAttribute as u8
    );
}

#[test]
fn test_encode_med1() {
    let (ref bytes, ref attr) = *MED1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_med1() {
    let (ref bytes, ref attr) = *MED1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
    test_truncated_value(bytes);
}

#[test]
fn test_decode_med_bad_length() {
    let bytes = [0x80, 0x04, 0x05, 0x00, 0x00, 0x00, 0x00, 0x0a];
    let error = test_decode_attr_err(&bytes);
    assert_eq!(error.attr_type, Some(4));
    assert_eq!(error.error, DecodeError::AttributeLength(5));

    // The whole attribute is echoed back to the peer.
    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg,
        NotificationMsg {
            error_code: ErrorCode::UpdateMessageError as u8,
            error_subcode: UpdateMessageErrorSubcode::AttributeLengthError
                as u8,
            data: bytes.to_vec(),
        }
    );
}

#[test]
fn test_encode_local_pref1() {
    let (ref bytes, ref attr) = *LOCAL_PREF1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_local_pref1() {
    let (ref bytes, ref attr) = *LOCAL_PREF1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
    test_truncated_value(bytes);
}

#[test]
fn test_decode_length_overrun() {
    // Declared length exceeds the available data.
    let error = test_decode_attr_err(&[0x40, 0x05, 0x04, 0x00, 0x00]);
    assert_eq!(error.attr_type, Some(5));
    assert_eq!(error.error, DecodeError::AttributeLength(4));

    // Truncated header.
    let error = test_decode_attr_err(&[0x40]);
    assert_eq!(error.attr_type, None);
    assert_eq!(error.error, DecodeError::MalformedAttribute);
}

#[test]
fn test_decode_unknown_well_known() {
    let error = test_decode_attr_err(&[0x40, 0x63, 0x01, 0x00]);
    assert_eq!(error.error, DecodeError::UnrecognizedWellKnownAttribute(0x63));

    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg.error_subcode,
        UpdateMessageErrorSubcode::UnrecognizedWellKnownAttribute as u8
    );
}

#[test]
fn test_decode_unknown_non_transitive() {
    let mut buf = Bytes::from_static(&[0x80, 0x63, 0x01, 0x00]);
    assert_eq!(PathAttr::decode(&mut buf), Ok(None));
    assert!(buf.is_empty());
}

#[test]
fn test_encode_unknown1() {
    let (ref bytes, ref attr) = *UNKNOWN1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_unknown1() {
    // The Partial bit is set when the attribute is retained.
    let (_, ref attr) = *UNKNOWN1;
    test_decode_attr(&[0xc0, 0x63, 0x02, 0xab, 0xcd], attr);
    test_decode_attr(&[0xd0, 0x63, 0x00, 0x02, 0xab, 0xcd], attr);
}

#[test]
fn test_unknown_attr_set() {
    // Retained unknown attributes are keyed by type, flags and value.
    let (_, ref attr) = *UNKNOWN1;
    let unknown = attr.as_unknown().unwrap();
    let mut set = HashSet::new();
    assert!(set.insert(unknown.clone()));
    assert!(!set.insert(unknown.clone()));

    let mut other = unknown.clone();
    other.flags.remove(AttrFlags::PARTIAL);
    assert!(set.insert(other));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_decode_list_duplicate() {
    let (_, ref origin) = *ORIGIN1;
    let (_, ref med) = *MED1;

    // Repeated attributes other than MP_REACH/MP_UNREACH are discarded.
    let mut buf = Bytes::from_static(&[
        0x40, 0x01, 0x01, 0x00, 0x80, 0x04, 0x04, 0x00, 0x00, 0x00, 0x0a,
        0x40, 0x01, 0x01, 0x02,
    ]);
    let attrs = PathAttr::decode_list(&mut buf).unwrap();
    assert_eq!(attrs, vec![origin.clone(), med.clone()]);
}

#[test]
fn test_decode_list_duplicate_mp_unreach() {
    let mut buf = Bytes::from_static(&[
        0x80, 0x0f, 0x03, 0x00, 0x01, 0x85, 0x80, 0x0f, 0x03, 0x00, 0x01,
        0x85,
    ]);
    let error = PathAttr::decode_list(&mut buf).unwrap_err();
    assert_eq!(error.attr_type, Some(15));
    assert_eq!(error.error, DecodeError::MalformedAttributeList);
    assert_eq!(&error.data[..], &[0x80, 0x0f, 0x03, 0x00, 0x01, 0x85]);
}

#[test]
fn test_decode_list_skip_unknown() {
    let (_, ref origin) = *ORIGIN1;
    let mut buf = Bytes::from_static(&[
        0x80, 0x63, 0x01, 0x00, 0x40, 0x01, 0x01, 0x00,
    ]);
    let attrs = PathAttr::decode_list(&mut buf).unwrap();
    assert_eq!(attrs, vec![origin.clone()]);
}

#[test]
fn test_encode_list() {
    let (ref origin_bytes, ref origin) = *ORIGIN1;
    let (ref med_bytes, ref med) = *MED1;
    let unreach =
        PathAttr::MpUnreach(MpUnreachNlri::flowspec(None, Default::default()));

    // Attributes are written in ascending type order.
    let attrs = vec![unreach, med.clone(), origin.clone()];
    let mut bytes_expected = vec![];
    bytes_expected.extend_from_slice(origin_bytes);
    bytes_expected.extend_from_slice(med_bytes);
    bytes_expected.extend_from_slice(&[0x80, 0x0f, 0x03, 0x00, 0x01, 0x85]);

    let mut buf = BytesMut::new();
    let len = PathAttr::encode_list(&attrs, &mut buf);
    assert_eq!(len, bytes_expected.len());
    assert_eq!(&buf[..], &bytes_expected[..]);
    assert_eq!(PathAttr::encode_list_bytes(&attrs), bytes_expected);

    let mut buf = buf.freeze();
    let attrs_decoded = PathAttr::decode_list(&mut buf).unwrap();
    assert_eq!(attrs_decoded.len(), 3);
    assert_eq!(attrs_decoded[0], *origin);
}
