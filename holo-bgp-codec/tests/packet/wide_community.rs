//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use const_addrs::ip4;
use holo_bgp_codec::packet::attribute::PathAttr;
use holo_bgp_codec::packet::consts::{
    UpdateMessageErrorSubcode, WideCommunitySectionType,
};
use holo_bgp_codec::packet::error::{DecodeError, NotificationMsg};
use holo_bgp_codec::packet::wide_community::{
    Ipv4Neighbor, WideCommunityAtom, WideCommunityBuilder,
};

use super::{
    test_decode_attr, test_decode_attr_err, test_encode_attr,
    test_truncated_attr,
};

static WIDE_COMM1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0xc0, 0x81, 0x26, 0x00, 0x01, 0x00, 0x01, 0x00, 0x20, 0x80, 0x00,
            0x00, 0x01, 0x00, 0x00, 0xfd, 0xe8, 0x00, 0x00, 0xfd, 0xe8, 0x01,
            0x00, 0x07, 0x04, 0x00, 0x04, 0x00, 0x00, 0xfd, 0xe9, 0x03, 0x00,
            0x07, 0x04, 0x00, 0x04, 0x00, 0x00, 0x00, 0x64,
        ],
        PathAttr::WideCommunity(
            WideCommunityBuilder::new(0x8000_0001)
                .hop_count(1)
                .local_as(65000)
                .context_as(65000)
                .target(WideCommunityAtom::Integer(vec![65001]))
                .parameter(WideCommunityAtom::Integer(vec![100]))
                .build(),
        ),
    )
});

static WIDE_COMM2: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0xc0, 0x81, 0x20, 0x00, 0x01, 0x80, 0x00, 0x00, 0x1a, 0x00, 0x00,
            0x00, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x02,
            0x00, 0x0b, 0x08, 0x00, 0x08, 0x01, 0x01, 0x01, 0x01, 0x02, 0x02,
            0x02, 0x02,
        ],
        PathAttr::WideCommunity(
            WideCommunityBuilder::new(2)
                .flags(0x80)
                .local_as(1)
                .context_as(1)
                .exclude_target(WideCommunityAtom::Ipv4Neighbor(vec![
                    Ipv4Neighbor {
                        local: ip4!("1.1.1.1"),
                        remote: ip4!("2.2.2.2"),
                    },
                ]))
                .build(),
        ),
    )
});

static WIDE_COMM3: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0xc0, 0x81, 0x20, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1a, 0x80, 0x00,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x00, 0x0b, 0x04, 0x00, 0x08, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00,
            0x00, 0x2a,
        ],
        PathAttr::WideCommunity(
            WideCommunityBuilder::new(0x8000_0001)
                .target(WideCommunityAtom::Integer(vec![7, 42]))
                .build(),
        ),
    )
});

#[test]
fn test_encode_wide_comm1() {
    let (ref bytes, ref attr) = *WIDE_COMM1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_wide_comm1() {
    let (ref bytes, ref attr) = *WIDE_COMM1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);

    let comm = attr.as_wide_community().unwrap();
    let sections = comm
        .sections()
        .map(|(section_type, _)| section_type)
        .collect::<Vec<_>>();
    assert_eq!(
        sections,
        vec![
            WideCommunitySectionType::Target,
            WideCommunitySectionType::Parameter
        ]
    );
}

#[test]
fn test_encode_wide_comm2() {
    let (ref bytes, ref attr) = *WIDE_COMM2;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_wide_comm2() {
    let (ref bytes, ref attr) = *WIDE_COMM2;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_encode_wide_comm3() {
    let (ref bytes, ref attr) = *WIDE_COMM3;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_wide_comm3() {
    let (ref bytes, ref attr) = *WIDE_COMM3;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);

    let comm = attr.as_wide_community().unwrap();
    let target = comm.target.as_ref().unwrap();
    assert_eq!(target.atoms, vec![WideCommunityAtom::Integer(vec![7, 42])]);
    assert!(comm.exclude_target.is_none());
    assert!(comm.parameter.is_none());
}

#[test]
fn test_decode_wide_comm_bad_container() {
    let error = test_decode_attr_err(&[
        0xc0, 0x81, 0x12, 0x00, 0x02, 0x00, 0x01, 0x00, 0x0c, 0x00, 0x00,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    ]);
    assert_eq!(error.attr_type, Some(129));
    assert_eq!(error.error, DecodeError::MalformedAttribute);
}

#[test]
fn test_decode_wide_comm_container_length_ignored() {
    // The container length (13) disagrees with the 12 bytes that follow.
    test_decode_attr(
        &[
            0xc0, 0x81, 0x12, 0x00, 0x01, 0x00, 0x01, 0x00, 0x0d, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
        ],
        &PathAttr::WideCommunity(
            WideCommunityBuilder::new(1)
                .hop_count(1)
                .local_as(1)
                .context_as(1)
                .build(),
        ),
    );
}

#[test]
fn test_decode_wide_comm_truncated_fixed_fields() {
    // Value truncated inside the community, local AS and context AS fields.
    let (ref bytes, _) = *WIDE_COMM1;
    for len in 0..18 {
        let mut data = bytes[..3 + len].to_vec();
        data[2] = len as u8;
        let error = test_decode_attr_err(&data);
        assert_eq!(error.error, DecodeError::MalformedAttribute);
    }
}

#[test]
fn test_decode_wide_comm_unknown_atom() {
    let error = test_decode_attr_err(&[
        0xc0, 0x81, 0x1c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x16, 0x00, 0x00,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01,
        0x00, 0x07, 0x05, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01,
    ]);
    assert_eq!(error.error, DecodeError::UnsupportedWideCommunityAtom(5));

    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg.error_subcode,
        UpdateMessageErrorSubcode::OptionalAttributeError as u8
    );
}

#[test]
fn test_decode_wide_comm_unknown_section() {
    let error = test_decode_attr_err(&[
        0xc0, 0x81, 0x15, 0x00, 0x01, 0x00, 0x01, 0x00, 0x0f, 0x00, 0x00,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x04,
        0x00, 0x00,
    ]);
    assert_eq!(error.error, DecodeError::UnsupportedWideCommunityAtom(4));
}

#[test]
fn test_decode_wide_comm_duplicate_section() {
    let error = test_decode_attr_err(&[
        0xc0, 0x81, 0x26, 0x00, 0x01, 0x00, 0x01, 0x00, 0x20, 0x00, 0x00,
        0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01,
        0x00, 0x07, 0x04, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00,
        0x07, 0x04, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02,
    ]);
    assert_eq!(error.error, DecodeError::MalformedAttribute);
}
