//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use bytes::BytesMut;
use const_addrs::{ip, ip4, net4};
use holo_bgp_codec::packet::Encodable;
use holo_bgp_codec::packet::attribute::PathAttr;
use holo_bgp_codec::packet::bgpls::{LinkNlri, LinkStateNlri, NodeNlri};
use holo_bgp_codec::packet::consts::{
    FlowSpecType, OpFlags, ProtocolId, UpdateMessageErrorSubcode,
};
use holo_bgp_codec::packet::error::{DecodeError, NotificationMsg};
use holo_bgp_codec::packet::flowspec::{
    FlowSpecComponent, OperatorValue, ValueWidth,
};
use holo_bgp_codec::packet::mp_nlri::{MpNlri, MpReachNlri, MpUnreachNlri};
use holo_bgp_codec::packet::tlv::{
    IgpRouterId, LinkDescriptorTlv, NodeDescriptorTlv,
};
use holo_bgp_codec::packet::vpn::RouteDistinguisher;

use super::{
    test_decode_attr, test_decode_attr_err, test_encode_attr,
    test_truncated_attr,
};

static MP_REACH_LS1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0x80, 0x0e, 0x3a, 0x40, 0x04, 0x47, 0x04, 0x0a, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x01, 0x00, 0x2d, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x20, 0x02, 0x00, 0x00, 0x04,
            0x00, 0x00, 0xfd, 0xe8, 0x02, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00,
            0x00, 0x02, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03,
            0x00, 0x04, 0x0a, 0x00, 0x00, 0x01,
        ],
        PathAttr::MpReach(MpReachNlri::link_state(
            false,
            Some(ip!("10.0.0.1")),
            vec![LinkStateNlri::Node(NodeNlri::new(
                ProtocolId::Ospfv2,
                0,
                vec![
                    NodeDescriptorTlv::AsNumber(65000),
                    NodeDescriptorTlv::BgpLsIdentifier(0),
                    NodeDescriptorTlv::OspfAreaId(0),
                    NodeDescriptorTlv::IgpRouterId(
                        IgpRouterId::OspfNonPseudonode {
                            router_id: ip4!("10.0.0.1"),
                        },
                    ),
                ],
            ))],
        )),
    )
});

static MP_UNREACH_LS1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0x80, 0x0f, 0x3c, 0x40, 0x04, 0x47, 0x00, 0x02, 0x00, 0x35, 0x02,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
            0x0a, 0x02, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x01, 0x01, 0x00, 0x0a, 0x02, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x02, 0x01, 0x03, 0x00, 0x04, 0x0a, 0x00, 0x00, 0x01,
            0x01, 0x04, 0x00, 0x04, 0x0a, 0x00, 0x00, 0x02,
        ],
        PathAttr::MpUnreach(MpUnreachNlri::link_state(
            false,
            vec![LinkStateNlri::Link(LinkNlri::new(
                ProtocolId::IsisL2,
                0,
                vec![NodeDescriptorTlv::IgpRouterId(
                    IgpRouterId::IsisNonPseudonode {
                        system_id: [0, 0, 0, 0, 0, 1],
                    },
                )],
                vec![NodeDescriptorTlv::IgpRouterId(
                    IgpRouterId::IsisNonPseudonode {
                        system_id: [0, 0, 0, 0, 0, 2],
                    },
                )],
                vec![
                    LinkDescriptorTlv::Ipv4InterfaceAddr(ip4!("10.0.0.1")),
                    LinkDescriptorTlv::Ipv4NeighborAddr(ip4!("10.0.0.2")),
                ],
            ))],
        )),
    )
});

static MP_REACH_FLOWSPEC1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0x80, 0x0e, 0x0f, 0x00, 0x01, 0x85, 0x00, 0x00, 0x09, 0x01, 0x08,
            0x0a, 0x03, 0x81, 0x06, 0x05, 0x81, 0x50,
        ],
        PathAttr::MpReach(MpReachNlri::flowspec(
            None,
            None,
            vec![
                FlowSpecComponent::DestinationPrefix(net4!("10.0.0.0/8")),
                FlowSpecComponent::IpProtocol(vec![OperatorValue::new(
                    OpFlags::EQ,
                    6,
                )]),
                FlowSpecComponent::DestinationPort(vec![OperatorValue::new(
                    OpFlags::EQ,
                    80,
                )]),
            ],
        )),
    )
});

static MP_UNREACH_FLOWSPEC1: Lazy<(Vec<u8>, PathAttr)> = Lazy::new(|| {
    (
        vec![
            0x80, 0x0f, 0x14, 0x00, 0x01, 0x86, 0x00, 0x00, 0xfd, 0xe8, 0x00,
            0x00, 0x00, 0x01, 0x03, 0x04, 0x81, 0x50, 0x04, 0x04, 0x91, 0x01,
            0xbb,
        ],
        PathAttr::MpUnreach(MpUnreachNlri::flowspec(
            Some(RouteDistinguisher::As2 {
                asn: 65000,
                number: 1,
            }),
            vec![
                FlowSpecComponent::Port(vec![OperatorValue::new(
                    OpFlags::EQ,
                    80,
                )]),
                FlowSpecComponent::Port(vec![OperatorValue::new(
                    OpFlags::EQ,
                    443,
                )]),
            ],
        )),
    )
});

#[test]
fn test_encode_mp_reach_ls1() {
    let (ref bytes, ref attr) = *MP_REACH_LS1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_mp_reach_ls1() {
    let (ref bytes, ref attr) = *MP_REACH_LS1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_encode_mp_unreach_ls1() {
    let (ref bytes, ref attr) = *MP_UNREACH_LS1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_mp_unreach_ls1() {
    let (ref bytes, ref attr) = *MP_UNREACH_LS1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_encode_mp_reach_flowspec1() {
    let (ref bytes, ref attr) = *MP_REACH_FLOWSPEC1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_mp_reach_flowspec1() {
    let (ref bytes, ref attr) = *MP_REACH_FLOWSPEC1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_encode_mp_unreach_flowspec1() {
    let (ref bytes, ref attr) = *MP_UNREACH_FLOWSPEC1;
    test_encode_attr(bytes, attr);
}

#[test]
fn test_decode_mp_unreach_flowspec1() {
    let (ref bytes, ref attr) = *MP_UNREACH_FLOWSPEC1;
    test_decode_attr(bytes, attr);
    test_truncated_attr(bytes);
}

#[test]
fn test_mp_reach_extended_length() {
    // 200 NLRIs of 4 bytes each no longer fit in a one-octet length.
    let components = (0..200)
        .map(|port| {
            FlowSpecComponent::Port(vec![OperatorValue::new(OpFlags::EQ, port)])
        })
        .collect::<Vec<_>>();
    let attr =
        PathAttr::MpReach(MpReachNlri::flowspec(None, None, components));

    let mut buf = BytesMut::new();
    attr.encode(&mut buf);
    assert_eq!(&buf[..4], &[0x90, 0x0e, 0x03, 0x25]);
    test_decode_attr(&buf, &attr);
}

#[test]
fn test_decode_unsupported_family() {
    // IPv4 unicast isn't handled by this codec.
    let error = test_decode_attr_err(&[
        0x80, 0x0e, 0x09, 0x00, 0x01, 0x01, 0x04, 0x0a, 0x00, 0x00, 0x01, 0x00,
    ]);
    assert_eq!(error.attr_type, Some(14));
    assert_eq!(error.error, DecodeError::UnsupportedAddressFamily(1, 1));

    let msg = NotificationMsg::from(error);
    assert_eq!(
        msg.error_subcode,
        UpdateMessageErrorSubcode::OptionalAttributeError as u8
    );
}

#[test]
fn test_decode_mp_reach_too_short() {
    let error =
        test_decode_attr_err(&[0x80, 0x0e, 0x04, 0x40, 0x04, 0x47, 0x00]);
    assert_eq!(error.error, DecodeError::AttributeLength(4));
}

#[test]
fn test_decode_mp_reach_ipv6_nexthop() {
    let bytes = [
        0x80, 0x0e, 0x15, 0x40, 0x04, 0x47, 0x10, 0x20, 0x01, 0x0d, 0xb8, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00,
    ];
    let attr = PathAttr::MpReach(MpReachNlri::link_state(
        false,
        Some(ip!("2001:db8::1")),
        vec![],
    ));
    test_decode_attr(&bytes, &attr);
    test_encode_attr(&bytes, &attr);
}

#[test]
fn test_decode_mp_reach_vpn_flowspec() {
    let (_, ref attr) = *MP_UNREACH_FLOWSPEC1;
    let MpNlri::FlowSpec { rd, components } =
        &attr.as_mp_unreach().unwrap().nlri
    else {
        panic!("unexpected address family");
    };
    assert_eq!(rd.as_ref().unwrap().to_string(), "65000:1");
    assert_eq!(components.len(), 2);
}

#[test]
fn test_mp_reach_flowspec_nlri_split() {
    // Ten components of 501 bytes each exceed the 4095-byte NLRI limit, so
    // they're spread over two NLRIs of 8 and 2 components.
    let components = (0..10u32)
        .map(|idx| {
            let comp_type = if idx % 2 == 0 {
                FlowSpecType::Port
            } else {
                FlowSpecType::Dscp
            };
            let ops = (0..100)
                .map(|value| {
                    OperatorValue::with_width(
                        OpFlags::EQ,
                        ValueWidth::Four,
                        value,
                    )
                })
                .collect();
            FlowSpecComponent::with_ops(comp_type, ops).unwrap()
        })
        .collect::<Vec<_>>();
    let attr =
        PathAttr::MpReach(MpReachNlri::flowspec(None, None, components));

    let mut buf = BytesMut::new();
    attr.encode(&mut buf);
    assert_eq!(&buf[..4], &[0x90, 0x0e, 0x13, 0x9b]);
    assert_eq!(&buf[9..11], &[0xff, 0xa8]);
    assert_eq!(&buf[4019..4021], &[0xf3, 0xea]);
    test_decode_attr(&buf, &attr);
}

#[test]
fn test_mp_reach_flowspec_oversized_component() {
    // A component that can't fit in any NLRI is left out.
    let ops = (0..1000)
        .map(|port| {
            OperatorValue::with_width(OpFlags::EQ, ValueWidth::Four, port)
        })
        .collect::<Vec<_>>();
    let dscp = FlowSpecComponent::Dscp(vec![OperatorValue::new(
        OpFlags::EQ,
        10,
    )]);
    let attr = PathAttr::MpReach(MpReachNlri::flowspec(
        None,
        None,
        vec![FlowSpecComponent::Port(ops), dscp.clone()],
    ));

    let mut buf = BytesMut::new();
    attr.encode(&mut buf);
    test_decode_attr(
        &buf,
        &PathAttr::MpReach(MpReachNlri::flowspec(None, None, vec![dscp])),
    );
}
