//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock as Lazy;

use bytes::{Bytes, BytesMut};
use const_addrs::net4;
use holo_bgp_codec::packet::Encodable;
use holo_bgp_codec::packet::consts::{FlowSpecType, OpFlags};
use holo_bgp_codec::packet::error::DecodeError;
use holo_bgp_codec::packet::flowspec::{
    FlowSpecComponent, OperatorValue, ValueWidth,
};
use holo_utils::assert_eq_hex;

// Operator bytes (without the end-of-list bit) and values of a port chain.
const PORT_CHAIN: [(u8, &[u8]); 5] = [
    (0x03, &[0x06]),
    (0x54, &[0x03, 0xe8]),
    (0x21, &[0x00, 0x01, 0x11, 0x70]),
    (0x01, &[0x50]),
    (0x55, &[0x1f, 0x90]),
];

static DST_PORT1: Lazy<(Vec<u8>, FlowSpecComponent)> = Lazy::new(|| {
    (
        vec![0x05, 0x81, 0x50],
        FlowSpecComponent::DestinationPort(vec![OperatorValue {
            op: OpFlags::EQ,
            width: ValueWidth::One,
            value: 80,
        }]),
    )
});

static DST_PREFIX1: Lazy<(Vec<u8>, FlowSpecComponent)> = Lazy::new(|| {
    (
        vec![0x01, 0x08, 0x0a],
        FlowSpecComponent::DestinationPrefix(net4!("10.0.0.0/8")),
    )
});

static SRC_PREFIX1: Lazy<(Vec<u8>, FlowSpecComponent)> = Lazy::new(|| {
    (
        vec![0x02, 0x00],
        FlowSpecComponent::SourcePrefix(net4!("0.0.0.0/0")),
    )
});

//
// Helper functions.
//

fn test_encode_comp(bytes_expected: &[u8], comp: &FlowSpecComponent) {
    let mut buf = BytesMut::new();
    let len = comp.encode(&mut buf);
    assert_eq!(len, buf.len());
    assert_eq_hex!(bytes_expected, &buf[..]);
}

fn test_decode_comp(bytes: &[u8], comp_expected: &FlowSpecComponent) {
    let mut buf = Bytes::copy_from_slice(bytes);
    let comp_actual = FlowSpecComponent::decode(&mut buf).unwrap();
    assert_eq!(*comp_expected, comp_actual);
    assert!(buf.is_empty());
}

fn decode_comp_err(bytes: &[u8]) -> DecodeError {
    let mut buf = Bytes::copy_from_slice(bytes);
    FlowSpecComponent::decode(&mut buf).unwrap_err()
}

fn port_chain_bytes(n: usize) -> Vec<u8> {
    let mut bytes = vec![FlowSpecType::Port as u8];
    for (idx, (op, value)) in PORT_CHAIN.iter().take(n).enumerate() {
        let end_of_list = if idx == n - 1 { 0x80 } else { 0x00 };
        bytes.push(op | end_of_list);
        bytes.extend_from_slice(value);
    }
    bytes
}

//
// Tests.
//

#[test]
fn test_encode_dst_port1() {
    let (ref bytes, ref comp) = *DST_PORT1;
    test_encode_comp(bytes, comp);
}

#[test]
fn test_decode_dst_port1() {
    let (ref bytes, ref comp) = *DST_PORT1;
    test_decode_comp(bytes, comp);
}

#[test]
fn test_encode_dst_prefix1() {
    let (ref bytes, ref comp) = *DST_PREFIX1;
    test_encode_comp(bytes, comp);
}

#[test]
fn test_decode_dst_prefix1() {
    let (ref bytes, ref comp) = *DST_PREFIX1;
    test_decode_comp(bytes, comp);
}

#[test]
fn test_encode_src_prefix1() {
    let (ref bytes, ref comp) = *SRC_PREFIX1;
    test_encode_comp(bytes, comp);
}

#[test]
fn test_decode_src_prefix1() {
    let (ref bytes, ref comp) = *SRC_PREFIX1;
    test_decode_comp(bytes, comp);
}

#[test]
fn test_port_chain() {
    for n in [1, 2, 5] {
        let bytes = port_chain_bytes(n);

        let mut buf = Bytes::copy_from_slice(&bytes);
        let comp = FlowSpecComponent::decode(&mut buf).unwrap();
        assert!(buf.is_empty());
        assert_eq!(comp.comp_type(), FlowSpecType::Port);

        let ops = comp.ops().unwrap();
        assert_eq!(ops.len(), n);
        assert_eq!(ops[0].op, OpFlags::GT | OpFlags::EQ);
        assert_eq!(ops[0].value, 6);
        if n >= 2 {
            assert_eq!(ops[1].op, OpFlags::AND | OpFlags::LT);
            assert_eq!(ops[1].width, ValueWidth::Two);
            assert_eq!(ops[1].value, 1000);
        }
        if n >= 5 {
            assert_eq!(ops[2].width, ValueWidth::Four);
            assert_eq!(ops[2].value, 70000);
            assert_eq!(ops[4].value, 8080);
        }

        // Widths are preserved, so the re-encoded bytes are identical.
        test_encode_comp(&bytes, &comp);
    }
}

#[test]
fn test_operator_value_width() {
    let pair = OperatorValue::new(OpFlags::EQ, 443);
    assert_eq!(pair.width, ValueWidth::Two);

    let pair = OperatorValue::with_width(OpFlags::EQ, ValueWidth::One, 443);
    assert_eq!(pair.value, 443 & 0xff);

    // A small value can still be carried in a wider field.
    let pair = OperatorValue::with_width(OpFlags::EQ, ValueWidth::Four, 80);
    let comp = FlowSpecComponent::with_ops(FlowSpecType::Dscp, vec![pair])
        .unwrap();
    test_encode_comp(&[0x0b, 0xa1, 0x00, 0x00, 0x00, 0x50], &comp);
}

#[test]
fn test_with_ops() {
    assert!(FlowSpecComponent::with_ops(FlowSpecType::Port, vec![]).is_none());
    assert!(
        FlowSpecComponent::with_ops(
            FlowSpecType::DestinationPrefix,
            vec![OperatorValue::new(OpFlags::EQ, 1)],
        )
        .is_none()
    );

    // Empty operator lists are never written.
    let comp = FlowSpecComponent::TcpFlags(vec![]);
    test_encode_comp(&[], &comp);
}

#[test]
fn test_decode_invalid_operator() {
    assert_eq!(
        decode_comp_err(&[0x04, 0xb1, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        DecodeError::InvalidFlowSpecOperator(0xb1)
    );
}

#[test]
fn test_decode_unknown_component() {
    assert_eq!(
        decode_comp_err(&[0x0d, 0x81, 0x01]),
        DecodeError::UnsupportedFlowSpecComponent(13)
    );
}

#[test]
fn test_decode_truncated() {
    // Two-octet value with a single octet available.
    assert_eq!(
        decode_comp_err(&[0x04, 0x91, 0x1f]),
        DecodeError::MalformedAttribute
    );

    // Operator list without the end-of-list bit.
    assert_eq!(
        decode_comp_err(&[0x04, 0x01, 0x50]),
        DecodeError::MalformedAttribute
    );

    // Every strict prefix of a valid chain is rejected.
    let bytes = port_chain_bytes(5);
    for len in 0..bytes.len() {
        let mut buf = Bytes::copy_from_slice(&bytes[..len]);
        assert!(FlowSpecComponent::decode(&mut buf).is_err());
    }
}

#[test]
fn test_decode_bad_prefix() {
    assert_eq!(
        decode_comp_err(&[0x01, 0x21, 0x0a, 0x00, 0x00, 0x00, 0x00]),
        DecodeError::MalformedAttribute
    );
}

#[test]
fn test_operator_reserved_bit() {
    // The reserved 0x08 bit is kept, so the re-encoded bytes are identical.
    let bytes = [0x05, 0x89, 0x50];
    let mut buf = Bytes::copy_from_slice(&bytes);
    let comp = FlowSpecComponent::decode(&mut buf).unwrap();
    let ops = comp.ops().unwrap();
    assert!(ops[0].op.contains(OpFlags::EQ));
    assert_eq!(ops[0].op.bits(), 0x09);
    test_encode_comp(&bytes, &comp);
}

#[test]
fn test_prefix_host_bits() {
    let comp = FlowSpecComponent::destination_prefix(net4!("10.0.0.1/8"));
    assert_eq!(comp, FlowSpecComponent::DestinationPrefix(net4!("10.0.0.0/8")));
    test_encode_comp(&[0x01, 0x08, 0x0a], &comp);
    test_decode_comp(&[0x01, 0x08, 0x0a], &comp);

    // Host bits of a raw prefix never reach the wire.
    let comp = FlowSpecComponent::SourcePrefix(net4!("10.1.255.1/17"));
    test_encode_comp(&[0x02, 0x11, 0x0a, 0x01, 0x80], &comp);
    test_decode_comp(
        &[0x02, 0x11, 0x0a, 0x01, 0x80],
        &FlowSpecComponent::source_prefix(net4!("10.1.128.0/17")),
    );
}
