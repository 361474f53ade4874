#![no_main]

use bytes::{BufMut, Bytes, BytesMut};
use holo_bgp_codec::packet::consts::FlowSpecType;
use holo_bgp_codec::packet::flowspec::FlowSpecComponent;
use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(comp_type) = FlowSpecType::arbitrary(&mut u) {
        let mut buf = BytesMut::new();
        buf.put_u8(comp_type as u8);
        buf.put_slice(u.take_rest());
        let mut buf = Bytes::from(buf);
        let _ = FlowSpecComponent::decode(&mut buf);
    }
});
