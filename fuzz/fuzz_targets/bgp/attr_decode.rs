#![no_main]

use bytes::{BufMut, Bytes, BytesMut};
use holo_bgp_codec::packet::attribute::PathAttr;
use holo_bgp_codec::packet::consts::AttrType;
use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(attr_type) = AttrType::arbitrary(&mut u)
        && let Ok(flags) = u8::arbitrary(&mut u)
    {
        let value = u.take_rest();
        let mut buf = BytesMut::new();
        buf.put_u8(flags & 0xef);
        buf.put_u8(attr_type as u8);
        buf.put_u8(value.len().min(u8::MAX as usize) as u8);
        buf.put_slice(value);
        let mut buf = Bytes::from(buf);
        let _ = PathAttr::decode(&mut buf);
    }
});
