#![no_main]

use bytes::{Bytes, BytesMut};
use holo_bgp_codec::packet::attribute::PathAttr;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = Bytes::copy_from_slice(data);
    if let Ok(attrs) = PathAttr::decode_list(&mut buf) {
        let mut buf = BytesMut::new();
        PathAttr::encode_list(&attrs, &mut buf);
    }
});
