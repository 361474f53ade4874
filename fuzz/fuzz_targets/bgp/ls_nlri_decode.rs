#![no_main]

use bytes::{BufMut, Bytes, BytesMut};
use holo_bgp_codec::packet::bgpls::LinkStateNlri;
use holo_bgp_codec::packet::consts::LsNlriType;
use libfuzzer_sys::arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    if let Ok(nlri_type) = LsNlriType::arbitrary(&mut u)
        && let Ok(vpn) = bool::arbitrary(&mut u)
    {
        let value = u.take_rest();
        let mut buf = BytesMut::new();
        buf.put_u16(nlri_type as u16);
        buf.put_u16(value.len().min(u16::MAX as usize) as u16);
        buf.put_slice(value);
        let mut buf = Bytes::from(buf);
        let _ = LinkStateNlri::decode(&mut buf, vpn);
    }
});
