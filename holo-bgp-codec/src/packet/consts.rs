//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use arbitrary::Arbitrary;
use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

// BGP Error Codes.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-3
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum ErrorCode {
    MessageHeaderError = 1,
    OpenMessageError = 2,
    UpdateMessageError = 3,
    HoldTimerExpired = 4,
    FiniteStateMachineError = 5,
    Cease = 6,
    // RFC 7313
    RouteRefreshMessageError = 7,
}

// UPDATE Message Error Subcodes.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-7
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum UpdateMessageErrorSubcode {
    Unspecific = 0,
    MalformedAttributeList = 1,
    UnrecognizedWellKnownAttribute = 2,
    MissingWellKnownAttribute = 3,
    AttributeFlagsError = 4,
    AttributeLengthError = 5,
    InvalidOriginAttribute = 6,
    InvalidNexthopAttribute = 8,
    OptionalAttributeError = 9,
    InvalidNetworkField = 10,
    MalformedAsPath = 11,
}

// Address Family Numbers.
//
// IANA registry:
// http://www.iana.org/assignments/address-family-numbers
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
    L2vpn = 25,
    // RFC 7752
    BgpLs = 16388,
}

// Subsequent Address Family Identifiers (SAFI) Parameters.
//
// IANA registry:
// https://www.iana.org/assignments/safi-namespace/safi-namespace.xhtml#safi-namespace-2
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum Safi {
    Unicast = 1,
    Multicast = 2,
    LabeledUnicast = 4,
    // RFC 7432
    Evpn = 70,
    // RFC 7752
    BgpLs = 71,
    BgpLsVpn = 72,
    // RFC 4364
    MplsVpn = 128,
    // RFC 8955
    FlowSpec = 133,
    FlowSpecVpn = 134,
}

// BGP Path Attribute Flags.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Ord, PartialOrd)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct AttrFlags: u8 {
        const OPTIONAL = 0x80;
        const TRANSITIVE = 0x40;
        const PARTIAL = 0x20;
        const EXTENDED = 0x10;
    }
}

// BGP Path Attribute Types.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
#[derive(Arbitrary)]
pub enum AttrType {
    Origin = 1,
    AsPath = 2,
    Nexthop = 3,
    Med = 4,
    LocalPref = 5,
    // RFC 4760
    MpReachNlri = 14,
    MpUnreachNlri = 15,
    // RFC 4360
    ExtCommunities = 16,
    // RFC 6793
    As4Path = 17,
    // RFC 7752
    LinkState = 29,
    // draft-ietf-idr-wide-bgp-communities
    WideCommunity = 129,
}

// BGP Origin.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum Origin {
    Igp = 0,
    Egp = 1,
    Incomplete = 2,
}

// AS_PATH Segment Types.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-19
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum AsPathSegmentType {
    Set = 1,
    Sequence = 2,
}

// BGP-LS NLRI Types.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-ls-parameters/bgp-ls-parameters.xhtml#nlri-types
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
#[derive(Arbitrary)]
pub enum LsNlriType {
    Node = 1,
    Link = 2,
    Ipv4Prefix = 3,
}

// BGP-LS Protocol-IDs.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-ls-parameters/bgp-ls-parameters.xhtml#protocol-ids
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum ProtocolId {
    IsisL1 = 1,
    IsisL2 = 2,
    Ospfv2 = 3,
    Direct = 4,
    Static = 5,
    Ospfv3 = 6,
}

// BGP-LS Node, Link and Prefix Descriptor TLVs.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-ls-parameters/bgp-ls-parameters.xhtml#node-descriptor-link-descriptor-prefix-descriptor-attribute-tlv
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum LsDescriptorType {
    LocalNode = 256,
    RemoteNode = 257,
    LinkLocalRemoteIds = 258,
    Ipv4InterfaceAddr = 259,
    Ipv4NeighborAddr = 260,
    Ipv6InterfaceAddr = 261,
    Ipv6NeighborAddr = 262,
    MultiTopologyId = 263,
    OspfRouteType = 264,
    IpReachability = 265,
    AsNumber = 512,
    BgpLsIdentifier = 513,
    OspfAreaId = 514,
    IgpRouterId = 515,
}

// BGP-LS Node, Link and Prefix Attribute TLVs.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-ls-parameters/bgp-ls-parameters.xhtml#node-descriptor-link-descriptor-prefix-descriptor-attribute-tlv
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum LsAttrType {
    MultiTopologyId = 263,
    // Node attributes.
    NodeFlagBits = 1024,
    OpaqueNode = 1025,
    NodeName = 1026,
    IsisAreaId = 1027,
    LocalRouterIdV4 = 1028,
    LocalRouterIdV6 = 1029,
    // Link attributes.
    RemoteRouterIdV4 = 1030,
    RemoteRouterIdV6 = 1031,
    AdminGroup = 1088,
    MaxLinkBandwidth = 1089,
    MaxReservableBandwidth = 1090,
    UnreservedBandwidth = 1091,
    TeDefaultMetric = 1092,
    LinkProtectionType = 1093,
    MplsProtocolMask = 1094,
    IgpMetric = 1095,
    Srlg = 1096,
    OpaqueLink = 1097,
    LinkName = 1098,
    // Prefix attributes.
    IgpFlags = 1152,
    RouteTag = 1153,
    ExtendedTag = 1154,
    PrefixMetric = 1155,
    OspfForwardingAddr = 1156,
    OpaquePrefix = 1157,
}

// OSPF Route Types.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum OspfRouteType {
    IntraArea = 1,
    InterArea = 2,
    External1 = 3,
    External2 = 4,
    Nssa1 = 5,
    Nssa2 = 6,
}

// BGP-LS Node Flag Bits.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct NodeFlags: u8 {
        const OVERLOAD = 0x80;
        const ATTACHED = 0x40;
        const EXTERNAL = 0x20;
        const ABR = 0x10;
        const ROUTER = 0x08;
        const V6 = 0x04;
    }
}

// BGP-LS MPLS Protocol Mask.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct MplsProtocolMask: u8 {
        const LDP = 0x80;
        const RSVP_TE = 0x40;
    }
}

// Link Protection Types (RFC 5307).
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LinkProtectionFlags: u8 {
        const EXTRA_TRAFFIC = 0x01;
        const UNPROTECTED = 0x02;
        const SHARED = 0x04;
        const DEDICATED_1_1 = 0x08;
        const DEDICATED_1_PLUS_1 = 0x10;
        const ENHANCED = 0x20;
    }
}

// Flow Specification Component Types.
//
// IANA registry:
// https://www.iana.org/assignments/flow-spec/flow-spec.xhtml#flow-spec-nlri-types
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
#[derive(Arbitrary)]
pub enum FlowSpecType {
    DestinationPrefix = 1,
    SourcePrefix = 2,
    IpProtocol = 3,
    Port = 4,
    DestinationPort = 5,
    SourcePort = 6,
    IcmpType = 7,
    IcmpCode = 8,
    TcpFlags = 9,
    PacketLength = 10,
    Dscp = 11,
    Fragment = 12,
}

// Flow Specification operator byte.
//
// Bitmask components (TCP flags, fragment) reuse the GT and EQ bits as NOT
// and MATCH respectively.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct OpFlags: u8 {
        const AND = 0x40;
        const LT = 0x04;
        const GT = 0x02;
        const EQ = 0x01;
        const NOT = 0x02;
        const MATCH = 0x01;
    }
}

// Flow Specification operator byte fields not exposed through `OpFlags`.
pub const FLOWSPEC_OP_END_OF_LIST: u8 = 0x80;
pub const FLOWSPEC_OP_LEN_MASK: u8 = 0x30;
pub const FLOWSPEC_OP_LEN_SHIFT: u8 = 4;

// Flow Specification NLRI length threshold for the 2-byte length encoding.
pub const FLOWSPEC_NLRI_EXT_LEN: u16 = 0xF0;

// Maximum Flow Specification NLRI length (12-bit length field).
pub const FLOWSPEC_NLRI_MAX_LEN: usize = 0x0FFF;

// Extended Community types, encoded as (type << 8 | subtype).
//
// IANA registry:
// https://www.iana.org/assignments/bgp-extended-communities/bgp-extended-communities.xhtml
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum ExtCommType {
    RouteTargetAs2 = 0x0002,
    RouteTargetIpv4 = 0x0102,
    RouteTargetAs4 = 0x0202,
    // RFC 8955
    TrafficRate = 0x8006,
    TrafficAction = 0x8007,
    Redirect = 0x8008,
    TrafficMarking = 0x8009,
}

// Flow Specification traffic-action bits.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct TrafficActionFlags: u8 {
        const TERMINAL = 0x01;
        const SAMPLE = 0x02;
        const RPD = 0x04;
    }
}

// Route Distinguisher types (RFC 4364).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum RdType {
    As2 = 0,
    Ipv4 = 1,
    As4 = 2,
}

// EVPN Ethernet Segment Identifier types (RFC 7432).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum EsiType {
    Arbitrary = 0,
    Lacp = 1,
    Bridge = 2,
    MacBased = 3,
    RouterId = 4,
    AsBased = 5,
}

// Wide Community container type.
pub const WIDE_COMMUNITY_CONTAINER_TYPE: u16 = 1;

// Wide Community sections.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum WideCommunitySectionType {
    Target = 1,
    ExcludeTarget = 2,
    Parameter = 3,
}

// Wide Community atoms.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum WideCommunityAtomType {
    Integer = 4,
    Ipv4Neighbor = 8,
}
