use serde::{Deserialize, Serialize};

use crate::feedback::WireError;
use crate::util::{pad_field, strip_field};
use crate::{Address, Cost};

/// Width of the destination field of a packet header.
pub const DST_FIELD: usize = 5;
/// Width of the kind tag.
pub const KIND_FIELD: usize = 1;
/// Minimum length of a decodable frame.
pub const MIN_FRAME: usize = DST_FIELD + KIND_FIELD;
/// Width of the advertiser name field of a routing update payload.
pub const NAME_FIELD: usize = 5;

/// Sentinel destination for control packets. Control traffic is always
/// consumed locally by the receiving router, so this address is never looked
/// up by the forwarding path.
pub const BROADCAST: &str = "0";

/// Upper-layer protocol of a packet, one tag byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketKind {
    Data,
    Control,
}

impl PacketKind {
    pub const fn tag(self) -> char {
        match self {
            Self::Data => '1',
            Self::Control => '2',
        }
    }

    pub fn from_tag(tag: char) -> Result<Self, WireError> {
        match tag {
            '1' => Ok(Self::Data),
            '2' => Ok(Self::Control),
            other => Err(WireError::UnknownKind(other)),
        }
    }
}

/// A network-layer packet.
///
/// Wire layout: `<dst, 5 bytes, left-padded><kind, 1 byte><payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub dst: Address,
    pub kind: PacketKind,
    pub payload: String,
}

impl Packet {
    pub fn data(dst: impl Into<Address>, payload: impl Into<String>) -> Self {
        Self {
            dst: dst.into(),
            kind: PacketKind::Data,
            payload: payload.into(),
        }
    }

    pub fn control(payload: impl Into<String>) -> Self {
        Self {
            dst: BROADCAST.to_string(),
            kind: PacketKind::Control,
            payload: payload.into(),
        }
    }

    pub fn encode(&self) -> Result<String, WireError> {
        let mut frame = pad_field(&self.dst, DST_FIELD).ok_or_else(|| WireError::FieldOverflow {
            field: self.dst.clone(),
            width: DST_FIELD,
        })?;
        frame.push(self.kind.tag());
        frame.push_str(&self.payload);
        Ok(frame)
    }

    pub fn decode(frame: &str) -> Result<Self, WireError> {
        if frame.len() < MIN_FRAME {
            return Err(WireError::Truncated {
                len: frame.len(),
                min: MIN_FRAME,
            });
        }
        let header = frame.get(..MIN_FRAME).ok_or(WireError::BadHeader)?;
        if !header.is_ascii() {
            return Err(WireError::BadHeader);
        }
        let kind = PacketKind::from_tag(header.as_bytes()[DST_FIELD] as char)?;
        Ok(Self {
            dst: strip_field(&header[..DST_FIELD]).to_string(),
            kind,
            payload: frame[MIN_FRAME..].to_string(),
        })
    }
}

/// One advertised route: the advertiser's believed best path to
/// `destination` goes through `via` at `cost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTriple {
    pub destination: Address,
    pub via: Address,
    pub cost: Cost,
}

/// The payload of a control packet: the advertiser's full routing table.
///
/// Wire layout: `<advertiser, 5 bytes, left-padded>` followed by one
/// `(destination, via, cost)` group per route. Decoding extracts every
/// parenthesised group independently and assumes nothing about separators
/// between groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub advertiser: Address,
    pub routes: Vec<RouteTriple>,
}

impl Advertisement {
    pub fn encode(&self) -> Result<String, WireError> {
        let mut out =
            pad_field(&self.advertiser, NAME_FIELD).ok_or_else(|| WireError::FieldOverflow {
                field: self.advertiser.clone(),
                width: NAME_FIELD,
            })?;
        for route in &self.routes {
            out.push_str(&format!(
                "({}, {}, {})",
                route.destination, route.via, route.cost
            ));
        }
        Ok(out)
    }

    pub fn decode(payload: &str) -> Result<Self, WireError> {
        let name = payload.get(..NAME_FIELD).ok_or(WireError::Truncated {
            len: payload.len(),
            min: NAME_FIELD,
        })?;
        if !name.is_ascii() {
            return Err(WireError::BadHeader);
        }
        let mut routes = Vec::new();
        let rest = &payload[NAME_FIELD..];
        let mut group_start = None;
        for (pos, ch) in rest.char_indices() {
            match ch {
                '(' => group_start = Some(pos + 1),
                ')' => {
                    if let Some(start) = group_start.take() {
                        routes.push(parse_triple(&rest[start..pos])?);
                    }
                }
                _ => {}
            }
        }
        Ok(Self {
            advertiser: strip_field(name).to_string(),
            routes,
        })
    }
}

fn parse_triple(group: &str) -> Result<RouteTriple, WireError> {
    let fields: Vec<&str> = group.split(',').map(|f| f.trim().trim_matches('\'')).collect();
    let [destination, via, cost] = fields.as_slice() else {
        return Err(WireError::MalformedTriple(group.to_string()));
    };
    let cost: Cost = cost
        .parse()
        .map_err(|_| WireError::BadCost(cost.to_string()))?;
    Ok(RouteTriple {
        destination: destination.to_string(),
        via: via.to_string(),
        cost,
    })
}
