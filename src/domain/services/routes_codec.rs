//! Binary decoding of the on-chain routing table
//!
//! The routing table lives in a dynamic field named `b"routes"`. Its object
//! bytes are the canonical binary encoding of
//! `Field { id: UID, name: vector<u8>, value: Routes { route_list: VecMap<String, String> } }`:
//! fixed 32-byte id, ULEB128-length-prefixed byte vectors and strings.

use thiserror::Error;

use crate::domain::entities::Route;

/// Name of the dynamic field that holds the routing table.
pub const ROUTES_FIELD_NAME: &[u8] = b"routes";

const UID_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutesDecodeError {
    #[error("routing table ended early at byte {0}")]
    UnexpectedEof(usize),

    #[error("length prefix at byte {0} does not fit in 32 bits")]
    LengthOverflow(usize),

    #[error("route string at byte {0} is not valid utf-8")]
    InvalidUtf8(usize),

    #[error("dynamic field name is {0:?}, expected \"routes\"")]
    UnexpectedName(String),

    #[error("{0} trailing bytes after routing table")]
    TrailingBytes(usize),
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], RoutesDecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(RoutesDecodeError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn uleb128(&mut self) -> Result<usize, RoutesDecodeError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.take(1)?[0];
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(RoutesDecodeError::LengthOverflow(start));
            }
        }
        u32::try_from(value)
            .map(|v| v as usize)
            .map_err(|_| RoutesDecodeError::LengthOverflow(start))
    }

    fn bytes_vec(&mut self) -> Result<&'a [u8], RoutesDecodeError> {
        let len = self.uleb128()?;
        self.take(len)
    }

    fn string(&mut self) -> Result<String, RoutesDecodeError> {
        let start = self.pos;
        let raw = self.bytes_vec()?;
        String::from_utf8(raw.to_vec()).map_err(|_| RoutesDecodeError::InvalidUtf8(start))
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

/// Decode the full dynamic-field object bytes.
pub fn decode_routes_field(bytes: &[u8]) -> Result<Vec<Route>, RoutesDecodeError> {
    let mut reader = Reader::new(bytes);
    reader.take(UID_LENGTH)?;
    let name = reader.bytes_vec()?;
    if name != ROUTES_FIELD_NAME {
        return Err(RoutesDecodeError::UnexpectedName(
            String::from_utf8_lossy(name).into_owned(),
        ));
    }
    let routes = read_route_list(&mut reader)?;
    finish(&reader)?;
    Ok(routes)
}

/// Decode just the `Routes` value.
pub fn decode_route_list(bytes: &[u8]) -> Result<Vec<Route>, RoutesDecodeError> {
    let mut reader = Reader::new(bytes);
    let routes = read_route_list(&mut reader)?;
    finish(&reader)?;
    Ok(routes)
}

fn read_route_list(reader: &mut Reader<'_>) -> Result<Vec<Route>, RoutesDecodeError> {
    let count = reader.uleb128()?;
    let mut routes = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let route = reader.string()?;
        let target = reader.string()?;
        routes.push(Route::new(route, target));
    }
    Ok(routes)
}

fn finish(reader: &Reader<'_>) -> Result<(), RoutesDecodeError> {
    match reader.remaining() {
        0 => Ok(()),
        n => Err(RoutesDecodeError::TrailingBytes(n)),
    }
}

/// Encode a route list the way the contract stores it.
pub fn encode_route_list(routes: &[Route]) -> Vec<u8> {
    let mut out = Vec::new();
    write_uleb128(&mut out, routes.len());
    for route in routes {
        write_bytes(&mut out, route.route.as_bytes());
        write_bytes(&mut out, route.target.as_bytes());
    }
    out
}

/// Encode the whole dynamic-field object around a route list.
pub fn encode_routes_field(uid: [u8; UID_LENGTH], routes: &[Route]) -> Vec<u8> {
    let mut out = uid.to_vec();
    write_bytes(&mut out, ROUTES_FIELD_NAME);
    out.extend(encode_route_list(routes));
    out
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_uleb128(out, bytes.len());
    out.extend_from_slice(bytes);
}

fn write_uleb128(out: &mut Vec<u8>, mut value: usize) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
}
