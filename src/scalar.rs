//! Wire scalar codecs.
//!
//! The provider's JSON diverges from the semantic types in four places:
//! booleans travel as `0`/`1`, instants as Unix-second integers, calendar
//! dates as `YYYY-MM-DD` strings, and network addresses as IP literals.
//! Each codec here is a newtype with manual serde impls that decodes the
//! wire shape strictly (malformed input is a decode error, never a silent
//! zero value) and re-encodes the canonical form.

use std::fmt;
use std::net;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A boolean transported as JSON `0`/`1`.
///
/// Decoding also accepts plain `true`/`false` for forward compatibility;
/// encoding always emits the canonical integer form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntBool(pub bool);

impl From<bool> for IntBool {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<IntBool> for bool {
    fn from(value: IntBool) -> Self {
        value.0
    }
}

impl Serialize for IntBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.0))
    }
}

struct IntBoolVisitor;

impl Visitor<'_> for IntBoolVisitor {
    type Value = IntBool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0, 1, true or false")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<IntBool, E> {
        Ok(IntBool(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<IntBool, E> {
        match v {
            0 => Ok(IntBool(false)),
            1 => Ok(IntBool(true)),
            _ => Err(E::invalid_value(Unexpected::Unsigned(v), &self)),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<IntBool, E> {
        match v {
            0 => Ok(IntBool(false)),
            1 => Ok(IntBool(true)),
            _ => Err(E::invalid_value(Unexpected::Signed(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for IntBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IntBoolVisitor)
    }
}

/// An instant transported as an integer count of Unix seconds, normalized
/// to UTC on decode. No sub-second precision is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnixTime(pub DateTime<Utc>);

impl UnixTime {
    /// Construct from a Unix second count. Returns `None` for values
    /// outside chrono's representable range.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// The Unix second count this instant encodes to.
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<DateTime<Utc>> for UnixTime {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Serialize for UnixTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0.timestamp())
    }
}

struct UnixTimeVisitor;

impl Visitor<'_> for UnixTimeVisitor {
    type Value = UnixTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer Unix timestamp in seconds")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<UnixTime, E> {
        UnixTime::from_timestamp(v)
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<UnixTime, E> {
        let secs =
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))?;
        self.visit_i64(secs)
    }
}

impl<'de> Deserialize<'de> for UnixTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_i64(UnixTimeVisitor)
    }
}

/// A calendar date transported as an exact `YYYY-MM-DD` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateOnly(pub NaiveDate);

const DATE_FORMAT: &str = "%Y-%m-%d";

impl From<NaiveDate> for DateOnly {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl fmt::Display for DateOnly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for DateOnly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DateOnlyVisitor;

impl Visitor<'_> for DateOnlyVisitor {
    type Value = DateOnly;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date string in YYYY-MM-DD form")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DateOnly, E> {
        // chrono accepts unpadded numerics; the length check pins the
        // zero-padded, four-digit-year form.
        if v.len() != 10 {
            return Err(E::invalid_value(Unexpected::Str(v), &self));
        }
        NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(DateOnly)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for DateOnly {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(DateOnlyVisitor)
    }
}

/// A network address transported as its textual form, IPv4 or IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IpAddress(pub net::IpAddr);

impl From<net::IpAddr> for IpAddress {
    fn from(value: net::IpAddr) -> Self {
        Self(value)
    }
}

impl From<net::Ipv4Addr> for IpAddress {
    fn from(value: net::Ipv4Addr) -> Self {
        Self(net::IpAddr::V4(value))
    }
}

impl From<net::Ipv6Addr> for IpAddress {
    fn from(value: net::Ipv6Addr) -> Self {
        Self(net::IpAddr::V6(value))
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for IpAddress {
    type Err = net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Serialize for IpAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct IpAddressVisitor;

impl Visitor<'_> for IpAddressVisitor {
    type Value = IpAddress;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an IPv4 or IPv6 address string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<IpAddress, E> {
        v.parse()
            .map(IpAddress)
            .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for IpAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(IpAddressVisitor)
    }
}
