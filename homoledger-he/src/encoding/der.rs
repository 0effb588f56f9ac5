//! A DER codec restricted to what keys need: one `SEQUENCE` holding non-negative `INTEGER`s.
//! Encoding is canonical, and decoding only accepts canonical input.

use homoledger_traits::{Error, Result};
use rug::integer::Order;
use rug::Integer;

const TAG_INTEGER: u8 = 0x02;
const TAG_SEQUENCE: u8 = 0x30;

fn malformed(reason: &str) -> Error {
    Error::MalformedKey(reason.to_string())
}

fn encode_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn encode_integer(value: &Integer, out: &mut Vec<u8>) {
    debug_assert!(*value >= 0);

    let mut content = value.to_digits::<u8>(Order::MsfBe);
    // Zero is a single 0x00 byte, and a set high bit would read as a negative number
    if content.first().map_or(true, |b| b & 0x80 != 0) {
        content.insert(0, 0x00);
    }

    out.push(TAG_INTEGER);
    encode_length(content.len(), out);
    out.extend_from_slice(&content);
}

/// Encodes `values` as a DER `SEQUENCE` of `INTEGER`s. All values must be non-negative.
pub fn encode_integer_sequence(values: &[&Integer]) -> Vec<u8> {
    let mut content = Vec::new();
    for value in values {
        encode_integer(value, &mut content);
    }

    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(TAG_SEQUENCE);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(&content);
    out
}

/// Decodes a DER `SEQUENCE` of non-negative `INTEGER`s. Bytes after the sequence are rejected
/// with [`Error::TrailingData`]; everything else that is not canonical DER is rejected with
/// [`Error::MalformedKey`].
pub fn decode_integer_sequence(bytes: &[u8]) -> Result<Vec<Integer>> {
    let mut reader = DerReader { input: bytes };
    let content = reader.read_element(TAG_SEQUENCE)?;
    if !reader.is_empty() {
        return Err(Error::TrailingData);
    }

    let mut elements = DerReader { input: content };
    let mut values = Vec::new();
    while !elements.is_empty() {
        values.push(decode_integer(elements.read_element(TAG_INTEGER)?)?);
    }

    Ok(values)
}

fn decode_integer(content: &[u8]) -> Result<Integer> {
    match content {
        [] => Err(malformed("empty integer")),
        [first, ..] if first & 0x80 != 0 => Err(malformed("negative integer")),
        [0x00, second, ..] if second & 0x80 == 0 => Err(malformed("integer is not minimally encoded")),
        _ => Ok(Integer::from_digits(content, Order::MsfBe)),
    }
}

struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn read_byte(&mut self) -> Result<u8> {
        let (first, rest) = self.input.split_first().ok_or_else(|| malformed("truncated"))?;
        self.input = rest;
        Ok(*first)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.input.len() {
            return Err(malformed("truncated"));
        }

        let (bytes, rest) = self.input.split_at(count);
        self.input = rest;
        Ok(bytes)
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = self.read_byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }

        let count = (first & 0x7f) as usize;
        if count == 0 {
            return Err(malformed("indefinite length"));
        }
        if count > std::mem::size_of::<usize>() {
            return Err(malformed("length does not fit in memory"));
        }

        let bytes = self.read_bytes(count)?;
        if bytes[0] == 0 {
            return Err(malformed("length is not minimally encoded"));
        }

        let length = bytes
            .iter()
            .fold(0usize, |length, byte| (length << 8) | *byte as usize);
        if length < 0x80 {
            return Err(malformed("length is not minimally encoded"));
        }

        Ok(length)
    }

    fn read_element(&mut self, tag: u8) -> Result<&'a [u8]> {
        if self.read_byte()? != tag {
            return Err(malformed("unexpected tag"));
        }

        let length = self.read_length()?;
        self.read_bytes(length)
    }
}
