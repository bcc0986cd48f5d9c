use crate::bitstream::BitReader;
use crate::error::{DecodeError, Result};

#[derive(Debug, Eq, PartialEq)]
enum Node {
    Leaf(u8),
    /// Children for a 0 bit and a 1 bit. A missing child is a code the
    /// table never assigned.
    Internal(Option<Box<Node>>, Option<Box<Node>>),
}

/// Binary decode tree for one DC or AC table.
#[derive(Debug, Eq, PartialEq)]
pub struct HuffmanTree {
    root: Node,
}

/// Canonical `(code, length)` pairs in symbol order for 16 per-length counts.
pub fn canonical_codes(counts: &[u8; 16]) -> Result<Vec<(u16, u8)>> {
    let mut code = 0u32;
    let mut ret = Vec::with_capacity(counts.iter().map(|c| *c as usize).sum());
    for (i, count) in counts.iter().enumerate() {
        let length = i as u8 + 1;
        code <<= 1;
        if code + *count as u32 > 1 << length {
            return Err(DecodeError::Malformed(format!("too many Huffman codes of length {}", length)));
        }
        for _ in 0..*count {
            ret.push((code as u16, length));
            code += 1;
        }
    }
    Ok(ret)
}

impl HuffmanTree {
    /// Builds the tree from `counts[i]` = number of codes of length `i + 1`
    /// and the symbols listed in code order.
    pub fn build(counts: &[u8; 16], symbols: &[u8]) -> Result<HuffmanTree> {
        let codes = canonical_codes(counts)?;
        if codes.is_empty() {
            return Err(DecodeError::Malformed("Huffman table defines no codes".into()));
        }
        if symbols.len() < codes.len() {
            return Err(DecodeError::Malformed(format!(
                "Huffman table lists {} symbols for {} codes",
                symbols.len(),
                codes.len()
            )));
        }

        let mut root = Node::Internal(None, None);
        for ((code, length), symbol) in codes.into_iter().zip(symbols) {
            insert(&mut root, code, length, *symbol)?;
        }
        Ok(HuffmanTree { root })
    }

    /// Walks the tree bit by bit until a leaf is reached.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u8> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(symbol) => return Ok(*symbol),
                Node::Internal(zero, one) => {
                    let child = if reader.read_bit()? { one } else { zero };
                    node = child.as_deref().ok_or(DecodeError::InvalidHuffmanCode)?;
                }
            }
        }
    }
}

fn insert(root: &mut Node, code: u16, length: u8, symbol: u8) -> Result<()> {
    let mut node = root;
    for i in (0..length).rev() {
        let Node::Internal(zero, one) = node else {
            return Err(DecodeError::Malformed("Huffman code is prefixed by a shorter code".into()));
        };
        let child = if (code >> i) & 1 == 1 { one } else { zero };
        node = &mut **child.get_or_insert_with(|| Box::new(Node::Internal(None, None)));
    }
    if *node != Node::Internal(None, None) {
        return Err(DecodeError::Malformed("Huffman code assigned twice".into()));
    }
    *node = Node::Leaf(symbol);
    Ok(())
}
