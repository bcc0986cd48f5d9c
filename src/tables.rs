use log::debug;

use crate::constants::ZIGZAG_TO_NATURAL;
use crate::error::{DecodeError, Result, TableClass};
use crate::huffman::HuffmanTree;

/// 64 dequantization multipliers in natural (row-major) order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuantizationTable {
    values: [u16; 64],
}

impl QuantizationTable {
    /// Builds a table from values listed in zigzag order, as they appear in a DQT segment.
    pub fn from_zigzag(zigzag: &[u16; 64]) -> QuantizationTable {
        let mut values = [0; 64];
        for (i, value) in zigzag.iter().enumerate() {
            values[ZIGZAG_TO_NATURAL[i]] = *value;
        }
        QuantizationTable { values }
    }

    pub fn flat(value: u16) -> QuantizationTable {
        QuantizationTable { values: [value; 64] }
    }

    /// Multiplier for a natural-order coefficient position.
    pub fn get(&self, natural: usize) -> u16 {
        self.values[natural]
    }
}

/// Quantization and Huffman tables defined so far, each addressed by a 0-3 index.
#[derive(Debug, Default)]
pub struct TableStore {
    quantization: [Option<QuantizationTable>; 4],
    dc: [Option<HuffmanTree>; 4],
    ac: [Option<HuffmanTree>; 4],
}

fn check_index(index: u8) -> Result<usize> {
    if index > 3 {
        return Err(DecodeError::Malformed(format!("table index {} out of range", index)));
    }
    Ok(index as usize)
}

impl TableStore {
    pub fn set_quantization(&mut self, index: u8, table: QuantizationTable) -> Result<()> {
        let slot = check_index(index)?;
        if self.quantization[slot].is_some() {
            debug!("redefining quantization table {}", index);
        }
        self.quantization[slot] = Some(table);
        Ok(())
    }

    pub fn set_huffman(&mut self, class: TableClass, index: u8, tree: HuffmanTree) -> Result<()> {
        let slot = check_index(index)?;
        let tables = match class {
            TableClass::DC => &mut self.dc,
            TableClass::AC => &mut self.ac,
        };
        if tables[slot].is_some() {
            debug!("redefining {} Huffman table {}", class, index);
        }
        tables[slot] = Some(tree);
        Ok(())
    }

    pub fn quantization(&self, index: u8) -> Result<&QuantizationTable> {
        self.quantization
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(DecodeError::MissingQuantizationTable(index))
    }

    pub fn huffman(&self, class: TableClass, index: u8) -> Result<&HuffmanTree> {
        let tables = match class {
            TableClass::DC => &self.dc,
            TableClass::AC => &self.ac,
        };
        tables
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(DecodeError::MissingHuffmanTable { class, index })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_zigzag() {
        let zigzag: [u16; 64] = std::array::from_fn(|i| i as u16);
        let table = QuantizationTable::from_zigzag(&zigzag);
        assert_eq!(table.get(0), 0);
        assert_eq!(table.get(1), 1);
        assert_eq!(table.get(8), 2);
        assert_eq!(table.get(16), 3);
        assert_eq!(table.get(63), 63);
    }

    #[test]
    fn test_missing_tables() {
        let mut store = TableStore::default();
        store.set_quantization(0, QuantizationTable::flat(1)).unwrap();
        store.set_quantization(1, QuantizationTable::flat(2)).unwrap();

        assert_eq!(store.quantization(1).unwrap().get(5), 2);
        assert_eq!(store.quantization(2), Err(DecodeError::MissingQuantizationTable(2)));
        assert_eq!(store.quantization(9), Err(DecodeError::MissingQuantizationTable(9)));
        assert_eq!(
            store.huffman(TableClass::AC, 0),
            Err(DecodeError::MissingHuffmanTable { class: TableClass::AC, index: 0 })
        );
    }

    #[test]
    fn test_dc_and_ac_are_separate() {
        let mut counts = [0u8; 16];
        counts[0] = 1;
        let mut store = TableStore::default();
        store.set_huffman(TableClass::DC, 1, HuffmanTree::build(&counts, &[0]).unwrap()).unwrap();

        assert!(store.huffman(TableClass::DC, 1).is_ok());
        assert!(store.huffman(TableClass::AC, 1).is_err());
        assert!(store.set_quantization(4, QuantizationTable::flat(1)).is_err());
    }
}
