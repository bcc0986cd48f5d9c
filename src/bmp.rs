use crate::image::PixelGrid;

/// Encodes `image` as an uncompressed 24-bit BMP: bottom-up BGR rows, each
/// padded to a multiple of four bytes.
pub fn write_bmp(image: &PixelGrid) -> Vec<u8> {
    let width = image.width() as u32;
    let height = image.height() as u32;
    let padding = (4 - (width * 3) % 4) % 4;
    let data_size = (width * 3 + padding) * height;

    let mut ret = Vec::with_capacity(14 + 40 + data_size as usize);

    // BMP header
    ret.extend_from_slice("BM".as_bytes());
    ret.extend_from_slice(&(14 + 40 + data_size).to_le_bytes());
    ret.extend_from_slice(&0u16.to_le_bytes());
    ret.extend_from_slice(&0u16.to_le_bytes());
    ret.extend_from_slice(&(14u32 + 40u32).to_le_bytes());

    // BITMAPINFOHEADER
    ret.extend_from_slice(&40u32.to_le_bytes());
    ret.extend_from_slice(&width.to_le_bytes());
    ret.extend_from_slice(&height.to_le_bytes());
    ret.extend_from_slice(&1u16.to_le_bytes());
    ret.extend_from_slice(&24u16.to_le_bytes());
    ret.extend_from_slice(&0u32.to_le_bytes());
    ret.extend_from_slice(&data_size.to_le_bytes());
    ret.extend_from_slice(&96u32.to_le_bytes());
    ret.extend_from_slice(&96u32.to_le_bytes());
    ret.extend_from_slice(&0u32.to_le_bytes());
    ret.extend_from_slice(&0u32.to_le_bytes());

    let rows = image.rows().take(image.height()).collect::<Vec<_>>();
    for row in rows.iter().rev() {
        for pixel in row.iter() {
            ret.extend_from_slice(&[pixel.b, pixel.g, pixel.r]);
        }
        for _ in 0..padding {
            ret.push(0x00);
        }
    }

    ret
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::image::Rgb;

    #[test]
    fn test_header() {
        let bmp = write_bmp(&PixelGrid::new(3, 2));
        assert_eq!(&bmp[0..2], b"BM");
        // Three pixels take 9 bytes, padded to 12.
        assert_eq!(bmp.len(), 54 + 12 * 2);
        assert_eq!(u32::from_le_bytes([bmp[2], bmp[3], bmp[4], bmp[5]]) as usize, bmp.len());
        assert_eq!(u32::from_le_bytes([bmp[18], bmp[19], bmp[20], bmp[21]]), 3);
        assert_eq!(u32::from_le_bytes([bmp[22], bmp[23], bmp[24], bmp[25]]), 2);
        assert_eq!(u16::from_le_bytes([bmp[28], bmp[29]]), 24);
    }

    #[test]
    fn test_rows_are_bottom_up_bgr() {
        let mut image = PixelGrid::new(1, 2);
        image.set(0, 0, Rgb { r: 1, g: 2, b: 3 });
        image.set(0, 1, Rgb { r: 4, g: 5, b: 6 });
        let bmp = write_bmp(&image);
        assert_eq!(&bmp[54..], &[6, 5, 4, 0, 3, 2, 1, 0]);
    }

    #[test]
    fn test_aligned_rows_have_no_padding() {
        let bmp = write_bmp(&PixelGrid::new(4, 1));
        assert_eq!(bmp.len(), 54 + 12);
    }
}
