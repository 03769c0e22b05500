/// Packed 1-bit image, one bit per canvas pixel, row-major.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    buffer: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0; (width * height).div_ceil(8)],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0);
    }

    pub fn get(&self, col: usize, row: usize) -> bool {
        if col >= self.width || row >= self.height {
            return false;
        }
        let idx = row * self.width + col;
        self.buffer[idx / 8] & (1 << (idx % 8)) != 0
    }

    pub fn set(&mut self, col: usize, row: usize, val: bool) {
        if col >= self.width || row >= self.height {
            return;
        }
        let idx = row * self.width + col;
        let mask: u8 = 1 << (idx % 8);
        if val {
            self.buffer[idx / 8] |= mask;
        } else {
            self.buffer[idx / 8] &= !mask;
        }
    }

    /// Bresenham line between two pixels, inclusive. Off-image pixels are skipped.
    pub fn line(&mut self, from: (i64, i64), to: (i64, i64)) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x >= 0 && y >= 0 {
                self.set(x as usize, y as usize, true);
            }
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Coordinates of every set pixel.
    pub fn points(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .flat_map(move |row| (0..self.width).map(move |col| (col, row)))
            .filter(|&(col, row)| self.get(col, row))
    }

    pub fn count(&self) -> usize {
        self.buffer.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_reset() {
        let mut raster = Raster::new(10, 3);
        raster.set(9, 2, true);
        raster.set(0, 0, true);
        raster.set(0, 0, false);
        raster.set(50, 50, true);
        assert!(raster.get(9, 2));
        assert!(!raster.get(0, 0));
        assert_eq!(raster.count(), 1);
        raster.reset();
        assert_eq!(raster.count(), 0);
    }

    #[test]
    fn line_covers_endpoints() {
        let mut raster = Raster::new(8, 8);
        raster.line((0, 0), (7, 3));
        assert!(raster.get(0, 0));
        assert!(raster.get(7, 3));
        assert_eq!(raster.count(), 8);

        raster.reset();
        raster.line((2, 5), (2, 1));
        assert_eq!(
            raster.points().collect::<Vec<_>>(),
            vec![(2, 1), (2, 2), (2, 3), (2, 4), (2, 5)]
        );
    }
}
