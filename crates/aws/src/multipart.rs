//! Multipart upload planning
//!
//! Files at or above the threshold are sent as multipart uploads. The plan is
//! a list of 1-based part numbers with the byte range each covers.

/// Files this large or larger use multipart upload: 8 MiB
pub const DEFAULT_THRESHOLD: u64 = 8 * 1024 * 1024;

/// Default part size: 8 MiB
pub const DEFAULT_PART_SIZE: u64 = 8 * 1024 * 1024;

/// Minimum part size: 5 MiB (S3 requirement)
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum part size: 5 GiB
pub const MAX_PART_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Maximum number of parts: 10,000 (S3 limit)
pub const MAX_PARTS: usize = 10_000;

/// One part of a planned upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub part_number: i32,
    pub offset: u64,
    pub length: u64,
}

/// Multipart upload configuration
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Minimum file size that switches to multipart
    pub threshold: u64,

    /// Preferred part size in bytes
    pub part_size: u64,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            part_size: DEFAULT_PART_SIZE,
        }
    }
}

impl MultipartConfig {
    pub fn use_multipart(&self, file_size: u64) -> bool {
        file_size >= self.threshold
    }

    /// Calculate appropriate part size for a file
    pub fn calculate_part_size(&self, file_size: u64) -> u64 {
        if file_size <= MIN_PART_SIZE {
            return MIN_PART_SIZE;
        }

        let parts = file_size.div_ceil(self.part_size);

        if parts <= MAX_PARTS as u64 {
            self.part_size
        } else {
            // Grow parts to stay within the 10,000 limit
            let required_size = file_size.div_ceil(MAX_PARTS as u64);
            required_size.clamp(MIN_PART_SIZE, MAX_PART_SIZE)
        }
    }

    /// Split a file of `file_size` bytes into parts
    pub fn plan(&self, file_size: u64) -> Vec<PartRange> {
        let part_size = self.calculate_part_size(file_size);
        (1..=calculate_parts(file_size, part_size) as i32)
            .map(|part_number| {
                let (start, end) = part_byte_range(part_number, part_size, file_size);
                PartRange {
                    part_number,
                    offset: start,
                    length: end - start,
                }
            })
            .collect()
    }
}

/// Calculate number of parts for a file
pub fn calculate_parts(file_size: u64, part_size: u64) -> usize {
    file_size.div_ceil(part_size) as usize
}

/// Get byte range for a part
pub fn part_byte_range(part_number: i32, part_size: u64, total_size: u64) -> (u64, u64) {
    let start = (part_number as u64 - 1) * part_size;
    let end = (start + part_size).min(total_size);
    (start, end)
}
