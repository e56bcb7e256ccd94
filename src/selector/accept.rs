//! Accept header media-range parsing (RFC 7231 section 5.3.2)

/// One media range from an Accept header, with its quality weight
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub media_type: String,
    pub quality: f32,
}

impl MediaRange {
    /// Whether this range accepts the given concrete media type.
    /// Matches exactly, as `type/*`, or as `*/*`; all comparisons
    /// case-insensitive.
    pub fn matches(&self, media_type: &str) -> bool {
        let range = self.media_type.trim();
        let candidate = media_type.trim();

        if range == "*/*" {
            return true;
        }
        if range.eq_ignore_ascii_case(candidate) {
            return true;
        }
        if let Some(range_type) = range.strip_suffix("/*") {
            if let Some((candidate_type, _)) = candidate.split_once('/') {
                return range_type.eq_ignore_ascii_case(candidate_type);
            }
        }
        false
    }
}

/// Parse an Accept header into media ranges ordered by descending quality.
///
/// Quality defaults to 1.0 when no `q=` parameter is present; malformed
/// quality values fall back to 1.0 rather than dropping the range. Ordering
/// is stable, so equal-quality ranges keep their declaration order.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let media_type = parts.next()?.trim();
            if media_type.is_empty() {
                return None;
            }

            let mut quality = 1.0f32;
            for param in parts {
                if let Some((key, val)) = param.split_once('=') {
                    if key.trim().eq_ignore_ascii_case("q") {
                        quality = val.trim().parse().unwrap_or(1.0);
                    }
                }
            }

            Some(MediaRange {
                media_type: media_type.to_string(),
                quality: quality.clamp(0.0, 1.0),
            })
        })
        .collect();

    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(std::cmp::Ordering::Equal));
    ranges
}
