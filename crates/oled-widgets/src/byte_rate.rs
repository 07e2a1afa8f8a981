//! Byte-rate auto-scaling shared by the network and disk widgets
//! (spec.md §4.8's `ByteRateConverter`). The bar/graph/gauge strategies
//! only understand a `0..100` percent; this converts raw bytes/sec into
//! that range against either a fixed speed cap or a per-channel recent
//! maximum, and separately formats a human-magnitude string for text
//! mode (B/s ... GiB/s).

const KIB: f32 = 1024.0;
const MIB: f32 = KIB * 1024.0;
const GIB: f32 = MIB * 1024.0;

/// Formats a bytes/sec value as the smallest unit that keeps the
/// mantissa readable, with precision scaled to magnitude.
pub fn format_byte_rate(bytes_per_sec: f32) -> String {
    let v = bytes_per_sec.max(0.0);
    if v >= GIB {
        format!("{:.2} GiB/s", v / GIB)
    } else if v >= MIB {
        format!("{:.1} MiB/s", v / MIB)
    } else if v >= KIB {
        format!("{:.0} KiB/s", v / KIB)
    } else {
        format!("{:.0} B/s", v)
    }
}

/// Converts raw bytes/sec samples on one channel (rx, tx, read, or
/// write) into a `0..100` percent. A positive `max_speed_mbps` is a
/// fixed cap in megabits/sec; `-1` (or any non-positive value) auto-
/// scales from the recent maximum observed on this channel instead, so
/// a fresh high-water mark always reads as 100% and the channel rescales
/// monotonically as new maxima arrive.
#[derive(Debug, Clone, Copy)]
pub struct ByteRateConverter {
    max_speed_mbps: f32,
    recent_max_bytes: f32,
}

impl ByteRateConverter {
    pub fn new(max_speed_mbps: f32) -> Self {
        Self { max_speed_mbps, recent_max_bytes: 0.0 }
    }

    /// Fixed-cap mode when `max_speed_mbps` is a positive value,
    /// otherwise auto-scale from the recent maximum (spec.md §4.8,
    /// scenario S6).
    pub fn to_percent(&mut self, bytes_per_sec: f32) -> f32 {
        let bytes_per_sec = bytes_per_sec.max(0.0);
        let cap_bytes = if self.max_speed_mbps > 0.0 {
            self.max_speed_mbps * 1_000_000.0 / 8.0
        } else {
            self.recent_max_bytes = self.recent_max_bytes.max(bytes_per_sec);
            self.recent_max_bytes.max(1.0)
        };
        (bytes_per_sec / cap_bytes * 100.0).clamp(0.0, 100.0)
    }
}

/// Reads `max_speed_mbps` out of a widget's catch-all config map,
/// defaulting to `-1` (recent-max auto-scale) when absent.
pub fn max_speed_mbps_from(extra: &serde_json::Map<String, serde_json::Value>) -> f32 {
    extra.get("max_speed_mbps").and_then(|v| v.as_f64()).map(|v| v as f32).unwrap_or(-1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_magnitude_by_size() {
        assert_eq!(format_byte_rate(512.0), "512 B/s");
        assert_eq!(format_byte_rate(2048.0), "2 KiB/s");
        assert_eq!(format_byte_rate(5.0 * MIB), "5.0 MiB/s");
        assert_eq!(format_byte_rate(2.5 * GIB), "2.50 GiB/s");
    }

    #[test]
    fn fixed_cap_normalizes_against_configured_speed() {
        let mut conv = ByteRateConverter::new(8.0); // 8 Mbps == 1 MiB/s
        assert!((conv.to_percent(MIB) - 100.0).abs() < 0.01);
        assert!((conv.to_percent(MIB / 2.0) - 50.0).abs() < 0.5);
    }

    #[test]
    fn auto_scale_rescales_monotonically_from_recent_max() {
        let mut conv = ByteRateConverter::new(-1.0);
        let p1 = conv.to_percent(1.0 * MIB);
        let p2 = conv.to_percent(10.0 * MIB);
        let p3 = conv.to_percent(100.0 * MIB);
        // Each new sample is itself the fresh high-water mark, so every
        // frame reads at (roughly) full scale rather than saturating
        // against an earlier, now-irrelevant cap.
        assert!(p1 > 99.0);
        assert!(p2 > 99.0);
        assert!(p3 > 99.0);

        // A dip after a high-water mark reads proportionally, not
        // saturated, because the cap no longer moves.
        let p4 = conv.to_percent(50.0 * MIB);
        assert!((p4 - 50.0).abs() < 1.0);
    }
}
